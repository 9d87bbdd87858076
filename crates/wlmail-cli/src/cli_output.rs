use anyhow::Result;
use serde_json::{Value as JsonValue, json};
use wlmail_core::ErrorKind;

pub(crate) const CLI_SCHEMA_VERSION: u32 = 1;

pub(crate) fn ok_envelope(value: JsonValue) -> JsonValue {
    json!({
        "schema": CLI_SCHEMA_VERSION,
        "ok": true,
        "result": value
    })
}

pub(crate) fn error_envelope(message: &str, kind: Option<ErrorKind>) -> JsonValue {
    let mut value = json!({
        "schema": CLI_SCHEMA_VERSION,
        "ok": false,
        "error": message
    });
    if let Some(kind) = kind {
        value["kind"] = json!(kind);
    }
    value
}

pub(crate) fn output_ok(value: JsonValue) -> Result<()> {
    println!("{}", serde_json::to_string(&ok_envelope(value))?);
    Ok(())
}

pub(crate) fn output_error(message: &str, kind: Option<ErrorKind>) -> Result<()> {
    println!("{}", serde_json::to_string(&error_envelope(message, kind))?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wlmail_core::{ComposeOutcome, ErrorKind, MessageId};

    use super::{error_envelope, ok_envelope};

    #[test]
    fn posted_outcome_is_wrapped() {
        let outcome = ComposeOutcome::Posted {
            mid: MessageId::from("ABCDEF123456".to_string()),
        };
        let value = ok_envelope(serde_json::to_value(&outcome).unwrap());
        assert_eq!(
            value,
            json!({
                "schema": 1,
                "ok": true,
                "result": {"status": "posted", "mid": "ABCDEF123456"}
            })
        );
    }

    #[test]
    fn errors_carry_the_message() {
        let value = error_envelope("no recipients", Some(ErrorKind::Validation));
        assert_eq!(value["ok"], json!(false));
        assert_eq!(value["error"], json!("no recipients"));
        assert_eq!(value["kind"], json!("validation"));

        let plain = error_envelope("bad config", None);
        assert!(plain.get("kind").is_none());
    }
}
