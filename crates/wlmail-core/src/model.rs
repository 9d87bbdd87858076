use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use rand::{Rng, distributions::Alphanumeric};
use serde::Serialize;

use crate::error::{ComposeError, Result};

pub const NO_SUBJECT: &str = "<No subject>";
pub const NO_BODY: &str = "<No message body>\n";
pub const P2P_ONLY_FLAG: &str = "X-P2POnly";
pub const DATE_FORMAT: &str = "%Y/%m/%d %H:%M";
const MID_LEN: usize = 12;

/// A sender or receiver, compared without regard to ASCII case.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn generate() -> Self {
        let id = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(MID_LEN)
            .map(|b| (b as char).to_ascii_uppercase())
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    /// Empty means "guess from the name".
    pub media_type: String,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: String::new(),
            content,
        }
    }

    pub fn media_type(&self) -> String {
        if !self.media_type.is_empty() {
            return self.media_type.clone();
        }
        mime_guess::from_path(&self.name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub date: DateTime<Utc>,
    pub from: Address,
    pub to: Vec<Address>,
    pub cc: Vec<Address>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
    pub flags: BTreeMap<String, String>,
}

impl Message {
    pub fn new(from: Address) -> Self {
        Self {
            id: MessageId::generate(),
            date: Utc::now(),
            from,
            to: Vec::new(),
            cc: Vec::new(),
            subject: String::new(),
            body: String::new(),
            attachments: Vec::new(),
            flags: BTreeMap::new(),
        }
    }

    pub fn add_to(&mut self, addr: Address) {
        if !addr.is_empty() {
            self.to.push(addr);
        }
    }

    pub fn add_cc(&mut self, addr: Address) {
        if !addr.is_empty() {
            self.cc.push(addr);
        }
    }

    pub fn receivers(&self) -> impl Iterator<Item = &Address> {
        self.to.iter().chain(self.cc.iter())
    }

    pub fn receiver_count(&self) -> usize {
        self.to.len() + self.cc.len()
    }

    pub fn set_flag(&mut self, name: &str, value: &str) {
        self.flags.insert(name.to_string(), value.to_string());
    }

    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_p2p_only(&self) -> bool {
        self.flag(P2P_ONLY_FLAG)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Substitutes placeholder subject and body and checks that somebody will
    /// receive the message. Must pass before the message leaves the engine.
    pub fn finalize(&mut self) -> Result<()> {
        if self.receiver_count() == 0 {
            return Err(ComposeError::NoRecipients);
        }
        if self.subject.trim().is_empty() {
            self.subject = NO_SUBJECT.to_string();
        }
        self.body = body_or_placeholder(std::mem::take(&mut self.body));
        Ok(())
    }
}

pub fn body_or_placeholder(body: String) -> String {
    if body.trim().is_empty() {
        NO_BODY.to_string()
    } else {
        body
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mid: {}", self.id)?;
        writeln!(f, "Date: {}", self.date.format(DATE_FORMAT))?;
        writeln!(f, "From: {}", self.from)?;
        for to in &self.to {
            writeln!(f, "To: {}", to)?;
        }
        for cc in &self.cc {
            writeln!(f, "Cc: {}", cc)?;
        }
        writeln!(f, "Subject: {}", self.subject)?;
        for (name, value) in &self.flags {
            writeln!(f, "{}: {}", name, value)?;
        }
        for att in &self.attachments {
            writeln!(
                f,
                "File: {} ({}, {} bytes)",
                att.name,
                att.media_type(),
                att.content.len()
            )?;
        }
        writeln!(f)?;
        f.write_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{Address, Attachment, Message, MessageId, NO_BODY, NO_SUBJECT, P2P_ONLY_FLAG};
    use crate::error::ComposeError;

    #[test]
    fn addresses_compare_case_insensitively() {
        assert_eq!(Address::new("la5nta"), Address::new(" LA5NTA "));
        let set: HashSet<Address> = ["N0CALL", "n0call", "W1AW"]
            .into_iter()
            .map(Address::new)
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn generated_ids_are_upper_alphanumeric() {
        let id = MessageId::generate();
        assert_eq!(id.as_str().len(), 12);
        assert!(
            id.as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn media_type_is_guessed_only_when_empty() {
        let mut att = Attachment::new("report.pdf", vec![1, 2, 3]);
        assert_eq!(att.media_type(), "application/pdf");
        att.media_type = "text/plain".to_string();
        assert_eq!(att.media_type(), "text/plain");
        assert_eq!(
            Attachment::new("blob", Vec::new()).media_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn finalize_substitutes_placeholders() {
        let mut msg = Message::new(Address::new("N0CALL"));
        msg.add_to(Address::new("W1AW"));
        msg.body = "  \n\t".to_string();
        msg.finalize().unwrap();
        assert_eq!(msg.subject, NO_SUBJECT);
        assert_eq!(msg.body, NO_BODY);
    }

    #[test]
    fn finalize_rejects_message_without_receivers() {
        let mut msg = Message::new(Address::new("N0CALL"));
        msg.add_to(Address::new("   "));
        assert!(matches!(msg.finalize(), Err(ComposeError::NoRecipients)));
    }

    #[test]
    fn p2p_flag_lookup_ignores_header_case() {
        let mut msg = Message::new(Address::new("N0CALL"));
        assert!(!msg.is_p2p_only());
        msg.set_flag(P2P_ONLY_FLAG, "true");
        assert!(msg.is_p2p_only());
        assert_eq!(msg.flag("x-p2ponly"), Some("true"));
    }
}
