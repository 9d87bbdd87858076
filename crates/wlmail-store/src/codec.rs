//! On-disk message layout: `Key: value` header lines, a blank line, the body
//! and then each attached file, every section terminated by CRLF.

use chrono::{DateTime, NaiveDateTime, Utc};
use mailparse::MailHeaderMap;
use wlmail_core::{Address, Attachment, DATE_FORMAT, Message, MessageId};

use crate::error::{Result, StoreError};

const CRLF: &[u8] = b"\r\n";

fn push_header(out: &mut Vec<u8>, key: &str, value: &str) {
    let value = value.replace(['\r', '\n'], " ");
    out.extend_from_slice(key.as_bytes());
    out.extend_from_slice(b": ");
    out.extend_from_slice(value.trim().as_bytes());
    out.extend_from_slice(CRLF);
}

pub fn encode(msg: &Message) -> Vec<u8> {
    let mut out = Vec::new();
    push_header(&mut out, "Mid", msg.id.as_str());
    push_header(&mut out, "Date", &msg.date.format(DATE_FORMAT).to_string());
    push_header(&mut out, "Type", "Private");
    push_header(&mut out, "From", msg.from.as_str());
    for to in &msg.to {
        push_header(&mut out, "To", to.as_str());
    }
    for cc in &msg.cc {
        push_header(&mut out, "Cc", cc.as_str());
    }
    push_header(&mut out, "Subject", &msg.subject);
    push_header(&mut out, "Mbo", msg.from.as_str());
    for (name, value) in &msg.flags {
        push_header(&mut out, name, value);
    }
    push_header(&mut out, "Body", &msg.body.len().to_string());
    for att in &msg.attachments {
        push_header(
            &mut out,
            "File",
            &format!("{} {}", att.content.len(), att.name),
        );
    }
    out.extend_from_slice(CRLF);
    out.extend_from_slice(msg.body.as_bytes());
    out.extend_from_slice(CRLF);
    for att in &msg.attachments {
        out.extend_from_slice(&att.content);
        out.extend_from_slice(CRLF);
    }
    out
}

fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value.trim(), DATE_FORMAT) {
        return Ok(naive.and_utc());
    }
    mailparse::dateparse(value)
        .ok()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .ok_or_else(|| StoreError::Malformed(format!("bad date {:?}", value)))
}

fn parse_size(value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| StoreError::Malformed(format!("bad size {:?}", value)))
}

/// Takes `len` bytes at `*pos` and steps over the CRLF that follows them.
fn take<'a>(raw: &'a [u8], pos: &mut usize, len: usize, what: &str) -> Result<&'a [u8]> {
    let end = pos
        .checked_add(len)
        .filter(|end| *end <= raw.len())
        .ok_or_else(|| StoreError::Malformed(format!("truncated {}", what)))?;
    let chunk = &raw[*pos..end];
    *pos = end;
    if raw[*pos..].starts_with(CRLF) {
        *pos += CRLF.len();
    }
    Ok(chunk)
}

pub fn decode(raw: &[u8]) -> Result<Message> {
    let (headers, offset) =
        mailparse::parse_headers(raw).map_err(|e| StoreError::Malformed(e.to_string()))?;

    let from = headers
        .get_first_value("From")
        .ok_or_else(|| StoreError::Malformed("missing From".to_string()))?;
    let mid = headers
        .get_first_value("Mid")
        .ok_or_else(|| StoreError::Malformed("missing Mid".to_string()))?;

    let mut msg = Message::new(Address::new(from));
    msg.id = MessageId::from(mid.trim().to_string());
    let mut body_len = 0usize;
    let mut files: Vec<(usize, String)> = Vec::new();
    for header in &headers {
        let key = header.get_key();
        let value = header.get_value();
        match key.to_ascii_lowercase().as_str() {
            "date" => msg.date = parse_date(&value)?,
            "to" => msg.add_to(Address::new(value)),
            "cc" => msg.add_cc(Address::new(value)),
            "subject" => msg.subject = value.trim().to_string(),
            "body" => body_len = parse_size(&value)?,
            "file" => {
                let (size, name) = value
                    .trim()
                    .split_once(' ')
                    .ok_or_else(|| StoreError::Malformed(format!("bad File header {:?}", value)))?;
                files.push((parse_size(size)?, name.to_string()));
            }
            k if k.starts_with("x-") => msg.set_flag(&key, value.trim()),
            _ => {}
        }
    }

    let mut pos = offset;
    msg.body = String::from_utf8_lossy(take(raw, &mut pos, body_len, "body")?).into_owned();
    for (size, name) in files {
        let content = take(raw, &mut pos, size, &name)?.to_vec();
        msg.attachments.push(Attachment::new(name, content));
    }
    Ok(msg)
}
