//! Named message templates kept as plain files under a forms directory.
//!
//! A template starts with optional `Subject:` and `Attach:` lines ended by a
//! blank line; the rest is the body. `<Token>` placeholders are expanded in
//! the subject, the body and UTF-8 attachments.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use wlmail_core::{Attachment, Message, TemplateRenderer, TemplateResult};

use crate::error::{Result, StoreError};

const TEMPLATE_EXT: &str = "txt";

#[derive(Debug, Clone)]
pub struct FormsDir {
    root: PathBuf,
    callsign: String,
    vars: BTreeMap<String, String>,
}

struct Context<'a> {
    callsign: &'a str,
    subject_hint: &'a str,
    reply: Option<&'a Message>,
    vars: &'a BTreeMap<String, String>,
    now: DateTime<Utc>,
}

impl Context<'_> {
    fn lookup(&self, token: &str) -> Option<String> {
        let lower = token.trim().to_ascii_lowercase();
        if let Some(name) = lower.strip_prefix("var ") {
            return self
                .vars
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name.trim()))
                .map(|(_, value)| value.clone());
        }
        let value = match lower.as_str() {
            "callsign" | "msgsender" => self.callsign.to_string(),
            "subjecthint" => self.subject_hint.to_string(),
            "datetime" => self
                .now
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            "udatetime" => self.now.format("%Y-%m-%d %H:%M:%SZ").to_string(),
            "replyfrom" => self.reply.map(|r| r.from.to_string()).unwrap_or_default(),
            "replysubject" => self.reply.map(|r| r.subject.clone()).unwrap_or_default(),
            _ => return None,
        };
        Some(value)
    }

    /// Unknown tokens are left untouched so markup survives.
    fn expand(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find('<') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            let Some(end) = tail.find('>') else {
                out.push_str(tail);
                return out;
            };
            let token = &tail[1..end];
            match self.lookup(token) {
                Some(value) => out.push_str(&value),
                None => {
                    if token.to_ascii_lowercase().starts_with("var ") {
                        tracing::warn!(token, "template variable has no value");
                    }
                    out.push_str(&tail[..=end]);
                }
            }
            rest = &tail[end + 1..];
        }
        out.push_str(rest);
        out
    }
}

struct Parsed<'a> {
    subject: String,
    attach: Vec<&'a str>,
    body: &'a str,
}

fn parse_template(text: &str) -> Parsed<'_> {
    let mut subject = String::new();
    let mut attach = Vec::new();
    let mut has_headers = false;
    let mut rest = text;
    loop {
        let (line, next) = match rest.find('\n') {
            Some(idx) => (&rest[..idx], &rest[idx + 1..]),
            None => (rest, ""),
        };
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if has_headers {
                rest = next;
            }
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            break;
        };
        if key.eq_ignore_ascii_case("subject") {
            subject = value.trim().to_string();
        } else if key.eq_ignore_ascii_case("attach") {
            attach.push(value.trim());
        } else {
            break;
        }
        has_headers = true;
        rest = next;
    }
    Parsed {
        subject,
        attach,
        body: if has_headers { rest } else { text },
    }
}

impl FormsDir {
    pub fn new(root: impl Into<PathBuf>, callsign: &str) -> Self {
        Self {
            root: root.into(),
            callsign: callsign.trim().to_ascii_uppercase(),
            vars: BTreeMap::new(),
        }
    }

    pub fn with_vars(mut self, vars: BTreeMap<String, String>) -> Self {
        self.vars = vars;
        self
    }

    pub fn template_path(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.extension().is_some() {
            self.root.join(path)
        } else {
            self.root.join(format!("{}.{}", name, TEMPLATE_EXT))
        }
    }

    pub fn render_at(
        &self,
        name: &str,
        subject_hint: &str,
        reply: Option<&Message>,
        now: DateTime<Utc>,
    ) -> Result<TemplateResult> {
        let path = self.template_path(name);
        if !path.is_file() {
            return Err(StoreError::TemplateNotFound(path));
        }
        let text = std::fs::read_to_string(&path).map_err(StoreError::io(&path))?;
        let ctx = Context {
            callsign: &self.callsign,
            subject_hint,
            reply,
            vars: &self.vars,
            now,
        };
        let parsed = parse_template(&text);

        let mut subject = ctx.expand(&parsed.subject).trim().to_string();
        if subject.is_empty() {
            subject = subject_hint.to_string();
        }
        let base = path.parent().unwrap_or(self.root.as_path());
        let mut attachments = Vec::new();
        for rel in parsed.attach {
            let file = base.join(rel);
            let raw = std::fs::read(&file).map_err(StoreError::io(&file))?;
            let content = match String::from_utf8(raw) {
                Ok(text) => ctx.expand(&text).into_bytes(),
                Err(err) => err.into_bytes(),
            };
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| rel.to_string());
            attachments.push(Attachment::new(name, content));
        }
        tracing::debug!(template = name, attachments = attachments.len(), "template rendered");
        Ok(TemplateResult {
            subject,
            body: ctx.expand(parsed.body),
            attachments,
        })
    }
}

impl TemplateRenderer for FormsDir {
    fn render(
        &self,
        name: &str,
        subject_hint: &str,
        reply: Option<&Message>,
    ) -> anyhow::Result<TemplateResult> {
        Ok(self.render_at(name, subject_hint, reply, Utc::now())?)
    }
}
