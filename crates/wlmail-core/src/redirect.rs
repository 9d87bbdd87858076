use chrono::{DateTime, Utc};

use crate::error::{ComposeError, Result};
use crate::model::{DATE_FORMAT, Message};

pub fn redirect(msg: Message, source: Option<&Message>) -> Result<Message> {
    redirect_at(msg, source, Utc::now())
}

/// Wraps `source` unchanged in `msg`, whose header is already resolved, and
/// carries over every attachment.
pub fn redirect_at(mut msg: Message, source: Option<&Message>, now: DateTime<Utc>) -> Result<Message> {
    let source = source.ok_or(ComposeError::MissingRedirectSource)?;

    let mut body = format!(
        "----- Message from {} was forwarded without change by {} at {} UTC -----\n\n",
        source.from,
        msg.from,
        now.format("%Y-%m-%d %H:%M")
    );
    body.push_str(&format!("Mid: {}\n", source.id));
    body.push_str(&format!("Date: {}\n", source.date.format(DATE_FORMAT)));
    body.push_str(&format!("From: {}\n", source.from));
    for to in &source.to {
        body.push_str(&format!("To: {}\n", to));
    }
    for cc in &source.cc {
        body.push_str(&format!("Cc: {}\n", cc));
    }
    body.push_str(&format!("Subject: {}\n", source.subject));
    body.push('\n');
    body.push_str(&source.body);
    body.push('\n');

    msg.body = body;
    msg.attachments.extend(source.attachments.iter().cloned());
    tracing::debug!(source = %source.id, mid = %msg.id, "message redirected");
    Ok(msg)
}
