//! Capabilities the compose engine consumes but does not implement.

use anyhow::Result;

use crate::model::{Attachment, Message};

pub trait MessageLoader {
    fn load(&self, reference: &str) -> Result<Message>;
}

/// Hands `seed` to the operator and blocks until they are done editing.
pub trait TextEditor {
    fn edit_text(&mut self, seed: &str) -> Result<String>;
}

pub trait TemplateRenderer {
    fn render(
        &self,
        name: &str,
        subject_hint: &str,
        reply: Option<&Message>,
    ) -> Result<TemplateResult>;
}

pub trait Delivery {
    fn deliver(&mut self, message: &Message) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct TemplateResult {
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
}
