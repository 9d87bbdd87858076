use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::address::literal_addresses;
use crate::attachment::load_attachment;
use crate::citation::build_citation;
use crate::collab::{Delivery, MessageLoader, TemplateRenderer, TextEditor};
use crate::error::{ComposeError, Result};
use crate::model::{Address, Message, MessageId, P2P_ONLY_FLAG, body_or_placeholder};
use crate::prompt::Prompt;
use crate::redirect::redirect;

/// Raw command-surface input, before any mode is chosen.
#[derive(Debug, Clone, Default)]
pub struct ComposeOptions {
    pub from: Option<String>,
    pub subject: Option<String>,
    pub attachments: Vec<PathBuf>,
    pub cc: Vec<String>,
    pub p2p_only: bool,
    pub template: Option<String>,
    pub in_reply_to: Option<String>,
    pub redirect: Option<String>,
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub from: Option<Address>,
    pub subject: String,
    pub attachments: Vec<PathBuf>,
    pub to: Vec<Address>,
    pub cc: Vec<Address>,
    pub p2p_only: bool,
}

#[derive(Debug, Clone)]
pub enum ComposeRequest {
    Interactive { reply: Option<Message> },
    NonInteractive(BatchRequest),
    Template { name: String, reply: Option<Message> },
    Redirect { source: Message },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComposeOutcome {
    Posted { mid: MessageId },
    Discarded,
    Aborted { reason: String },
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ComposeRequest {
    /// Validates the option combination, loads any referenced message and
    /// picks exactly one compose mode.
    pub fn from_options(options: ComposeOptions, loader: &dyn MessageLoader) -> Result<Self> {
        let in_reply_to = non_blank(options.in_reply_to);
        let redirect = non_blank(options.redirect);
        let template = non_blank(options.template);
        let subject = options.subject.filter(|s| !s.is_empty());
        if in_reply_to.is_some() && redirect.is_some() {
            return Err(ComposeError::ConflictingSources);
        }

        let to = literal_addresses(&options.recipients);
        let cc = literal_addresses(&options.cc);

        let source = match in_reply_to.as_deref().or(redirect.as_deref()) {
            Some(reference) => Some(load_source(loader, reference)?),
            None => None,
        };

        let batch = redirect.is_none()
            && template.is_none()
            && (subject.is_some()
                || !options.attachments.is_empty()
                || !cc.is_empty()
                || !to.is_empty());
        if batch {
            if to.is_empty() && cc.is_empty() {
                return Err(ComposeError::NoRecipients);
            }
            return Ok(Self::NonInteractive(BatchRequest {
                from: non_blank(options.from).map(Address::new),
                subject: subject.unwrap_or_default(),
                attachments: options.attachments,
                to,
                cc,
                p2p_only: options.p2p_only,
            }));
        }
        if let Some(name) = template {
            return Ok(Self::Template {
                name,
                reply: source,
            });
        }
        if redirect.is_some() {
            let source = source.ok_or(ComposeError::MissingRedirectSource)?;
            return Ok(Self::Redirect { source });
        }
        Ok(Self::Interactive { reply: source })
    }
}

fn load_source(loader: &dyn MessageLoader, reference: &str) -> Result<Message> {
    let msg = loader
        .load(reference)
        .map_err(|err| ComposeError::NotFound {
            reference: reference.to_string(),
            reason: format!("{:#}", err),
        })?;
    tracing::debug!(reference, mid = %msg.id, "source message loaded");
    Ok(msg)
}

/// One compose operation: the operator's terminal plus the collaborators the
/// flow calls into. Built once per compose and dropped when it finishes.
pub struct Session<'a> {
    pub(crate) identity: Address,
    pub(crate) prompt: Prompt<'a>,
    pub(crate) editor: &'a mut dyn TextEditor,
    pub(crate) forms: &'a dyn TemplateRenderer,
    pub(crate) outbox: &'a mut dyn Delivery,
}

impl<'a> Session<'a> {
    pub fn new(
        identity: Address,
        prompt: Prompt<'a>,
        editor: &'a mut dyn TextEditor,
        forms: &'a dyn TemplateRenderer,
        outbox: &'a mut dyn Delivery,
    ) -> Self {
        Self {
            identity,
            prompt,
            editor,
            forms,
            outbox,
        }
    }

    pub fn run(&mut self, request: ComposeRequest) -> Result<ComposeOutcome> {
        match request {
            ComposeRequest::Interactive { reply } => self.compose_interactive(reply.as_ref()),
            ComposeRequest::NonInteractive(batch) => self.compose_batch(batch),
            ComposeRequest::Template { name, reply } => {
                self.compose_with_template(&name, reply.as_ref())
            }
            ComposeRequest::Redirect { source } => {
                let header = self.compose_header(Some(&source))?;
                let msg = redirect(header, Some(&source))?;
                self.prompt.say(&format!("New msg:\n{}", msg))?;
                self.post(msg)
            }
        }
    }

    fn compose_interactive(&mut self, reply: Option<&Message>) -> Result<ComposeOutcome> {
        let mut msg = self.compose_header(reply)?;

        let seed = reply.map(build_citation).unwrap_or_default();
        self.prompt
            .ask("Press ENTER to start composing the message body. ")?;
        msg.body = self.compose_body(&seed)?;

        self.prompt.say("")?;
        loop {
            let path = self.prompt.ask("Attachment [empty when done]: ")?;
            if path.is_empty() {
                break;
            }
            if let Err(err) = load_attachment(&mut msg, Path::new(&path)) {
                tracing::warn!(error = %err, "attachment not added");
                self.prompt.say(&err.to_string())?;
            }
        }
        self.prompt.say(&msg.to_string())?;
        self.post(msg)
    }

    fn compose_batch(&mut self, batch: BatchRequest) -> Result<ComposeOutcome> {
        let from = batch.from.unwrap_or_else(|| self.identity.clone());
        if batch.subject.is_empty() {
            self.prompt.warn("Warning: missing subject; hope that's OK")?;
        }

        let mut msg = Message::new(from);
        msg.to = batch.to;
        msg.cc = batch.cc;
        msg.subject = batch.subject;
        for path in &batch.attachments {
            if let Err(err) = load_attachment(&mut msg, path) {
                self.prompt
                    .warn(&format!("{}\nAborting! (Message not posted)", err))?;
                return Err(err);
            }
        }

        let body = self.prompt.read_all()?;
        if body.is_empty() {
            self.prompt.warn("Null message body; hope that's ok")?;
        }
        msg.body = body;
        if batch.p2p_only {
            msg.set_flag(P2P_ONLY_FLAG, "true");
        }
        self.post(msg)
    }

    /// Runs the editor on `seed`. A blank result becomes the placeholder body.
    pub(crate) fn compose_body(&mut self, seed: &str) -> Result<String> {
        let body = self
            .editor
            .edit_text(seed)
            .map_err(|err| ComposeError::Editor(format!("{:#}", err)))?;
        Ok(body_or_placeholder(body))
    }

    pub(crate) fn post(&mut self, mut msg: Message) -> Result<ComposeOutcome> {
        msg.finalize()?;
        self.outbox
            .deliver(&msg)
            .map_err(|err| ComposeError::Delivery(format!("{:#}", err)))?;
        tracing::info!(mid = %msg.id, receivers = msg.receiver_count(), "message posted to outbox");
        Ok(ComposeOutcome::Posted { mid: msg.id })
    }
}

/// Builds the request from `options` and runs it in `session`.
pub fn compose(
    options: ComposeOptions,
    loader: &dyn MessageLoader,
    session: &mut Session<'_>,
) -> Result<ComposeOutcome> {
    let request = ComposeRequest::from_options(options, loader)?;
    session.run(request)
}
