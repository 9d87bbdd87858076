//! Error types for the compose engine.

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Failures that end a compose attempt.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Neither To nor Cc holds an address.
    #[error("message must have at least one recipient")]
    NoRecipients,

    /// Both an in-reply-to and a redirect reference were supplied.
    #[error("only one of in-reply-to or redirect may be used")]
    ConflictingSources,

    /// A redirect was requested without a message to redirect.
    #[error("there is no message to be redirected")]
    MissingRedirectSource,

    /// A local file could not be read as an attachment.
    #[error("{}: {source}", path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The reply or redirect source could not be loaded.
    #[error("unable to load message {reference}: {reason}")]
    NotFound { reference: String, reason: String },

    /// The text editing collaborator failed.
    #[error("editor failed: {0}")]
    Editor(String),

    /// The forms collaborator could not render a template.
    #[error("template {name} failed: {reason}")]
    Template { name: String, reason: String },

    /// The outbound pipeline rejected the message.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Reading a prompt answer or writing to the terminal failed.
    #[error("terminal I/O error: {0}")]
    Terminal(#[from] io::Error),
}

/// Coarse classification used by callers to pick an exit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Io,
    NotFound,
    Editor,
    Template,
    Delivery,
}

impl ComposeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoRecipients | Self::ConflictingSources | Self::MissingRedirectSource => {
                ErrorKind::Validation
            }
            Self::Attachment { .. } | Self::Terminal(_) => ErrorKind::Io,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Editor(_) => ErrorKind::Editor,
            Self::Template { .. } => ErrorKind::Template,
            Self::Delivery(_) => ErrorKind::Delivery,
        }
    }
}

pub type Result<T> = std::result::Result<T, ComposeError>;
