//! Message composition engine: header resolution, quoting, redirects,
//! form templates and the compose mode dispatcher.

pub mod address;
pub mod attachment;
pub mod citation;
pub mod collab;
pub mod compose;
pub mod error;
pub mod header;
pub mod model;
pub mod prompt;
pub mod redirect;
pub mod template;

#[cfg(test)]
pub(crate) mod testing;

pub use attachment::load_attachment;
pub use citation::build_citation;
pub use collab::{Delivery, MessageLoader, TemplateRenderer, TemplateResult, TextEditor};
pub use compose::{BatchRequest, ComposeOptions, ComposeOutcome, ComposeRequest, Session, compose};
pub use error::{ComposeError, ErrorKind};
pub use header::reply_subject;
pub use model::{
    Address, Attachment, DATE_FORMAT, Message, MessageId, NO_BODY, NO_SUBJECT, P2P_ONLY_FLAG,
};
pub use prompt::Prompt;
pub use redirect::{redirect, redirect_at};
pub use template::{ReviewAnswer, ReviewState};
