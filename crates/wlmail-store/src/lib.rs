//! File-backed collaborators for the compose engine: the mailbox folders,
//! their message file format, and the forms directory.

pub mod codec;
pub mod error;
pub mod forms;
pub mod mailbox;

pub use error::StoreError;
pub use forms::FormsDir;
pub use mailbox::{FOLDER_ARCHIVE, FOLDER_IN, FOLDER_OUT, FOLDER_SENT, Mailbox};
