use std::path::Path;

use crate::error::{ComposeError, Result};
use crate::model::{Attachment, Message};

/// Reads `path` and appends it to `msg`. On failure `msg` is untouched.
pub fn load_attachment(msg: &mut Message, path: &Path) -> Result<()> {
    let content = std::fs::read(path).map_err(|source| ComposeError::Attachment {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    tracing::debug!(name = %name, size = content.len(), "attachment loaded");
    msg.attachments.push(Attachment::new(name, content));
    Ok(())
}
