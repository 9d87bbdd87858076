use std::io::Write;
use std::path::{Path, PathBuf};

use wlmail_core::{Delivery, Message, MessageLoader};

use crate::codec::{decode, encode};
use crate::error::{Result, StoreError};

pub const FOLDER_IN: &str = "in";
pub const FOLDER_OUT: &str = "out";
pub const FOLDER_SENT: &str = "sent";
pub const FOLDER_ARCHIVE: &str = "archive";
pub const MESSAGE_EXT: &str = "b2f";

const SEARCH_ORDER: [&str; 4] = [FOLDER_IN, FOLDER_SENT, FOLDER_ARCHIVE, FOLDER_OUT];

/// Per-callsign message folders under a mailbox root.
#[derive(Debug, Clone)]
pub struct Mailbox {
    root: PathBuf,
    mycall: String,
}

impl Mailbox {
    pub fn new(root: impl Into<PathBuf>, mycall: &str) -> Self {
        Self {
            root: root.into(),
            mycall: mycall.trim().to_ascii_uppercase(),
        }
    }

    pub fn folder(&self, name: &str) -> PathBuf {
        self.root.join(&self.mycall).join(name)
    }

    /// `reference` is either a path to a message file or a MID looked up in
    /// the folders.
    pub fn open(&self, reference: &str) -> Result<Message> {
        let direct = Path::new(reference);
        if direct.is_file() {
            return read_message(direct);
        }
        for folder in SEARCH_ORDER {
            let path = self
                .folder(folder)
                .join(format!("{}.{}", reference, MESSAGE_EXT));
            if path.is_file() {
                return read_message(&path);
            }
        }
        Err(StoreError::NotFound(reference.to_string()))
    }

    pub fn post(&self, msg: &Message) -> Result<PathBuf> {
        let path = self
            .folder(FOLDER_OUT)
            .join(format!("{}.{}", msg.id, MESSAGE_EXT));
        write_atomic(&path, &encode(msg))?;
        tracing::debug!(path = %path.display(), "message written to outbox");
        Ok(path)
    }
}

fn read_message(path: &Path) -> Result<Message> {
    let raw = std::fs::read(path).map_err(StoreError::io(path))?;
    decode(&raw)
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(StoreError::io(parent))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = parent.join(format!(".{}.tmp", file_name));
    let mut file = std::fs::File::create(&tmp).map_err(StoreError::io(&tmp))?;
    file.write_all(content).map_err(StoreError::io(&tmp))?;
    file.sync_all().map_err(StoreError::io(&tmp))?;
    drop(file);
    std::fs::rename(&tmp, path).map_err(StoreError::io(path))?;
    Ok(())
}

impl MessageLoader for Mailbox {
    fn load(&self, reference: &str) -> anyhow::Result<Message> {
        Ok(self.open(reference)?)
    }
}

impl Delivery for Mailbox {
    fn deliver(&mut self, message: &Message) -> anyhow::Result<()> {
        self.post(message)?;
        Ok(())
    }
}
