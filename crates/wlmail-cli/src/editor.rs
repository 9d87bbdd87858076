use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow, bail};
use wlmail_core::TextEditor;

const FALLBACK_EDITOR: &str = "vi";

/// Runs the operator's editor on a scratch file seeded with the draft.
#[derive(Debug, Clone)]
pub(crate) struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    pub(crate) fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Config value first, then `$VISUAL`, then `$EDITOR`.
    pub(crate) fn from_config(configured: Option<&str>) -> Self {
        let command = configured
            .map(str::to_string)
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .filter(|cmd| !cmd.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_EDITOR.to_string());
        Self::new(command)
    }

    fn scratch_path() -> PathBuf {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("wlmail-draft-{}-{}.txt", std::process::id(), ts))
    }
}

impl TextEditor for ExternalEditor {
    fn edit_text(&mut self, seed: &str) -> Result<String> {
        let parts = shell_words::split(&self.command)
            .map_err(|e| anyhow!("invalid editor command {:?}: {}", self.command, e))?;
        let Some((program, args)) = parts.split_first() else {
            bail!("editor command is empty");
        };
        let path = Self::scratch_path();
        std::fs::write(&path, seed)
            .with_context(|| format!("failed to write draft {}", path.display()))?;
        tracing::debug!(editor = %program, path = %path.display(), "launching editor");

        let result = Command::new(program)
            .args(args)
            .arg(&path)
            .status()
            .with_context(|| format!("failed to start editor {}", program))
            .and_then(|status| {
                if !status.success() {
                    bail!("editor {} exited with {}", program, status);
                }
                std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read draft {}", path.display()))
            });
        let _ = std::fs::remove_file(&path);
        result
    }
}
