use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

pub(crate) const MYCALL_ENV: &str = "WLMAIL_MYCALL";

#[derive(Debug, Clone)]
pub(crate) struct ComposeConfig {
    pub(crate) mycall: Option<String>,
    pub(crate) mailbox_path: PathBuf,
    pub(crate) forms_path: PathBuf,
    pub(crate) editor: Option<String>,
    pub(crate) form_vars: BTreeMap<String, String>,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        let data = xdg_data_dir().join("wlmail");
        Self {
            mycall: None,
            mailbox_path: data.join("mailbox"),
            forms_path: data.join("forms"),
            editor: None,
            form_vars: BTreeMap::new(),
        }
    }
}

impl ComposeConfig {
    pub(crate) fn mycall(&self) -> Result<&str> {
        self.mycall
            .as_deref()
            .filter(|call| !call.trim().is_empty())
            .ok_or_else(|| anyhow!("no callsign configured (set mycall in wlmail.toml or {})", MYCALL_ENV))
    }

    pub(crate) fn with_mycall_override(mut self, mycall: Option<String>) -> Self {
        if let Some(call) = mycall.filter(|c| !c.trim().is_empty()) {
            self.mycall = Some(call.trim().to_string());
        }
        self
    }
}

fn xdg_config_dir() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}

fn xdg_data_dir() -> PathBuf {
    std::env::var_os("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
        })
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}

fn config_path_candidates() -> Vec<PathBuf> {
    vec![
        PathBuf::from("wlmail.toml"),
        xdg_config_dir().join("wlmail").join("wlmail.toml"),
    ]
}

fn load_config_text(explicit: Option<&Path>) -> Result<Option<String>> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        return Ok(Some(content));
    }
    for path in config_path_candidates() {
        if let Ok(content) = std::fs::read_to_string(&path) {
            tracing::debug!(path = %path.display(), "config loaded");
            return Ok(Some(content));
        }
    }
    Ok(None)
}

fn string_value(value: &toml::Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub(crate) fn parse_config(content: &str) -> Result<ComposeConfig> {
    let value: toml::Value = toml::from_str(content).context("invalid config")?;
    let mut config = ComposeConfig::default();
    config.mycall = string_value(&value, "mycall");
    if let Some(path) = string_value(&value, "mailbox_path") {
        config.mailbox_path = PathBuf::from(path);
    }
    if let Some(path) = string_value(&value, "forms_path") {
        config.forms_path = PathBuf::from(path);
    }
    config.editor = string_value(&value, "editor");
    if let Some(vars) = value
        .get("forms")
        .and_then(|forms| forms.get("vars"))
        .and_then(|vars| vars.as_table())
    {
        for (key, v) in vars {
            let text = match v {
                toml::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            config.form_vars.insert(key.clone(), text);
        }
    }
    Ok(config)
}

pub(crate) fn load_config(explicit: Option<&Path>) -> Result<ComposeConfig> {
    let config = match load_config_text(explicit)? {
        Some(content) => parse_config(&content)?,
        None => ComposeConfig::default(),
    };
    Ok(config.with_mycall_override(std::env::var(MYCALL_ENV).ok()))
}
