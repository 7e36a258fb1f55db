use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::controller::SessionConfig;

pub const DEFAULT_REPLY_TEXT: &str = "Thanks for your message! I'll get back to you soon.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub reply_delay_ms: u64,
    pub reply_text: String,
    pub self_avatar: Option<String>,
    pub seed_date_divider: bool,
    pub directory_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: 1000,
            reply_text: DEFAULT_REPLY_TEXT.to_string(),
            self_avatar: None,
            seed_date_divider: true,
            directory_path: None,
        }
    }
}

impl AppConfig {
    /// Resolve configuration: optional JSON file named by `MURMUR_CONFIG`,
    /// then individual `MURMUR_*` overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("MURMUR_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup("MURMUR_REPLY_DELAY_MS") {
            self.reply_delay_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("MURMUR_REPLY_DELAY_MS is not a number: {}", raw))?;
        }
        if let Some(text) = lookup("MURMUR_REPLY_TEXT") {
            self.reply_text = text;
        }
        if let Some(avatar) = lookup("MURMUR_SELF_AVATAR") {
            self.self_avatar = Some(avatar);
        }
        if let Some(path) = lookup("MURMUR_DIRECTORY") {
            self.directory_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            reply_delay: Duration::from_millis(self.reply_delay_ms),
            reply_text: self.reply_text.clone(),
            self_avatar: self.self_avatar.clone(),
            seed_date_divider: self.seed_date_divider,
        }
    }
}
