use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One row of the chat list, as supplied by whoever owns contacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_ref: Option<String>,
    #[serde(default)]
    pub last_message_preview: String,
    #[serde(default)]
    pub last_activity_label: String,
    #[serde(default)]
    pub unread: bool,
}

/// Read-only source of chat metadata.
pub trait ChatDirectory: Send + Sync {
    fn chats(&self) -> Vec<ChatSummary>;

    fn find(&self, chat_id: &str) -> Option<ChatSummary> {
        self.chats().into_iter().find(|c| c.id == chat_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    chats: Vec<ChatSummary>,
}

impl StaticDirectory {
    pub fn new(chats: Vec<ChatSummary>) -> Self {
        Self { chats }
    }

    /// Load a JSON array of chat summaries.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read chat directory {}", path.display()))?;
        let chats: Vec<ChatSummary> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse chat directory {}", path.display()))?;
        Ok(Self { chats })
    }
}

impl ChatDirectory for StaticDirectory {
    fn chats(&self) -> Vec<ChatSummary> {
        self.chats.clone()
    }

    fn find(&self, chat_id: &str) -> Option<ChatSummary> {
        self.chats.iter().find(|c| c.id == chat_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_json_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"1","display_name":"Ada","avatar_ref":"ada.png"}},
                {{"id":"2","display_name":"Grace","unread":true,"last_message_preview":"ok"}}]"#
        )
        .unwrap();

        let dir = StaticDirectory::from_file(file.path()).unwrap();
        let chats = dir.chats();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].avatar_ref.as_deref(), Some("ada.png"));
        assert!(!chats[0].unread);
        assert!(chats[1].unread);
        assert_eq!(dir.find("2").unwrap().display_name, "Grace");
        assert!(dir.find("3").is_none());
    }

    #[test]
    fn bad_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(StaticDirectory::from_file(file.path()).is_err());
    }
}
