use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    Incoming,
    Outgoing,
    DateDivider,
}

/// A single entry in a conversation.
///
/// `sent_at` is the rendered time label captured when the message was
/// created, so re-rendering a conversation never shifts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub kind: MessageKind,
    pub content: String,
    pub sent_at: String,
    pub avatar_ref: Option<String>,
    pub is_read: bool,
}

impl Message {
    pub fn outgoing(
        id: impl Into<String>,
        content: impl Into<String>,
        sent_at: impl Into<String>,
        avatar_ref: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: MessageKind::Outgoing,
            content: content.into(),
            sent_at: sent_at.into(),
            avatar_ref,
            is_read: true,
        }
    }

    pub fn incoming(
        id: impl Into<String>,
        content: impl Into<String>,
        sent_at: impl Into<String>,
        avatar_ref: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: MessageKind::Incoming,
            content: content.into(),
            sent_at: sent_at.into(),
            avatar_ref,
            is_read: true,
        }
    }

    /// Dividers never carry an avatar.
    pub fn date_divider(
        id: impl Into<String>,
        label: impl Into<String>,
        sent_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: MessageKind::DateDivider,
            content: label.into(),
            sent_at: sent_at.into(),
            avatar_ref: None,
            is_read: true,
        }
    }

    pub fn is_divider(&self) -> bool {
        self.kind == MessageKind::DateDivider
    }

    /// Outgoing messages are the only entries that get a simulated reply.
    pub fn expects_reply(&self) -> bool {
        self.kind == MessageKind::Outgoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divider_has_no_avatar_and_never_expects_reply() {
        let divider = Message::date_divider("d1", "Today", "9:00 am");
        assert!(divider.is_divider());
        assert!(divider.avatar_ref.is_none());
        assert!(!divider.expects_reply());
    }

    #[test]
    fn messages_default_to_read() {
        let out = Message::outgoing("a", "hi", "1:00 pm", None);
        let inc = Message::incoming("b", "hey", "1:01 pm", Some("bob.png".into()));
        assert!(out.is_read && inc.is_read);
        assert!(out.expects_reply());
        assert!(!inc.expects_reply());
    }

    #[test]
    fn kind_serializes_kebab_case() {
        let json = serde_json::to_value(MessageKind::DateDivider).unwrap();
        assert_eq!(json, serde_json::json!("date-divider"));
    }
}
