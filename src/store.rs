use crate::{chat::Message, error::Rejection};
use tracing::debug;

/// Append-only, insertion-ordered message list for one open chat.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `seed`, in the given order.
    pub fn seeded(seed: impl IntoIterator<Item = Message>) -> Self {
        let mut store = Self::new();
        for message in seed {
            store.append(message);
        }
        store
    }

    /// Insert at the tail. Outgoing messages with blank content are dropped.
    pub fn append(&mut self, message: Message) {
        if let Err(e) = self.try_append(message) {
            debug!("Dropped message: {}", e);
        }
    }

    pub fn try_append(&mut self, message: Message) -> Result<(), Rejection> {
        if message.expects_reply() && message.content.trim().is_empty() {
            return Err(Rejection::InvalidInput);
        }
        self.messages.push(message);
        Ok(())
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
