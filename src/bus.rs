use crate::chat::Message;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// A chat became the active conversation
    ChatSelected { chat_id: String },

    /// The active conversation was torn down
    ChatClosed { chat_id: String },

    /// Sidebar visibility changed
    SidebarToggled { visible: bool },

    /// A message landed in the active chat's store
    MessageAppended { chat_id: String, message: Message },
}

/// Events a slow subscriber may fall behind by before it starts lagging.
const BUS_CAPACITY: usize = 100;

pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: Event) {
        // Err only means nobody is subscribed yet
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(Event::SidebarToggled { visible: true });
    }

    #[test]
    fn subscribers_see_events_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        bus.publish(Event::ChatSelected { chat_id: "7".into() });
        bus.publish(Event::ChatClosed { chat_id: "7".into() });

        assert_eq!(rx.try_recv().unwrap(), Event::ChatSelected { chat_id: "7".into() });
        assert_eq!(rx.try_recv().unwrap(), Event::ChatClosed { chat_id: "7".into() });
    }

    #[test]
    fn slow_subscriber_lags_past_capacity() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        for _ in 0..=BUS_CAPACITY {
            bus.publish(Event::SidebarToggled { visible: true });
        }

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(1))
        ));
    }

    #[test]
    fn events_are_tagged() {
        let json = serde_json::to_value(Event::SidebarToggled { visible: false }).unwrap();
        assert_eq!(json["type"], "SidebarToggled");
        assert_eq!(json["data"]["visible"], false);
    }
}
