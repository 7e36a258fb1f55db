use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::bus::{Event, EventBus};
use crate::chat::{Message, MessageKind};
use crate::config::DEFAULT_REPLY_TEXT;
use crate::directory::{ChatDirectory, ChatSummary};
use crate::error::Rejection;
use crate::ids::{display_timestamp, next_id};
use crate::simulator::{ReplyDelivery, ReplySimulator};
use crate::store::MessageStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub reply_delay: Duration,
    pub reply_text: String,
    pub self_avatar: Option<String>,
    pub seed_date_divider: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(1000),
            reply_text: DEFAULT_REPLY_TEXT.to_string(),
            self_avatar: None,
            seed_date_divider: true,
        }
    }
}

/// What the presentation layer reads: which chat is open and whether the
/// chat list should be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub selected_chat_id: String,
    pub sidebar_visible: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            selected_chat_id: String::new(),
            sidebar_visible: true,
        }
    }
}

/// The live binding between an open chat and its store. Dropping it aborts
/// every reply still scheduled for that chat.
struct ActiveSession {
    id: String,
    chat_id: String,
    store: MessageStore,
    simulator: ReplySimulator,
}

pub struct SessionController {
    config: SessionConfig,
    directory: Arc<dyn ChatDirectory>,
    bus: Arc<EventBus>,
    state: SessionState,
    active: Option<ActiveSession>,
    deliveries_tx: mpsc::UnboundedSender<ReplyDelivery>,
    deliveries_rx: mpsc::UnboundedReceiver<ReplyDelivery>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        directory: Arc<dyn ChatDirectory>,
        bus: Arc<EventBus>,
    ) -> Self {
        let (deliveries_tx, deliveries_rx) = mpsc::unbounded_channel();
        Self {
            config,
            directory,
            bus,
            state: SessionState::default(),
            active: None,
            deliveries_tx,
            deliveries_rx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn selected_chat_id(&self) -> &str {
        &self.state.selected_chat_id
    }

    pub fn sidebar_visible(&self) -> bool {
        self.state.sidebar_visible
    }

    /// Ordered messages of the open chat; empty when idle.
    pub fn messages(&self) -> &[Message] {
        self.active
            .as_ref()
            .map(|active| active.store.all())
            .unwrap_or(&[])
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.id.as_str())
    }

    pub fn pending_replies(&self) -> usize {
        self.active
            .as_ref()
            .map(|active| active.simulator.pending())
            .unwrap_or(0)
    }

    pub fn chats(&self) -> Vec<ChatSummary> {
        self.directory.chats()
    }

    /// Open `chat_id` and hide the sidebar. Any other open chat is torn down
    /// first; re-selecting the open chat keeps its store.
    pub fn select_chat(&mut self, chat_id: impl Into<String>) {
        let chat_id = chat_id.into();

        let already_open = self
            .active
            .as_ref()
            .is_some_and(|active| active.chat_id == chat_id);

        if !already_open {
            self.teardown();
            if !chat_id.is_empty() {
                self.open(&chat_id);
            }
        }

        self.state.selected_chat_id = chat_id.clone();
        self.bus.publish(Event::ChatSelected { chat_id });
        self.set_sidebar(false);

        if !already_open {
            if let Some(active) = &self.active {
                for message in active.store.all() {
                    self.bus.publish(Event::MessageAppended {
                        chat_id: active.chat_id.clone(),
                        message: message.clone(),
                    });
                }
            }
        }
    }

    /// Close the open chat and show the sidebar again.
    pub fn go_back(&mut self) {
        self.teardown();
        self.state.selected_chat_id.clear();
        self.set_sidebar(true);
    }

    pub fn toggle_sidebar(&mut self, visible: bool) {
        self.set_sidebar(visible);
    }

    /// Append an outgoing message to the open chat and schedule its reply.
    /// Blank content, or no open chat, makes this a no-op.
    pub fn send_message(&mut self, content: &str) {
        if content.trim().is_empty() {
            debug!("Ignoring send: {}", Rejection::InvalidInput);
            return;
        }

        let Some(active) = self.active.as_mut() else {
            debug!("Ignoring send: no chat selected");
            return;
        };

        let message = Message::outgoing(
            next_id(),
            content.trim(),
            display_timestamp(&Local::now()),
            self.config.self_avatar.clone(),
        );

        if let Err(e) = active.store.try_append(message.clone()) {
            debug!("Ignoring send: {}", e);
            return;
        }

        active.simulator.schedule(&message);

        self.bus.publish(Event::MessageAppended {
            chat_id: active.chat_id.clone(),
            message,
        });
    }

    /// Apply every reply that has already arrived. Returns how many landed.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(delivery) = self.deliveries_rx.try_recv() {
            if self.deliver(delivery).is_some() {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next reply that belongs to the open chat and apply it.
    /// Stale replies are discarded along the way.
    pub async fn next_delivery(&mut self) -> Option<Message> {
        loop {
            let delivery = self.deliveries_rx.recv().await?;
            if let Some(message) = self.deliver(delivery) {
                return Some(message);
            }
        }
    }

    /// Land a reply in the store it was scheduled for, provided that session
    /// is still the open one. Only incoming messages count as replies.
    fn apply_delivery(&mut self, delivery: ReplyDelivery) -> Result<Message, Rejection> {
        if delivery.message.kind != MessageKind::Incoming {
            return Err(Rejection::NotAReply {
                kind: delivery.message.kind,
            });
        }

        let active = match self.active.as_mut() {
            Some(active) if active.id == delivery.session => active,
            _ => {
                return Err(Rejection::StaleDelivery {
                    session: delivery.session,
                    chat_id: delivery.chat_id,
                })
            }
        };

        active.store.try_append(delivery.message.clone())?;
        self.bus.publish(Event::MessageAppended {
            chat_id: active.chat_id.clone(),
            message: delivery.message.clone(),
        });
        Ok(delivery.message)
    }

    fn deliver(&mut self, delivery: ReplyDelivery) -> Option<Message> {
        match self.apply_delivery(delivery) {
            Ok(message) => Some(message),
            Err(e) => {
                debug!("Discarded reply: {}", e);
                None
            }
        }
    }

    fn open(&mut self, chat_id: &str) {
        let session = format!("ses_{}", Uuid::new_v4().simple());
        let peer_avatar = self
            .directory
            .find(chat_id)
            .and_then(|summary| summary.avatar_ref);

        // Dividers carry no send time.
        let store = if self.config.seed_date_divider {
            MessageStore::seeded([Message::date_divider(next_id(), "Today", "")])
        } else {
            MessageStore::new()
        };

        let simulator = ReplySimulator::new(
            session.clone(),
            chat_id,
            self.config.reply_delay,
            self.config.reply_text.clone(),
            peer_avatar,
            self.deliveries_tx.clone(),
        );

        info!("Opened chat {} (session {})", chat_id, session);
        self.active = Some(ActiveSession {
            id: session,
            chat_id: chat_id.to_string(),
            store,
            simulator,
        });
    }

    fn teardown(&mut self) {
        if let Some(mut active) = self.active.take() {
            let cancelled = active.simulator.cancel_all();
            info!(
                "Closed chat {} (session {}), cancelled {} pending replies",
                active.chat_id, active.id, cancelled
            );
            self.bus.publish(Event::ChatClosed {
                chat_id: active.chat_id,
            });
        }
    }

    fn set_sidebar(&mut self, visible: bool) {
        if self.state.sidebar_visible != visible {
            self.state.sidebar_visible = visible;
            debug!("Sidebar visible: {}", visible);
            self.bus.publish(Event::SidebarToggled { visible });
        }
    }
}
