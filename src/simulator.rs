use crate::chat::Message;
use crate::ids::{display_timestamp, next_id};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::debug;

/// A synthetic reply on its way back to the controller.
#[derive(Debug, Clone)]
pub struct ReplyDelivery {
    pub session: String,
    pub chat_id: String,
    pub message: Message,
}

/// Stands in for the remote party of one open chat.
///
/// Every outgoing message schedules its own timer task; the tasks live in a
/// `JoinSet` owned by the simulator, so dropping or cancelling the simulator
/// aborts anything still in flight.
pub struct ReplySimulator {
    session: String,
    chat_id: String,
    delay: Duration,
    reply_text: String,
    avatar_ref: Option<String>,
    tx: mpsc::UnboundedSender<ReplyDelivery>,
    tasks: JoinSet<()>,
}

impl ReplySimulator {
    pub fn new(
        session: impl Into<String>,
        chat_id: impl Into<String>,
        delay: Duration,
        reply_text: impl Into<String>,
        avatar_ref: Option<String>,
        tx: mpsc::UnboundedSender<ReplyDelivery>,
    ) -> Self {
        Self {
            session: session.into(),
            chat_id: chat_id.into(),
            delay,
            reply_text: reply_text.into(),
            avatar_ref,
            tx,
            tasks: JoinSet::new(),
        }
    }

    /// Schedule one reply to `sent`. Returns false for anything that is not
    /// an outgoing message. Must be called from within a tokio runtime.
    pub fn schedule(&mut self, sent: &Message) -> bool {
        if !sent.expects_reply() {
            return false;
        }

        // Reap finished timers so the set only tracks live ones.
        while self.tasks.try_join_next().is_some() {}

        let session = self.session.clone();
        let chat_id = self.chat_id.clone();
        let text = self.reply_text.clone();
        let avatar_ref = self.avatar_ref.clone();
        let delay = self.delay;
        let tx = self.tx.clone();
        let replying_to = sent.id.clone();

        self.tasks.spawn(async move {
            tokio::time::sleep(delay).await;

            let now = chrono::Local::now();
            let message = Message::incoming(next_id(), text, display_timestamp(&now), avatar_ref);
            debug!("Reply to {} ready in session {}", replying_to, session);

            // The receiver only goes away when the controller is dropped.
            let _ = tx.send(ReplyDelivery {
                session,
                chat_id,
                message,
            });
        });

        debug!(
            "Scheduled reply for {} in {:?} (session {})",
            sent.id, self.delay, self.session
        );
        true
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Abort every reply that has not fired yet.
    pub fn cancel_all(&mut self) -> usize {
        let pending = self.tasks.len();
        self.tasks.abort_all();
        pending
    }
}
