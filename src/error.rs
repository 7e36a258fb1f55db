use crate::chat::MessageKind;
use thiserror::Error;

/// Reasons the core declines to apply a mutation.
///
/// These never reach the presentation layer; callers log them and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("outgoing message content is empty")]
    InvalidInput,

    #[error("delivered {kind:?} message is not a reply")]
    NotAReply { kind: MessageKind },

    #[error("reply for session {session} (chat '{chat_id}') arrived after teardown")]
    StaleDelivery { session: String, chat_id: String },
}
