use thiserror::Error;

use crate::message::{MessageId, MessageStatus};

/// Errors from misuse of the message lifecycle
#[derive(Debug, Error)]
pub enum QueueError {
    /// The requested status change is not a legal lifecycle step
    #[error("message {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: MessageId,
        from: MessageStatus,
        to: MessageStatus,
    },

    /// The payload does not decode into the requested type
    #[error("message {id} payload: {source}")]
    Payload {
        id: MessageId,
        #[source]
        source: serde_json::Error,
    },
}
