//! Dead-letter storage and failure routing

use indexmap::IndexMap;
use jiff::Timestamp;
use parking_lot::RwLock;
use serde::Serialize;

use crate::factory::MessageFactory;
use crate::message::{Message, MessageId, MessageStatus};

/// A message held for manual inspection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetter {
    pub message: Message,
    pub reason: String,
    pub dead_lettered_at: Timestamp,
}

/// Concurrent dead-letter store
///
/// Idempotent by message id: a message pushed twice is stored once.
/// Entries keep arrival order.
#[derive(Debug, Default)]
pub struct DeadLetterQueue {
    entries: RwLock<IndexMap<MessageId, DeadLetter>>,
}

impl DeadLetterQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `message`, returning `false` if it was already present
    pub fn push(&self, message: Message, reason: impl Into<String>) -> bool {
        let mut entries = self.entries.write();
        if entries.contains_key(&message.id) {
            return false;
        }

        let reason = reason.into();
        tracing::warn!(
            message_id = %message.id,
            origin_id = %message.origin_id,
            message_type = %message.message_type,
            retry_count = message.retry_count,
            reason = %reason,
            "message dead-lettered"
        );

        entries.insert(
            message.id,
            DeadLetter {
                message,
                reason,
                dead_lettered_at: Timestamp::now(),
            },
        );
        true
    }

    pub fn get(&self, id: &MessageId) -> Option<DeadLetter> {
        self.entries.read().get(id).cloned()
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.entries.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Every entry in arrival order
    pub fn list(&self) -> Vec<DeadLetter> {
        self.entries.read().values().cloned().collect()
    }

    /// Remove and return every entry in arrival order
    pub fn drain(&self) -> Vec<DeadLetter> {
        let mut entries = self.entries.write();
        entries.drain(..).map(|(_, letter)| letter).collect()
    }
}

/// Where a failed message went
#[derive(Debug, Clone, PartialEq)]
pub enum FailureRoute {
    /// Resubmit this new message
    Retry(Message),
    /// Budget spent or TTL passed; stored under this id
    DeadLettered(MessageId),
}

/// Route a failed message: retry it while budget remains, dead-letter it otherwise
///
/// Expired messages are dead-lettered regardless of remaining budget.
pub fn route_failure(
    factory: &MessageFactory,
    message: &Message,
    reason: &str,
    dead_letters: &DeadLetterQueue,
) -> FailureRoute {
    route_failure_at(factory, message, reason, dead_letters, Timestamp::now())
}

pub(crate) fn route_failure_at(
    factory: &MessageFactory,
    message: &Message,
    reason: &str,
    dead_letters: &DeadLetterQueue,
    now: Timestamp,
) -> FailureRoute {
    let failed = message.with_status(MessageStatus::Failed);

    if message.is_expired(now) {
        dead_letters.push(failed, format!("expired: {reason}"));
        return FailureRoute::DeadLettered(message.id);
    }

    if !message.has_retries_remaining() {
        dead_letters.push(
            failed,
            format!("retries exhausted ({}/{}): {reason}", message.retry_count, message.max_retries),
        );
        return FailureRoute::DeadLettered(message.id);
    }

    let retry = factory.create_retry_message(message);
    tracing::debug!(
        message_id = %message.id,
        retry_id = %retry.id,
        retry_count = retry.retry_count,
        max_retries = retry.max_retries,
        reason,
        "message scheduled for retry"
    );
    FailureRoute::Retry(retry)
}
