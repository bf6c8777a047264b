//! Append-only log of message versions
//!
//! Each retry chain is keyed by its origin id. Versions are appended, never
//! replaced, so the full history of a logical task stays inspectable.

use dashmap::DashMap;

use crate::message::{Message, MessageId};

#[derive(Debug, Default)]
pub struct MessageLog {
    chains: DashMap<MessageId, Vec<Message>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message version
    ///
    /// Returns `false` when this exact version id is already in its chain.
    pub fn append(&self, message: Message) -> bool {
        let mut chain = self.chains.entry(message.origin_id).or_default();
        if chain.iter().any(|m| m.id == message.id) {
            return false;
        }
        chain.push(message);
        true
    }

    /// Every version of a chain, oldest first
    pub fn history(&self, origin_id: &MessageId) -> Vec<Message> {
        self.chains.get(origin_id).map(|chain| chain.clone()).unwrap_or_default()
    }

    /// Most recently appended version of a chain
    pub fn latest(&self, origin_id: &MessageId) -> Option<Message> {
        self.chains.get(origin_id).and_then(|chain| chain.last().cloned())
    }

    /// Number of chains
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::factory::MessageFactory;
    use crate::message::MessageStatus;

    #[test]
    fn retry_chain_history() {
        let factory = MessageFactory::default();
        let log = MessageLog::new();

        let first = factory.task(json!({"step": "resize"}));
        let second = factory.create_retry_message(&first);
        let third = factory.create_retry_message(&second);

        for message in [&first, &second, &third] {
            assert!(log.append(message.clone()));
        }

        let history = log.history(&first.id);
        assert_eq!(history.len(), 3);
        assert_eq!(
            history.iter().map(|m| m.retry_count).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(log.latest(&first.origin_id).unwrap().id, third.id);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn versions_are_unique_by_id() {
        let log = MessageLog::new();
        let message = MessageFactory::default().command(json!({}));

        assert!(log.append(message.clone()));
        assert!(!log.append(message.clone()));

        // a status copy shares the id and is not a new version
        assert!(!log.append(message.with_status(MessageStatus::InFlight)));
        assert_eq!(log.history(&message.id).len(), 1);
    }

    #[test]
    fn unknown_chain_is_empty() {
        let log = MessageLog::new();
        let id = MessageId::new();
        assert!(log.history(&id).is_empty());
        assert!(log.latest(&id).is_none());
        assert!(log.is_empty());
    }
}
