//! Message construction with per-type defaults

use std::time::Duration;

use jiff::Timestamp;
use serde_json::Value;

use crate::message::{Message, MessageId, MessageMetadata, MessageStatus, MessageType, Priority};

/// Envelope schema version stamped on new messages
pub const ENVELOPE_VERSION: &str = "1.0";

/// Source recorded when the factory is not given one
pub const DEFAULT_SOURCE: &str = "switchboard";

/// Defaults a message type applies before caller overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDefaults {
    pub priority: Priority,
    pub max_retries: u32,
    pub ttl: Duration,
}

impl MessageType {
    pub const fn defaults(self) -> TypeDefaults {
        const fn minutes(n: u64) -> Duration {
            Duration::from_secs(n * 60)
        }

        let (priority, max_retries, ttl) = match self {
            Self::Command => (Priority::High, 3, minutes(5)),
            Self::Query => (Priority::High, 2, minutes(1)),
            Self::Event => (Priority::Normal, 1, minutes(10)),
            Self::Notification => (Priority::Normal, 2, minutes(5)),
            Self::Task => (Priority::Normal, 3, minutes(30)),
            Self::Job => (Priority::Low, 5, minutes(60)),
        };

        TypeDefaults {
            priority,
            max_retries,
            ttl,
        }
    }
}

/// Caller overrides for a new message
#[derive(Debug, Clone, Default)]
pub struct MessageOptions {
    pub priority: Option<Priority>,
    pub max_retries: Option<u32>,
    pub ttl: Option<Duration>,
    pub correlation_id: Option<String>,
    pub reply_to: Option<String>,
    pub trace_id: Option<String>,
    pub tags: Vec<String>,
}

impl MessageOptions {
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    #[must_use]
    pub const fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    #[must_use]
    pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    #[must_use]
    pub fn trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// Builds messages stamped with one producer's source
#[derive(Debug, Clone)]
pub struct MessageFactory {
    source: String,
}

impl Default for MessageFactory {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE)
    }
}

impl MessageFactory {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// New pending message; type defaults fill anything `options` leaves unset
    pub fn create_message(&self, message_type: MessageType, payload: Value, options: MessageOptions) -> Message {
        let defaults = message_type.defaults();
        let id = MessageId::new();
        let now = Timestamp::now();

        Message {
            id,
            origin_id: id,
            previous_id: None,
            message_type,
            priority: options.priority.unwrap_or(defaults.priority),
            status: MessageStatus::Pending,
            payload,
            metadata: MessageMetadata {
                source: self.source.clone(),
                version: ENVELOPE_VERSION.to_owned(),
                trace_id: options.trace_id,
                tags: options.tags,
            },
            created_at: now,
            updated_at: now,
            correlation_id: options.correlation_id,
            reply_to: options.reply_to,
            ttl: options.ttl.unwrap_or(defaults.ttl),
            retry_count: 0,
            max_retries: options.max_retries.unwrap_or(defaults.max_retries),
        }
    }

    pub fn command(&self, payload: Value) -> Message {
        self.create_message(MessageType::Command, payload, MessageOptions::default())
    }

    pub fn event(&self, payload: Value) -> Message {
        self.create_message(MessageType::Event, payload, MessageOptions::default())
    }

    pub fn notification(&self, payload: Value) -> Message {
        self.create_message(MessageType::Notification, payload, MessageOptions::default())
    }

    pub fn task(&self, payload: Value) -> Message {
        self.create_message(MessageType::Task, payload, MessageOptions::default())
    }

    pub fn job(&self, payload: Value) -> Message {
        self.create_message(MessageType::Job, payload, MessageOptions::default())
    }

    pub fn query(&self, payload: Value) -> Message {
        self.create_message(MessageType::Query, payload, MessageOptions::default())
    }

    /// Event answering `request`, correlated to it and sharing its trace
    ///
    /// Delivery is up to the caller: publish the reply to `request.reply_to`.
    pub fn reply(&self, request: &Message, payload: Value) -> Message {
        let mut options = MessageOptions::default().correlation_id(request.id.to_string());
        options.trace_id.clone_from(&request.metadata.trace_id);
        self.create_message(MessageType::Event, payload, options)
    }

    /// New identity retrying `original`
    ///
    /// The retry count is incremented and the status reset to pending.
    /// There is no cap here: callers check
    /// [`Message::has_retries_remaining`] first, or use
    /// [`crate::route_failure`].
    pub fn create_retry_message(&self, original: &Message) -> Message {
        let now = Timestamp::now();

        Message {
            id: MessageId::new(),
            origin_id: original.origin_id,
            previous_id: Some(original.id),
            status: MessageStatus::Pending,
            created_at: now,
            updated_at: now,
            retry_count: original.retry_count + 1,
            ..original.clone()
        }
    }
}
