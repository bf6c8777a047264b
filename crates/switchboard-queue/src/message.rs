//! Typed message envelope

use std::fmt;
use std::time::Duration;

use jiff::{SignedDuration, Timestamp};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::QueueError;

/// Unique identity of one message version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Kind of work a message carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Command,
    Event,
    Notification,
    Task,
    Job,
    Query,
}

impl MessageType {
    pub const ALL: [Self; 6] = [
        Self::Command,
        Self::Event,
        Self::Notification,
        Self::Task,
        Self::Job,
        Self::Query,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Event => "event",
            Self::Notification => "notification",
            Self::Task => "task",
            Self::Job => "job",
            Self::Query => "query",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery priority, lowest first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

/// Lifecycle state of one message version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageStatus {
    #[default]
    Pending,
    InFlight,
    Completed,
    Failed,
}

impl MessageStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InFlight => "in-flight",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Legal lifecycle steps: pending to in-flight, in-flight to completed or failed
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InFlight) | (Self::InFlight, Self::Completed | Self::Failed)
        )
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive metadata carried with every message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    /// Component that produced the message
    pub source: String,
    /// Envelope schema version
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A typed work envelope
///
/// Messages are values: a retry or status change produces a new copy,
/// leaving the original intact for the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    /// Identity of the first message in this retry chain
    pub origin_id: MessageId,
    /// Message this one retries, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<MessageId>,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub priority: Priority,
    pub status: MessageStatus,
    pub payload: Value,
    pub metadata: MessageMetadata,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    /// Time to live, serialized as milliseconds
    #[serde(with = "millis")]
    pub ttl: Duration,
    pub retry_count: u32,
    pub max_retries: u32,
}

impl Message {
    /// Another retry is within budget
    pub const fn has_retries_remaining(&self) -> bool {
        self.retry_count < self.max_retries
    }

    /// The message has outlived its TTL at `now`
    pub fn is_expired(&self, now: Timestamp) -> bool {
        let age = now.duration_since(self.created_at);
        SignedDuration::try_from(self.ttl).is_ok_and(|ttl| age > ttl)
    }

    /// Copy with a new status and a fresh `updated_at`
    ///
    /// No lifecycle check; see [`Message::transition`] for the checked form.
    #[must_use]
    pub fn with_status(&self, status: MessageStatus) -> Self {
        Self {
            status,
            updated_at: Timestamp::now(),
            ..self.clone()
        }
    }

    /// Copy moved to `next`, if that is a legal lifecycle step
    pub fn transition(&self, next: MessageStatus) -> Result<Self, QueueError> {
        if self.status.can_transition_to(next) {
            Ok(self.with_status(next))
        } else {
            Err(QueueError::InvalidTransition {
                id: self.id,
                from: self.status,
                to: next,
            })
        }
    }

    /// Decode the payload into a concrete type
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, QueueError> {
        serde_json::from_value(self.payload.clone()).map_err(|source| QueueError::Payload { id: self.id, source })
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
