//! Typed message envelopes, retry routing, and dead-letter storage
//!
//! - [`MessageFactory`]: builds [`Message`]s with per-type defaults and
//!   derives retry messages as new identities
//! - [`route_failure`]: retries a failed message or dead-letters it
//! - [`DeadLetterQueue`] / [`MessageLog`]: concurrent in-memory stores

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod dead_letter;
pub mod error;
pub mod factory;
pub mod log;
pub mod message;

pub use dead_letter::{DeadLetter, DeadLetterQueue, FailureRoute, route_failure};
pub use error::QueueError;
pub use factory::{MessageFactory, MessageOptions, TypeDefaults};
pub use log::MessageLog;
pub use message::{Message, MessageId, MessageMetadata, MessageStatus, MessageType, Priority};
