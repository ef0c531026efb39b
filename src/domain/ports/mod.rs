//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - OrderRepository: durable, idempotent order storage
//! - MessageStream: the inbound order message source
//!
//! These traits keep the pipeline independent of the concrete store and
//! broker client.

pub mod message_stream;
pub mod order_repository;

pub use message_stream::{MessageStream, StreamMessage};
pub use order_repository::{OrderRepository, SaveOutcome};
