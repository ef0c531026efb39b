//! Domain layer for the order service
//!
//! This module contains the order model, configuration types, errors and
//! the port traits adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
