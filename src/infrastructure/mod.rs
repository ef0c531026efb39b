//! Infrastructure layer module
//!
//! Process-wide concerns that are not adapters of a domain port:
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod logging;
