//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - pretty or JSON stdout output
//! - optional JSON log file with rotation

pub mod logger;

pub use logger::{parse_log_level, LoggerImpl};
