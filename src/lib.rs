//! Order Service - stream ingestion with a warm read cache
//!
//! Orders arrive on a message stream, are persisted idempotently to the store
//! of record, then mirrored into an in-memory cache that answers point
//! lookups over HTTP.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Order model, errors and port traits
//! - **Adapters** (`adapters`): SQLite store, cache, stream sources, HTTP endpoint
//! - **Service Layer** (`services`): Write-through persistence and the ingestion loop
//! - **Application Layer** (`application`): Start-up, warm-up and shutdown
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use order_service::{application, ConfigLoader, ConfigOverrides};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load(None, &ConfigOverrides::default())?;
//!     application::run(config, CancellationToken::new()).await
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::cache::{CachePhase, OrderCache};
pub use application::OrderPipeline;
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{Config, Delivery, Item, Order, Payment};
pub use domain::ports::{MessageStream, OrderRepository, SaveOutcome, StreamMessage};
pub use infrastructure::config::{ConfigError, ConfigLoader, ConfigOverrides};
pub use services::{IngestorReport, OrderIngestor, StopReason, WriteThroughWriter};
