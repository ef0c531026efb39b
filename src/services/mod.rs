//! Order pipeline services.

pub mod ingestor;
pub mod write_through;

pub use ingestor::{IngestorReport, OrderIngestor, ProcessOutcome, StopReason};
pub use write_through::WriteThroughWriter;
