//! Inbound order stream adapters.
//!
//! - `channel`: in-process tokio mpsc feed
//! - `lines`: newline-delimited JSON from any async reader (stdin)
//! - `kafka`: topic consumer under a consumer group (`kafka` feature)

pub mod channel;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod lines;

pub use channel::{channel, ChannelPublisher, ChannelStream};
#[cfg(feature = "kafka")]
pub use kafka::KafkaOrderStream;
pub use lines::LineDelimitedStream;
