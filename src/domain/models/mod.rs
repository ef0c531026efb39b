pub mod config;
pub mod order;

pub use config::{
    Config, DatabaseConfig, HttpConfig, IngestorConfig, LogFormat, LoggingConfig,
    RotationPolicy, StreamConfig, StreamSource,
};
pub use order::{Delivery, Item, Order, Payment};
