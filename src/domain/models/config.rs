use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the order service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Store of record
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Inbound order stream
    #[serde(default)]
    pub stream: StreamConfig,

    /// Query endpoint
    #[serde(default)]
    pub http: HttpConfig,

    /// Ingestion loop tuning
    #[serde(default)]
    pub ingestor: IngestorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// sqlx connection URL, e.g. `sqlite:.orders/orders.db`
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_database_url() -> String {
    "sqlite:.orders/orders.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_acquire_timeout_secs() -> u64 {
    3
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

/// Where inbound order messages come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamSource {
    /// Kafka topic under a consumer group (requires the `kafka` feature)
    Kafka,
    /// Newline-delimited JSON on standard input
    Stdin,
}

impl StreamSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kafka => "kafka",
            Self::Stdin => "stdin",
        }
    }
}

impl Default for StreamSource {
    fn default() -> Self {
        if cfg!(feature = "kafka") {
            Self::Kafka
        } else {
            Self::Stdin
        }
    }
}

/// Stream consumer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StreamConfig {
    #[serde(default)]
    pub source: StreamSource,

    /// Comma-separated broker addresses
    #[serde(default = "default_brokers")]
    pub brokers: String,

    #[serde(default = "default_topic")]
    pub topic: String,

    #[serde(default = "default_group_id")]
    pub group_id: String,
}

fn default_brokers() -> String {
    "127.0.0.1:9092".to_string()
}

fn default_topic() -> String {
    "orders".to_string()
}

fn default_group_id() -> String {
    "order-service-group".to_string()
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            source: StreamSource::default(),
            brokers: default_brokers(),
            topic: default_topic(),
            group_id: default_group_id(),
        }
    }
}

impl StreamConfig {
    /// Broker addresses with surrounding whitespace and empty entries removed.
    pub fn broker_list(&self) -> Vec<String> {
        self.brokers
            .split(',')
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

/// HTTP query endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpConfig {
    /// Bind address; a leading `:` (e.g. `:8081`) binds all interfaces
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Allow any origin on responses
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Directory of static assets served as a fallback, if present
    #[serde(default = "default_static_dir")]
    pub static_dir: Option<PathBuf>,
}

fn default_bind() -> String {
    ":8081".to_string()
}

const fn default_true() -> bool {
    true
}

#[allow(clippy::unnecessary_wraps)]
fn default_static_dir() -> Option<PathBuf> {
    Some(PathBuf::from("./web/static"))
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            enable_cors: default_true(),
            static_dir: default_static_dir(),
        }
    }
}

impl HttpConfig {
    /// Resolve the bind string into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        let bind = self.bind.trim();
        if bind.starts_with(':') {
            format!("0.0.0.0{bind}").parse()
        } else {
            bind.parse()
        }
    }
}

/// Ingestion loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IngestorConfig {
    /// Pause after a stream read error before receiving again
    #[serde(default = "default_read_error_pause_ms")]
    pub read_error_pause_ms: u64,
}

const fn default_read_error_pause_ms() -> u64 {
    500
}

impl Default for IngestorConfig {
    fn default() -> Self {
        Self {
            read_error_pause_ms: default_read_error_pause_ms(),
        }
    }
}

impl IngestorConfig {
    pub fn read_error_pause(&self) -> Duration {
        Duration::from_millis(self.read_error_pause_ms)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Rolling policy for the log file
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Directory for log files (stdout only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}
