//! Command-line interface.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::infrastructure::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(name = "order-service")]
#[command(about = "Order ingestion service with a warm in-memory query cache", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to a YAML config file (defaults to config/orders.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database URL, e.g. sqlite:.orders/orders.db
    #[arg(long, global = true)]
    pub db_url: Option<String>,

    /// Comma-separated Kafka broker addresses
    #[arg(long, global = true)]
    pub brokers: Option<String>,

    /// HTTP bind address, e.g. :8081 or 127.0.0.1:8081
    #[arg(long, global = true)]
    pub bind: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Warm the cache, consume the order stream and serve queries (default)
    Serve,

    /// Print the effective configuration
    Config,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database_url: self.db_url.clone(),
            brokers: self.brokers.clone(),
            bind: self.bind.clone(),
        }
    }
}

/// Print a command failure and its cause chain.
pub fn handle_error(err: &anyhow::Error, json_mode: bool) {
    if json_mode {
        let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({ "error": err.to_string(), "causes": causes });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
}
