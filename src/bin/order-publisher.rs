//! Publishes test orders to the order topic.
//!
//! Reads one JSON order from a file and sends it to Kafka. `--count` sends
//! copies under fresh identities; `--repeat` redelivers each payload to
//! exercise idempotent ingestion.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use order_service::Order;

#[derive(Parser, Debug)]
#[command(name = "order-publisher")]
#[command(about = "Publish test orders to the order topic")]
struct Args {
    /// JSON file holding one order
    #[arg(short, long)]
    file: PathBuf,

    /// Comma-separated broker addresses
    #[arg(long, env = "KAFKA_BROKERS", default_value = "127.0.0.1:9092")]
    brokers: String,

    #[arg(long, default_value = "orders")]
    topic: String,

    /// Number of distinct orders to send; copies after the first get a new order_uid
    #[arg(long, default_value_t = 1)]
    count: u32,

    /// Times each payload is delivered
    #[arg(long, default_value_t = 1)]
    repeat: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let raw = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let template = Order::decode(&raw).context("Order file is not a valid order")?;

    let producer: FutureProducer = ClientConfig::new()
        .set("bootstrap.servers", &args.brokers)
        .set("message.timeout.ms", "5000")
        .create()
        .context("Failed to create Kafka producer")?;

    let mut sent = 0u64;
    for index in 0..args.count {
        let mut order = template.clone();
        if index > 0 {
            order.order_uid = Uuid::new_v4().simple().to_string();
        }
        let payload = serde_json::to_vec(&order)?;

        for _ in 0..args.repeat {
            let record = FutureRecord::to(&args.topic)
                .key(order.order_uid.as_str())
                .payload(&payload);
            let (partition, offset) = producer
                .send(record, Duration::from_secs(5))
                .await
                .map_err(|(e, _)| anyhow!("Failed to publish {}: {e}", order.order_uid))?;

            tracing::info!(order_uid = %order.order_uid, partition, offset, "order published");
            sent += 1;
        }
    }

    tracing::info!(sent, topic = %args.topic, "done");
    Ok(())
}
