//! Kafka consumer adapter.
//!
//! Subscribes to a single topic under a fixed consumer group. Offsets are
//! committed automatically, so delivery is at-least-once: a message may be
//! seen again after a restart or rebalance. The client reconnects on its own.

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::StreamConfig;
use crate::domain::ports::{MessageStream, StreamMessage};

pub struct KafkaOrderStream {
    consumer: StreamConsumer,
}

impl KafkaOrderStream {
    /// Create the consumer and subscribe to the configured topic.
    pub fn connect(config: &StreamConfig) -> DomainResult<Self> {
        let brokers = config.broker_list().join(",");
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "earliest")
            .create()
            .map_err(|e| DomainError::StreamFailure(format!("failed to create consumer: {e}")))?;

        consumer
            .subscribe(&[config.topic.as_str()])
            .map_err(|e| DomainError::StreamFailure(format!("failed to subscribe to {}: {e}", config.topic)))?;

        tracing::info!(
            brokers = %brokers,
            topic = %config.topic,
            group_id = %config.group_id,
            "kafka consumer subscribed"
        );
        Ok(Self { consumer })
    }
}

#[async_trait]
impl MessageStream for KafkaOrderStream {
    async fn recv(&mut self) -> DomainResult<Option<StreamMessage>> {
        let message = self
            .consumer
            .recv()
            .await
            .map_err(|e| DomainError::StreamFailure(e.to_string()))?;

        Ok(Some(StreamMessage {
            key: message.key().map(|k| String::from_utf8_lossy(k).into_owned()),
            payload: message.payload().unwrap_or_default().to_vec(),
            partition: Some(message.partition()),
            offset: Some(message.offset()),
        }))
    }
}
