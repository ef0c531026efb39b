//! Channel-backed message stream.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{MessageStream, StreamMessage};

/// Create a connected publisher/stream pair with the given buffer size.
pub fn channel(capacity: usize) -> (ChannelPublisher, ChannelStream) {
    let (tx, rx) = mpsc::channel(capacity);
    (ChannelPublisher { tx }, ChannelStream { rx })
}

/// Sending half. Dropping every publisher closes the stream.
#[derive(Clone)]
pub struct ChannelPublisher {
    tx: mpsc::Sender<StreamMessage>,
}

impl ChannelPublisher {
    pub async fn publish(&self, message: StreamMessage) -> DomainResult<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| DomainError::StreamFailure("stream receiver dropped".to_string()))
    }

    /// Publish a raw payload.
    pub async fn publish_payload(&self, payload: impl Into<Vec<u8>>) -> DomainResult<()> {
        self.publish(StreamMessage::new(payload)).await
    }
}

/// Receiving half, consumed by the ingestor.
pub struct ChannelStream {
    rx: mpsc::Receiver<StreamMessage>,
}

#[async_trait]
impl MessageStream for ChannelStream {
    async fn recv(&mut self) -> DomainResult<Option<StreamMessage>> {
        Ok(self.rx.recv().await)
    }
}
