use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// A raw message delivered by the stream client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamMessage {
    pub key: Option<String>,
    pub payload: Vec<u8>,
    pub partition: Option<i32>,
    pub offset: Option<i64>,
}

impl StreamMessage {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            ..Default::default()
        }
    }

    /// Payload as text, lossily, for log lines.
    pub fn payload_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Inbound order message source.
///
/// Delivery is at-least-once: the same payload may arrive more than once.
#[async_trait]
pub trait MessageStream: Send {
    /// Wait for the next message.
    ///
    /// Returns `Ok(None)` once the stream is closed for good and
    /// `Err(StreamFailure)` for a transient read error. The returned future
    /// may be dropped at any await point without losing a delivered message.
    async fn recv(&mut self) -> DomainResult<Option<StreamMessage>>;
}
