//! Stream ingestion loop.
//!
//! Receives order messages, decodes them and hands them to the write-through
//! writer. Bad payloads and store failures are logged and skipped, transient
//! read errors are logged and the loop keeps receiving. The loop only ends
//! on cancellation or when the stream closes. A message already received
//! when cancellation arrives is still fully processed.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::domain::errors::DomainError;
use crate::domain::models::{IngestorConfig, Order};
use crate::domain::ports::{MessageStream, OrderRepository, SaveOutcome, StreamMessage};
use crate::services::write_through::WriteThroughWriter;

/// Why the ingestion loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    StreamClosed,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::StreamClosed => "stream_closed",
        }
    }
}

/// Result of handling a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Persisted,
    Duplicate,
    DecodeFailed,
    PersistFailed,
}

/// Counters accumulated over one run of the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestorReport {
    pub received: u64,
    pub persisted: u64,
    pub duplicates: u64,
    pub decode_failures: u64,
    pub persist_failures: u64,
    pub read_errors: u64,
    pub stop_reason: StopReason,
}

impl Default for IngestorReport {
    fn default() -> Self {
        Self {
            received: 0,
            persisted: 0,
            duplicates: 0,
            decode_failures: 0,
            persist_failures: 0,
            read_errors: 0,
            stop_reason: StopReason::StreamClosed,
        }
    }
}

impl IngestorReport {
    fn record(&mut self, outcome: ProcessOutcome) {
        self.received += 1;
        match outcome {
            ProcessOutcome::Persisted => self.persisted += 1,
            ProcessOutcome::Duplicate => self.duplicates += 1,
            ProcessOutcome::DecodeFailed => self.decode_failures += 1,
            ProcessOutcome::PersistFailed => self.persist_failures += 1,
        }
    }
}

enum Received {
    Message(StreamMessage),
    Closed,
    Cancelled,
    ReadError(DomainError),
}

pub struct OrderIngestor<R: OrderRepository> {
    stream: Box<dyn MessageStream>,
    writer: WriteThroughWriter<R>,
    cancel: CancellationToken,
    read_error_pause: Duration,
}

impl<R: OrderRepository> OrderIngestor<R> {
    pub fn new(
        stream: Box<dyn MessageStream>,
        writer: WriteThroughWriter<R>,
        cancel: CancellationToken,
        config: &IngestorConfig,
    ) -> Self {
        Self {
            stream,
            writer,
            cancel,
            read_error_pause: config.read_error_pause(),
        }
    }

    /// Run until cancelled or until the stream closes.
    pub async fn run(self) -> IngestorReport {
        let Self {
            mut stream,
            writer,
            cancel,
            read_error_pause,
        } = self;

        tracing::info!("order ingestor started");
        let mut report = IngestorReport::default();

        loop {
            let received = tokio::select! {
                biased;
                _ = cancel.cancelled() => Received::Cancelled,
                result = stream.recv() => match result {
                    Ok(Some(message)) => Received::Message(message),
                    Ok(None) => Received::Closed,
                    Err(e) => Received::ReadError(e),
                },
            };

            match received {
                Received::Message(message) => {
                    // Outside the select: cancellation never interrupts a message mid-flight.
                    let outcome = process_message(&writer, message).await;
                    report.record(outcome);
                }
                Received::Closed => {
                    report.stop_reason = StopReason::StreamClosed;
                    break;
                }
                Received::Cancelled => {
                    report.stop_reason = StopReason::Cancelled;
                    break;
                }
                Received::ReadError(e) => {
                    if cancel.is_cancelled() {
                        report.stop_reason = StopReason::Cancelled;
                        break;
                    }
                    report.read_errors += 1;
                    tracing::warn!(error = %e, "stream read failed, continuing");
                    if !pause_after_error(&cancel, read_error_pause).await {
                        report.stop_reason = StopReason::Cancelled;
                        break;
                    }
                }
            }
        }

        tracing::info!(
            stop_reason = report.stop_reason.as_str(),
            received = report.received,
            persisted = report.persisted,
            duplicates = report.duplicates,
            decode_failures = report.decode_failures,
            persist_failures = report.persist_failures,
            read_errors = report.read_errors,
            "order ingestor stopped"
        );
        report
    }

    /// Decode and persist one message. Never fails the loop.
    pub async fn process(&self, message: StreamMessage) -> ProcessOutcome {
        process_message(&self.writer, message).await
    }
}

async fn process_message<R: OrderRepository>(
    writer: &WriteThroughWriter<R>,
    message: StreamMessage,
) -> ProcessOutcome {
    let order = match Order::decode(&message.payload) {
        Ok(order) => order,
        Err(e) => {
            tracing::warn!(
                error = %e,
                partition = ?message.partition,
                offset = ?message.offset,
                payload = %message.payload_lossy(),
                "skipping undecodable message"
            );
            return ProcessOutcome::DecodeFailed;
        }
    };

    let order_uid = order.order_uid.clone();
    match writer.persist_and_cache(order).await {
        Ok(SaveOutcome::Inserted) => {
            tracing::info!(order_uid = %order_uid, "order received and stored");
            ProcessOutcome::Persisted
        }
        Ok(SaveOutcome::AlreadyExists) => {
            tracing::info!(order_uid = %order_uid, "duplicate order delivery ignored");
            ProcessOutcome::Duplicate
        }
        Err(e) => {
            tracing::error!(order_uid = %order_uid, error = %e, "failed to persist order, skipping");
            ProcessOutcome::PersistFailed
        }
    }
}

/// Returns `false` if cancelled while waiting.
async fn pause_after_error(cancel: &CancellationToken, pause: Duration) -> bool {
    if pause.is_zero() {
        return true;
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(pause) => true,
    }
}
