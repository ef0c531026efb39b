//! Newline-delimited message stream.
//!
//! Each non-blank line is one message payload. End of input closes the
//! stream. Used for the `stdin` source.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{MessageStream, StreamMessage};

pub struct LineDelimitedStream<R> {
    lines: Lines<R>,
    line_number: i64,
}

impl<R: AsyncBufRead + Unpin + Send> LineDelimitedStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }
}

impl LineDelimitedStream<BufReader<Stdin>> {
    /// Read payloads from standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> MessageStream for LineDelimitedStream<R> {
    async fn recv(&mut self) -> DomainResult<Option<StreamMessage>> {
        loop {
            let line = self
                .lines
                .next_line()
                .await
                .map_err(|e| DomainError::StreamFailure(e.to_string()))?;
            let Some(line) = line else {
                return Ok(None);
            };
            self.line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Ok(Some(StreamMessage {
                payload: line.into_bytes(),
                offset: Some(self.line_number),
                ..Default::default()
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_one_payload_per_line() {
        let input: &[u8] = b"{\"order_uid\":\"a\"}\n\n   \n{\"order_uid\":\"b\"}\n";
        let mut stream = LineDelimitedStream::new(BufReader::new(input));

        let first = stream.recv().await.unwrap().unwrap();
        assert_eq!(first.payload, br#"{"order_uid":"a"}"#);
        assert_eq!(first.offset, Some(1));

        let second = stream.recv().await.unwrap().unwrap();
        assert_eq!(second.payload, br#"{"order_uid":"b"}"#);
        assert_eq!(second.offset, Some(4));

        assert!(stream.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_error_is_stream_failure() {
        let reader = tokio_test::io::Builder::new()
            .read_error(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let mut stream = LineDelimitedStream::new(BufReader::new(reader));

        let err = stream.recv().await.unwrap_err();
        assert!(matches!(err, DomainError::StreamFailure(_)));
    }
}
