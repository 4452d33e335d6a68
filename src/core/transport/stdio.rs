//! Line-delimited JSON framing over a byte stream pair.
//!
//! One message per line. Reads skip blank lines and signal end-of-stream
//! with `None`; writes serialize the full line in memory first and flush
//! after every message, so the caller either sees a complete response
//! promptly or nothing at all.

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::trace;

use super::TransportResult;

/// Framed transport over any async read/write pair.
///
/// Production servers run it over stdin/stdout; tests run it over
/// in-memory buffers.
pub struct StdioTransport<R, W> {
    reader: BufReader<R>,
    writer: W,
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    /// Read the next non-empty line. `Ok(None)` means the input stream
    /// closed, which is the normal shutdown path.
    pub async fn read_message(&mut self) -> TransportResult<Option<String>> {
        loop {
            let mut line = String::new();
            let read = self.reader.read_line(&mut line).await?;
            if read == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            trace!(bytes = read, "read message");
            return Ok(Some(trimmed.to_string()));
        }
    }

    /// Serialize one message as a single line and flush it.
    pub async fn write_message<T: Serialize>(&mut self, message: &T) -> TransportResult<()> {
        let mut payload = serde_json::to_vec(message)?;
        payload.push(b'\n');
        self.writer.write_all(&payload).await?;
        self.writer.flush().await?;
        trace!(bytes = payload.len(), "wrote message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn read_skips_blank_lines_and_stops_at_eof() {
        let input = b"\n  \n{\"id\":1}\n".to_vec();
        let mut transport = StdioTransport::new(input.as_slice(), Vec::new());

        assert_eq!(
            transport.read_message().await.unwrap(),
            Some("{\"id\":1}".to_string())
        );
        assert_eq!(transport.read_message().await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_emits_one_flushed_line_per_message() {
        let mut transport = StdioTransport::new(&b""[..], Vec::new());
        transport.write_message(&json!({"a": 1})).await.unwrap();
        transport.write_message(&json!({"b": 2})).await.unwrap();

        let written = String::from_utf8(transport.writer).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines, vec![r#"{"a":1}"#, r#"{"b":2}"#]);
        assert!(written.ends_with('\n'));
    }
}
