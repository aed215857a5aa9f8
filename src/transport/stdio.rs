use futures::{Stream, StreamExt};
use std::pin::Pin;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::{error::Error, protocol::Response};

type LineStream = Pin<Box<dyn Stream<Item = Result<String, Error>> + Send>>;

/// A transport over a read/write stream pair carrying newline-delimited JSON.
///
/// The read side is exposed as a stream of trimmed, non-empty lines. The write
/// side only ever carries protocol bytes; diagnostics go through `tracing`.
pub struct StdioTransport<W> {
    /// Where responses are written, one JSON object per line.
    writer: W,
    /// Incoming lines read from the input stream.
    lines: LineStream,
}

impl<W> StdioTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a StdioTransport by providing a read and a write stream.
    pub fn with_streams<R>(read: R, write: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        StdioTransport {
            writer: write,
            lines: Box::pin(read_lines(read)),
        }
    }

    /// Waits for the next non-empty line. `None` means end of stream; an
    /// `Err` means the input stream itself failed and no more lines follow.
    pub async fn receive(&mut self) -> Option<Result<String, Error>> {
        self.lines.next().await
    }

    /// Writes the response as a single JSON line and flushes before
    /// returning, so the client never waits on buffered output.
    pub async fn send(&mut self, response: &Response) -> Result<(), Error> {
        let json = serde_json::to_string(response)?;
        self.writer
            .write_all(json.as_bytes())
            .await
            .map_err(|e| Error::Io(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .await
            .map_err(|e| Error::Io(e.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|e| Error::Io(e.to_string()))?;
        Ok(())
    }
}

fn read_lines<R>(read: R) -> impl Stream<Item = Result<String, Error>> + Send
where
    R: AsyncRead + Unpin + Send + 'static,
{
    async_stream::try_stream! {
        let mut reader = BufReader::new(read);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|e| Error::Io(e.to_string()))?;
            if n == 0 {
                tracing::debug!("EOF reached on input stream");
                break;
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(err) => {
                    tracing::warn!(error = %err, "Dropping line that is not valid UTF-8");
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }
            yield line.to_string();
        }
    }
}
