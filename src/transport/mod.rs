use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::error::Error;
use crate::protocol::{self, Inbound, Request, Response};

pub mod stdio;

#[cfg(test)]
mod test;

/// Something that turns a decoded request into at most one response.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Returns `None` when no response is owed (notifications).
    async fn dispatch(&self, request: Request) -> Option<Response>;
}

/// Serves requests from `transport` until its input is exhausted.
///
/// Every decoded request is handed to `dispatcher`; a returned response is
/// written as one flushed line. Blank and undecodable lines are skipped, so a
/// malformed line never ends the loop.
///
/// # Errors
///
/// Returns an error only for a fault on the transport itself (failed read or
/// write). End of input is a clean `Ok(())`.
pub async fn run<W, D>(transport: &mut stdio::StdioTransport<W>, dispatcher: &D) -> Result<(), Error>
where
    W: AsyncWrite + Unpin + Send,
    D: Dispatch + ?Sized,
{
    while let Some(line) = transport.receive().await {
        let line = line.map_err(|e| {
            tracing::error!(error = %e, "Error reading from input stream");
            e
        })?;

        let inbound = match protocol::decode(&line) {
            Ok(inbound) => inbound,
            Err(err) => {
                tracing::warn!(error = %err, "Dropping line that is not valid JSON");
                continue;
            }
        };

        let response = match inbound {
            Inbound::Request(request) => dispatcher.dispatch(request).await,
            invalid => {
                let rejection = invalid.rejection();
                if let (None, Inbound::Invalid { reason, .. }) = (&rejection, &invalid) {
                    tracing::warn!(%reason, "Dropping invalid request without a usable id");
                }
                rejection
            }
        };

        if let Some(response) = response {
            transport.send(&response).await.map_err(|e| {
                tracing::error!(error = %e, "Error writing response");
                e
            })?;
        }
    }

    tracing::info!("Input stream closed, shutting down");
    Ok(())
}
