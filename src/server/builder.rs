use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::Config;
use crate::error::Error;
use crate::server::Server;
use crate::tools::{Calculator, ToolExecutor};
use crate::transport::{self, stdio::StdioTransport};
use crate::types::Implementation;

/// Default server name announced in `initialize`.
pub const DEFAULT_SERVER_NAME: &str = "mcp-calculator";

/// A builder for a `Server`, optionally running it over a pair of streams.
pub struct ServerBuilder {
    /// Server implementation info (name, version).
    implementation: Option<Implementation>,
    /// Protocol version reported by `initialize`.
    protocol_version: String,
    /// Executor backing `tools/list` and `tools/call`.
    executor: Option<Arc<dyn ToolExecutor>>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            implementation: None,
            protocol_version: crate::LATEST_PROTOCOL_VERSION.to_string(),
            executor: None,
        }
    }

    /// Starts from the identity settings in a loaded `Config`.
    pub fn from_config(config: &Config) -> Self {
        tracing::debug!(?config, "Creating ServerBuilder from config");
        Self::new()
            .implementation(&config.server_name, &config.server_version)
            .protocol_version(&config.protocol_version)
    }

    pub fn implementation(mut self, name: &str, version: &str) -> Self {
        tracing::trace!(%name, %version, "Setting implementation for ServerBuilder");
        self.implementation = Some(Implementation {
            name: name.to_string(),
            version: version.to_string(),
        });
        self
    }

    pub fn protocol_version(mut self, version: &str) -> Self {
        tracing::trace!(%version, "Setting protocol version for ServerBuilder");
        self.protocol_version = version.to_string();
        self
    }

    pub fn executor(mut self, executor: Arc<dyn ToolExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Builds the dispatcher. Without an explicit executor the server exposes
    /// the calculator tools.
    ///
    /// # Errors
    ///
    /// Returns an error if the server's static descriptors cannot be encoded.
    pub fn build(self) -> Result<Server, Error> {
        let implementation = self.implementation.unwrap_or_else(|| Implementation {
            name: DEFAULT_SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        });
        let executor = self.executor.unwrap_or_else(|| {
            tracing::debug!("Using default calculator executor");
            Arc::new(Calculator::new()) as Arc<dyn ToolExecutor>
        });

        Server::new(implementation, &self.protocol_version, executor)
    }

    /// Builds the server and serves requests from `read`, writing responses
    /// to `write`, until `read` is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if building fails or the transport hits an I/O fault.
    pub async fn serve<R, W>(self, read: R, write: W) -> Result<(), Error>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send,
    {
        let server = self.build()?;
        let mut transport = StdioTransport::with_streams(read, write);
        tracing::info!("MCP server started and listening for requests");
        transport::run(&mut transport, &server).await
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
