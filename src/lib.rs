//! # Model Context Protocol (MCP) calculator server
//!
//! A minimal MCP server speaking newline-delimited JSON-RPC 2.0 over stdio.
//! It answers `initialize`, `tools/list`, `tools/call`, `prompts/list` and
//! `resources/list`, silently accepts `notifications/*`, and exposes four
//! arithmetic tools through a pluggable [`tools::ToolExecutor`].
//!
//! ## Example
//!
//! ```no_run
//! use mcp_calculator_rs::server::ServerBuilder;
//! use tokio::io::{stdin, stdout};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     ServerBuilder::new()
//!         .implementation("my-calculator", "1.0.0")
//!         .serve(stdin(), stdout())
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! Responses are written to the output stream only; every diagnostic goes
//! through `tracing`, which the binary points at stderr.

/// Optional JSON configuration file
pub mod config;
/// Error types and JSON-RPC error codes
pub mod error;
/// Diagnostic sink installation
pub mod logging;
/// JSON-RPC envelopes and line decoding
pub mod protocol;
/// The protocol dispatcher and its builder
pub mod server;
/// Tool executors, including the calculator
pub mod tools;
/// Line transport and the serve loop
pub mod transport;
/// Typed MCP payloads
pub mod types;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use error::Error;
pub use protocol::{Request, RequestId, Response};
pub use types::*;

/// The protocol version this server reports from `initialize`.
pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";

/// JSON-RPC version carried by every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Methods with this prefix are notifications and never get a response.
pub const NOTIFICATION_PREFIX: &str = "notifications/";
