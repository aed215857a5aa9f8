//! Tool executors consumed by the dispatcher's `tools/call` handler.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::types::Tool;

mod calculator;
pub use calculator::Calculator;

/// Failure modes of a tool invocation.
///
/// Domain outcomes such as division by zero are not errors: they come back as
/// ordinary result text.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ToolError {
    /// Unknown tool name, or arguments that are missing or of the wrong type.
    #[error("{0}")]
    InvalidArgument(String),

    /// Anything else that went wrong while running the tool.
    #[error("{0}")]
    Failed(String),
}

/// A set of named tools the server can advertise and invoke.
#[async_trait]
pub trait ToolExecutor: Send + Sync + 'static {
    /// Descriptors for every tool this executor accepts. Called once when the
    /// server is built.
    fn tools(&self) -> Vec<Tool>;

    /// Runs the named tool and returns its human-readable result.
    async fn execute(&self, name: &str, arguments: &Value) -> Result<String, ToolError>;
}
