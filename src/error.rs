use serde_json::Value;
use thiserror::Error;

/// JSON-RPC error codes used by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code as i32
    }
}

/// Errors produced by the server library.
#[derive(Debug, Error)]
pub enum Error {
    /// A failure that is reported to the client as a JSON-RPC error object.
    #[error("protocol error {code}: {message}")]
    Protocol {
        code: i32,
        message: String,
        data: Option<Value>,
    },

    #[error("IO error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub fn protocol(code: ErrorCode, message: impl Into<String>) -> Self {
        Error::Protocol {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }

    /// The JSON-RPC code this error is reported with. Anything that is not
    /// already a protocol error is an internal error from the client's view.
    pub fn code(&self) -> i32 {
        match self {
            Error::Protocol { code, .. } => *code,
            _ => ErrorCode::InternalError.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
