//! JSON-RPC 2.0 envelopes and inbound line decoding.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::{Error, ErrorCode};
use crate::{JSONRPC_VERSION, NOTIFICATION_PREFIX};

/// Opaque request identifier, echoed back exactly as received. Numbers keep
/// their original text, so `1e2` or ids beyond the `u64` range round-trip
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(Number),
    String(String),
}

impl RequestId {
    /// Salvages an id from an arbitrary JSON value. Only strings and numbers
    /// are valid ids; anything else is treated as absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(RequestId::Number(n.clone())),
            Value::String(s) => Some(RequestId::String(s.clone())),
            _ => None,
        }
    }
}

impl From<i32> for RequestId {
    fn from(n: i32) -> Self {
        RequestId::Number(n.into())
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n.into())
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

fn default_jsonrpc() -> String {
    JSONRPC_VERSION.to_string()
}

/// A decoded inbound message. Requests without an `id` and requests whose
/// method carries the notification prefix are both delivered as `Request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Filled in by `decode`, which validates the id type itself.
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

impl Request {
    pub fn new(method: &str, params: Option<Value>, id: Option<RequestId>) -> Self {
        Self {
            jsonrpc: default_jsonrpc(),
            method: method.to_string(),
            params,
            id,
        }
    }

    /// Notifications never receive a response, whether or not they carry an id.
    pub fn is_notification(&self) -> bool {
        self.method.starts_with(NOTIFICATION_PREFIX)
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Exactly one of `result` or `error`, flattened into the envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePayload {
    Result(Value),
    Error(ResponseError),
}

/// Outbound response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

impl Response {
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: default_jsonrpc(),
            id,
            payload: ResponsePayload::Result(result),
        }
    }

    pub fn error(id: Option<RequestId>, code: impl Into<i32>, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: default_jsonrpc(),
            id,
            payload: ResponsePayload::Error(ResponseError {
                code: code.into(),
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Builds an error response from a library error, keeping any attached data.
    pub fn from_error(id: Option<RequestId>, err: Error) -> Self {
        let code = err.code();
        let (message, data) = match err {
            Error::Protocol { message, data, .. } => (message, data),
            other => (format!("Internal error: {other}"), None),
        };
        Self {
            jsonrpc: default_jsonrpc(),
            id,
            payload: ResponsePayload::Error(ResponseError {
                code,
                message,
                data,
            }),
        }
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.payload {
            ResponsePayload::Result(value) => Some(value),
            ResponsePayload::Error(_) => None,
        }
    }

    pub fn error_object(&self) -> Option<&ResponseError> {
        match &self.payload {
            ResponsePayload::Error(error) => Some(error),
            ResponsePayload::Result(_) => None,
        }
    }
}

/// Outcome of decoding one inbound line that was at least valid JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Request(Request),
    /// Parsed as JSON but not a usable request. `id` is set when one could be
    /// salvaged, in which case an `InvalidRequest` response is owed.
    Invalid {
        id: Option<RequestId>,
        reason: String,
    },
}

impl Inbound {
    /// The response owed for an invalid message, if any.
    pub fn rejection(&self) -> Option<Response> {
        match self {
            Inbound::Invalid {
                id: Some(id),
                reason,
            } => Some(Response::error(
                Some(id.clone()),
                ErrorCode::InvalidRequest,
                format!("Invalid Request: {reason}"),
            )),
            _ => None,
        }
    }
}

/// Decodes one trimmed line. Lines that are not JSON at all are returned as
/// `Err`: nothing can be correlated with them.
pub fn decode(line: &str) -> Result<Inbound, serde_json::Error> {
    let mut value: Value = serde_json::from_str(line)?;
    let raw_id = value.as_object_mut().and_then(|object| object.remove("id"));
    let id = raw_id.as_ref().and_then(RequestId::from_value);

    if let Some(raw) = raw_id.as_ref().filter(|raw| !raw.is_null()) {
        if id.is_none() {
            return Ok(Inbound::Invalid {
                id: None,
                reason: format!("unsupported id type: {raw}"),
            });
        }
    }

    let inbound = match value.get("method") {
        Some(Value::String(_)) => match serde_json::from_value::<Request>(value) {
            Ok(mut request) => {
                request.id = id;
                Inbound::Request(request)
            }
            Err(err) => Inbound::Invalid {
                id,
                reason: err.to_string(),
            },
        },
        Some(_) => Inbound::Invalid {
            id,
            reason: "'method' must be a string".to_string(),
        },
        None => Inbound::Invalid {
            id,
            reason: "missing 'method'".to_string(),
        },
    };
    Ok(inbound)
}
