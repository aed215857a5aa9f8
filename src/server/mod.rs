use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    error::{Error, ErrorCode},
    protocol::{Request, Response},
    tools::{ToolError, ToolExecutor},
    transport::Dispatch,
    types::{
        CallToolRequest, CallToolResult, Implementation, InitializeResult, ListPromptsResult,
        ListResourcesResult, ListToolsResult, ServerCapabilities, Tool,
    },
};

mod builder;
pub use builder::{ServerBuilder, DEFAULT_SERVER_NAME};


/// Request methods the server answers. Notifications are handled before the
/// table is consulted and never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Initialize,
    ListTools,
    CallTool,
    ListPrompts,
    ListResources,
}

impl Method {
    /// Every method with its wire name.
    pub const TABLE: [(&'static str, Method); 5] = [
        ("initialize", Method::Initialize),
        ("tools/list", Method::ListTools),
        ("tools/call", Method::CallTool),
        ("prompts/list", Method::ListPrompts),
        ("resources/list", Method::ListResources),
    ];
}

/// The MCP protocol dispatcher.
///
/// Owns the capability table and the tool descriptors. Both are fixed when the
/// server is built, and `handle` never mutates them, so every call is
/// independent of the ones before it.
pub struct Server {
    /// Method name to handler, built once.
    methods: BTreeMap<&'static str, Method>,
    /// Pre-rendered `initialize` result; only depends on construction inputs.
    initialize_result: Value,
    /// Tool descriptors advertised by `tools/list`.
    tools: Vec<Tool>,
    /// Executes `tools/call` requests.
    executor: Arc<dyn ToolExecutor>,
}

impl Server {
    /// Creates a dispatcher for the given implementation info and executor.
    ///
    /// # Errors
    ///
    /// Returns an error if the `initialize` descriptor cannot be encoded.
    pub fn new(
        server_info: Implementation,
        protocol_version: &str,
        executor: Arc<dyn ToolExecutor>,
    ) -> Result<Self, Error> {
        let initialize_result = serde_json::to_value(InitializeResult {
            protocol_version: protocol_version.to_string(),
            server_info,
            capabilities: ServerCapabilities::default(),
        })?;
        let tools = executor.tools();
        tracing::debug!(tools = tools.len(), "Created MCP server");

        Ok(Self {
            methods: Method::TABLE.into_iter().collect(),
            initialize_result,
            tools,
            executor,
        })
    }

    /// Tool descriptors this server advertises.
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Handles one decoded request.
    ///
    /// Returns `None` for notifications, whatever their `id`; every other
    /// request yields exactly one response carrying the request's `id`.
    pub async fn handle(&self, request: &Request) -> Option<Response> {
        if request.is_notification() {
            self.handle_notification(request);
            return None;
        }

        let id = request.id.clone();
        let Some(method) = self.methods.get(request.method.as_str()).copied() else {
            let message = format!("Method not found: {}", request.method);
            tracing::warn!(code = i32::from(ErrorCode::MethodNotFound), %message, "Error response");
            return Some(Response::error(id, ErrorCode::MethodNotFound, message));
        };

        let outcome = match method {
            Method::Initialize => self.initialize(),
            Method::ListTools => self.list_tools(),
            Method::CallTool => self.call_tool(request.params.as_ref()).await,
            Method::ListPrompts => self.list_prompts(),
            Method::ListResources => self.list_resources(),
        };

        Some(match outcome {
            Ok(result) => Response::success(id, result),
            Err(err) => {
                tracing::warn!(code = err.code(), error = %err, "Error response");
                Response::from_error(id, err)
            }
        })
    }

    fn handle_notification(&self, request: &Request) {
        match request.method.as_str() {
            "notifications/initialized" => {
                tracing::info!("Client initialized notification received");
            }
            other => {
                tracing::debug!(method = other, "Unknown notification");
            }
        }
    }

    fn initialize(&self) -> Result<Value, Error> {
        tracing::info!("Server initialized");
        Ok(self.initialize_result.clone())
    }

    fn list_tools(&self) -> Result<Value, Error> {
        tracing::debug!("Tools list requested");
        to_result(ListToolsResult {
            tools: self.tools.clone(),
        })
    }

    async fn call_tool(&self, params: Option<&Value>) -> Result<Value, Error> {
        let params = params.ok_or_else(|| {
            Error::protocol(ErrorCode::InvalidParams, "Missing params for tools/call")
        })?;
        let call: CallToolRequest = serde_json::from_value(params.clone()).map_err(|e| {
            Error::protocol(ErrorCode::InvalidParams, format!("Invalid tools/call params: {e}"))
        })?;
        let arguments = call
            .arguments
            .unwrap_or_else(|| Value::Object(Default::default()));

        tracing::info!(tool = %call.name, "Tool called");

        match self.executor.execute(&call.name, &arguments).await {
            Ok(text) => to_result(CallToolResult::text(text)),
            Err(ToolError::InvalidArgument(message)) => {
                Err(Error::protocol(ErrorCode::InvalidParams, message))
            }
            Err(ToolError::Failed(message)) => {
                tracing::error!(tool = %call.name, %message, "Error executing tool");
                Err(Error::protocol(
                    ErrorCode::InternalError,
                    format!("Error executing tool: {message}"),
                ))
            }
        }
    }

    fn list_prompts(&self) -> Result<Value, Error> {
        tracing::debug!("Prompts list requested");
        to_result(ListPromptsResult::default())
    }

    fn list_resources(&self) -> Result<Value, Error> {
        tracing::debug!("Resources list requested");
        to_result(ListResourcesResult::default())
    }
}

fn to_result<T: Serialize>(result: T) -> Result<Value, Error> {
    Ok(serde_json::to_value(result)?)
}

#[async_trait]
impl Dispatch for Server {
    async fn dispatch(&self, request: Request) -> Option<Response> {
        tracing::debug!(method = %request.method, "Received request");
        self.handle(&request).await
    }
}
