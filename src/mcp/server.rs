use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::mcp::protocol::{
    negotiate_protocol_version, CallToolParams, Implementation, InitializeParams,
    InitializeResult, JsonRpcRequest, JsonRpcResponse, RpcError, ToolResult, JSONRPC_VERSION,
};
use crate::tools::{DicomTools, ToolError};

const INSTRUCTIONS: &str = "Use list_dicom_nodes to see the configured DICOM nodes and local AE titles. \
Use dicom_cecho_by_name to verify a configured node, or dicom_cecho to verify any node by AE title, address and port.";

/// Transport-independent MCP request dispatcher
pub struct McpServer {
    name: String,
    tools: Arc<DicomTools>,
}

impl McpServer {
    pub fn new(name: impl Into<String>, tools: Arc<DicomTools>) -> Self {
        Self {
            name: name.into(),
            tools,
        }
    }

    /// Handle one raw JSON-RPC message. Returns `None` for notifications.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                warn!("Rejecting malformed JSON-RPC message: {}", e);
                return Some(JsonRpcResponse::error(Value::Null, RpcError::parse_error(e)));
            }
        };
        self.handle_value(value).await
    }

    pub async fn handle_value(&self, value: Value) -> Option<JsonRpcResponse> {
        let id_hint = value.get("id").cloned().unwrap_or(Value::Null);

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => return Some(JsonRpcResponse::error(id_hint, RpcError::invalid_request(e))),
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id_hint,
                RpcError::invalid_request(format!("unsupported jsonrpc version '{}'", request.jsonrpc)),
            ));
        }

        if request.is_notification() {
            debug!("Notification received: {}", request.method);
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);

        if !(id.is_string() || id.is_number() || id.is_null()) {
            return Some(JsonRpcResponse::error(
                Value::Null,
                RpcError::invalid_request("id must be a string, a number or null"),
            ));
        }

        let response = match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::result(id, result),
            Err(e) => {
                debug!("Request '{}' failed: {}", request.method, e);
                JsonRpcResponse::error(id, e)
            }
        };
        Some(response)
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, RpcError> {
        match method {
            "initialize" => self.initialize(params),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.tools.definitions() })),
            "tools/call" => self.call_tool(params).await,
            other => Err(RpcError::method_not_found(other)),
        }
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let params: InitializeParams = match params {
            Some(p) => serde_json::from_value(p).map_err(RpcError::invalid_params)?,
            None => InitializeParams::default(),
        };

        if let Some(client) = &params.client_info {
            info!("MCP client connected: {} {}", client.name, client.version);
        }

        let result = InitializeResult {
            protocol_version: negotiate_protocol_version(params.protocol_version.as_deref())
                .to_string(),
            capabilities: json!({ "tools": { "listChanged": false } }),
            server_info: Implementation {
                name: self.name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: INSTRUCTIONS.to_string(),
        };
        serde_json::to_value(result).map_err(RpcError::internal)
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| RpcError::invalid_params("missing tool call parameters"))
            .and_then(|p| serde_json::from_value(p).map_err(RpcError::invalid_params))?;

        debug!("tools/call {}", params.name);
        let output = self
            .tools
            .call(&params.name, params.arguments)
            .await
            .map_err(|e| match e {
                ToolError::UnknownTool(_) | ToolError::InvalidArguments { .. } => {
                    RpcError::invalid_params(e)
                }
                ToolError::Serialization(_) => RpcError::internal(e),
            })?;

        serde_json::to_value(ToolResult::json(output.value, output.is_error))
            .map_err(RpcError::internal)
    }
}
