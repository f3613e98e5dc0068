//! MCP server implementation.
//!
//! Handles JSON-RPC 2.0 over stdio according to the MCP protocol specification.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::error::{rpc_codes, McpError, Result};
use crate::session::McpSession;
use crate::tools::ToolRegistry;

/// MCP protocol version we support.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server information.
const SERVER_NAME: &str = "trello-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON-RPC 2.0 request.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version, must be "2.0"
    pub jsonrpc: String,
    /// Request ID; `None` only when absent (a notification). An explicit
    /// `null` is kept as `Some(Null)` and still answered.
    #[serde(default, deserialize_with = "present")]
    pub id: Option<JsonValue>,
    /// Method name
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: Option<JsonValue>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<JsonValue>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(Some)
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// Protocol version, always "2.0"
    pub jsonrpc: String,
    /// ID of the request being answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonValue>,
    /// Result on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    /// Error on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Human-readable message
    pub message: String,
    /// Additional detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<JsonValue>, result: JsonValue) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<JsonValue>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
        }
    }

    /// Create an error response from an McpError.
    pub fn from_error(id: Option<JsonValue>, err: McpError) -> Self {
        let mut response = Self::error(id, err.rpc_code(), err.to_string());
        if let Some(error) = response.error.as_mut() {
            error.data = Some(err.detail());
        }
        response
    }
}

/// Wrap a tool result object in the MCP content envelope.
///
/// `isError` mirrors the result's own `success: false`, so partial
/// completions are flagged to the client even though they carry data.
fn tool_content(result: &JsonValue) -> JsonValue {
    let is_error = result.get("success").and_then(|v| v.as_bool()) == Some(false);
    serde_json::json!({
        "content": [{
            "type": "text",
            "text": serde_json::to_string_pretty(result).unwrap_or_else(|_| "null".to_string())
        }],
        "isError": is_error
    })
}

/// MCP server.
pub struct McpServer {
    session: McpSession,
    registry: ToolRegistry,
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server with the given session.
    pub fn new(session: McpSession) -> Self {
        Self {
            session,
            registry: ToolRegistry::new(),
            initialized: false,
        }
    }

    /// Whether a client has completed `initialize`.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the server, reading from stdin and writing to stdout.
    ///
    /// Requests are handled one at a time, so tool calls never overlap.
    pub async fn run(&mut self) -> Result<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();

        tracing::info!(tools = self.registry.tools().len(), "trello-mcp listening on stdio");

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                // EOF - client disconnected
                tracing::info!("stdin closed, shutting down");
                break;
            }

            let Some(response) = self.handle_line(line.trim()).await else {
                continue;
            };

            // Send response
            let response_json = serde_json::to_string(&response)?;
            stdout.write_all(response_json.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }

        Ok(())
    }

    /// Handle one line of input. Returns `None` when nothing should be written back.
    pub async fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable request");
                Some(JsonRpcResponse::error(
                    None,
                    rpc_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            }
        }
    }

    /// Handle a single JSON-RPC request.
    ///
    /// Notifications (requests without an id) never get a response.
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let is_notification = request.id.is_none();

        // Validate JSON-RPC version
        if request.jsonrpc != "2.0" {
            return (!is_notification).then(|| {
                JsonRpcResponse::error(
                    request.id,
                    rpc_codes::INVALID_REQUEST,
                    "Invalid JSON-RPC version".to_string(),
                )
            });
        }

        // Route to appropriate handler
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "initialized" | "notifications/initialized" => {
                tracing::debug!("client initialized");
                return None;
            }
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),
            method if method.starts_with("notifications/") => {
                tracing::debug!(method, "ignoring notification");
                return None;
            }
            _ => JsonRpcResponse::error(
                request.id,
                rpc_codes::METHOD_NOT_FOUND,
                format!("Unknown method: {}", request.method),
            ),
        };

        (!is_notification).then_some(response)
    }

    /// Handle the initialize request.
    fn handle_initialize(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        self.initialized = true;

        JsonRpcResponse::success(
            request.id,
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": SERVER_VERSION
                }
            }),
        )
    }

    /// Handle the tools/list request.
    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let tools: Vec<JsonValue> = self
            .registry
            .tools()
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect();

        JsonRpcResponse::success(request.id, serde_json::json!({ "tools": tools }))
    }

    /// Handle the tools/call request.
    async fn handle_tools_call(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        // Extract name and arguments from params
        let params = match &request.params {
            Some(JsonValue::Object(obj)) => obj,
            _ => {
                return JsonRpcResponse::error(
                    request.id,
                    rpc_codes::INVALID_PARAMS,
                    "Missing params object".to_string(),
                )
            }
        };

        let name = match params.get("name").and_then(|v| v.as_str()) {
            Some(n) => n.to_string(),
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    rpc_codes::INVALID_PARAMS,
                    "Missing 'name' in params".to_string(),
                )
            }
        };

        let arguments = match params.get("arguments") {
            Some(JsonValue::Object(obj)) => obj.clone(),
            Some(JsonValue::Null) | None => Map::new(),
            _ => {
                return JsonRpcResponse::error(
                    request.id,
                    rpc_codes::INVALID_PARAMS,
                    "'arguments' must be an object".to_string(),
                )
            }
        };

        // Dispatch the tool call
        match self.registry.dispatch(&self.session, &name, arguments).await {
            Ok(result) => JsonRpcResponse::success(request.id, tool_content(&result)),
            Err(err) if err.is_tool_failure() => {
                tracing::warn!(tool = %name, code = err.code(), error = %err, "tool call failed");
                JsonRpcResponse::success(request.id, tool_content(&err.to_tool_result()))
            }
            Err(err) => JsonRpcResponse::from_error(request.id, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{Fields, HttpMethod, Upstream};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Arc;

    /// Answers every GET with an empty list and fails every write.
    struct ReadOnlyBoard;

    #[async_trait]
    impl Upstream for ReadOnlyBoard {
        async fn send(&self, method: HttpMethod, _: &str, _: &Fields) -> Result<JsonValue> {
            match method {
                HttpMethod::Get => Ok(serde_json::json!([])),
                _ => Err(McpError::Upstream {
                    status: Some(401),
                    message: "unauthorized permission requested".to_string(),
                }),
            }
        }

        async fn upload(&self, _: &str, _: &Fields, _: &Path) -> Result<JsonValue> {
            Err(McpError::Upstream {
                status: Some(401),
                message: "unauthorized permission requested".to_string(),
            })
        }
    }

    fn server() -> McpServer {
        McpServer::new(McpSession::new(Arc::new(ReadOnlyBoard)))
    }

    fn content_of(response: &JsonRpcResponse) -> JsonValue {
        let result = response.result.as_ref().unwrap();
        let text = result["content"][0]["text"].as_str().unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_json_rpc_response_success() {
        let response = JsonRpcResponse::success(Some(JsonValue::Number(1.into())), serde_json::json!({"ok": true}));
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"result\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_json_rpc_response_error() {
        let response = JsonRpcResponse::error(Some(JsonValue::Number(1.into())), -32600, "Invalid".to_string());
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"error\""));
        assert!(!json.contains("\"result\""));
    }

    #[tokio::test]
    async fn test_initialize_handshake() {
        let mut server = server();
        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "trello-mcp");
        assert!(server.is_initialized());

        let ack = server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(ack.is_none());
    }

    #[tokio::test]
    async fn test_parse_error() {
        let response = server().handle_line("{not json").await.unwrap();
        assert_eq!(response.error.unwrap().code, rpc_codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_null_id_is_answered() {
        let request: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();
        assert_eq!(request.id, Some(JsonValue::Null));

        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#)
            .await
            .expect("null id still gets a reply");
        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(wire["id"], JsonValue::Null);
        assert!(wire.as_object().unwrap().contains_key("id"));
        assert!(response.error.is_none());

        let missing = server()
            .handle_line(r#"{"jsonrpc":"2.0","method":"ping"}"#)
            .await;
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, rpc_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tools_list_names() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":3,"method":"tools/list"}"#)
            .await
            .unwrap();
        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        assert!(tools.iter().any(|t| t["name"] == "trello_checklist_create_on_board"));
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_rpc_error() {
        let response = server()
            .handle_line(
                r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"trello_nope","arguments":{}}}"#,
            )
            .await
            .unwrap();
        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().code, rpc_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_error_result() {
        let response = server()
            .handle_line(
                r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"trello_card_create","arguments":{"id_list":"l1","name":"x"}}}"#,
            )
            .await
            .unwrap();
        assert!(response.error.is_none());
        assert_eq!(response.result.as_ref().unwrap()["isError"], true);

        let body = content_of(&response);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "UPSTREAM_REQUEST_FAILED");
        assert_eq!(body["error"]["status"], 401);
    }

    #[tokio::test]
    async fn test_successful_call_is_not_error() {
        let response = server()
            .handle_line(
                r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"trello_board_lists","arguments":{"id_board":"b1"}}}"#,
            )
            .await
            .unwrap();
        assert_eq!(response.result.as_ref().unwrap()["isError"], false);
        assert_eq!(content_of(&response)["success"], true);
    }
}
