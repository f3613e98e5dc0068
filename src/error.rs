//! Error types for the MCP server.
//!
//! Maps upstream HTTP failures and argument problems to MCP-friendly error responses.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// MCP server errors.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum McpError {
    /// An upstream Trello call returned a non-success status or never completed.
    #[error("upstream request failed{}: {message}", status_suffix(.status))]
    Upstream {
        /// HTTP status, absent when the request failed before a response arrived
        status: Option<u16>,
        /// Upstream error body or transport error
        message: String,
    },

    /// Unknown tool requested.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArg(String),

    /// Invalid argument value.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArg {
        /// Argument name
        name: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// No board member matched a lookup.
    #[error("no member of board {board_id} matches '{query}'")]
    MemberNotFound {
        /// Board whose member list was searched
        board_id: String,
        /// The query as given by the caller
        query: String,
    },

    /// A lookup found nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// JSON-RPC protocol error.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        McpError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::Protocol(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for McpError {
    fn from(err: reqwest::Error) -> Self {
        McpError::Upstream {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// JSON-RPC error codes.
pub mod rpc_codes {
    /// Parse error - Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found - The method does not exist / is not available.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params - Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
}

impl McpError {
    /// Convert to JSON-RPC error code.
    pub fn rpc_code(&self) -> i32 {
        match self {
            McpError::UnknownTool(_) => rpc_codes::METHOD_NOT_FOUND,
            McpError::MissingArg(_) | McpError::InvalidArg { .. } => rpc_codes::INVALID_PARAMS,
            McpError::MemberNotFound { .. } | McpError::NotFound(_) => rpc_codes::INVALID_PARAMS,
            McpError::Protocol(_) => rpc_codes::INVALID_REQUEST,
            _ => rpc_codes::INTERNAL_ERROR,
        }
    }

    /// Stable machine-readable code, surfaced inside tool results.
    pub fn code(&self) -> &'static str {
        match self {
            McpError::Upstream { .. } => "UPSTREAM_REQUEST_FAILED",
            McpError::UnknownTool(_) => "UNKNOWN_TOOL",
            McpError::MissingArg(_) | McpError::InvalidArg { .. } => "INVALID_ARGUMENT",
            McpError::MemberNotFound { .. } => "MEMBER_NOT_FOUND",
            McpError::NotFound(_) => "NOT_FOUND",
            McpError::Protocol(_) => "PROTOCOL_ERROR",
            McpError::Config(_) => "CONFIG_ERROR",
            McpError::Io(_) => "IO_ERROR",
            McpError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this error belongs to a single tool invocation.
    ///
    /// Tool failures are reported as unsuccessful tool results; everything
    /// else becomes a JSON-RPC error.
    pub fn is_tool_failure(&self) -> bool {
        !matches!(self, McpError::UnknownTool(_) | McpError::Protocol(_))
    }

    /// Structured detail for embedding in a result object.
    pub fn detail(&self) -> JsonValue {
        let mut detail = json!({
            "code": self.code(),
            "message": self.to_string(),
        });
        match self {
            McpError::Upstream { status, .. } => {
                detail["status"] = json!(status);
            }
            McpError::MemberNotFound { board_id, query } => {
                detail["board_id"] = json!(board_id);
                detail["query"] = json!(query);
            }
            McpError::MissingArg(name) | McpError::InvalidArg { name, .. } => {
                detail["argument"] = json!(name);
            }
            _ => {}
        }
        detail
    }

    /// Render as an unsuccessful tool result.
    pub fn to_tool_result(&self) -> JsonValue {
        json!({
            "success": false,
            "message": self.to_string(),
            "error": self.detail(),
        })
    }
}

/// Result type for MCP operations.
pub type Result<T> = std::result::Result<T, McpError>;
