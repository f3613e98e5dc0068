//! Tool registry and category definitions.
//!
//! Provides the infrastructure for registering and dispatching MCP tools.

pub mod actions;
pub mod batch;
pub mod boards;
pub mod cards;
pub mod checklists;
pub mod labels;
pub mod lists;
pub mod members;
pub mod notifications;
pub mod webhooks;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};
use crate::session::McpSession;

/// A tool definition for the MCP tools/list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool name (e.g., "trello_card_create")
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonValue,
}

impl ToolDef {
    /// Create a new tool definition.
    pub fn new(name: &str, description: &str, input_schema: JsonValue) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// Registry of all available tools.
pub struct ToolRegistry {
    tools: Vec<ToolDef>,
}

impl ToolRegistry {
    /// Create a new registry with all tools registered.
    pub fn new() -> Self {
        let mut tools = Vec::new();

        // Register all tool categories
        tools.extend(boards::tools());
        tools.extend(cards::tools());
        tools.extend(lists::tools());
        tools.extend(checklists::tools());
        tools.extend(labels::tools());
        tools.extend(members::tools());
        tools.extend(actions::tools());
        tools.extend(notifications::tools());
        tools.extend(webhooks::tools());
        tools.extend(batch::tools());

        Self { tools }
    }

    /// Get all tool definitions.
    pub fn tools(&self) -> &[ToolDef] {
        &self.tools
    }

    /// Dispatch a tool call to the appropriate handler.
    pub async fn dispatch(
        &self,
        session: &McpSession,
        name: &str,
        args: Map<String, JsonValue>,
    ) -> Result<JsonValue> {
        tracing::debug!(tool = name, "dispatch");

        // Route based on prefix
        if name.starts_with("trello_board_") {
            boards::dispatch(session, name, args).await
        } else if name.starts_with("trello_card_") {
            cards::dispatch(session, name, args).await
        } else if name.starts_with("trello_list_") {
            lists::dispatch(session, name, args).await
        } else if name.starts_with("trello_checklist_") {
            checklists::dispatch(session, name, args).await
        } else if name.starts_with("trello_label_") {
            labels::dispatch(session, name, args).await
        } else if name.starts_with("trello_member_") {
            members::dispatch(session, name, args).await
        } else if name.starts_with("trello_action_") {
            actions::dispatch(session, name, args).await
        } else if name.starts_with("trello_notification_") {
            notifications::dispatch(session, name, args).await
        } else if name.starts_with("trello_webhook_") {
            webhooks::dispatch(session, name, args).await
        } else if name.starts_with("trello_batch_") {
            batch::dispatch(session, name, args).await
        } else {
            Err(McpError::UnknownTool(name.to_string()))
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper macro for creating JSON Schema for tool input parameters.
#[macro_export]
macro_rules! schema {
    // Object with required and optional properties
    (object {
        required: { $($req_name:literal : $req_type:tt),* $(,)? },
        optional: { $($opt_name:literal : $opt_type:tt),* $(,)? }
    }) => {{
        let mut required = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), schema!(@type $req_type));)*
        $(props.insert($opt_name.to_string(), schema!(@type $opt_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Object with only required properties
    (object {
        required: { $($req_name:literal : $req_type:tt),* $(,)? }
    }) => {{
        let mut required = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), schema!(@type $req_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Object with only optional properties
    (object {
        optional: { $($opt_name:literal : $opt_type:tt),* $(,)? }
    }) => {{
        let mut props = serde_json::Map::new();
        $(props.insert($opt_name.to_string(), schema!(@type $opt_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": []
        })
    }};

    // Empty object (no parameters)
    (object {}) => {{
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }};

    // Type mappings
    (@type string) => { serde_json::json!({"type": "string"}) };
    (@type integer) => { serde_json::json!({"type": "integer"}) };
    (@type boolean) => { serde_json::json!({"type": "boolean"}) };
    (@type number) => { serde_json::json!({"type": "number"}) };
    (@type position) => { serde_json::json!({"type": ["string", "number"], "description": "top, bottom, or a positive number"}) };
    (@type array_string) => { serde_json::json!({"type": "array", "items": {"type": "string"}}) };
}
