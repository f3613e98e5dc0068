//! Batch tools.
//!
//! Tools: trello_batch_get

use serde_json::{Map, Value as JsonValue};

use crate::convert::get_string_list_arg;
use crate::error::{McpError, Result};
use crate::ops;
use crate::schema;
use crate::session::McpSession;
use crate::tools::ToolDef;

/// Largest number of paths accepted in one batch.
const MAX_BATCH: usize = 10;

/// Get all batch tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![ToolDef::new(
        "trello_batch_get",
        "Run up to 10 GET requests in one call. Each url is an API path such as \
         '/boards/{id}/lists'. Requests run one after another and each reports its own \
         success or error; one failure does not stop the rest.",
        schema!(object {
            required: { "urls": array_string }
        }),
    )]
}

/// Dispatch a batch tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "trello_batch_get" => {
            let urls = get_string_list_arg(&args, "urls")?;
            if urls.len() > MAX_BATCH {
                return Err(McpError::InvalidArg {
                    name: "urls".to_string(),
                    reason: format!("at most {} paths per batch, got {}", MAX_BATCH, urls.len()),
                });
            }

            let outcome = ops::batch_get(session.upstream(), &urls).await?;
            Ok(serde_json::to_value(outcome)?)
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
