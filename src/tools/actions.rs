//! Action (activity history) tools.
//!
//! Tools: trello_action_get, trello_action_update_comment, trello_action_delete

use serde_json::{json, Map, Value as JsonValue};

use crate::convert::{get_id_arg, get_string_arg, ok_result, str_field};
use crate::error::{McpError, Result};
use crate::fields;
use crate::schema;
use crate::session::McpSession;
use crate::tools::ToolDef;
use crate::upstream::{Fields, HttpMethod, ResourceKind};

/// Get all action tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "trello_action_get",
            "Get an action (an entry in a board's or card's activity history) by ID.",
            schema!(object {
                required: { "id_action": string }
            }),
        ),
        ToolDef::new(
            "trello_action_update_comment",
            "Edit the text of a comment action. Only the comment's author can edit it.",
            schema!(object {
                required: { "id_action": string, "text": string }
            }),
        ),
        ToolDef::new(
            "trello_action_delete",
            "Delete an action. Only comment actions can be deleted.",
            schema!(object {
                required: { "id_action": string }
            }),
        ),
    ]
}

/// Dispatch an action tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    let up = session.upstream();

    match name {
        "trello_action_get" => {
            let id_action = get_id_arg(&args, "id_action")?;
            let data = up.get(&ResourceKind::Action.path(&id_action), &Fields::new()).await?;
            let kind = str_field(&data, "type").map(str::to_string);
            Ok(ok_result(
                "get_action",
                format!("Retrieved action {}", id_action),
                data,
                json!({ "id_action": id_action, "type": kind }),
            ))
        }

        "trello_action_update_comment" => {
            let id_action = get_id_arg(&args, "id_action")?;
            let text = get_string_arg(&args, "text")?;

            let path = format!("{}/text", ResourceKind::Action.path(&id_action));
            let data = up
                .send(HttpMethod::Put, &path, &fields! { "value" => text })
                .await?;
            Ok(ok_result(
                "update_comment",
                format!("Updated comment {}", id_action),
                data,
                json!({ "id_action": id_action }),
            ))
        }

        "trello_action_delete" => {
            let id_action = get_id_arg(&args, "id_action")?;
            let data = up.delete(ResourceKind::Action, &id_action).await?;
            Ok(ok_result(
                "delete_action",
                format!("Deleted action {}", id_action),
                data,
                json!({ "id_action": id_action }),
            ))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
