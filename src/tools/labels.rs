//! Label tools.
//!
//! Tools: trello_label_get, trello_label_create, trello_label_update, trello_label_delete

use serde_json::{json, Map, Value as JsonValue};

use crate::convert::{
    copy_optional, entity_id, get_id_arg, get_optional_choice, get_string_arg, ok_result,
};
use crate::error::{McpError, Result};
use crate::schema;
use crate::session::McpSession;
use crate::tools::ToolDef;
use crate::upstream::{Fields, ResourceKind};

/// Label colors accepted by Trello. "null" creates a colorless label.
const LABEL_COLORS: &[&str] = &[
    "green", "yellow", "orange", "red", "purple", "blue", "sky", "lime", "pink", "black", "null",
];

/// Get all label tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "trello_label_get",
            "Get a label by ID.",
            schema!(object {
                required: { "id_label": string }
            }),
        ),
        ToolDef::new(
            "trello_label_create",
            "Create a label on a board. Color: green, yellow, orange, red, purple, blue, sky, \
             lime, pink, black, or null for no color.",
            schema!(object {
                required: { "id_board": string, "name": string, "color": string }
            }),
        ),
        ToolDef::new(
            "trello_label_update",
            "Rename or recolor a label.",
            schema!(object {
                required: { "id_label": string },
                optional: { "name": string, "color": string }
            }),
        ),
        ToolDef::new(
            "trello_label_delete",
            "Delete a label. It is removed from every card that carries it.",
            schema!(object {
                required: { "id_label": string }
            }),
        ),
    ]
}

/// Dispatch a label tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    let up = session.upstream();

    match name {
        "trello_label_get" => {
            let id_label = get_id_arg(&args, "id_label")?;
            let data = up.get(&ResourceKind::Label.path(&id_label), &Fields::new()).await?;
            Ok(ok_result(
                "get_label",
                format!("Retrieved label {}", id_label),
                data,
                json!({ "id_label": id_label }),
            ))
        }

        "trello_label_create" => {
            let id_board = get_id_arg(&args, "id_board")?;
            let label_name = get_string_arg(&args, "name")?;
            let color = get_optional_choice(&args, "color", LABEL_COLORS)?
                .ok_or_else(|| McpError::MissingArg("color".to_string()))?;

            let mut fields = Fields::new();
            fields.insert("name".to_string(), label_name.clone());
            fields.insert("color".to_string(), color.clone());

            let data = up
                .create(ResourceKind::Label, Some(ResourceKind::Board.of(&id_board)), &fields)
                .await?;
            Ok(ok_result(
                "create_label",
                format!("Created {} label '{}' on board {}", color, label_name, id_board),
                data.clone(),
                json!({ "id_board": id_board, "label_id": entity_id(&data) }),
            ))
        }

        "trello_label_update" => {
            let id_label = get_id_arg(&args, "id_label")?;

            let mut fields = Fields::new();
            copy_optional(&args, &[("name", "name")], &mut fields)?;
            if let Some(color) = get_optional_choice(&args, "color", LABEL_COLORS)? {
                fields.insert("color".to_string(), color);
            }
            if fields.is_empty() {
                return Err(McpError::InvalidArg {
                    name: "id_label".to_string(),
                    reason: "no attributes to update were given".to_string(),
                });
            }

            let updated: Vec<String> = fields.keys().cloned().collect();
            let data = up.update(ResourceKind::Label, &id_label, &fields).await?;
            Ok(ok_result(
                "update_label",
                format!("Updated label {} ({})", id_label, updated.join(", ")),
                data,
                json!({ "id_label": id_label, "updated_fields": updated }),
            ))
        }

        "trello_label_delete" => {
            let id_label = get_id_arg(&args, "id_label")?;
            let data = up.delete(ResourceKind::Label, &id_label).await?;
            Ok(ok_result(
                "delete_label",
                format!("Deleted label {}", id_label),
                data,
                json!({ "id_label": id_label }),
            ))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
