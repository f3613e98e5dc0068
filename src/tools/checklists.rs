//! Checklist tools.
//!
//! Tools: trello_checklist_get, trello_checklist_create, trello_checklist_create_on_board,
//!        trello_checklist_delete, trello_checklist_items, trello_checklist_add_item,
//!        trello_checklist_update_item, trello_checklist_delete_item,
//!        trello_checklist_convert_item_to_card

use serde_json::{json, Map, Value as JsonValue};

use crate::convert::{
    checklist_summary, copy_optional, count, entity_id, get_id_arg, get_optional_bool,
    get_optional_id, get_optional_position, get_optional_string, get_string_arg, ok_result,
    str_field,
};
use crate::error::{McpError, Result};
use crate::fields;
use crate::ops;
use crate::schema;
use crate::session::McpSession;
use crate::tools::ToolDef;
use crate::upstream::{Fields, HttpMethod, ResourceKind};

/// Get all checklist tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "trello_checklist_get",
            "Get a checklist and its items.",
            schema!(object {
                required: { "id_checklist": string }
            }),
        ),
        ToolDef::new(
            "trello_checklist_create",
            "Create a checklist on a card, empty (name) or copied from id_checklist_source. \
             Items are added separately with trello_checklist_add_item.",
            schema!(object {
                required: { "id_card": string },
                optional: { "name": string, "id_checklist_source": string, "pos": position }
            }),
        ),
        ToolDef::new(
            "trello_checklist_create_on_board",
            "Create a checklist for a board. Trello only attaches checklists to cards, so this \
             first creates a host card named 'Checklist: <name>' (in id_list, or the board's \
             first open list) and then the checklist on it. id_list must belong to id_board. \
             If the checklist step fails the host card is kept and reported as orphan_card_id \
             for manual cleanup. A call cancelled after the card was created leaves that card \
             in place with no orphan report.",
            schema!(object {
                required: { "id_board": string, "name": string },
                optional: { "id_list": string }
            }),
        ),
        ToolDef::new(
            "trello_checklist_delete",
            "Delete a checklist and all of its items.",
            schema!(object {
                required: { "id_checklist": string }
            }),
        ),
        ToolDef::new(
            "trello_checklist_items",
            "List the items of a checklist.",
            schema!(object {
                required: { "id_checklist": string }
            }),
        ),
        ToolDef::new(
            "trello_checklist_add_item",
            "Add an item to a checklist.",
            schema!(object {
                required: { "id_checklist": string, "name": string },
                optional: { "checked": boolean, "pos": position }
            }),
        ),
        ToolDef::new(
            "trello_checklist_update_item",
            "Rename, reposition, or check/uncheck a checklist item. Needs the card the \
             checklist belongs to.",
            schema!(object {
                required: { "id_card": string, "id_check_item": string },
                optional: { "name": string, "checked": boolean, "pos": position }
            }),
        ),
        ToolDef::new(
            "trello_checklist_delete_item",
            "Delete an item from a checklist.",
            schema!(object {
                required: { "id_checklist": string, "id_check_item": string }
            }),
        ),
        ToolDef::new(
            "trello_checklist_convert_item_to_card",
            "Promote a checklist item to its own card. The item is removed from the checklist; \
             this cannot be reversed through the API.",
            schema!(object {
                required: { "id_card": string, "id_checklist": string, "id_check_item": string }
            }),
        ),
    ]
}

/// Dispatch a checklist tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    let up = session.upstream();

    match name {
        "trello_checklist_get" => {
            let id_checklist = get_id_arg(&args, "id_checklist")?;
            let data = up
                .get(&ResourceKind::Checklist.path(&id_checklist), &Fields::new())
                .await?;
            Ok(ok_result(
                "get_checklist",
                format!("Retrieved checklist {}", id_checklist),
                data.clone(),
                json!({ "id_checklist": id_checklist, "checklist": checklist_summary(&data) }),
            ))
        }

        "trello_checklist_create" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let source = get_optional_id(&args, "id_checklist_source")?;
            let pos = get_optional_position(&args, "pos")?;
            if get_optional_string(&args, "name")?.is_none() && source.is_none() {
                return Err(McpError::InvalidArg {
                    name: "name".to_string(),
                    reason: "provide 'name' to create a checklist or 'id_checklist_source' to copy one"
                        .to_string(),
                });
            }

            let mut fields = fields! { "idCard" => id_card };
            copy_optional(
                &args,
                &[("name", "name"), ("id_checklist_source", "idChecklistSource")],
                &mut fields,
            )?;
            if let Some(pos) = pos {
                fields.insert("pos".to_string(), pos);
            }

            let data = up.create(ResourceKind::Checklist, None, &fields).await?;
            Ok(ok_result(
                "create_checklist",
                format!(
                    "Created checklist '{}' on card {}",
                    str_field(&data, "name").unwrap_or_default(),
                    id_card
                ),
                data.clone(),
                json!({
                    "id_card": id_card,
                    "checklist_id": entity_id(&data),
                    "source_checklist_id": source,
                }),
            ))
        }

        "trello_checklist_create_on_board" => {
            let id_board = get_id_arg(&args, "id_board")?;
            let checklist_name = get_string_arg(&args, "name")?;
            let id_list = get_optional_id(&args, "id_list")?;

            let outcome =
                ops::create_checklist_on_board(up, &id_board, &checklist_name, id_list.as_deref())
                    .await?;
            Ok(serde_json::to_value(outcome)?)
        }

        "trello_checklist_delete" => {
            let id_checklist = get_id_arg(&args, "id_checklist")?;
            let data = up.delete(ResourceKind::Checklist, &id_checklist).await?;
            Ok(ok_result(
                "delete_checklist",
                format!("Deleted checklist {}", id_checklist),
                data,
                json!({ "id_checklist": id_checklist }),
            ))
        }

        "trello_checklist_items" => {
            let id_checklist = get_id_arg(&args, "id_checklist")?;
            let path = format!("{}/checkItems", ResourceKind::Checklist.path(&id_checklist));
            let data = up.get(&path, &Fields::new()).await?;
            Ok(ok_result(
                "get_checklist_items",
                format!("Retrieved {} items from checklist {}", count(&data), id_checklist),
                data,
                json!({ "id_checklist": id_checklist }),
            ))
        }

        "trello_checklist_add_item" => {
            let id_checklist = get_id_arg(&args, "id_checklist")?;
            let item_name = get_string_arg(&args, "name")?;
            let pos = get_optional_position(&args, "pos")?;

            let mut fields = fields! { "name" => item_name };
            if let Some(checked) = get_optional_bool(&args, "checked")? {
                fields.insert("checked".to_string(), checked.to_string());
            }
            if let Some(pos) = pos {
                fields.insert("pos".to_string(), pos);
            }

            let path = format!("{}/checkItems", ResourceKind::Checklist.path(&id_checklist));
            let data = up.send(HttpMethod::Post, &path, &fields).await?;
            Ok(ok_result(
                "add_check_item",
                format!("Added item '{}' to checklist {}", item_name, id_checklist),
                data.clone(),
                json!({ "id_checklist": id_checklist, "id_check_item": entity_id(&data) }),
            ))
        }

        "trello_checklist_update_item" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let id_check_item = get_id_arg(&args, "id_check_item")?;
            let pos = get_optional_position(&args, "pos")?;

            let mut fields = Fields::new();
            copy_optional(&args, &[("name", "name")], &mut fields)?;
            if let Some(checked) = get_optional_bool(&args, "checked")? {
                let state = if checked { "complete" } else { "incomplete" };
                fields.insert("state".to_string(), state.to_string());
            }
            if let Some(pos) = pos {
                fields.insert("pos".to_string(), pos);
            }
            if fields.is_empty() {
                return Err(McpError::InvalidArg {
                    name: "id_check_item".to_string(),
                    reason: "no attributes to update were given".to_string(),
                });
            }

            let path = format!(
                "{}/checkItem/{}",
                ResourceKind::Card.path(&id_card),
                id_check_item
            );
            let data = up.send(HttpMethod::Put, &path, &fields).await?;
            Ok(ok_result(
                "update_check_item",
                format!("Updated checklist item {} on card {}", id_check_item, id_card),
                data,
                json!({ "id_card": id_card, "id_check_item": id_check_item }),
            ))
        }

        "trello_checklist_delete_item" => {
            let id_checklist = get_id_arg(&args, "id_checklist")?;
            let id_check_item = get_id_arg(&args, "id_check_item")?;

            let path = format!(
                "{}/checkItems/{}",
                ResourceKind::Checklist.path(&id_checklist),
                id_check_item
            );
            let data = up.send(HttpMethod::Delete, &path, &Fields::new()).await?;
            Ok(ok_result(
                "delete_check_item",
                format!("Deleted item {} from checklist {}", id_check_item, id_checklist),
                data,
                json!({ "id_checklist": id_checklist, "id_check_item": id_check_item }),
            ))
        }

        "trello_checklist_convert_item_to_card" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let id_checklist = get_id_arg(&args, "id_checklist")?;
            let id_check_item = get_id_arg(&args, "id_check_item")?;

            let path = format!(
                "{}/checklist/{}/checkItem/{}/convertToCard",
                ResourceKind::Card.path(&id_card),
                id_checklist,
                id_check_item
            );
            let data = up.send(HttpMethod::Post, &path, &Fields::new()).await?;
            Ok(ok_result(
                "convert_check_item_to_card",
                format!("Converted checklist item {} to a card", id_check_item),
                data.clone(),
                json!({
                    "id_card": id_card,
                    "id_checklist": id_checklist,
                    "id_check_item": id_check_item,
                    "new_card_id": entity_id(&data),
                }),
            ))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
