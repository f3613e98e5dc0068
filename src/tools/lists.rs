//! List tools.
//!
//! Tools: trello_list_get, trello_list_create, trello_list_update, trello_list_archive,
//!        trello_list_cards, trello_list_archive_all_cards, trello_list_move_all_cards

use serde_json::{json, Map, Value as JsonValue};

use crate::convert::{
    card_summary, copy_optional, entity_id, get_id_arg, get_optional_id, get_optional_position,
    get_optional_string, list_summary, ok_result,
};
use crate::error::{McpError, Result};
use crate::fields;
use crate::ops;
use crate::schema;
use crate::session::McpSession;
use crate::tools::ToolDef;
use crate::upstream::{Fields, HttpMethod, ResourceKind};

/// Get all list tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "trello_list_get",
            "Get a list by ID.",
            schema!(object {
                required: { "id_list": string }
            }),
        ),
        ToolDef::new(
            "trello_list_create",
            "Create a list on a board, either empty (name) or as a copy of id_list_source.",
            schema!(object {
                required: { "id_board": string },
                optional: { "name": string, "id_list_source": string, "pos": position }
            }),
        ),
        ToolDef::new(
            "trello_list_update",
            "Rename, reposition, archive or move a list to another board.",
            schema!(object {
                required: { "id_list": string },
                optional: {
                    "name": string,
                    "pos": position,
                    "closed": boolean,
                    "subscribed": boolean,
                    "id_board": string
                }
            }),
        ),
        ToolDef::new(
            "trello_list_archive",
            "Archive (close) a list. Its cards stay in it.",
            schema!(object {
                required: { "id_list": string }
            }),
        ),
        ToolDef::new(
            "trello_list_cards",
            "List the cards in a list, in list order. Filter: all, open, closed, none.",
            schema!(object {
                required: { "id_list": string },
                optional: { "filter": string }
            }),
        ),
        ToolDef::new(
            "trello_list_archive_all_cards",
            "Archive every card in a list. Cards can be restored individually later.",
            schema!(object {
                required: { "id_list": string }
            }),
        ),
        ToolDef::new(
            "trello_list_move_all_cards",
            "Move every card in a list to another board (and optionally a specific list there), \
             one card at a time in list order. Stops at the first failed move without undoing \
             earlier moves; the result lists moved, failed and not-attempted cards. Safe to \
             rerun: only cards still in the source list are moved. A cancelled call also \
             leaves already moved cards at the destination.",
            schema!(object {
                required: { "id_list": string, "id_board": string },
                optional: { "id_list_destination": string }
            }),
        ),
    ]
}

/// Dispatch a list tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    let up = session.upstream();

    match name {
        "trello_list_get" => {
            let id_list = get_id_arg(&args, "id_list")?;
            let data = up.get(&ResourceKind::List.path(&id_list), &Fields::new()).await?;
            Ok(ok_result(
                "get_list",
                format!("Retrieved list {}", id_list),
                data.clone(),
                json!({ "id_list": id_list, "list": list_summary(&data) }),
            ))
        }

        "trello_list_create" => {
            let id_board = get_id_arg(&args, "id_board")?;
            let list_name = get_optional_string(&args, "name")?;
            let source = get_optional_id(&args, "id_list_source")?;
            let pos = get_optional_position(&args, "pos")?;
            if list_name.is_none() && source.is_none() {
                return Err(McpError::InvalidArg {
                    name: "name".to_string(),
                    reason: "provide 'name' to create a list or 'id_list_source' to copy one"
                        .to_string(),
                });
            }

            let mut fields = Fields::new();
            if let Some(n) = &list_name {
                fields.insert("name".to_string(), n.clone());
            }
            if let Some(s) = &source {
                fields.insert("idListSource".to_string(), s.clone());
            }
            if let Some(pos) = pos {
                fields.insert("pos".to_string(), pos);
            }

            let data = up
                .create(ResourceKind::List, Some(ResourceKind::Board.of(&id_board)), &fields)
                .await?;
            Ok(ok_result(
                "create_list",
                format!(
                    "Created list '{}' on board {}",
                    list_name.as_deref().unwrap_or("(copy)"),
                    id_board
                ),
                data.clone(),
                json!({
                    "id_board": id_board,
                    "list_id": entity_id(&data),
                    "source_list_id": source,
                }),
            ))
        }

        "trello_list_update" => {
            let id_list = get_id_arg(&args, "id_list")?;
            let pos = get_optional_position(&args, "pos")?;
            get_optional_id(&args, "id_board")?;

            let mut fields = Fields::new();
            copy_optional(
                &args,
                &[
                    ("name", "name"),
                    ("closed", "closed"),
                    ("subscribed", "subscribed"),
                    ("id_board", "idBoard"),
                ],
                &mut fields,
            )?;
            if let Some(pos) = pos {
                fields.insert("pos".to_string(), pos);
            }
            if fields.is_empty() {
                return Err(McpError::InvalidArg {
                    name: "id_list".to_string(),
                    reason: "no attributes to update were given".to_string(),
                });
            }

            let updated: Vec<String> = fields.keys().cloned().collect();
            let data = up.update(ResourceKind::List, &id_list, &fields).await?;
            Ok(ok_result(
                "update_list",
                format!("Updated list {} ({})", id_list, updated.join(", ")),
                data,
                json!({ "id_list": id_list, "updated_fields": updated }),
            ))
        }

        "trello_list_archive" => {
            let id_list = get_id_arg(&args, "id_list")?;
            let data = up
                .update(ResourceKind::List, &id_list, &fields! { "closed" => true })
                .await?;
            Ok(ok_result(
                "archive_list",
                format!("Archived list {}", id_list),
                data,
                json!({ "id_list": id_list }),
            ))
        }

        "trello_list_cards" => {
            let id_list = get_id_arg(&args, "id_list")?;
            let filter = get_optional_id(&args, "filter")?;

            let cards = up
                .list(ResourceKind::Card, ResourceKind::List.of(&id_list), filter.as_deref())
                .await?;
            let summaries: Vec<JsonValue> = cards.iter().map(card_summary).collect();
            Ok(ok_result(
                "get_list_cards",
                format!("Retrieved {} cards from list {}", cards.len(), id_list),
                json!(cards),
                json!({ "id_list": id_list, "card_count": summaries.len(), "cards": summaries }),
            ))
        }

        "trello_list_archive_all_cards" => {
            let id_list = get_id_arg(&args, "id_list")?;
            let path = format!("{}/archiveAllCards", ResourceKind::List.path(&id_list));
            let data = up.send(HttpMethod::Post, &path, &Fields::new()).await?;
            Ok(ok_result(
                "archive_all_cards_in_list",
                format!("Archived all cards in list {}", id_list),
                data,
                json!({ "id_list": id_list }),
            ))
        }

        "trello_list_move_all_cards" => {
            let id_list = get_id_arg(&args, "id_list")?;
            let id_board = get_id_arg(&args, "id_board")?;
            let destination = get_optional_id(&args, "id_list_destination")?;

            let outcome =
                ops::move_all_cards(up, &id_list, &id_board, destination.as_deref()).await?;
            Ok(serde_json::to_value(outcome)?)
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
