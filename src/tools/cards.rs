//! Card tools.
//!
//! Tools: trello_card_get, trello_card_create, trello_card_update, trello_card_move,
//!        trello_card_archive, trello_card_delete, trello_card_comment,
//!        trello_card_add_label, trello_card_remove_label, trello_card_add_member,
//!        trello_card_remove_member, trello_card_checklists, trello_card_actions,
//!        trello_card_attachments, trello_card_attachment_add, trello_card_stickers,
//!        trello_card_add_sticker, trello_card_delete_sticker

use serde_json::{json, Map, Value as JsonValue};

use crate::convert::{
    card_summary, checklist_summary, copy_optional, count, entity_id, get_id_arg,
    get_optional_id, get_optional_position, get_optional_string, get_string_arg, ok_result,
    str_field,
};
use crate::error::{McpError, Result};
use crate::fields;
use crate::schema;
use crate::session::McpSession;
use crate::tools::ToolDef;
use crate::upstream::{Fields, HttpMethod, ResourceKind};

/// Get all card tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "trello_card_get",
            "Get a card by ID, optionally restricted to a comma-separated 'fields' list.",
            schema!(object {
                required: { "id_card": string },
                optional: { "fields": string }
            }),
        ),
        ToolDef::new(
            "trello_card_create",
            "Create a card in a list. Members and labels are comma-separated IDs. \
             Use id_card_source to copy an existing card.",
            schema!(object {
                required: { "id_list": string },
                optional: {
                    "name": string,
                    "desc": string,
                    "due": string,
                    "pos": position,
                    "id_members": string,
                    "id_labels": string,
                    "id_card_source": string,
                    "keep_from_source": string,
                    "url_source": string
                }
            }),
        ),
        ToolDef::new(
            "trello_card_update",
            "Update card attributes: name, description, due date, due completion, \
             position, archived state.",
            schema!(object {
                required: { "id_card": string },
                optional: {
                    "name": string,
                    "desc": string,
                    "due": string,
                    "due_complete": boolean,
                    "pos": position,
                    "closed": boolean,
                    "subscribed": boolean
                }
            }),
        ),
        ToolDef::new(
            "trello_card_move",
            "Move a card to another list, and optionally to another board.",
            schema!(object {
                required: { "id_card": string, "id_list": string },
                optional: { "id_board": string, "pos": position }
            }),
        ),
        ToolDef::new(
            "trello_card_archive",
            "Archive (close) a card. It can be restored with trello_card_update closed=false.",
            schema!(object {
                required: { "id_card": string }
            }),
        ),
        ToolDef::new(
            "trello_card_delete",
            "Permanently delete a card. This cannot be undone; prefer trello_card_archive.",
            schema!(object {
                required: { "id_card": string }
            }),
        ),
        ToolDef::new(
            "trello_card_comment",
            "Add a text comment to a card. @mentions are supported; attachments are not.",
            schema!(object {
                required: { "id_card": string, "text": string }
            }),
        ),
        ToolDef::new(
            "trello_card_add_label",
            "Apply an existing board label to a card.",
            schema!(object {
                required: { "id_card": string, "id_label": string }
            }),
        ),
        ToolDef::new(
            "trello_card_remove_label",
            "Remove a label from a card. The label itself stays on the board.",
            schema!(object {
                required: { "id_card": string, "id_label": string }
            }),
        ),
        ToolDef::new(
            "trello_card_add_member",
            "Assign a board member to a card.",
            schema!(object {
                required: { "id_card": string, "id_member": string }
            }),
        ),
        ToolDef::new(
            "trello_card_remove_member",
            "Unassign a member from a card.",
            schema!(object {
                required: { "id_card": string, "id_member": string }
            }),
        ),
        ToolDef::new(
            "trello_card_checklists",
            "List the checklists on a card, including their items.",
            schema!(object {
                required: { "id_card": string }
            }),
        ),
        ToolDef::new(
            "trello_card_actions",
            "List activity on a card, optionally filtered by action type (e.g. 'commentCard').",
            schema!(object {
                required: { "id_card": string },
                optional: { "filter": string }
            }),
        ),
        ToolDef::new(
            "trello_card_attachments",
            "List the attachments of a card.",
            schema!(object {
                required: { "id_card": string }
            }),
        ),
        ToolDef::new(
            "trello_card_attachment_add",
            "Attach a link ('url') or a local file ('file', relative to the server's BASE_PATH) \
             to a card. Exactly one of url or file is required.",
            schema!(object {
                required: { "id_card": string },
                optional: { "url": string, "file": string, "name": string, "mime_type": string }
            }),
        ),
        ToolDef::new(
            "trello_card_stickers",
            "List the stickers on a card.",
            schema!(object {
                required: { "id_card": string }
            }),
        ),
        ToolDef::new(
            "trello_card_add_sticker",
            "Put a sticker on a card. image is a built-in sticker name (e.g. 'taco-cool') or a \
             custom sticker ID. left and top are percentages of the card, rotate is in degrees.",
            schema!(object {
                required: { "id_card": string, "image": string },
                optional: { "left": number, "top": number, "rotate": number, "z_index": integer }
            }),
        ),
        ToolDef::new(
            "trello_card_delete_sticker",
            "Remove a sticker from a card.",
            schema!(object {
                required: { "id_card": string, "id_sticker": string }
            }),
        ),
    ]
}

/// Dispatch a card tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    let up = session.upstream();

    match name {
        "trello_card_get" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let mut params = Fields::new();
            copy_optional(&args, &[("fields", "fields")], &mut params)?;

            let data = up.get(&ResourceKind::Card.path(&id_card), &params).await?;
            Ok(ok_result(
                "get_card",
                format!("Retrieved card {}", id_card),
                data,
                json!({ "id_card": id_card }),
            ))
        }

        "trello_card_create" => {
            let id_list = get_id_arg(&args, "id_list")?;
            let pos = get_optional_position(&args, "pos")?;
            get_optional_id(&args, "id_card_source")?;

            let mut fields = fields! { "idList" => id_list };
            copy_optional(
                &args,
                &[
                    ("name", "name"),
                    ("desc", "desc"),
                    ("due", "due"),
                    ("id_members", "idMembers"),
                    ("id_labels", "idLabels"),
                    ("id_card_source", "idCardSource"),
                    ("keep_from_source", "keepFromSource"),
                    ("url_source", "urlSource"),
                ],
                &mut fields,
            )?;
            if let Some(pos) = pos {
                fields.insert("pos".to_string(), pos);
            }

            let data = up.create(ResourceKind::Card, None, &fields).await?;
            Ok(ok_result(
                "create_card",
                format!("Created card in list {}", id_list),
                data.clone(),
                json!({
                    "id_list": id_list,
                    "card_id": entity_id(&data),
                    "card": card_summary(&data),
                }),
            ))
        }

        "trello_card_update" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let pos = get_optional_position(&args, "pos")?;

            let mut fields = Fields::new();
            copy_optional(
                &args,
                &[
                    ("name", "name"),
                    ("desc", "desc"),
                    ("due", "due"),
                    ("due_complete", "dueComplete"),
                    ("closed", "closed"),
                    ("subscribed", "subscribed"),
                ],
                &mut fields,
            )?;
            if let Some(pos) = pos {
                fields.insert("pos".to_string(), pos);
            }
            if fields.is_empty() {
                return Err(McpError::InvalidArg {
                    name: "id_card".to_string(),
                    reason: "no attributes to update were given".to_string(),
                });
            }

            let updated: Vec<String> = fields.keys().cloned().collect();
            let data = up.update(ResourceKind::Card, &id_card, &fields).await?;
            Ok(ok_result(
                "update_card",
                format!("Updated card {} ({})", id_card, updated.join(", ")),
                data,
                json!({ "id_card": id_card, "updated_fields": updated }),
            ))
        }

        "trello_card_move" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let id_list = get_id_arg(&args, "id_list")?;
            let id_board = get_optional_id(&args, "id_board")?;
            let pos = get_optional_position(&args, "pos")?;

            let mut fields = fields! { "idList" => id_list };
            if let Some(id_board) = &id_board {
                fields.insert("idBoard".to_string(), id_board.clone());
            }
            if let Some(pos) = pos {
                fields.insert("pos".to_string(), pos);
            }

            let data = up.update(ResourceKind::Card, &id_card, &fields).await?;
            Ok(ok_result(
                "move_card",
                format!("Moved card {} to list {}", id_card, id_list),
                data.clone(),
                json!({
                    "id_card": id_card,
                    "destination_list_id": id_list,
                    "destination_board_id": id_board,
                    "card": card_summary(&data),
                }),
            ))
        }

        "trello_card_archive" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let data = up
                .update(ResourceKind::Card, &id_card, &fields! { "closed" => true })
                .await?;
            Ok(ok_result(
                "archive_card",
                format!("Archived card {}", id_card),
                data,
                json!({ "id_card": id_card }),
            ))
        }

        "trello_card_delete" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let data = up.delete(ResourceKind::Card, &id_card).await?;
            Ok(ok_result(
                "delete_card",
                format!("Deleted card {}", id_card),
                data,
                json!({ "id_card": id_card }),
            ))
        }

        "trello_card_comment" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let text = get_string_arg(&args, "text")?;

            let path = format!("{}/actions/comments", ResourceKind::Card.path(&id_card));
            let data = up
                .send(HttpMethod::Post, &path, &fields! { "text" => text })
                .await?;
            Ok(ok_result(
                "comment_card",
                format!("Added comment to card {}", id_card),
                data.clone(),
                json!({ "id_card": id_card, "id_action": entity_id(&data) }),
            ))
        }

        "trello_card_add_label" | "trello_card_remove_label" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let id_label = get_id_arg(&args, "id_label")?;

            let base = format!("{}/idLabels", ResourceKind::Card.path(&id_card));
            let (data, action, message) = if name == "trello_card_add_label" {
                let data = up
                    .send(HttpMethod::Post, &base, &fields! { "value" => id_label })
                    .await?;
                (data, "add_label_to_card", format!("Added label {} to card {}", id_label, id_card))
            } else {
                let path = format!("{}/{}", base, id_label);
                let data = up.send(HttpMethod::Delete, &path, &Fields::new()).await?;
                (
                    data,
                    "remove_label_from_card",
                    format!("Removed label {} from card {}", id_label, id_card),
                )
            };
            Ok(ok_result(
                action,
                message,
                data,
                json!({ "id_card": id_card, "id_label": id_label }),
            ))
        }

        "trello_card_add_member" | "trello_card_remove_member" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let id_member = get_id_arg(&args, "id_member")?;

            let base = format!("{}/idMembers", ResourceKind::Card.path(&id_card));
            let (data, action, message) = if name == "trello_card_add_member" {
                let data = up
                    .send(HttpMethod::Post, &base, &fields! { "value" => id_member })
                    .await?;
                (
                    data,
                    "add_member_to_card",
                    format!("Assigned member {} to card {}", id_member, id_card),
                )
            } else {
                let path = format!("{}/{}", base, id_member);
                let data = up.send(HttpMethod::Delete, &path, &Fields::new()).await?;
                (
                    data,
                    "remove_member_from_card",
                    format!("Unassigned member {} from card {}", id_member, id_card),
                )
            };
            Ok(ok_result(
                action,
                message,
                data,
                json!({ "id_card": id_card, "id_member": id_member }),
            ))
        }

        "trello_card_checklists" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let checklists = up
                .list(ResourceKind::Checklist, ResourceKind::Card.of(&id_card), None)
                .await?;
            let summaries: Vec<JsonValue> = checklists.iter().map(checklist_summary).collect();
            Ok(ok_result(
                "get_card_checklists",
                format!("Retrieved {} checklists from card {}", checklists.len(), id_card),
                json!(checklists),
                json!({ "id_card": id_card, "checklists": summaries }),
            ))
        }

        "trello_card_actions" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let mut params = Fields::new();
            copy_optional(&args, &[("filter", "filter")], &mut params)?;

            let path = format!("{}/actions", ResourceKind::Card.path(&id_card));
            let data = up.get(&path, &params).await?;
            Ok(ok_result(
                "get_card_actions",
                format!("Retrieved {} actions from card {}", count(&data), id_card),
                data,
                json!({ "id_card": id_card }),
            ))
        }

        "trello_card_attachments" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let path = format!("{}/attachments", ResourceKind::Card.path(&id_card));
            let data = up.get(&path, &Fields::new()).await?;
            Ok(ok_result(
                "get_card_attachments",
                format!("Retrieved {} attachments from card {}", count(&data), id_card),
                data,
                json!({ "id_card": id_card }),
            ))
        }

        "trello_card_attachment_add" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let url = get_optional_string(&args, "url")?;
            let file = get_optional_string(&args, "file")?;

            let mut fields = Fields::new();
            copy_optional(&args, &[("name", "name"), ("mime_type", "mimeType")], &mut fields)?;
            let path = format!("{}/attachments", ResourceKind::Card.path(&id_card));

            let data = match (url, file) {
                (Some(url), None) => {
                    fields.insert("url".to_string(), url);
                    up.send(HttpMethod::Post, &path, &fields).await?
                }
                (None, Some(file)) => {
                    let local = session.resolve_local_file(&file)?;
                    if !local.is_file() {
                        return Err(McpError::InvalidArg {
                            name: "file".to_string(),
                            reason: format!("'{}' does not exist under BASE_PATH", file),
                        });
                    }
                    up.upload(&path, &fields, &local).await?
                }
                _ => {
                    return Err(McpError::InvalidArg {
                        name: "url".to_string(),
                        reason: "provide exactly one of 'url' or 'file'".to_string(),
                    })
                }
            };
            Ok(ok_result(
                "add_attachment_to_card",
                format!(
                    "Attached {} to card {}",
                    str_field(&data, "name").unwrap_or("attachment"),
                    id_card
                ),
                data.clone(),
                json!({ "id_card": id_card, "id_attachment": entity_id(&data) }),
            ))
        }

        "trello_card_stickers" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let stickers = up
                .list(ResourceKind::Sticker, ResourceKind::Card.of(&id_card), None)
                .await?;
            Ok(ok_result(
                "get_card_stickers",
                format!("Retrieved {} stickers from card {}", stickers.len(), id_card),
                json!(stickers),
                json!({ "id_card": id_card }),
            ))
        }

        "trello_card_add_sticker" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let image = get_string_arg(&args, "image")?;

            let mut fields = fields! { "image" => image };
            copy_optional(
                &args,
                &[("left", "left"), ("top", "top"), ("rotate", "rotate"), ("z_index", "zIndex")],
                &mut fields,
            )?;
            // Trello rejects a sticker without a position
            for (field, default) in [("left", "0"), ("top", "0"), ("zIndex", "1")] {
                fields.entry(field.to_string()).or_insert_with(|| default.to_string());
            }

            let data = up
                .create(ResourceKind::Sticker, Some(ResourceKind::Card.of(&id_card)), &fields)
                .await?;
            Ok(ok_result(
                "add_sticker_to_card",
                format!("Added sticker '{}' to card {}", image, id_card),
                data.clone(),
                json!({ "id_card": id_card, "id_sticker": entity_id(&data), "image": image }),
            ))
        }

        "trello_card_delete_sticker" => {
            let id_card = get_id_arg(&args, "id_card")?;
            let id_sticker = get_id_arg(&args, "id_sticker")?;
            let path = format!("{}/stickers/{}", ResourceKind::Card.path(&id_card), id_sticker);
            let data = up.send(HttpMethod::Delete, &path, &Fields::new()).await?;
            Ok(ok_result(
                "delete_sticker_from_card",
                format!("Removed sticker {} from card {}", id_sticker, id_card),
                data,
                json!({ "id_card": id_card, "id_sticker": id_sticker }),
            ))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
