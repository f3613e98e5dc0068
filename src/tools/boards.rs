//! Board tools.
//!
//! Tools: trello_board_get, trello_board_create, trello_board_update, trello_board_lists,
//!        trello_board_cards, trello_board_labels, trello_board_members,
//!        trello_board_members_invited, trello_board_checklists, trello_board_actions,
//!        trello_board_mark_viewed, trello_board_generate_email_key

use serde_json::{json, Map, Value as JsonValue};

use crate::convert::{
    copy_optional, count, entity_id, get_id_arg, get_optional_choice, get_optional_id,
    get_optional_u64, get_string_arg, list_summary, ok_result,
};
use crate::error::{McpError, Result};
use crate::schema;
use crate::session::McpSession;
use crate::tools::ToolDef;
use crate::upstream::{Fields, HttpMethod, ResourceKind};

const PERMISSION_LEVELS: &[&str] = &["private", "org", "public"];
const COMMENT_POLICIES: &[&str] = &["disabled", "members", "observers", "org", "public"];
const INVITATION_POLICIES: &[&str] = &["members", "admins"];
const CARD_AGING: &[&str] = &["regular", "pirate"];

/// Get all board tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "trello_board_get",
            "Get a board by ID. Optionally restrict the returned fields with a \
             comma-separated 'fields' list.",
            schema!(object {
                required: { "id_board": string },
                optional: { "fields": string }
            }),
        ),
        ToolDef::new(
            "trello_board_create",
            "Create a new board. Set default_lists=false to start without the To Do/Doing/Done \
             lists, or copy an existing board with id_board_source.",
            schema!(object {
                required: { "name": string },
                optional: {
                    "desc": string,
                    "id_organization": string,
                    "id_board_source": string,
                    "default_lists": boolean,
                    "permission_level": string
                }
            }),
        ),
        ToolDef::new(
            "trello_board_update",
            "Update board attributes and preferences: name, description, archived state, \
             permission level (private/org/public), comment, voting and invitation policy, \
             background and card aging mode (regular/pirate).",
            schema!(object {
                required: { "id_board": string },
                optional: {
                    "name": string,
                    "desc": string,
                    "closed": boolean,
                    "subscribed": boolean,
                    "permission_level": string,
                    "comments": string,
                    "voting": string,
                    "invitations": string,
                    "background": string,
                    "card_aging": string
                }
            }),
        ),
        ToolDef::new(
            "trello_board_lists",
            "List the lists on a board. Filter: all, open, closed, none.",
            schema!(object {
                required: { "id_board": string },
                optional: { "filter": string }
            }),
        ),
        ToolDef::new(
            "trello_board_cards",
            "List the cards on a board. Filter: all, open, closed, visible, none.",
            schema!(object {
                required: { "id_board": string },
                optional: { "filter": string }
            }),
        ),
        ToolDef::new(
            "trello_board_labels",
            "List the labels defined on a board.",
            schema!(object {
                required: { "id_board": string }
            }),
        ),
        ToolDef::new(
            "trello_board_members",
            "List the members of a board.",
            schema!(object {
                required: { "id_board": string }
            }),
        ),
        ToolDef::new(
            "trello_board_members_invited",
            "List board members for invitation follow-up. Trello does not expose pending \
             invitations: invitees only appear once they have joined, so this returns the \
             current members and says so.",
            schema!(object {
                required: { "id_board": string }
            }),
        ),
        ToolDef::new(
            "trello_board_checklists",
            "List every checklist on a board, across all of its cards.",
            schema!(object {
                required: { "id_board": string }
            }),
        ),
        ToolDef::new(
            "trello_board_actions",
            "List recent activity (actions) on a board, optionally filtered by action type \
             (e.g. 'commentCard,createCard') and limited in count.",
            schema!(object {
                required: { "id_board": string },
                optional: { "filter": string, "limit": integer }
            }),
        ),
        ToolDef::new(
            "trello_board_mark_viewed",
            "Mark a board as viewed by the current member.",
            schema!(object {
                required: { "id_board": string }
            }),
        ),
        ToolDef::new(
            "trello_board_generate_email_key",
            "Generate a new email-to-board key. Invalidates the previous key.",
            schema!(object {
                required: { "id_board": string }
            }),
        ),
    ]
}

/// Dispatch a board tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    let up = session.upstream();

    match name {
        "trello_board_get" => {
            let id_board = get_id_arg(&args, "id_board")?;
            let mut params = Fields::new();
            copy_optional(&args, &[("fields", "fields")], &mut params)?;

            let data = up.get(&ResourceKind::Board.path(&id_board), &params).await?;
            Ok(ok_result(
                "get_board",
                format!("Retrieved board {}", id_board),
                data,
                json!({ "id_board": id_board }),
            ))
        }

        "trello_board_create" => {
            let board_name = get_string_arg(&args, "name")?;
            let permission = get_optional_choice(&args, "permission_level", PERMISSION_LEVELS)?;

            let mut fields = Fields::new();
            fields.insert("name".to_string(), board_name.clone());
            copy_optional(
                &args,
                &[
                    ("desc", "desc"),
                    ("id_organization", "idOrganization"),
                    ("id_board_source", "idBoardSource"),
                    ("default_lists", "defaultLists"),
                ],
                &mut fields,
            )?;
            if let Some(level) = permission {
                fields.insert("prefs_permissionLevel".to_string(), level);
            }

            let data = up.create(ResourceKind::Board, None, &fields).await?;
            let id_board = entity_id(&data).map(str::to_string);
            Ok(ok_result(
                "create_board",
                format!("Created board '{}'", board_name),
                data,
                json!({ "id_board": id_board, "board_name": board_name }),
            ))
        }

        "trello_board_update" => {
            let id_board = get_id_arg(&args, "id_board")?;

            let mut fields = Fields::new();
            copy_optional(
                &args,
                &[
                    ("name", "name"),
                    ("desc", "desc"),
                    ("closed", "closed"),
                    ("subscribed", "subscribed"),
                    ("background", "prefs/background"),
                ],
                &mut fields,
            )?;
            let prefs = [
                ("permission_level", "prefs/permissionLevel", PERMISSION_LEVELS),
                ("comments", "prefs/comments", COMMENT_POLICIES),
                ("voting", "prefs/voting", COMMENT_POLICIES),
                ("invitations", "prefs/invitations", INVITATION_POLICIES),
                ("card_aging", "prefs/cardAging", CARD_AGING),
            ];
            for (arg, field, allowed) in prefs {
                if let Some(value) = get_optional_choice(&args, arg, allowed)? {
                    fields.insert(field.to_string(), value);
                }
            }
            if fields.is_empty() {
                return Err(McpError::InvalidArg {
                    name: "id_board".to_string(),
                    reason: "no attributes to update were given".to_string(),
                });
            }

            let updated: Vec<String> = fields.keys().cloned().collect();
            let data = up.update(ResourceKind::Board, &id_board, &fields).await?;
            Ok(ok_result(
                "update_board",
                format!("Updated board {} ({})", id_board, updated.join(", ")),
                data,
                json!({ "id_board": id_board, "updated_fields": updated }),
            ))
        }

        "trello_board_lists" => {
            let id_board = get_id_arg(&args, "id_board")?;
            let filter = get_optional_id(&args, "filter")?;

            let lists = up
                .list(ResourceKind::List, ResourceKind::Board.of(&id_board), filter.as_deref())
                .await?;
            let summaries: Vec<JsonValue> = lists.iter().map(list_summary).collect();
            Ok(ok_result(
                "get_board_lists",
                format!("Retrieved {} lists from board {}", lists.len(), id_board),
                JsonValue::Array(lists),
                json!({ "id_board": id_board, "lists": summaries }),
            ))
        }

        "trello_board_cards" => {
            let id_board = get_id_arg(&args, "id_board")?;
            let filter = get_optional_id(&args, "filter")?;

            let cards = up
                .list(ResourceKind::Card, ResourceKind::Board.of(&id_board), filter.as_deref())
                .await?;
            Ok(ok_result(
                "get_board_cards",
                format!("Retrieved {} cards from board {}", cards.len(), id_board),
                json!(cards),
                json!({ "id_board": id_board, "card_count": cards.len() }),
            ))
        }

        "trello_board_labels" | "trello_board_members" | "trello_board_checklists" => {
            let id_board = get_id_arg(&args, "id_board")?;
            let (kind, what) = match name {
                "trello_board_labels" => (ResourceKind::Label, "labels"),
                "trello_board_members" => (ResourceKind::Member, "members"),
                _ => (ResourceKind::Checklist, "checklists"),
            };

            let items = up.list(kind, ResourceKind::Board.of(&id_board), None).await?;
            Ok(ok_result(
                &format!("get_board_{}", what),
                format!("Retrieved {} {} from board {}", items.len(), what, id_board),
                json!(items),
                json!({ "id_board": id_board, "count": items.len() }),
            ))
        }

        "trello_board_members_invited" => {
            let id_board = get_id_arg(&args, "id_board")?;

            let members = up
                .list(ResourceKind::Member, ResourceKind::Board.of(&id_board), None)
                .await?;
            Ok(ok_result(
                "get_board_invited_members",
                format!(
                    "Retrieved {} current members of board {}; pending invitations are not visible through the API",
                    members.len(),
                    id_board
                ),
                json!(members),
                json!({
                    "id_board": id_board,
                    "member_count": members.len(),
                    "note": "Invited people only appear once they accept the invitation and join the board.",
                }),
            ))
        }

        "trello_board_actions" => {
            let id_board = get_id_arg(&args, "id_board")?;
            let mut params = Fields::new();
            copy_optional(&args, &[("filter", "filter")], &mut params)?;
            if let Some(limit) = get_optional_u64(&args, "limit")? {
                if limit == 0 || limit > 1000 {
                    return Err(McpError::InvalidArg {
                        name: "limit".to_string(),
                        reason: "must be between 1 and 1000".to_string(),
                    });
                }
                params.insert("limit".to_string(), limit.to_string());
            }

            let path = format!("{}/actions", ResourceKind::Board.path(&id_board));
            let data = up.get(&path, &params).await?;
            Ok(ok_result(
                "get_board_actions",
                format!("Retrieved {} actions from board {}", count(&data), id_board),
                data,
                json!({ "id_board": id_board }),
            ))
        }

        "trello_board_mark_viewed" | "trello_board_generate_email_key" => {
            let id_board = get_id_arg(&args, "id_board")?;
            let (suffix, action, message) = if name == "trello_board_mark_viewed" {
                (
                    "markAsViewed",
                    "mark_board_viewed",
                    format!("Marked board {} as viewed", id_board),
                )
            } else {
                (
                    "emailKey/generate",
                    "generate_email_key",
                    format!("Generated a new email key for board {}", id_board),
                )
            };

            let path = format!("{}/{}", ResourceKind::Board.path(&id_board), suffix);
            let data = up.send(HttpMethod::Post, &path, &Fields::new()).await?;
            Ok(ok_result(action, message, data, json!({ "id_board": id_board })))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
