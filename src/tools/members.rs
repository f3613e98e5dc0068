//! Member tools.
//!
//! Tools: trello_member_get, trello_member_boards, trello_member_cards,
//!        trello_member_notifications, trello_member_find_on_board

use serde_json::{json, Map, Value as JsonValue};

use crate::convert::{
    copy_optional, count, get_id_arg, get_optional_choice, get_optional_id, get_optional_u64,
    get_string_arg, member_summary, ok_result,
};
use crate::error::{McpError, Result};
use crate::ops;
use crate::schema;
use crate::session::McpSession;
use crate::tools::ToolDef;
use crate::upstream::{Fields, ResourceKind};

/// The member the API credentials belong to.
const CURRENT_MEMBER: &str = "me";

const READ_FILTERS: &[&str] = &["all", "read", "unread"];

/// Get all member tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "trello_member_get",
            "Get a member by ID or username. Defaults to the authenticated member.",
            schema!(object {
                optional: { "id_member": string }
            }),
        ),
        ToolDef::new(
            "trello_member_boards",
            "List the boards a member belongs to. Filter: all, open, closed, members, \
             organization, public, starred.",
            schema!(object {
                optional: { "id_member": string, "filter": string }
            }),
        ),
        ToolDef::new(
            "trello_member_cards",
            "List the cards a member is assigned to. Filter: all, open, closed, visible.",
            schema!(object {
                optional: { "id_member": string, "filter": string }
            }),
        ),
        ToolDef::new(
            "trello_member_notifications",
            "List a member's notifications, optionally only read or unread ones.",
            schema!(object {
                optional: { "id_member": string, "read_filter": string, "limit": integer }
            }),
        ),
        ToolDef::new(
            "trello_member_find_on_board",
            "Find a board member by email, username, or display name. An exact email match \
             wins over an exact username, which wins over a case-insensitive display-name \
             substring. Several display-name matches return the first and set ambiguous=true.",
            schema!(object {
                required: { "id_board": string, "query": string }
            }),
        ),
    ]
}

/// Dispatch a member tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    let up = session.upstream();

    match name {
        "trello_member_get" => {
            let id_member = member_arg(&args)?;
            let data = up.get(&ResourceKind::Member.path(&id_member), &Fields::new()).await?;
            Ok(ok_result(
                "get_member",
                format!("Retrieved member {}", id_member),
                data.clone(),
                json!({ "id_member": id_member, "member": member_summary(&data) }),
            ))
        }

        "trello_member_boards" | "trello_member_cards" => {
            let id_member = member_arg(&args)?;
            let filter = get_optional_id(&args, "filter")?;
            let (kind, what) = if name == "trello_member_boards" {
                (ResourceKind::Board, "boards")
            } else {
                (ResourceKind::Card, "cards")
            };

            let items = up
                .list(kind, ResourceKind::Member.of(&id_member), filter.as_deref())
                .await?;
            Ok(ok_result(
                &format!("get_member_{}", what),
                format!("Retrieved {} {} for member {}", items.len(), what, id_member),
                json!(items),
                json!({ "id_member": id_member, "count": items.len() }),
            ))
        }

        "trello_member_notifications" => {
            let id_member = member_arg(&args)?;
            let mut params = Fields::new();
            if let Some(read) = get_optional_choice(&args, "read_filter", READ_FILTERS)? {
                params.insert("read_filter".to_string(), read);
            }
            if let Some(limit) = get_optional_u64(&args, "limit")? {
                if limit == 0 || limit > 1000 {
                    return Err(McpError::InvalidArg {
                        name: "limit".to_string(),
                        reason: "must be between 1 and 1000".to_string(),
                    });
                }
                params.insert("limit".to_string(), limit.to_string());
            }
            copy_optional(&args, &[("filter", "filter")], &mut params)?;

            let path = format!("{}/notifications", ResourceKind::Member.path(&id_member));
            let data = up.get(&path, &params).await?;
            Ok(ok_result(
                "get_member_notifications",
                format!("Retrieved {} notifications for member {}", count(&data), id_member),
                data,
                json!({ "id_member": id_member }),
            ))
        }

        "trello_member_find_on_board" => {
            let id_board = get_id_arg(&args, "id_board")?;
            let query = get_string_arg(&args, "query")?;

            let found = ops::find_member(up, &id_board, &query).await?;
            Ok(serde_json::to_value(found)?)
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

fn member_arg(args: &Map<String, JsonValue>) -> Result<String> {
    Ok(get_optional_id(args, "id_member")?.unwrap_or_else(|| CURRENT_MEMBER.to_string()))
}
