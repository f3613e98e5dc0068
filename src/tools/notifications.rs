//! Notification tools.
//!
//! Tools: trello_notification_get, trello_notification_update,
//!        trello_notification_mark_all_read

use serde_json::{json, Map, Value as JsonValue};

use crate::convert::{get_id_arg, get_optional_bool, ok_result};
use crate::error::{McpError, Result};
use crate::fields;
use crate::schema;
use crate::session::McpSession;
use crate::tools::ToolDef;
use crate::upstream::{Fields, HttpMethod, ResourceKind};

/// Get all notification tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "trello_notification_get",
            "Get a notification by ID.",
            schema!(object {
                required: { "id_notification": string }
            }),
        ),
        ToolDef::new(
            "trello_notification_update",
            "Mark a single notification read (unread=false) or unread (unread=true).",
            schema!(object {
                required: { "id_notification": string, "unread": boolean }
            }),
        ),
        ToolDef::new(
            "trello_notification_mark_all_read",
            "Mark every notification of the authenticated member as read.",
            schema!(object {}),
        ),
    ]
}

/// Dispatch a notification tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    let up = session.upstream();

    match name {
        "trello_notification_get" => {
            let id_notification = get_id_arg(&args, "id_notification")?;
            let data = up
                .get(&ResourceKind::Notification.path(&id_notification), &Fields::new())
                .await?;
            Ok(ok_result(
                "get_notification",
                format!("Retrieved notification {}", id_notification),
                data,
                json!({ "id_notification": id_notification }),
            ))
        }

        "trello_notification_update" => {
            let id_notification = get_id_arg(&args, "id_notification")?;
            let unread = get_optional_bool(&args, "unread")?
                .ok_or_else(|| McpError::MissingArg("unread".to_string()))?;

            let data = up
                .update(
                    ResourceKind::Notification,
                    &id_notification,
                    &fields! { "unread" => unread },
                )
                .await?;
            Ok(ok_result(
                "update_notification",
                format!(
                    "Marked notification {} as {}",
                    id_notification,
                    if unread { "unread" } else { "read" }
                ),
                data,
                json!({ "id_notification": id_notification, "unread": unread }),
            ))
        }

        "trello_notification_mark_all_read" => {
            let path = format!("/{}/all/read", ResourceKind::Notification.collection());
            let data = up.send(HttpMethod::Post, &path, &Fields::new()).await?;
            Ok(ok_result(
                "mark_all_notifications_read",
                "Marked all notifications as read",
                data,
                json!({}),
            ))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
