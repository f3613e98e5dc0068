//! Webhook tools.
//!
//! Tools: trello_webhook_create, trello_webhook_get, trello_webhook_update,
//!        trello_webhook_delete

use serde_json::{json, Map, Value as JsonValue};

use crate::convert::{
    copy_optional, entity_id, get_id_arg, get_optional_bool, get_optional_id,
    get_optional_string, get_string_arg, ok_result,
};
use crate::error::{McpError, Result};
use crate::fields;
use crate::schema;
use crate::session::McpSession;
use crate::tools::ToolDef;
use crate::upstream::{Fields, ResourceKind};

/// Get all webhook tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "trello_webhook_create",
            "Create a webhook that reports changes to a model (board, list, card, member) \
             to callback_url. Trello sends a HEAD request to the URL first and only creates \
             the webhook if it answers 200.",
            schema!(object {
                required: { "callback_url": string, "id_model": string },
                optional: { "description": string }
            }),
        ),
        ToolDef::new(
            "trello_webhook_get",
            "Get a webhook by ID.",
            schema!(object {
                required: { "id_webhook": string }
            }),
        ),
        ToolDef::new(
            "trello_webhook_update",
            "Change a webhook's callback URL, watched model, description, or active flag.",
            schema!(object {
                required: { "id_webhook": string },
                optional: {
                    "callback_url": string,
                    "id_model": string,
                    "description": string,
                    "active": boolean
                }
            }),
        ),
        ToolDef::new(
            "trello_webhook_delete",
            "Delete a webhook.",
            schema!(object {
                required: { "id_webhook": string }
            }),
        ),
    ]
}

fn check_callback_url(url: &str) -> Result<()> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(McpError::InvalidArg {
            name: "callback_url".to_string(),
            reason: format!("'{}' is not an http(s) URL", url),
        })
    }
}

/// Dispatch a webhook tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    let up = session.upstream();

    match name {
        "trello_webhook_create" => {
            let callback_url = get_string_arg(&args, "callback_url")?;
            let id_model = get_id_arg(&args, "id_model")?;
            check_callback_url(&callback_url)?;

            let mut fields = fields! {
                "callbackURL" => callback_url,
                "idModel" => id_model,
            };
            copy_optional(&args, &[("description", "description")], &mut fields)?;

            let data = up.create(ResourceKind::Webhook, None, &fields).await?;
            Ok(ok_result(
                "create_webhook",
                format!(
                    "Created webhook for model {} with callback URL {}",
                    id_model, callback_url
                ),
                data.clone(),
                json!({
                    "webhook_id": entity_id(&data),
                    "id_model": id_model,
                    "callback_url": callback_url,
                }),
            ))
        }

        "trello_webhook_get" => {
            let id_webhook = get_id_arg(&args, "id_webhook")?;
            let data = up
                .get(&ResourceKind::Webhook.path(&id_webhook), &Fields::new())
                .await?;
            Ok(ok_result(
                "get_webhook",
                format!("Retrieved webhook {}", id_webhook),
                data,
                json!({ "id_webhook": id_webhook }),
            ))
        }

        "trello_webhook_update" => {
            let id_webhook = get_id_arg(&args, "id_webhook")?;
            let id_model = get_optional_id(&args, "id_model")?;
            let callback_url = get_optional_string(&args, "callback_url")?;

            let mut fields = Fields::new();
            if let Some(url) = callback_url {
                check_callback_url(&url)?;
                fields.insert("callbackURL".to_string(), url);
            }
            if let Some(id_model) = id_model {
                fields.insert("idModel".to_string(), id_model);
            }
            copy_optional(&args, &[("description", "description")], &mut fields)?;
            if let Some(active) = get_optional_bool(&args, "active")? {
                fields.insert("active".to_string(), active.to_string());
            }
            if fields.is_empty() {
                return Err(McpError::InvalidArg {
                    name: "id_webhook".to_string(),
                    reason: "no attributes to update were given".to_string(),
                });
            }

            let updated: Vec<String> = fields.keys().cloned().collect();
            let data = up.update(ResourceKind::Webhook, &id_webhook, &fields).await?;
            Ok(ok_result(
                "update_webhook",
                format!("Updated webhook {}", id_webhook),
                data,
                json!({ "id_webhook": id_webhook, "updated_fields": updated }),
            ))
        }

        "trello_webhook_delete" => {
            let id_webhook = get_id_arg(&args, "id_webhook")?;
            let data = up.delete(ResourceKind::Webhook, &id_webhook).await?;
            Ok(ok_result(
                "delete_webhook",
                format!("Deleted webhook {}", id_webhook),
                data,
                json!({ "id_webhook": id_webhook }),
            ))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
