//! Integration tests for the MCP tools.

mod common;

use std::collections::HashSet;

use serde_json::{json, Value as JsonValue};
use trello_mcp::{HttpMethod, McpError, ToolRegistry};

use common::{call_tool, call_tool_err, rejected, session, MockUpstream};

// =============================================================================
// Registry
// =============================================================================

#[test]
fn test_tool_names_are_unique_and_prefixed() {
    let registry = ToolRegistry::new();
    let mut seen = HashSet::new();
    for tool in registry.tools() {
        assert!(tool.name.starts_with("trello_"), "bad prefix: {}", tool.name);
        assert!(seen.insert(tool.name.clone()), "duplicate tool: {}", tool.name);
        assert!(!tool.description.is_empty());
    }
    assert!(registry.tools().len() >= 50);
}

#[test]
fn test_compound_tools_registered() {
    let registry = ToolRegistry::new();
    let names: Vec<&str> = registry.tools().iter().map(|t| t.name.as_str()).collect();
    for expected in [
        "trello_checklist_create_on_board",
        "trello_list_move_all_cards",
        "trello_member_find_on_board",
        "trello_batch_get",
    ] {
        assert!(names.contains(&expected), "missing {}", expected);
    }
}

#[tokio::test]
async fn test_unknown_tool() {
    let up = MockUpstream::empty();
    let err = call_tool_err(&session(&up), "trello_card_nope", json!({})).await;
    assert!(matches!(err, McpError::UnknownTool(_)));

    let err = call_tool_err(&session(&up), "jira_issue_get", json!({})).await;
    assert!(matches!(err, McpError::UnknownTool(_)));
    assert!(up.calls().is_empty());
}

#[tokio::test]
async fn test_missing_required_arg_makes_no_call() {
    let up = MockUpstream::empty();
    let err = call_tool_err(&session(&up), "trello_card_get", json!({})).await;
    assert!(matches!(err, McpError::MissingArg(ref n) if n == "id_card"));
    assert!(up.calls().is_empty());
}

#[tokio::test]
async fn test_id_with_path_separator_rejected() {
    let up = MockUpstream::empty();
    let err = call_tool_err(
        &session(&up),
        "trello_card_delete",
        json!({"id_card": "abc/../../boards/x"}),
    )
    .await;
    assert!(matches!(err, McpError::InvalidArg { .. }));
    assert!(up.calls().is_empty());
}

// =============================================================================
// Board Tools
// =============================================================================

#[tokio::test]
async fn test_board_get() {
    let up = MockUpstream::new(|_, _, _| Ok(json!({"id": "b1", "name": "Roadmap"})));
    let result = call_tool(
        &session(&up),
        "trello_board_get",
        json!({"id_board": "b1", "fields": "name,desc"}),
    )
    .await;

    assert_eq!(result["success"], true);
    assert_eq!(result["data"]["name"], "Roadmap");
    let call = up.last();
    assert_eq!(call.method, HttpMethod::Get);
    assert_eq!(call.path, "/boards/b1");
    assert_eq!(call.fields["fields"], "name,desc");
}

#[tokio::test]
async fn test_board_create() {
    let up = MockUpstream::new(|_, _, _| Ok(json!({"id": "b9", "name": "Launch"})));
    let result = call_tool(
        &session(&up),
        "trello_board_create",
        json!({"name": "Launch", "default_lists": false, "permission_level": "org"}),
    )
    .await;

    assert_eq!(result["id_board"], "b9");
    let call = up.last();
    assert_eq!(call.method, HttpMethod::Post);
    assert_eq!(call.path, "/boards");
    assert_eq!(call.fields["defaultLists"], "false");
    assert_eq!(call.fields["prefs_permissionLevel"], "org");
}

#[tokio::test]
async fn test_board_update_rejects_bad_pref() {
    let up = MockUpstream::empty();
    let err = call_tool_err(
        &session(&up),
        "trello_board_update",
        json!({"id_board": "b1", "card_aging": "ancient"}),
    )
    .await;
    assert!(matches!(err, McpError::InvalidArg { ref name, .. } if name == "card_aging"));
}

#[tokio::test]
async fn test_board_update_needs_a_field() {
    let up = MockUpstream::empty();
    let err = call_tool_err(&session(&up), "trello_board_update", json!({"id_board": "b1"})).await;
    assert!(matches!(err, McpError::InvalidArg { .. }));
}

#[tokio::test]
async fn test_board_lists_with_filter() {
    let up = MockUpstream::new(|_, _, _| {
        Ok(json!([
            {"id": "l1", "name": "To Do", "closed": false, "idBoard": "b1"},
            {"id": "l2", "name": "Done", "closed": false, "idBoard": "b1"}
        ]))
    });
    let result = call_tool(
        &session(&up),
        "trello_board_lists",
        json!({"id_board": "b1", "filter": "open"}),
    )
    .await;

    assert_eq!(up.last().path, "/boards/b1/lists/open");
    assert_eq!(result["lists"][1]["name"], "Done");
    assert_eq!(result["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_board_members_invited_returns_current_members() {
    let up = MockUpstream::new(|_, _, _| Ok(json!([{"id": "m1"}])));
    let result = call_tool(
        &session(&up),
        "trello_board_members_invited",
        json!({"id_board": "b1"}),
    )
    .await;

    assert_eq!(up.last().path, "/boards/b1/members");
    assert_eq!(result["member_count"], 1);
    assert!(result["note"].as_str().unwrap().contains("accept"));
}

#[tokio::test]
async fn test_board_actions_limit_bounds() {
    let up = MockUpstream::new(|_, _, _| Ok(json!([])));
    let err = call_tool_err(
        &session(&up),
        "trello_board_actions",
        json!({"id_board": "b1", "limit": 5000}),
    )
    .await;
    assert!(matches!(err, McpError::InvalidArg { .. }));

    call_tool(
        &session(&up),
        "trello_board_actions",
        json!({"id_board": "b1", "limit": 20, "filter": "commentCard"}),
    )
    .await;
    let call = up.last();
    assert_eq!(call.path, "/boards/b1/actions");
    assert_eq!(call.fields["limit"], "20");
    assert_eq!(call.fields["filter"], "commentCard");
}

#[tokio::test]
async fn test_board_generate_email_key() {
    let up = MockUpstream::empty();
    call_tool(&session(&up), "trello_board_generate_email_key", json!({"id_board": "b1"})).await;
    let call = up.last();
    assert_eq!(call.method, HttpMethod::Post);
    assert_eq!(call.path, "/boards/b1/emailKey/generate");
}

// =============================================================================
// Card Tools
// =============================================================================

#[tokio::test]
async fn test_card_create() {
    let up = MockUpstream::new(|_, _, fields| {
        Ok(json!({"id": "c1", "name": fields["name"], "idList": fields["idList"], "idBoard": "b1"}))
    });
    let result = call_tool(
        &session(&up),
        "trello_card_create",
        json!({"id_list": "l1", "name": "Write docs", "pos": "top", "id_labels": "a,b"}),
    )
    .await;

    assert_eq!(result["card_id"], "c1");
    assert_eq!(result["card"]["id_board"], "b1");
    let call = up.last();
    assert_eq!(call.path, "/cards");
    assert_eq!(call.fields["pos"], "top");
    assert_eq!(call.fields["idLabels"], "a,b");
}

#[tokio::test]
async fn test_card_create_bad_position() {
    let up = MockUpstream::empty();
    let err = call_tool_err(
        &session(&up),
        "trello_card_create",
        json!({"id_list": "l1", "pos": "middle"}),
    )
    .await;
    assert!(matches!(err, McpError::InvalidArg { ref name, .. } if name == "pos"));
}

#[tokio::test]
async fn test_card_update_and_archive() {
    let up = MockUpstream::empty();
    let s = session(&up);

    let result = call_tool(
        &s,
        "trello_card_update",
        json!({"id_card": "c1", "due_complete": true, "desc": "updated"}),
    )
    .await;
    assert_eq!(result["updated_fields"], json!(["desc", "dueComplete"]));
    assert_eq!(up.last().method, HttpMethod::Put);

    call_tool(&s, "trello_card_archive", json!({"id_card": "c1"})).await;
    let call = up.last();
    assert_eq!(call.path, "/cards/c1");
    assert_eq!(call.fields["closed"], "true");
}

#[tokio::test]
async fn test_card_move_across_boards() {
    let up = MockUpstream::new(|_, _, _| Ok(json!({"id": "c1", "idList": "l9", "idBoard": "b2"})));
    let result = call_tool(
        &session(&up),
        "trello_card_move",
        json!({"id_card": "c1", "id_list": "l9", "id_board": "b2"}),
    )
    .await;

    assert_eq!(result["destination_board_id"], "b2");
    let call = up.last();
    assert_eq!(call.fields["idList"], "l9");
    assert_eq!(call.fields["idBoard"], "b2");
}

#[tokio::test]
async fn test_card_comment() {
    let up = MockUpstream::new(|_, _, _| Ok(json!({"id": "a1", "type": "commentCard"})));
    let result = call_tool(
        &session(&up),
        "trello_card_comment",
        json!({"id_card": "c1", "text": "@alice looks good"}),
    )
    .await;

    assert_eq!(result["id_action"], "a1");
    let call = up.last();
    assert_eq!(call.path, "/cards/c1/actions/comments");
    assert_eq!(call.fields["text"], "@alice looks good");
}

#[tokio::test]
async fn test_card_label_add_remove() {
    let up = MockUpstream::empty();
    let s = session(&up);

    call_tool(&s, "trello_card_add_label", json!({"id_card": "c1", "id_label": "lb1"})).await;
    let call = up.last();
    assert_eq!((call.method, call.path.as_str()), (HttpMethod::Post, "/cards/c1/idLabels"));
    assert_eq!(call.fields["value"], "lb1");

    call_tool(&s, "trello_card_remove_label", json!({"id_card": "c1", "id_label": "lb1"})).await;
    let call = up.last();
    assert_eq!((call.method, call.path.as_str()), (HttpMethod::Delete, "/cards/c1/idLabels/lb1"));
}

#[tokio::test]
async fn test_card_member_add_remove() {
    let up = MockUpstream::empty();
    let s = session(&up);

    call_tool(&s, "trello_card_add_member", json!({"id_card": "c1", "id_member": "m1"})).await;
    assert_eq!(up.last().path, "/cards/c1/idMembers");

    call_tool(&s, "trello_card_remove_member", json!({"id_card": "c1", "id_member": "m1"})).await;
    assert_eq!(up.last().path, "/cards/c1/idMembers/m1");
}

#[tokio::test]
async fn test_card_delete_upstream_failure() {
    let up = MockUpstream::new(|_, _, _| Err(rejected(404)));
    let err = call_tool_err(&session(&up), "trello_card_delete", json!({"id_card": "c1"})).await;
    assert!(matches!(err, McpError::Upstream { status: Some(404), .. }));
    assert_eq!(err.to_tool_result()["error"]["code"], "UPSTREAM_REQUEST_FAILED");
}

#[tokio::test]
async fn test_card_attachment_by_url() {
    let up = MockUpstream::new(|_, _, _| Ok(json!({"id": "at1", "name": "brief"})));
    let result = call_tool(
        &session(&up),
        "trello_card_attachment_add",
        json!({"id_card": "c1", "url": "https://example.com/brief.pdf", "name": "brief"}),
    )
    .await;

    assert_eq!(result["id_attachment"], "at1");
    let call = up.last();
    assert_eq!(call.path, "/cards/c1/attachments");
    assert_eq!(call.fields["url"], "https://example.com/brief.pdf");
    assert!(call.file.is_none());
}

#[tokio::test]
async fn test_card_attachment_from_base_path() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

    let up = MockUpstream::new(|_, _, _| Ok(json!({"id": "at2", "name": "notes.txt"})));
    let s = session(&up).with_base_path(dir.path());
    call_tool(&s, "trello_card_attachment_add", json!({"id_card": "c1", "file": "notes.txt"})).await;

    let file = up.last().file.expect("expected an upload");
    assert!(file.ends_with("notes.txt"));
}

#[tokio::test]
async fn test_card_attachment_rejects_escape_and_missing_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let up = MockUpstream::empty();
    let s = session(&up).with_base_path(dir.path());

    let err = call_tool_err(
        &s,
        "trello_card_attachment_add",
        json!({"id_card": "c1", "file": "../etc/passwd"}),
    )
    .await;
    assert!(matches!(err, McpError::InvalidArg { .. }));

    let err = call_tool_err(
        &s,
        "trello_card_attachment_add",
        json!({"id_card": "c1", "file": "absent.txt"}),
    )
    .await;
    assert!(matches!(err, McpError::InvalidArg { .. }));

    let err = call_tool_err(
        &s,
        "trello_card_attachment_add",
        json!({"id_card": "c1", "file": "a.txt", "url": "https://example.com"}),
    )
    .await;
    assert!(matches!(err, McpError::InvalidArg { .. }));
    assert!(up.calls().is_empty());
}

#[tokio::test]
async fn test_card_attachment_without_base_path() {
    let up = MockUpstream::empty();
    let err = call_tool_err(
        &session(&up),
        "trello_card_attachment_add",
        json!({"id_card": "c1", "file": "notes.txt"}),
    )
    .await;
    assert!(matches!(err, McpError::InvalidArg { .. }));
}

#[tokio::test]
async fn test_card_stickers() {
    let up = MockUpstream::new(|method, _, _| match method {
        HttpMethod::Get => Ok(json!([{"id": "s1", "image": "taco-cool"}])),
        _ => Ok(json!({"id": "s2", "image": "star"})),
    });
    let s = session(&up);

    let result = call_tool(&s, "trello_card_stickers", json!({"id_card": "c1"})).await;
    assert_eq!(up.last().path, "/cards/c1/stickers");
    assert_eq!(result["data"][0]["image"], "taco-cool");

    let result = call_tool(
        &s,
        "trello_card_add_sticker",
        json!({"id_card": "c1", "image": "star", "left": 12.5, "rotate": 90}),
    )
    .await;
    assert_eq!(result["id_sticker"], "s2");
    let call = up.last();
    assert_eq!((call.method, call.path.as_str()), (HttpMethod::Post, "/cards/c1/stickers"));
    assert_eq!(call.fields["image"], "star");
    assert_eq!(call.fields["left"], "12.5");
    assert_eq!(call.fields["rotate"], "90");
    assert_eq!(call.fields["top"], "0");
    assert_eq!(call.fields["zIndex"], "1");

    call_tool(&s, "trello_card_delete_sticker", json!({"id_card": "c1", "id_sticker": "s2"})).await;
    let call = up.last();
    assert_eq!((call.method, call.path.as_str()), (HttpMethod::Delete, "/cards/c1/stickers/s2"));
}

#[tokio::test]
async fn test_card_add_sticker_requires_image() {
    let up = MockUpstream::empty();
    let err = call_tool_err(&session(&up), "trello_card_add_sticker", json!({"id_card": "c1"})).await;
    assert!(matches!(err, McpError::MissingArg(ref n) if n == "image"));
    assert!(up.calls().is_empty());
}

// =============================================================================
// List Tools
// =============================================================================

#[tokio::test]
async fn test_list_create_requires_name_or_source() {
    let up = MockUpstream::empty();
    let err = call_tool_err(&session(&up), "trello_list_create", json!({"id_board": "b1"})).await;
    assert!(matches!(err, McpError::InvalidArg { .. }));

    call_tool(
        &session(&up),
        "trello_list_create",
        json!({"id_board": "b1", "name": "Backlog", "pos": 1024}),
    )
    .await;
    let call = up.last();
    assert_eq!(call.path, "/boards/b1/lists");
    assert_eq!(call.fields["pos"], "1024");
}

#[tokio::test]
async fn test_list_cards() {
    let up = MockUpstream::new(|_, _, _| {
        Ok(json!([{"id": "c1", "name": "A", "idList": "l1"}, {"id": "c2", "name": "B", "idList": "l1"}]))
    });
    let result = call_tool(&session(&up), "trello_list_cards", json!({"id_list": "l1"})).await;
    assert_eq!(up.last().path, "/lists/l1/cards");
    assert_eq!(result["card_count"], 2);
    assert_eq!(result["cards"][0]["id"], "c1");
}

#[tokio::test]
async fn test_list_archive_all_cards() {
    let up = MockUpstream::empty();
    call_tool(&session(&up), "trello_list_archive_all_cards", json!({"id_list": "l1"})).await;
    let call = up.last();
    assert_eq!((call.method, call.path.as_str()), (HttpMethod::Post, "/lists/l1/archiveAllCards"));
}

// =============================================================================
// Checklist Tools
// =============================================================================

#[tokio::test]
async fn test_checklist_create_on_card() {
    let up = MockUpstream::new(|_, _, _| Ok(json!({"id": "cl1", "name": "QA", "idCard": "c1"})));
    let result = call_tool(
        &session(&up),
        "trello_checklist_create",
        json!({"id_card": "c1", "name": "QA"}),
    )
    .await;

    assert_eq!(result["checklist_id"], "cl1");
    let call = up.last();
    assert_eq!(call.path, "/checklists");
    assert_eq!(call.fields["idCard"], "c1");
    assert_eq!(call.fields["name"], "QA");
}

#[tokio::test]
async fn test_checklist_items_lifecycle() {
    let up = MockUpstream::new(|_, _, _| Ok(json!({"id": "ci1", "name": "Step"})));
    let s = session(&up);

    let added = call_tool(
        &s,
        "trello_checklist_add_item",
        json!({"id_checklist": "cl1", "name": "Step", "checked": true}),
    )
    .await;
    assert_eq!(added["id_check_item"], "ci1");
    let call = up.last();
    assert_eq!(call.path, "/checklists/cl1/checkItems");
    assert_eq!(call.fields["checked"], "true");

    call_tool(
        &s,
        "trello_checklist_update_item",
        json!({"id_card": "c1", "id_check_item": "ci1", "checked": false}),
    )
    .await;
    let call = up.last();
    assert_eq!((call.method, call.path.as_str()), (HttpMethod::Put, "/cards/c1/checkItem/ci1"));
    assert_eq!(call.fields["state"], "incomplete");

    call_tool(
        &s,
        "trello_checklist_delete_item",
        json!({"id_checklist": "cl1", "id_check_item": "ci1"}),
    )
    .await;
    let call = up.last();
    assert_eq!((call.method, call.path.as_str()), (HttpMethod::Delete, "/checklists/cl1/checkItems/ci1"));
}

#[tokio::test]
async fn test_mistyped_optional_args_make_no_call() {
    let up = MockUpstream::empty();
    let s = session(&up);

    let err = call_tool_err(
        &s,
        "trello_checklist_update_item",
        json!({"id_card": "c1", "id_check_item": "ci1", "checked": "yes"}),
    )
    .await;
    assert!(matches!(err, McpError::InvalidArg { ref name, .. } if name == "checked"));

    let err = call_tool_err(
        &s,
        "trello_card_update",
        json!({"id_card": "c1", "name": {"text": "x"}}),
    )
    .await;
    assert!(matches!(err, McpError::InvalidArg { ref name, .. } if name == "name"));

    assert!(up.calls().is_empty());
}

#[tokio::test]
async fn test_checklist_convert_item_to_card() {
    let up = MockUpstream::new(|_, _, _| Ok(json!({"id": "c7"})));
    let result = call_tool(
        &session(&up),
        "trello_checklist_convert_item_to_card",
        json!({"id_card": "c1", "id_checklist": "cl1", "id_check_item": "ci1"}),
    )
    .await;
    assert_eq!(result["new_card_id"], "c7");
    assert_eq!(up.last().path, "/cards/c1/checklist/cl1/checkItem/ci1/convertToCard");
}

// =============================================================================
// Label Tools
// =============================================================================

#[tokio::test]
async fn test_label_create_validates_color() {
    let up = MockUpstream::new(|_, _, _| Ok(json!({"id": "lb1"})));
    let err = call_tool_err(
        &session(&up),
        "trello_label_create",
        json!({"id_board": "b1", "name": "Bug", "color": "magenta"}),
    )
    .await;
    assert!(matches!(err, McpError::InvalidArg { ref name, .. } if name == "color"));

    let result = call_tool(
        &session(&up),
        "trello_label_create",
        json!({"id_board": "b1", "name": "Bug", "color": "red"}),
    )
    .await;
    assert_eq!(result["label_id"], "lb1");
    assert_eq!(up.last().path, "/boards/b1/labels");
}

#[tokio::test]
async fn test_label_update_and_delete() {
    let up = MockUpstream::empty();
    let s = session(&up);
    call_tool(&s, "trello_label_update", json!({"id_label": "lb1", "color": "sky"})).await;
    assert_eq!(up.last().fields["color"], "sky");

    call_tool(&s, "trello_label_delete", json!({"id_label": "lb1"})).await;
    let call = up.last();
    assert_eq!((call.method, call.path.as_str()), (HttpMethod::Delete, "/labels/lb1"));
}

// =============================================================================
// Member, Action, Notification Tools
// =============================================================================

#[tokio::test]
async fn test_member_defaults_to_me() {
    let up = MockUpstream::new(|_, _, _| Ok(json!({"id": "m0", "username": "me_user"})));
    let result = call_tool(&session(&up), "trello_member_get", json!({})).await;
    assert_eq!(up.last().path, "/members/me");
    assert_eq!(result["member"]["username"], "me_user");

    let up = MockUpstream::new(|_, _, _| Ok(json!([])));
    call_tool(&session(&up), "trello_member_boards", json!({"id_member": "bob", "filter": "open"})).await;
    assert_eq!(up.last().path, "/members/bob/boards/open");
}

#[tokio::test]
async fn test_member_notifications_read_filter() {
    let up = MockUpstream::new(|_, _, _| Ok(json!([{"id": "n1"}])));
    let result = call_tool(
        &session(&up),
        "trello_member_notifications",
        json!({"read_filter": "unread", "limit": 5}),
    )
    .await;
    let call = up.last();
    assert_eq!(call.path, "/members/me/notifications");
    assert_eq!(call.fields["read_filter"], "unread");
    assert!(result["message"].as_str().unwrap().contains("1 notifications"));
}

#[tokio::test]
async fn test_action_update_comment() {
    let up = MockUpstream::empty();
    call_tool(
        &session(&up),
        "trello_action_update_comment",
        json!({"id_action": "a1", "text": "edited"}),
    )
    .await;
    let call = up.last();
    assert_eq!((call.method, call.path.as_str()), (HttpMethod::Put, "/actions/a1/text"));
    assert_eq!(call.fields["value"], "edited");
}

#[tokio::test]
async fn test_notification_update_and_mark_all() {
    let up = MockUpstream::empty();
    let s = session(&up);

    let result = call_tool(
        &s,
        "trello_notification_update",
        json!({"id_notification": "n1", "unread": false}),
    )
    .await;
    assert!(result["message"].as_str().unwrap().ends_with("as read"));
    assert_eq!(up.last().fields["unread"], "false");

    call_tool(&s, "trello_notification_mark_all_read", json!({})).await;
    let call = up.last();
    assert_eq!((call.method, call.path.as_str()), (HttpMethod::Post, "/notifications/all/read"));
}

// =============================================================================
// Webhook Tools
// =============================================================================

#[tokio::test]
async fn test_webhook_lifecycle() {
    let up = MockUpstream::new(|_, _, _| Ok(json!({"id": "w1", "active": true})));
    let s = session(&up);

    let result = call_tool(
        &s,
        "trello_webhook_create",
        json!({"callback_url": "https://hooks.example.com/trello", "id_model": "b1", "description": "board feed"}),
    )
    .await;
    assert_eq!(result["webhook_id"], "w1");
    let call = up.last();
    assert_eq!((call.method, call.path.as_str()), (HttpMethod::Post, "/webhooks"));
    assert_eq!(call.fields["callbackURL"], "https://hooks.example.com/trello");
    assert_eq!(call.fields["idModel"], "b1");
    assert_eq!(call.fields["description"], "board feed");

    call_tool(&s, "trello_webhook_get", json!({"id_webhook": "w1"})).await;
    let call = up.last();
    assert_eq!((call.method, call.path.as_str()), (HttpMethod::Get, "/webhooks/w1"));

    let result = call_tool(&s, "trello_webhook_update", json!({"id_webhook": "w1", "active": false})).await;
    let call = up.last();
    assert_eq!((call.method, call.path.as_str()), (HttpMethod::Put, "/webhooks/w1"));
    assert_eq!(call.fields["active"], "false");
    assert_eq!(result["updated_fields"], json!(["active"]));

    call_tool(&s, "trello_webhook_delete", json!({"id_webhook": "w1"})).await;
    let call = up.last();
    assert_eq!((call.method, call.path.as_str()), (HttpMethod::Delete, "/webhooks/w1"));
}

#[tokio::test]
async fn test_webhook_rejects_bad_input_before_any_call() {
    let up = MockUpstream::empty();
    let s = session(&up);

    let err = call_tool_err(
        &s,
        "trello_webhook_create",
        json!({"callback_url": "hooks.example.com", "id_model": "b1"}),
    )
    .await;
    assert!(matches!(err, McpError::InvalidArg { ref name, .. } if name == "callback_url"));

    let err = call_tool_err(&s, "trello_webhook_update", json!({"id_webhook": "w1"})).await;
    assert!(matches!(err, McpError::InvalidArg { .. }));

    assert!(up.calls().is_empty());
}

// =============================================================================
// Batch Tools
// =============================================================================

#[tokio::test]
async fn test_batch_get_records_each_outcome() {
    let up = MockUpstream::new(|_, path, _| {
        if path == "/boards/missing" {
            Err(rejected(404))
        } else {
            Ok(json!({"path": path}))
        }
    });
    let result = call_tool(
        &session(&up),
        "trello_batch_get",
        json!({"urls": ["/boards/b1", "/boards/missing", "/lists/l1"]}),
    )
    .await;

    assert_eq!(result["success"], false);
    assert_eq!(result["successful_requests"], 2);
    assert_eq!(result["failed_requests"], 1);
    let results = result["results"].as_array().unwrap();
    assert_eq!(results[1]["error"]["status"], 404);
    assert_eq!(results[2]["data"]["path"], "/lists/l1");
    assert_eq!(up.count(HttpMethod::Get), 3);
}

#[tokio::test]
async fn test_batch_get_rejects_absolute_urls() {
    let up = MockUpstream::empty();
    let err = call_tool_err(
        &session(&up),
        "trello_batch_get",
        json!({"urls": "/boards/b1, https://evil.example/x"}),
    )
    .await;
    assert!(matches!(err, McpError::InvalidArg { .. }));
    assert!(up.calls().is_empty());
}

#[tokio::test]
async fn test_batch_get_limit() {
    let up = MockUpstream::empty();
    let urls: Vec<JsonValue> = (0..11).map(|i| json!(format!("/cards/c{}", i))).collect();
    let err = call_tool_err(&session(&up), "trello_batch_get", json!({"urls": urls})).await;
    assert!(matches!(err, McpError::InvalidArg { .. }));
}
