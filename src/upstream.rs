//! The seam between tools and the Trello REST API.
//!
//! Tools only ever talk to an [`Upstream`]. The production implementation is
//! [`TrelloClient`](crate::client::TrelloClient); tests substitute a scripted one.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::{McpError, Result};

/// Request fields, sent as query parameters on GET/DELETE and as a form body otherwise.
pub type Fields = BTreeMap<String, String>;

/// HTTP verbs used against the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// Read
    Get,
    /// Create or act
    Post,
    /// Update
    Put,
    /// Remove
    Delete,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// Trello resource collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// `/boards`
    Board,
    /// `/cards`
    Card,
    /// `/lists`
    List,
    /// `/checklists`
    Checklist,
    /// `/labels`
    Label,
    /// `/members`
    Member,
    /// `/actions`
    Action,
    /// `/notifications`
    Notification,
    /// `/webhooks`
    Webhook,
    /// `stickers`, only ever nested under a card
    Sticker,
}

impl ResourceKind {
    /// Path segment of the collection, e.g. `cards`.
    pub fn collection(self) -> &'static str {
        match self {
            ResourceKind::Board => "boards",
            ResourceKind::Card => "cards",
            ResourceKind::List => "lists",
            ResourceKind::Checklist => "checklists",
            ResourceKind::Label => "labels",
            ResourceKind::Member => "members",
            ResourceKind::Action => "actions",
            ResourceKind::Notification => "notifications",
            ResourceKind::Webhook => "webhooks",
            ResourceKind::Sticker => "stickers",
        }
    }

    /// Path of a single entity, e.g. `/cards/abc`.
    pub fn path(self, id: &str) -> String {
        format!("/{}/{}", self.collection(), id)
    }

    /// Use an entity of this kind as the parent of a nested collection.
    pub fn of(self, id: &str) -> Parent<'_> {
        Parent { kind: self, id }
    }
}

/// The owner of a nested collection, e.g. the board in `/boards/{id}/lists`.
#[derive(Debug, Clone, Copy)]
pub struct Parent<'a> {
    /// Kind of the owning entity
    pub kind: ResourceKind,
    /// ID of the owning entity
    pub id: &'a str,
}

impl Parent<'_> {
    fn nested(&self, child: ResourceKind) -> String {
        format!("{}/{}", self.kind.path(self.id), child.collection())
    }
}

/// Authenticated access to the upstream API.
///
/// Implementors provide [`send`](Upstream::send) and [`upload`](Upstream::upload);
/// the resource-shaped helpers are built on top of them.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Issue one request and decode the JSON body.
    async fn send(&self, method: HttpMethod, path: &str, fields: &Fields) -> Result<JsonValue>;

    /// POST a local file as multipart form data.
    async fn upload(&self, path: &str, fields: &Fields, file: &Path) -> Result<JsonValue>;

    /// GET a single path.
    async fn get(&self, path: &str, params: &Fields) -> Result<JsonValue> {
        self.send(HttpMethod::Get, path, params).await
    }

    /// Create an entity, nested under `parent` when given.
    async fn create(
        &self,
        kind: ResourceKind,
        parent: Option<Parent<'_>>,
        fields: &Fields,
    ) -> Result<JsonValue> {
        let path = match parent {
            Some(p) => p.nested(kind),
            None => format!("/{}", kind.collection()),
        };
        self.send(HttpMethod::Post, &path, fields).await
    }

    /// Enumerate a nested collection in upstream order.
    async fn list(
        &self,
        kind: ResourceKind,
        parent: Parent<'_>,
        filter: Option<&str>,
    ) -> Result<Vec<JsonValue>> {
        self.list_with(kind, parent, filter, &Fields::new()).await
    }

    /// Like [`list`](Upstream::list), with extra query parameters.
    async fn list_with(
        &self,
        kind: ResourceKind,
        parent: Parent<'_>,
        filter: Option<&str>,
        params: &Fields,
    ) -> Result<Vec<JsonValue>> {
        let mut path = parent.nested(kind);
        if let Some(filter) = filter {
            path.push('/');
            path.push_str(filter);
        }
        match self.send(HttpMethod::Get, &path, params).await? {
            JsonValue::Array(items) => Ok(items),
            other => Err(McpError::Upstream {
                status: None,
                message: format!("expected a list from {}, got {}", path, type_name(&other)),
            }),
        }
    }

    /// Update fields of an entity.
    async fn update(&self, kind: ResourceKind, id: &str, fields: &Fields) -> Result<JsonValue> {
        self.send(HttpMethod::Put, &kind.path(id), fields).await
    }

    /// Delete an entity.
    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<JsonValue> {
        self.send(HttpMethod::Delete, &kind.path(id), &Fields::new())
            .await
    }
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Build a [`Fields`] map from literal pairs.
#[macro_export]
macro_rules! fields {
    () => { $crate::upstream::Fields::new() };
    ($($key:literal => $value:expr),+ $(,)?) => {{
        let mut f = $crate::upstream::Fields::new();
        $(f.insert($key.to_string(), ($value).to_string());)+
        f
    }};
}
