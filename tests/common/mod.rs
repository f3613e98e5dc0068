//! Scripted upstream shared by the integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use trello_mcp::{Fields, HttpMethod, McpError, McpSession, Result, ToolRegistry, Upstream};

/// One recorded upstream request.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: HttpMethod,
    pub path: String,
    pub fields: Fields,
    /// Set for multipart uploads.
    pub file: Option<String>,
}

type Responder = Box<dyn Fn(HttpMethod, &str, &Fields) -> Result<JsonValue> + Send + Sync>;

/// Upstream that records every request and answers from a closure.
pub struct MockUpstream {
    calls: Mutex<Vec<Call>>,
    responder: Responder,
}

impl MockUpstream {
    pub fn new(
        responder: impl Fn(HttpMethod, &str, &Fields) -> Result<JsonValue> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        })
    }

    /// Answers every request with `{}`.
    pub fn empty() -> Arc<Self> {
        Self::new(|_, _, _| Ok(JsonValue::Object(Map::new())))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: HttpMethod) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }

    pub fn last(&self) -> Call {
        self.calls().last().cloned().expect("no upstream calls recorded")
    }
}

#[async_trait]
impl Upstream for MockUpstream {
    async fn send(&self, method: HttpMethod, path: &str, fields: &Fields) -> Result<JsonValue> {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            fields: fields.clone(),
            file: None,
        });
        (self.responder)(method, path, fields)
    }

    async fn upload(&self, path: &str, fields: &Fields, file: &Path) -> Result<JsonValue> {
        self.calls.lock().unwrap().push(Call {
            method: HttpMethod::Post,
            path: path.to_string(),
            fields: fields.clone(),
            file: Some(file.display().to_string()),
        });
        (self.responder)(HttpMethod::Post, path, fields)
    }
}

/// An upstream rejection with the given status.
pub fn rejected(status: u16) -> McpError {
    McpError::Upstream {
        status: Some(status),
        message: format!("rejected with {}", status),
    }
}

pub fn session(upstream: &Arc<MockUpstream>) -> McpSession {
    McpSession::new(upstream.clone())
}

fn to_map(args: JsonValue) -> Map<String, JsonValue> {
    match args {
        JsonValue::Object(m) => m,
        _ => Map::new(),
    }
}

/// Helper to dispatch a tool call.
pub async fn call_tool(session: &McpSession, name: &str, args: JsonValue) -> JsonValue {
    ToolRegistry::new()
        .dispatch(session, name, to_map(args))
        .await
        .unwrap_or_else(|e| panic!("Tool {} failed: {}", name, e))
}

/// Helper to dispatch a tool call and expect an error.
pub async fn call_tool_err(session: &McpSession, name: &str, args: JsonValue) -> McpError {
    ToolRegistry::new()
        .dispatch(session, name, to_map(args))
        .await
        .expect_err(&format!("Expected tool {} to fail", name))
}
