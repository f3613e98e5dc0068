//! reqwest-backed [`Upstream`] talking to the Trello REST API.

use std::path::Path;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, Response};
use serde_json::{json, Value as JsonValue};

use crate::config::TrelloConfig;
use crate::error::{McpError, Result};
use crate::upstream::{Fields, HttpMethod, Upstream};

/// HTTP client bound to one set of credentials.
pub struct TrelloClient {
    http: reqwest::Client,
    config: TrelloConfig,
}

impl TrelloClient {
    /// Build a client from validated configuration.
    pub fn new(config: TrelloConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("trello-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| McpError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &TrelloConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

#[async_trait]
impl Upstream for TrelloClient {
    async fn send(&self, method: HttpMethod, path: &str, fields: &Fields) -> Result<JsonValue> {
        tracing::debug!(%method, path, fields = fields.len(), "trello request");

        let request = self
            .http
            .request(method.into(), self.url(path))
            .header(ACCEPT, "application/json")
            .query(&self.config.auth_params());
        let request = match method {
            HttpMethod::Get | HttpMethod::Delete => request.query(fields),
            HttpMethod::Post | HttpMethod::Put => request.form(fields),
        };

        let response = request.send().await?;
        read_response(method, path, response).await
    }

    async fn upload(&self, path: &str, fields: &Fields, file: &Path) -> Result<JsonValue> {
        let bytes = tokio::fs::read(file).await?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        tracing::debug!(path, file = %file.display(), size = bytes.len(), "trello upload");

        let mut form = Form::new();
        for (k, v) in fields {
            form = form.text(k.clone(), v.clone());
        }
        form = form.part("file", Part::bytes(bytes).file_name(file_name));

        let response = self
            .http
            .post(self.url(path))
            .header(ACCEPT, "application/json")
            .query(&self.config.auth_params())
            .multipart(form)
            .send()
            .await?;
        read_response(HttpMethod::Post, path, response).await
    }
}

async fn read_response(method: HttpMethod, path: &str, response: Response) -> Result<JsonValue> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        tracing::debug!(%method, path, status = status.as_u16(), "trello request failed");
        let message = if text.trim().is_empty() {
            status.canonical_reason().unwrap_or("Unknown").to_string()
        } else {
            text
        };
        return Err(McpError::Upstream {
            status: Some(status.as_u16()),
            message,
        });
    }

    Ok(decode_body(&text))
}

/// Decode a success body: empty becomes `{}`, non-JSON is wrapped as `{"raw": ...}`.
fn decode_body(text: &str) -> JsonValue {
    if text.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}
