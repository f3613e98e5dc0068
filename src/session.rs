//! MCP session context.
//!
//! Holds the upstream handle and the attachment root shared by every tool call.
//! No entity state lives here; each call re-reads what it needs from Trello.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::client::TrelloClient;
use crate::config::{self, TrelloConfig};
use crate::error::Result;
use crate::upstream::Upstream;

/// MCP session state.
#[derive(Clone)]
pub struct McpSession {
    /// Upstream API handle
    upstream: Arc<dyn Upstream>,
    /// Root directory for local attachment files
    base_path: Option<PathBuf>,
}

impl McpSession {
    /// Create a session over any upstream implementation.
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self {
            upstream,
            base_path: None,
        }
    }

    /// Create a session backed by a real Trello client.
    pub fn from_config(config: TrelloConfig) -> Result<Self> {
        let base_path = config.base_path().map(Path::to_path_buf);
        let client = TrelloClient::new(config)?;
        Ok(Self {
            upstream: Arc::new(client),
            base_path,
        })
    }

    /// Set the attachment root.
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// The upstream API.
    pub fn upstream(&self) -> &dyn Upstream {
        self.upstream.as_ref()
    }

    /// Resolve a caller-supplied attachment path.
    pub fn resolve_local_file(&self, relative: &str) -> Result<PathBuf> {
        config::resolve_local_file(self.base_path.as_deref(), relative)
    }
}
