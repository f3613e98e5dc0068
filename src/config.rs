//! Upstream credentials and local paths.
//!
//! Everything here is resolved once at startup and handed to the client by value.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::error::{McpError, Result};

/// Default Trello REST API root.
pub const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for talking to Trello.
#[derive(Clone)]
pub struct TrelloConfig {
    api_key: String,
    api_token: String,
    base_url: String,
    base_path: Option<PathBuf>,
    timeout: Duration,
}

impl std::fmt::Debug for TrelloConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrelloConfig")
            .field("api_key", &"<redacted>")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("base_path", &self.base_path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TrelloConfig {
    /// Create a configuration from an API key and token.
    ///
    /// Both must be non-blank.
    pub fn new(api_key: impl Into<String>, api_token: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        let api_token = api_token.into();
        if api_key.trim().is_empty() {
            return Err(McpError::Config("TRELLO_API_KEY is empty".to_string()));
        }
        if api_token.trim().is_empty() {
            return Err(McpError::Config("TRELLO_API_TOKEN is empty".to_string()));
        }
        Ok(Self {
            api_key,
            api_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            base_path: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the API root. A trailing slash is dropped.
    pub fn with_base_url(mut self, url: &str) -> Result<Self> {
        let url = url.trim().trim_end_matches('/');
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(McpError::Config(format!(
                "base URL must be http(s), got '{}'",
                url
            )));
        }
        self.base_url = url.to_string();
        Ok(self)
    }

    /// Set the directory that local attachment paths are resolved against.
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_dir() {
            return Err(McpError::Config(format!(
                "BASE_PATH '{}' is not a directory",
                path.display()
            )));
        }
        self.base_path = Some(path);
        Ok(self)
    }

    /// Set the per-request timeout. Zero is rejected.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(McpError::Config("timeout must be greater than zero".to_string()));
        }
        self.timeout = timeout;
        Ok(self)
    }

    /// The API root, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The attachment root, if configured.
    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Query parameters that authenticate every request.
    pub fn auth_params(&self) -> [(&'static str, &str); 2] {
        [("key", &self.api_key), ("token", &self.api_token)]
    }
}

/// Resolve a caller-supplied attachment path against the base path.
///
/// The path must be relative and may not climb out of the base path.
pub fn resolve_local_file(base: Option<&Path>, relative: &str) -> Result<PathBuf> {
    let base = base.ok_or_else(|| McpError::InvalidArg {
        name: "file".to_string(),
        reason: "no BASE_PATH configured for local attachments".to_string(),
    })?;

    let rel = Path::new(relative);
    let escapes = rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if relative.trim().is_empty() || escapes {
        return Err(McpError::InvalidArg {
            name: "file".to_string(),
            reason: format!("'{}' must be a relative path inside BASE_PATH", relative),
        });
    }

    Ok(base.join(rel))
}
