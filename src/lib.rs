//! # trello-mcp
//!
//! MCP (Model Context Protocol) server for the Trello REST API.
//!
//! This crate exposes Trello boards, lists, cards, checklists, labels, members,
//! actions, notifications and webhooks as tools for AI agents. It implements the MCP
//! protocol over stdin/stdout using JSON-RPC 2.0.
//!
//! ## Features
//!
//! - **Passthrough tools** for the common Trello resources, one upstream call each
//! - **Compound operations** that Trello has no single endpoint for:
//!   creating a checklist for a board, moving every card out of a list, and
//!   finding a board member by email, username or name
//! - **Honest partial results**: a compound operation that fails midway reports
//!   exactly what was done and what is left, and never deletes anything to undo it
//!
//! ## Usage
//!
//! The server is typically run as an executable and configured in AI tools like Claude Desktop:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "trello": {
//!       "command": "/path/to/trello-mcp",
//!       "env": {
//!         "TRELLO_API_KEY": "...",
//!         "TRELLO_API_TOKEN": "..."
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! ## Library Usage
//!
//! For testing or embedding, you can use the library API:
//!
//! ```no_run
//! use trello_mcp::{McpServer, McpSession, TrelloConfig};
//!
//! # async fn run() -> trello_mcp::Result<()> {
//! let config = TrelloConfig::new("key", "token")?;
//! let session = McpSession::from_config(config)?;
//! let mut server = McpServer::new(session);
//!
//! // Run the server (reads from stdin, writes to stdout)
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod config;
mod convert;
mod error;
pub mod ops;
mod server;
mod session;
mod tools;
mod upstream;

pub use client::TrelloClient;
pub use config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, TrelloConfig};
pub use error::{McpError, Result};
pub use server::{JsonRpcRequest, JsonRpcResponse, McpServer};
pub use session::McpSession;
pub use tools::{ToolDef, ToolRegistry};
pub use upstream::{Fields, HttpMethod, Parent, ResourceKind, Upstream};
