//! MCP server for the Trello REST API.
//!
//! Run with `TRELLO_API_KEY=... TRELLO_API_TOKEN=... trello-mcp`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use trello_mcp::{McpServer, McpSession, TrelloConfig};

/// MCP server for Trello.
///
/// Exposes Trello boards, lists, cards, checklists, labels and members as MCP
/// tools for AI agents. Communicates via JSON-RPC 2.0 over stdin/stdout.
#[derive(Parser)]
#[command(name = "trello-mcp")]
#[command(version, about, long_about = None)]
struct Args {
    /// Trello API key.
    #[arg(long, env = "TRELLO_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Trello API token for the acting member.
    #[arg(long, env = "TRELLO_API_TOKEN", hide_env_values = true)]
    api_token: String,

    /// Base URL of the Trello REST API.
    #[arg(long, env = "TRELLO_BASE_URL", default_value = trello_mcp::DEFAULT_BASE_URL)]
    base_url: String,

    /// Directory that local attachment paths are resolved against.
    /// File uploads are disabled when unset.
    #[arg(long, env = "BASE_PATH", value_name = "PATH")]
    base_path: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(
        long,
        env = "TRELLO_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_secs: u64,

    /// Force debug logging to stderr, ignoring RUST_LOG.
    #[arg(long, short)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("trello_mcp=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trello_mcp=debug"))
    };
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_session(args: &Args) -> trello_mcp::Result<McpSession> {
    let mut config = TrelloConfig::new(&args.api_key, &args.api_token)?
        .with_base_url(&args.base_url)?
        .with_timeout(Duration::from_secs(args.timeout_secs))?;
    if let Some(path) = &args.base_path {
        config = config.with_base_path(path.clone())?;
    }
    tracing::debug!(?config, "configuration loaded");
    McpSession::from_config(config)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let session = match build_session(&args) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut server = McpServer::new(session);

    // Run the server
    if let Err(e) = server.run().await {
        eprintln!("Error: Server error: {}", e);
        std::process::exit(1);
    }
}
