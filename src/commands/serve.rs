//! MCP server command implementation.
//!
//! Starts the declgrep MCP server on stdio for integration with LLM clients.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::mcp::DeclgrepServer;
use crate::project_detection::resolve_project_root;
use crate::search::DeclarationSearch;

/// Run the MCP server command
///
/// `root` is the default project root for tool calls that do not name one;
/// without it the root is detected from the current directory.
pub async fn run(root: Option<&Path>) -> Result<()> {
    let root = resolve_project_root(root)?;
    let config = Config::load(&root)?;

    let engine = Arc::new(DeclarationSearch::new(&config.search, &config.backend));

    // Tool calls return the remediation to the client while rg is missing.
    let status = engine.backend_status().await;
    if status.available {
        info!(
            version = status.version.as_deref().unwrap_or("unknown"),
            "Search backend available"
        );
    } else {
        warn!("{}", status.remediation);
    }

    let server = DeclgrepServer::new(engine, root);
    server.run().await
}
