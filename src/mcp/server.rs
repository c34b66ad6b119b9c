//! MCP server exposing local declaration search.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::search::{DeclarationMatch, DeclarationSearch, SearchError, SearchQuery};

/// Request parameters for local declaration search
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LocalSearchRequest {
    /// Declaration name or prefix
    #[schemars(
        description = "Declaration name or name prefix, optionally namespace-qualified (e.g. 'add_comm', 'Nat.succ')"
    )]
    pub query: String,

    /// Maximum number of results to return
    #[schemars(description = "Maximum number of declarations to return (default: 10)")]
    pub limit: Option<usize>,

    /// Lean project root to search
    #[schemars(
        description = "Absolute path to the Lean project root. Defaults to the last root used, then the server's project root."
    )]
    pub project_root: Option<String>,
}

/// MCP server for Lean declaration search
#[derive(Clone)]
pub struct DeclgrepServer {
    engine: Arc<DeclarationSearch>,
    default_root: PathBuf,
    last_root: Arc<RwLock<Option<PathBuf>>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl DeclgrepServer {
    pub fn new(engine: Arc<DeclarationSearch>, default_root: PathBuf) -> Self {
        Self {
            engine,
            default_root,
            last_root: Arc::new(RwLock::new(None)),
            tool_router: Self::tool_router(),
        }
    }

    /// Confirm that declarations exist in the project and its dependencies
    #[tool(
        name = "lean_local_search",
        description = "Search the Lean project, its .lake/packages dependencies and the toolchain sources for declarations (theorem, lemma, def, axiom, class, instance, structure, inductive, abbrev, opaque) whose name starts with the query. Returns a JSON array of {name, kind, file}. Fast; use it to confirm a declaration exists before referring to it."
    )]
    async fn lean_local_search(
        &self,
        Parameters(req): Parameters<LocalSearchRequest>,
    ) -> Result<CallToolResult, McpError> {
        let matches = self.local_search(req).await?;
        let body = serde_json::to_string_pretty(&matches).map_err(|e| {
            McpError::internal_error(format!("Failed to encode results: {}", e), None)
        })?;
        Ok(CallToolResult::success(vec![Content::text(body)]))
    }

    /// Validate a request, run the search and remember the root it used.
    pub async fn local_search(
        &self,
        req: LocalSearchRequest,
    ) -> Result<Vec<DeclarationMatch>, McpError> {
        let status = self.engine.ensure_backend().await;
        if !status.available {
            return Err(McpError::internal_error(status.remediation, None));
        }

        let root = match req.project_root.as_deref().map(str::trim) {
            Some(root) if !root.is_empty() => PathBuf::from(root),
            _ => self.current_root().await,
        };
        let limit = req.limit.unwrap_or(self.engine.config().default_limit);

        let query = SearchQuery::new(&req.query, limit, Some(root.as_path())).map_err(to_mcp_error)?;
        debug!(query = query.text(), root = %query.project_root().display(), "lean_local_search");

        let matches = self.engine.search(&query).await.map_err(to_mcp_error)?;
        *self.last_root.write().await = Some(query.project_root().to_path_buf());
        Ok(matches)
    }

    /// Root used when a request names none.
    pub async fn current_root(&self) -> PathBuf {
        self.last_root
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.default_root.clone())
    }

    /// Run the MCP server using stdio transport
    pub async fn run(self) -> anyhow::Result<()> {
        info!(root = %self.default_root.display(), "Starting MCP server on stdio");
        let service = self.serve(stdio()).await?;
        service.waiting().await?;
        Ok(())
    }

    pub fn default_root(&self) -> &Path {
        &self.default_root
    }
}

fn to_mcp_error(err: SearchError) -> McpError {
    match err {
        SearchError::EmptyQuery
        | SearchError::InvalidLimit
        | SearchError::MissingRoot { .. }
        | SearchError::RootResolution { .. } => McpError::invalid_params(err.to_string(), None),
        SearchError::BackendUnavailable { remediation } => {
            McpError::internal_error(remediation, None)
        }
        other => McpError::internal_error(format!("Search failed: {}", other), None),
    }
}

#[tool_handler]
impl ServerHandler for DeclgrepServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "declgrep".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("Lean Declaration Search".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "declgrep MCP Server - local declaration search for Lean 4 projects.\n\n\
                 Available tools:\n\
                 - lean_local_search: Confirm declarations (theorems, lemmas, defs, ...) exist \
                 in the project, its dependencies and the Lean toolchain.\n\n\
                 Queries match the start of the last name segment, so 'add' finds \
                 'Nat.add_comm'; qualify the query ('Nat.add') to narrow the namespace."
                    .into(),
            ),
        }
    }
}
