use anyhow::Result;
use rmcp::ServerHandler;
use std::sync::Arc;

use declgrep::mcp::{DeclgrepServer, LocalSearchRequest};
use declgrep::search::{DeclarationSearch, ScriptedBackend};

use crate::helpers::lean_project::LeanProject;

fn server(project: &LeanProject, backend: ScriptedBackend) -> DeclgrepServer {
    let engine = DeclarationSearch::with_backend(Arc::new(backend), project.search_config());
    DeclgrepServer::new(Arc::new(engine), project.path().to_path_buf())
}

#[test]
fn test_server_info_advertises_tools() {
    let project = LeanProject::new().unwrap();
    let server = server(&project, ScriptedBackend::new(vec![], Some(1)));

    let info = server.get_info();
    assert_eq!(info.server_info.name, "declgrep");
    assert!(info.capabilities.tools.is_some());
    assert!(info
        .instructions
        .unwrap_or_default()
        .contains("lean_local_search"));
}

#[tokio::test]
async fn test_default_root_and_limit() -> Result<()> {
    let project = LeanProject::new()?;
    let lines = (0..15)
        .map(|i| ScriptedBackend::match_event("./Demo/Many.lean", &format!("def item{} : Nat := 0", i)))
        .collect();
    let server = server(&project, ScriptedBackend::new(lines, Some(0)));

    let request: LocalSearchRequest = serde_json::from_str(r#"{"query": "item"}"#)?;
    let matches = server.local_search(request).await.map_err(|e| anyhow::anyhow!(e.message))?;

    assert_eq!(matches.len(), 10);
    assert_eq!(matches[0].name, "item0");
    assert_eq!(matches[9].file, "Demo/Many.lean");
    assert_eq!(server.current_root().await, project.canonical_path());
    Ok(())
}
