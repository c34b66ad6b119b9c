//! Init, configure, detect the root, search.

use anyhow::Result;
use std::sync::Arc;

use declgrep::commands::init::init_at;
use declgrep::project_detection::{ProjectDetector, ProjectType};
use declgrep::search::{DeclarationKind, DeclarationSearch, ScriptedBackend, SearchQuery};
use declgrep::Config;

use crate::helpers::lean_project::LeanProject;

#[tokio::test]
async fn test_configured_limit_and_globs_reach_the_backend() -> Result<()> {
    let project = LeanProject::new()?;
    init_at(project.path(), false)?;

    let mut config = Config::load(project.path())?;
    config.search.default_limit = 2;
    config.search.include_toolchain_sources = false;
    config.search.exclude_globs.push("Scratch/**".to_string());
    config.save(project.path())?;

    let config = Config::load(project.path())?;
    let backend = Arc::new(ScriptedBackend::new(
        vec![
            ScriptedBackend::match_event("./Demo/A.lean", "def foo : Nat := 1"),
            ScriptedBackend::match_event("./Demo/B.lean", "theorem foo_eq : foo = 1 := rfl"),
            ScriptedBackend::match_event("./Demo/C.lean", "abbrev fooAlias := foo"),
        ],
        Some(0),
    ));
    let engine = DeclarationSearch::with_backend(backend.clone(), config.search.clone());

    let query = SearchQuery::new("foo", config.search.default_limit, Some(project.path()))?;
    let matches = engine.search(&query).await?;

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[1].kind, DeclarationKind::Theorem);

    let invocation = &backend.invocations()[0];
    assert!(invocation.exclude_globs.contains(&"Scratch/**".to_string()));
    assert!(invocation.extra_paths.is_empty());
    assert!(invocation
        .ripgrep_args()
        .contains(&"!Scratch/**".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_root_detected_from_nested_directory_drives_search() -> Result<()> {
    let project = LeanProject::new()?;
    let nested = project.add_file("Demo/Algebra/Ring.lean", "theorem mul_one' : True := trivial\n")?;

    let detected = ProjectDetector::default().detect(nested.parent().unwrap())?;
    assert_eq!(detected.root, project.canonical_path());
    assert_eq!(detected.project_type, ProjectType::Lake);

    let backend = Arc::new(ScriptedBackend::new(
        vec![ScriptedBackend::match_event(
            &nested.canonicalize()?.display().to_string(),
            "theorem mul_one' : True := trivial",
        )],
        Some(0),
    ));
    let engine = DeclarationSearch::with_backend(backend, project.search_config());

    let query = SearchQuery::new("mul", 10, Some(detected.root.as_path()))?;
    let matches = engine.search(&query).await?;

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name, "mul_one'");
    assert_eq!(matches[0].file, "Demo/Algebra/Ring.lean");
    Ok(())
}

#[test]
fn test_matches_serialize_with_keyword_kinds() -> Result<()> {
    let project = LeanProject::new()?;
    let matches = declgrep::search::accumulate(
        [declgrep::search::RawMatchEvent {
            file: project.path().join("Demo/Basic.lean"),
            line_text: "structure Point where\n".to_string(),
        }],
        5,
        project.path(),
    );

    let json = serde_json::to_value(&matches)?;
    assert_eq!(
        json,
        serde_json::json!([{"name": "Point", "kind": "structure", "file": "Demo/Basic.lean"}])
    );
    Ok(())
}
