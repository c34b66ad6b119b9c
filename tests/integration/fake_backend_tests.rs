//! End-to-end searches through a real subprocess that impersonates ripgrep.

use anyhow::Result;
use std::time::Duration;

use declgrep::search::{DeclarationKind, DeclarationSearch, ScanOutcome, SearchError, SearchQuery};

use crate::helpers::fake_rg::FakeRg;
use crate::helpers::lean_project::LeanProject;

fn engine(project: &LeanProject, fake: &FakeRg) -> Result<DeclarationSearch> {
    Ok(DeclarationSearch::new(
        &project.search_config(),
        &fake.backend_config()?,
    ))
}

#[tokio::test]
async fn test_invocation_is_scoped_to_project_root() -> Result<()> {
    let project = LeanProject::new()?;
    let fake = FakeRg::new(1);
    let engine = engine(&project, &fake)?;

    let query = SearchQuery::new("add_comm", 5, Some(project.path()))?;
    let matches = engine.search(&query).await?;
    assert!(matches.is_empty());

    assert_eq!(fake.recorded_cwd(), Some(project.canonical_path()));
    let args = fake.recorded_args();
    for expected in ["--json", "--no-ignore", "--hidden", "*.lean", "!.lake/build/**"] {
        assert!(
            args.iter().any(|a| a == expected),
            "missing {} in {:?}",
            expected,
            args
        );
    }
    let separator = args.iter().position(|a| a == "--").expect("-- separator");
    assert_eq!(args[separator + 1], ".");
    assert!(args[separator - 1].contains("add_comm"));
    Ok(())
}

#[tokio::test]
async fn test_relative_and_absolute_paths_are_normalized() -> Result<()> {
    let project = LeanProject::new()?;
    let absolute = project.canonical_path().join(".lake/packages/std/Std/Nat.lean");
    let fake = FakeRg::new(0)
        .with_line(r#"{"type":"begin","data":{"path":{"text":"./Demo/Basic.lean"}}}"#)
        .with_match("./Demo/Basic.lean", "theorem Demo.add_zero' (n : Nat) : n + 0 = n := rfl")
        .with_match(&absolute.display().to_string(), "protected def Nat.add_mod : Nat := 0")
        .with_line(r#"{"type":"summary","data":{}}"#);
    let engine = engine(&project, &fake)?;

    let query = SearchQuery::new("add", 10, Some(project.path()))?;
    let matches = engine.search(&query).await?;

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].name, "Demo.add_zero'");
    assert_eq!(matches[0].kind, DeclarationKind::Theorem);
    assert_eq!(matches[0].file, "Demo/Basic.lean");
    assert_eq!(matches[1].name, "Nat.add_mod");
    assert_eq!(matches[1].kind, DeclarationKind::Def);
    assert_eq!(matches[1].file, ".lake/packages/std/Std/Nat.lean");
    Ok(())
}

#[tokio::test]
async fn test_error_exit_after_matches_returns_partial_results() -> Result<()> {
    let project = LeanProject::new()?;
    let fake = FakeRg::new(2)
        .with_match("./Demo/Basic.lean", "def sample : Nat := 1")
        .with_stderr("Demo/Broken.lean: Permission denied");
    let engine = engine(&project, &fake)?;

    let query = SearchQuery::new("sample", 10, Some(project.path()))?;
    let scan = engine.scan(&query).await?;
    assert!(matches!(
        scan.outcome,
        ScanOutcome::Degraded {
            exit_code: Some(2),
            ..
        }
    ));

    let matches = engine.search(&query).await?;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name, "sample");
    Ok(())
}

#[tokio::test]
async fn test_error_exit_without_matches_fails() -> Result<()> {
    let project = LeanProject::new()?;
    let fake = FakeRg::new(2).with_stderr("regex parse error");
    let engine = engine(&project, &fake)?;

    let query = SearchQuery::new("sample", 10, Some(project.path()))?;
    let err = engine.search(&query).await.unwrap_err();

    match &err {
        SearchError::BackendFailed {
            exit_code, stderr, ..
        } => {
            assert_eq!(*exit_code, Some(2));
            assert!(stderr.contains("regex parse error"));
        }
        other => panic!("expected BackendFailed, got {:?}", other),
    }
    assert!(err.to_string().contains("regex parse error"));
    Ok(())
}

#[tokio::test]
async fn test_stops_early_once_limit_is_reached() -> Result<()> {
    let project = LeanProject::new()?;
    let fake = FakeRg::new(0)
        .with_match("./A.lean", "def dup : Nat := 1")
        .with_match("./B.lean", "def dup : Nat := 2")
        .with_match("./C.lean", "def dup : Nat := 3")
        .hanging();
    let engine = engine(&project, &fake)?;

    let query = SearchQuery::new("dup", 2, Some(project.path()))?;
    let scan = tokio::time::timeout(Duration::from_secs(10), engine.scan(&query))
        .await
        .expect("search should not wait for the backend to finish")?;

    assert_eq!(scan.outcome, ScanOutcome::Ok);
    let files: Vec<&str> = scan.matches.iter().map(|m| m.file.as_str()).collect();
    assert_eq!(files, vec!["A.lean", "B.lean"]);
    Ok(())
}

#[tokio::test]
async fn test_missing_executable_reports_remediation() -> Result<()> {
    let project = LeanProject::new()?;
    let mut backend = FakeRg::new(0).backend_config()?;
    backend.executable = project.path().join("no-such-rg").display().to_string();
    let engine = DeclarationSearch::new(&project.search_config(), &backend);

    assert!(!engine.backend_status().await.available);
    let query = SearchQuery::new("sample", 10, Some(project.path()))?;
    let err = engine.search(&query).await.unwrap_err();

    assert!(matches!(err, SearchError::BackendUnavailable { .. }));
    assert!(err.to_string().contains("ripgrep (rg) was not found"));
    Ok(())
}
