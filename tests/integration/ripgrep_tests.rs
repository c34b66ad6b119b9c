//! Searches against the installed ripgrep. Each test returns early when
//! `rg` is not on PATH.

use anyhow::Result;
use std::collections::HashSet;

use declgrep::config::BackendConfig;
use declgrep::search::{check_backend_available, DeclarationKind, DeclarationSearch, SearchQuery};

use crate::helpers::lean_project::LeanProject;

async fn ripgrep_installed() -> bool {
    let status = check_backend_available("rg").await;
    if !status.available {
        eprintln!("skipping: ripgrep is not installed");
    }
    status.available
}

fn sample_project() -> Result<LeanProject> {
    let project = LeanProject::new()?;
    project.add_file(
        "Demo/Basic.lean",
        "namespace Demo\n\n\
         theorem add_zero' (n : Nat) : n + 0 = n := rfl\n\n\
         /-- docs -/\n\
         @[simp] lemma add_comm_demo (a b : Nat) : a + b = b + a := Nat.add_comm a b\n\n\
         def helper : Nat := add 1 2\n\n\
         end Demo\n",
    )?;
    project.add_file(
        ".lake/packages/mathlib/Mathlib/Algebra/Group.lean",
        "class AddMonoid (α : Type) where\n  add : α → α → α\n\n\
         instance addNat : AddMonoid Nat := ⟨Nat.add⟩\n",
    )?;
    project.add_file(
        ".lake/build/ir/Demo/Basic.lean",
        "def add_generated : Nat := 0\n",
    )?;
    project.add_file("notes.txt", "def add_in_text : Nat := 0\n")?;
    Ok(project)
}

fn engine(project: &LeanProject) -> DeclarationSearch {
    DeclarationSearch::new(&project.search_config(), &BackendConfig::default())
}

#[tokio::test]
async fn test_finds_project_and_vendored_declarations() -> Result<()> {
    if !ripgrep_installed().await {
        return Ok(());
    }
    let project = sample_project()?;
    let query = SearchQuery::new("add", 20, Some(project.path()))?;

    let matches = engine(&project).search(&query).await?;
    let found: HashSet<(String, DeclarationKind, String)> = matches
        .into_iter()
        .map(|m| (m.name, m.kind, m.file))
        .collect();

    let expected: HashSet<(String, DeclarationKind, String)> = [
        ("add_zero'", DeclarationKind::Theorem, "Demo/Basic.lean"),
        ("add_comm_demo", DeclarationKind::Lemma, "Demo/Basic.lean"),
        (
            "addNat",
            DeclarationKind::Instance,
            ".lake/packages/mathlib/Mathlib/Algebra/Group.lean",
        ),
    ]
    .into_iter()
    .map(|(n, k, f)| (n.to_string(), k, f.to_string()))
    .collect();

    assert_eq!(found, expected);
    Ok(())
}

#[tokio::test]
async fn test_limit_applies_to_real_output() -> Result<()> {
    if !ripgrep_installed().await {
        return Ok(());
    }
    let project = LeanProject::new()?;
    let body: String = (0..50)
        .map(|i| format!("def dup{} : Nat := {}\n", i, i))
        .collect();
    project.add_file("Demo/Many.lean", &body)?;

    let query = SearchQuery::new("dup", 3, Some(project.path()))?;
    let matches = engine(&project).search(&query).await?;

    let names: Vec<&str> = matches.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["dup0", "dup1", "dup2"]);
    Ok(())
}

#[tokio::test]
async fn test_no_matches_is_empty() -> Result<()> {
    if !ripgrep_installed().await {
        return Ok(());
    }
    let project = sample_project()?;
    let query = SearchQuery::new("nothingLikeThis", 10, Some(project.path()))?;

    assert!(engine(&project).search(&query).await?.is_empty());
    Ok(())
}
