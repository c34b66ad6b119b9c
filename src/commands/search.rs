use anyhow::Result;
use std::path::Path;

use crate::project_detection::resolve_project_root;
use crate::search::{DeclarationMatch, DeclarationSearch, SearchQuery};
use crate::Config;

/// Run the search command
///
/// Resolves the project root (explicit or detected), loads that project's
/// configuration and prints the matching declarations.
pub async fn run(query: &str, limit: Option<usize>, root: Option<&Path>, json: bool) -> Result<()> {
    let root = resolve_project_root(root)?;
    let config = Config::load(&root)?;
    let limit = limit.unwrap_or(config.search.default_limit);

    let engine = DeclarationSearch::new(&config.search, &config.backend);
    let query = SearchQuery::new(query, limit, Some(root.as_path()))?;
    let matches = engine.search(&query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No declarations found matching: {}", query.text());
        return Ok(());
    }

    println!(
        "Found {} declaration(s) for \"{}\" in {}\n",
        matches.len(),
        query.text(),
        query.project_root().display()
    );
    println!("{}", format_matches(&matches));

    Ok(())
}

/// One line per match: kind, name, file, with kind and name aligned.
fn format_matches(matches: &[DeclarationMatch]) -> String {
    let name_width = matches.iter().map(|m| m.name.len()).max().unwrap_or(0);

    matches
        .iter()
        .map(|m| {
            format!(
                "{:<9} {:<width$}  {}",
                m.kind.keyword(),
                m.name,
                m.file,
                width = name_width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
