use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use declgrep::cli::{Cli, Commands};
use declgrep::config::Config;
use declgrep::logging::{init_early_logging, init_logging};
use declgrep::project_detection::resolve_project_root;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let explicit_root = match &cli.command {
        Commands::Search { root, .. } | Commands::Serve { root } => root.clone(),
        Commands::Doctor | Commands::Init { .. } => None,
    };
    let project_root = resolve_project_root(explicit_root.as_deref())
        .unwrap_or_else(|_| PathBuf::from("."));

    // The guard MUST be held until program exit to ensure logs are flushed.
    // With an unreadable config, fall back to default stderr logging; the
    // command reloads the config and reports the error itself.
    let _logging_guard = match Config::load(&project_root) {
        Ok(config) => {
            let guard = init_logging(&config.logging, &project_root, cli.verbose)?;
            tracing::debug!("Loaded configuration from: {}", project_root.display());
            Some(guard)
        }
        Err(e) => {
            init_early_logging();
            tracing::warn!("{:#}", e);
            None
        }
    };

    match cli.command {
        Commands::Search {
            query,
            limit,
            root,
            json,
        } => {
            declgrep::commands::search::run(&query, limit, root.as_deref(), json).await?;
        }
        Commands::Serve { root } => {
            declgrep::commands::serve::run(root.as_deref()).await?;
        }
        Commands::Doctor => {
            declgrep::commands::doctor::run().await?;
        }
        Commands::Init { force } => {
            declgrep::commands::init::run(force).await?;
        }
    }

    Ok(())
}
