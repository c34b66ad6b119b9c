use anyhow::{bail, Result};
use std::env;
use std::path::Path;
use tracing::info;

use crate::Config;

pub async fn run(force: bool) -> Result<()> {
    let root = env::current_dir()?;
    init_at(&root, force)?;

    println!(
        "✓ Created {} with default configuration",
        Config::config_dir(&root).display()
    );
    println!("\nNext steps:");
    println!("  1. Edit .declgrep/config.toml to adjust globs or executables");
    println!("  2. Run 'declgrep doctor' to check that ripgrep and Lean are found");
    println!("  3. Run 'declgrep serve' from your MCP client configuration");

    Ok(())
}

/// Write the default configuration under `root`.
pub fn init_at(root: &Path, force: bool) -> Result<()> {
    if Config::is_initialized(root) && !force {
        bail!(
            "declgrep is already initialized in {:?} (use --force to overwrite)",
            Config::config_dir(root)
        );
    }

    Config::default().save(root)?;
    info!("Initialized declgrep in {:?}", Config::config_dir(root));
    Ok(())
}
