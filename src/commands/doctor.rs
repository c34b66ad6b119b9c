//! Doctor command implementation.
//!
//! Reports whether the search backend and the Lean toolchain can be found,
//! and which project root a search from here would use.

use anyhow::{bail, Result};
use std::env;

use crate::project_detection::ProjectDetector;
use crate::search::check_backend_available;
use crate::search::toolchain::lean_source_dir;
use crate::Config;

pub async fn run() -> Result<()> {
    let cwd = env::current_dir()?;

    let (root, config) = match ProjectDetector::default().detect(&cwd) {
        Ok(project) => {
            println!("Project root: {}", project.root.display());
            println!("Project type: {} ({})", project.project_type, project.marker_name());
            if !project.project_type.is_lean() {
                println!("  no lakefile or lean-toolchain at this root; only its .lean files are searched");
            }
            if project.has_vendored_packages() {
                println!("Vendored packages: .lake/packages");
            }
            let config = Config::load(&project.root)?;
            (project.root, config)
        }
        Err(e) => {
            println!("No project detected: {}", e);
            println!("Searches will use the current directory: {}", cwd.display());
            let config = Config::load(&cwd)?;
            (cwd, config)
        }
    };

    println!(
        "Configuration: {}",
        if Config::is_initialized(&root) {
            "local (.declgrep/config.toml)"
        } else {
            "defaults"
        }
    );
    println!();

    let backend = check_backend_available(&config.backend.executable).await;
    if backend.available {
        println!(
            "✓ ripgrep: {}",
            backend.version.as_deref().unwrap_or(&config.backend.executable)
        );
    } else {
        println!("✗ ripgrep: not found ({})", config.backend.executable);
    }

    if config.search.include_toolchain_sources {
        match lean_source_dir(&config.backend.lean_executable).await {
            Some(dir) => println!("✓ Lean toolchain sources: {}", dir.display()),
            None => println!(
                "✗ Lean toolchain sources: not found via '{} --print-prefix' \
                 (core declarations will not be searched)",
                config.backend.lean_executable
            ),
        }
    } else {
        println!("- Lean toolchain sources: disabled in configuration");
    }

    if !backend.available {
        println!();
        bail!("{}", backend.remediation);
    }

    Ok(())
}
