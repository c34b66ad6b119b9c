//! Locates the Lean toolchain's bundled sources.
//!
//! Core declarations (`Nat.succ`, `List.map`, ...) live in the toolchain, not
//! in the project, so they are searched as an extra path when available.

use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Ask `lean --print-prefix` for the toolchain prefix and return
/// `<prefix>/src/lean` if that directory exists.
pub async fn lean_source_dir(lean_executable: &str) -> Option<PathBuf> {
    let output = Command::new(lean_executable)
        .arg("--print-prefix")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await;

    let output = match output {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            debug!(status = ?output.status.code(), "lean --print-prefix failed");
            return None;
        }
        Err(e) => {
            debug!(lean = lean_executable, error = %e, "Lean toolchain not found");
            return None;
        }
    };

    let prefix = String::from_utf8_lossy(&output.stdout).trim().to_string();
    source_dir_for_prefix(&prefix)
}

/// `<prefix>/src/lean`, if it is an existing directory.
pub fn source_dir_for_prefix(prefix: &str) -> Option<PathBuf> {
    if prefix.is_empty() {
        return None;
    }
    let dir = PathBuf::from(prefix).join("src").join("lean");
    if dir.is_dir() {
        debug!(dir = %dir.display(), "Found Lean toolchain sources");
        Some(dir)
    } else {
        None
    }
}
