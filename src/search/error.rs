//! Errors surfaced by declaration search.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while searching for declarations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The backend executable is not installed; carries install guidance.
    #[error("{remediation}")]
    BackendUnavailable { remediation: String },

    /// The query was empty after trimming.
    #[error("Search query must not be empty")]
    EmptyQuery,

    /// The limit was zero.
    #[error("Search limit must be at least 1")]
    InvalidLimit,

    /// The project root does not exist.
    #[error("Project root '{}' does not exist", path.display())]
    MissingRoot { path: PathBuf },

    /// The project root exists but could not be resolved.
    #[error("Failed to resolve project root {}: {source}", path.display())]
    RootResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backend process could not be started.
    #[error("Failed to start {backend}: {source}")]
    Spawn {
        backend: String,
        #[source]
        source: std::io::Error,
    },

    /// The backend reported an error and produced no usable results.
    #[error("{backend} exited with {}{}", exit_description(*exit_code), stderr_suffix(stderr))]
    BackendFailed {
        backend: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Reading backend output failed.
    #[error("I/O error while reading backend output: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}
