//! Declaration search engine: compile, stream, extract, accumulate.

use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::accumulator::{Accepted, ResultAccumulator};
use super::backend::{decode_event, BackendInvocation, RipgrepBackend, SearchBackend};
use super::declaration::DeclarationMatch;
use super::error::SearchError;
use super::pattern::compile;
use super::availability::BackendStatus;
use super::toolchain::lean_source_dir;
use crate::config::{BackendConfig, SearchConfig};

/// A validated declaration search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    limit: usize,
    project_root: PathBuf,
}

impl SearchQuery {
    /// Validate and build a query.
    ///
    /// Surrounding whitespace is trimmed from `text`. When `project_root` is
    /// `None` the current working directory is used. The root is
    /// canonicalized.
    pub fn new(
        text: impl AsRef<str>,
        limit: usize,
        project_root: Option<&Path>,
    ) -> Result<Self, SearchError> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        if limit == 0 {
            return Err(SearchError::InvalidLimit);
        }

        let root = match project_root {
            Some(root) => root.to_path_buf(),
            None => std::env::current_dir().map_err(|e| SearchError::RootResolution {
                path: PathBuf::from("."),
                source: e,
            })?,
        };
        let project_root = resolve_root(&root)?;

        Ok(Self {
            text: text.to_string(),
            limit,
            project_root,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}

/// Resolve a project root to an existing, absolute, canonical directory.
pub fn resolve_root(root: &Path) -> Result<PathBuf, SearchError> {
    if !root.exists() {
        return Err(SearchError::MissingRoot {
            path: root.to_path_buf(),
        });
    }
    root.canonicalize().map_err(|e| SearchError::RootResolution {
        path: root.to_path_buf(),
        source: e,
    })
}

/// How a backend run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Clean exit, "no matches" exit, or early stop at the limit.
    Ok,
    /// The backend failed after some matches were collected.
    Degraded {
        exit_code: Option<i32>,
        stderr: String,
    },
    /// The backend failed without producing any matches.
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },
}

impl ScanOutcome {
    /// Classify a backend exit.
    ///
    /// Exit codes 0 (matches) and 1 (no matches) are clean. Any other exit,
    /// including death by signal, is an error that degrades to partial
    /// results when anything was collected. An early stop is always clean
    /// since the process was terminated on purpose.
    pub fn classify(
        exit_code: Option<i32>,
        stderr: String,
        collected: usize,
        stopped_early: bool,
    ) -> Self {
        if stopped_early {
            return Self::Ok;
        }
        match exit_code {
            Some(0) | Some(1) => Self::Ok,
            _ if collected > 0 => Self::Degraded { exit_code, stderr },
            _ => Self::Failed { exit_code, stderr },
        }
    }
}

/// Matches collected from one backend run, with how the run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendScan {
    pub matches: Vec<DeclarationMatch>,
    pub outcome: ScanOutcome,
}

/// Local declaration search over a project tree.
pub struct DeclarationSearch {
    backend: Arc<dyn SearchBackend>,
    config: SearchConfig,
    lean_executable: String,
    toolchain_sources: OnceCell<Option<PathBuf>>,
}

impl DeclarationSearch {
    /// Engine backed by ripgrep as configured.
    pub fn new(search: &SearchConfig, backend: &BackendConfig) -> Self {
        Self {
            backend: Arc::new(RipgrepBackend::new(backend.executable.clone())),
            config: search.clone(),
            lean_executable: backend.lean_executable.clone(),
            toolchain_sources: OnceCell::new(),
        }
    }

    /// Engine over an arbitrary backend.
    pub fn with_backend(backend: Arc<dyn SearchBackend>, config: SearchConfig) -> Self {
        Self {
            backend,
            config,
            lean_executable: BackendConfig::default().lean_executable,
            toolchain_sources: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Backend availability (memoized).
    pub async fn backend_status(&self) -> BackendStatus {
        self.backend.status().await
    }

    /// Check backend availability again.
    pub async fn refresh_backend_status(&self) -> BackendStatus {
        self.backend.refresh_status().await
    }

    /// Memoized availability, rechecked while it says unavailable so a
    /// backend installed mid-session is picked up by the next search.
    pub async fn ensure_backend(&self) -> BackendStatus {
        let status = self.backend.status().await;
        if status.available {
            return status;
        }
        let status = self.backend.refresh_status().await;
        if status.available {
            info!(backend = self.backend.name(), "Search backend became available");
        }
        status
    }

    /// Search and apply the partial-failure policy.
    ///
    /// A degraded run returns its partial results; a failed run is an error.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<DeclarationMatch>, SearchError> {
        let scan = self.scan(query).await?;
        match scan.outcome {
            ScanOutcome::Ok => Ok(scan.matches),
            ScanOutcome::Degraded { exit_code, stderr } => {
                warn!(
                    backend = self.backend.name(),
                    exit_code = ?exit_code,
                    stderr = %stderr.trim(),
                    returned = scan.matches.len(),
                    "Search backend failed; returning partial results"
                );
                Ok(scan.matches)
            }
            ScanOutcome::Failed { exit_code, stderr } => Err(SearchError::BackendFailed {
                backend: self.backend.name().to_string(),
                exit_code,
                stderr,
            }),
        }
    }

    /// Run one backend search and report matches with the raw outcome.
    pub async fn scan(&self, query: &SearchQuery) -> Result<BackendScan, SearchError> {
        let status = self.ensure_backend().await;
        if !status.available {
            return Err(SearchError::BackendUnavailable {
                remediation: status.remediation,
            });
        }

        let pattern = compile(query.text());
        let mut invocation =
            BackendInvocation::new(pattern, query.project_root().to_path_buf(), &self.config);
        if let Some(dir) = self.toolchain_source_dir().await {
            if !dir.starts_with(query.project_root()) {
                invocation = invocation.with_extra_path(dir);
            }
        }

        debug!(
            query = query.text(),
            limit = query.limit(),
            root = %query.project_root().display(),
            "Starting declaration search"
        );

        let run = self.backend.spawn(&invocation).await?;
        let mut lines = run.lines;
        let mut accumulator = ResultAccumulator::new(query.project_root(), query.limit());
        let mut stopped_early = false;
        let mut read_error = None;

        while let Some(line) = lines.next().await {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    read_error = Some(e);
                    break;
                }
            };
            let Some(event) = decode_event(&line) else {
                continue;
            };
            if accumulator.push(event) == Accepted::Yes && accumulator.is_full() {
                stopped_early = true;
                break;
            }
        }
        drop(lines);

        let exit = run
            .completion
            .wait(stopped_early || read_error.is_some())
            .await?;

        if let Some(e) = read_error {
            if accumulator.is_empty() {
                return Err(SearchError::Io(e));
            }
            warn!(error = %e, "Backend output ended unexpectedly");
            return Ok(BackendScan {
                outcome: ScanOutcome::Degraded {
                    exit_code: exit.code,
                    stderr: e.to_string(),
                },
                matches: accumulator.into_matches(),
            });
        }

        let outcome =
            ScanOutcome::classify(exit.code, exit.stderr, accumulator.len(), stopped_early);
        debug!(
            matches = accumulator.len(),
            exit_code = ?exit.code,
            stopped_early,
            "Declaration search finished"
        );

        Ok(BackendScan {
            matches: accumulator.into_matches(),
            outcome,
        })
    }

    async fn toolchain_source_dir(&self) -> Option<PathBuf> {
        if !self.config.include_toolchain_sources {
            return None;
        }
        self.toolchain_sources
            .get_or_init(|| lean_source_dir(&self.lean_executable))
            .await
            .clone()
    }
}
