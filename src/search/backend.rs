//! Text-search backend: process launch and JSON event decoding.
//!
//! The backend is modeled as a producer of a lazy stream of output lines plus
//! a completion handle that yields the exit status once the stream is done
//! (or abandoned).

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde::Deserialize;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::LinesStream;
use tracing::{debug, trace};

use super::error::SearchError;
use super::pattern::BackendPattern;
use super::availability::{BackendAvailability, BackendStatus};
use crate::config::SearchConfig;

/// Everything needed to launch one backend search.
#[derive(Debug, Clone)]
pub struct BackendInvocation {
    /// Compiled search expression
    pub pattern: BackendPattern,
    /// Working directory of the backend process
    pub root: PathBuf,
    /// Extra search paths beyond the root itself
    pub extra_paths: Vec<PathBuf>,
    /// Globs a file must match to be searched
    pub include_globs: Vec<String>,
    /// Globs excluded from the search
    pub exclude_globs: Vec<String>,
}

impl BackendInvocation {
    pub fn new(pattern: BackendPattern, root: PathBuf, config: &SearchConfig) -> Self {
        Self {
            pattern,
            root,
            extra_paths: Vec::new(),
            include_globs: config.include_globs.clone(),
            exclude_globs: config.exclude_globs.clone(),
        }
    }

    /// Add a search path outside the project root.
    pub fn with_extra_path(mut self, path: PathBuf) -> Self {
        self.extra_paths.push(path);
        self
    }

    /// Command-line arguments for ripgrep.
    pub fn ripgrep_args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "--json",
            "--no-config",
            "--no-ignore",
            "--hidden",
            "--case-sensitive",
            "--color",
            "never",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        for glob in &self.include_globs {
            args.push("-g".to_string());
            args.push(glob.clone());
        }
        for glob in &self.exclude_globs {
            args.push("-g".to_string());
            args.push(format!("!{}", glob));
        }

        args.push("-e".to_string());
        args.push(self.pattern.as_str().to_string());
        args.push("--".to_string());
        args.push(".".to_string());
        for path in &self.extra_paths {
            args.push(path.display().to_string());
        }
        args
    }
}

/// Exit information of a finished backend process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendExit {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    /// Collected standard error output
    pub stderr: String,
}

/// Lazy sequence of raw output lines.
pub type LineStream = BoxStream<'static, io::Result<String>>;

/// Completion side of a running backend.
#[async_trait]
pub trait BackendCompletion: Send {
    /// Wait for the process to exit. When `abandon` is set the remaining
    /// output is unwanted and the process is terminated first.
    async fn wait(self: Box<Self>, abandon: bool) -> io::Result<BackendExit>;
}

/// A launched backend search.
pub struct BackendRun {
    pub lines: LineStream,
    pub completion: Box<dyn BackendCompletion>,
}

/// A line-oriented recursive text-search executable.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Human-readable backend name used in errors and logs.
    fn name(&self) -> &str;

    /// Whether the backend can be launched, with remediation when it can't.
    async fn status(&self) -> BackendStatus;

    /// Recompute a cached availability status.
    async fn refresh_status(&self) -> BackendStatus {
        self.status().await
    }

    /// Launch a search.
    async fn spawn(&self, invocation: &BackendInvocation) -> Result<BackendRun, SearchError>;
}

/// ripgrep launched as a child process.
pub struct RipgrepBackend {
    executable: String,
    availability: BackendAvailability,
}

impl RipgrepBackend {
    pub fn new(executable: impl Into<String>) -> Self {
        let executable = executable.into();
        Self {
            availability: BackendAvailability::new(executable.clone()),
            executable,
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }
}

impl Default for RipgrepBackend {
    fn default() -> Self {
        Self::new("rg")
    }
}

#[async_trait]
impl SearchBackend for RipgrepBackend {
    fn name(&self) -> &str {
        "ripgrep"
    }

    async fn status(&self) -> BackendStatus {
        self.availability.status().await
    }

    async fn refresh_status(&self) -> BackendStatus {
        self.availability.refresh().await
    }

    async fn spawn(&self, invocation: &BackendInvocation) -> Result<BackendRun, SearchError> {
        let args = invocation.ripgrep_args();
        debug!(
            executable = %self.executable,
            cwd = %invocation.root.display(),
            pattern = %invocation.pattern,
            "Launching ripgrep"
        );

        let mut child = Command::new(&self.executable)
            .args(&args)
            .current_dir(&invocation.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SearchError::Spawn {
                backend: self.executable.clone(),
                source: e,
            })?;

        let stdout = child.stdout.take().ok_or_else(|| SearchError::Spawn {
            backend: self.executable.clone(),
            source: io::Error::new(io::ErrorKind::Other, "failed to capture stdout"),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| SearchError::Spawn {
            backend: self.executable.clone(),
            source: io::Error::new(io::ErrorKind::Other, "failed to capture stderr"),
        })?;

        // Drain stderr concurrently so a chatty backend can't block on a full pipe.
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = BufReader::new(stderr).read_to_string(&mut buf).await;
            buf
        });

        let lines = LinesStream::new(BufReader::new(stdout).lines()).boxed();

        Ok(BackendRun {
            lines,
            completion: Box::new(ProcessCompletion { child, stderr_task }),
        })
    }
}

struct ProcessCompletion {
    child: Child,
    stderr_task: JoinHandle<String>,
}

#[async_trait]
impl BackendCompletion for ProcessCompletion {
    async fn wait(mut self: Box<Self>, abandon: bool) -> io::Result<BackendExit> {
        if abandon {
            // The process may already have exited on its own.
            let _ = self.child.start_kill();
        }
        let status = self.child.wait().await?;
        let stderr = self.stderr_task.await.unwrap_or_default();
        Ok(BackendExit {
            code: status.code(),
            stderr,
        })
    }
}

/// A `match` event from the backend: one source line and the file it is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatchEvent {
    /// Path as reported by the backend, absolute or root-relative
    pub file: PathBuf,
    /// The matching line, without its terminator
    pub line_text: String,
}

#[derive(Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct MatchData {
    path: ArbitraryData,
    lines: ArbitraryData,
}

/// ripgrep encodes data as `{"text": ...}` or, for non-UTF-8, `{"bytes": ...}`.
#[derive(Deserialize)]
struct ArbitraryData {
    #[serde(default)]
    text: Option<String>,
}

/// Decode one line of ripgrep `--json` output.
///
/// Returns `None` for non-match events, undecodable lines, and matches whose
/// path or text is not valid UTF-8.
pub fn decode_event(line: &str) -> Option<RawMatchEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let envelope: EventEnvelope = match serde_json::from_str(line) {
        Ok(envelope) => envelope,
        Err(e) => {
            trace!(error = %e, "Skipping undecodable backend line");
            return None;
        }
    };
    if envelope.kind != "match" {
        return None;
    }

    let data: MatchData = match envelope.data.map(serde_json::from_value) {
        Some(Ok(data)) => data,
        Some(Err(e)) => {
            trace!(error = %e, "Skipping malformed match event");
            return None;
        }
        None => return None,
    };

    let file = data.path.text?;
    let text = data.lines.text?;
    Some(RawMatchEvent {
        file: PathBuf::from(file),
        line_text: text.trim_end_matches(['\n', '\r']).to_string(),
    })
}

/// Backend replaying canned output, for tests and dry runs.
///
/// Records every invocation it receives. Availability behaves like a memo:
/// `status` reports the last checked answer and only `refresh_status` picks
/// up an [`install`](ScriptedBackend::install).
pub struct ScriptedBackend {
    lines: Vec<String>,
    exit_code: Option<i32>,
    stderr: String,
    installed: AtomicBool,
    reported_available: AtomicBool,
    invocations: Mutex<Vec<BackendInvocation>>,
}

impl ScriptedBackend {
    /// Replay `lines` and exit with `exit_code`.
    pub fn new(lines: Vec<String>, exit_code: Option<i32>) -> Self {
        Self {
            lines,
            exit_code,
            stderr: String::new(),
            installed: AtomicBool::new(true),
            reported_available: AtomicBool::new(true),
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    /// Report the backend as not installed.
    pub fn unavailable(self) -> Self {
        self.installed.store(false, Ordering::SeqCst);
        self.reported_available.store(false, Ordering::SeqCst);
        self
    }

    /// Make the backend launchable; visible after the next refresh.
    pub fn install(&self) {
        self.installed.store(true, Ordering::SeqCst);
    }

    /// Invocations received so far.
    pub fn invocations(&self) -> Vec<BackendInvocation> {
        self.invocations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Serialize a ripgrep `match` event for `path` and `line`.
    pub fn match_event(path: &str, line: &str) -> String {
        serde_json::json!({
            "type": "match",
            "data": {
                "path": {"text": path},
                "lines": {"text": format!("{}\n", line)},
            },
        })
        .to_string()
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn status(&self) -> BackendStatus {
        if self.reported_available.load(Ordering::SeqCst) {
            BackendStatus::available(None)
        } else {
            BackendStatus::missing()
        }
    }

    async fn refresh_status(&self) -> BackendStatus {
        let installed = self.installed.load(Ordering::SeqCst);
        self.reported_available.store(installed, Ordering::SeqCst);
        self.status().await
    }

    async fn spawn(&self, invocation: &BackendInvocation) -> Result<BackendRun, SearchError> {
        self.invocations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(invocation.clone());

        let lines = stream::iter(self.lines.clone().into_iter().map(Ok)).boxed();
        Ok(BackendRun {
            lines,
            completion: Box::new(ScriptedCompletion {
                exit: BackendExit {
                    code: self.exit_code,
                    stderr: self.stderr.clone(),
                },
            }),
        })
    }
}

struct ScriptedCompletion {
    exit: BackendExit,
}

#[async_trait]
impl BackendCompletion for ScriptedCompletion {
    async fn wait(self: Box<Self>, _abandon: bool) -> io::Result<BackendExit> {
        Ok(self.exit)
    }
}
