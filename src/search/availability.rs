//! Backend availability check with platform-specific install guidance.

use std::process::Stdio;
use std::sync::RwLock;
use tokio::process::Command;
use tracing::debug;

/// Where ripgrep's installation instructions live.
pub const INSTALL_URL: &str = "https://github.com/BurntSushi/ripgrep#installation";

/// Result of looking for the backend executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStatus {
    /// Whether the executable could be launched
    pub available: bool,
    /// First line of `--version` output, when available
    pub version: Option<String>,
    /// Install guidance; empty when available
    pub remediation: String,
}

impl BackendStatus {
    pub fn available(version: Option<String>) -> Self {
        Self {
            available: true,
            version,
            remediation: String::new(),
        }
    }

    /// Status for a backend that is not installed on this platform.
    pub fn missing() -> Self {
        Self {
            available: false,
            version: None,
            remediation: remediation_message(std::env::consts::OS),
        }
    }
}

/// Check whether `executable` can be launched.
///
/// Runs `<executable> --version`; any failure to start the process counts as
/// unavailable. Has no side effects beyond that short-lived process.
pub async fn check_backend_available(executable: &str) -> BackendStatus {
    let output = Command::new(executable)
        .arg("--version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await;

    match output {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let version = stdout
                .lines()
                .next()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string);
            debug!(executable, version = ?version, "Search backend available");
            BackendStatus::available(version)
        }
        Err(e) => {
            debug!(executable, error = %e, "Search backend not found");
            BackendStatus::missing()
        }
    }
}

/// Install guidance for ripgrep on the given OS (`std::env::consts::OS` values).
pub fn remediation_message(os: &str) -> String {
    let install = match os {
        "windows" => {
            "  winget install BurntSushi.ripgrep.MSVC\n  choco install ripgrep\n  scoop install ripgrep"
        }
        "macos" => "  brew install ripgrep\n  sudo port install ripgrep",
        "linux" => {
            "  sudo apt-get install ripgrep    # Debian/Ubuntu\n  sudo dnf install ripgrep        # Fedora\n  sudo pacman -S ripgrep          # Arch"
        }
        _ => "  Check alternative installation methods.",
    };

    format!(
        "ripgrep (rg) was not found on your PATH. Local declaration search requires it.\n\n\
         Install it with:\n{}\n\n\
         See {} for more options, then retry the search.",
        install, INSTALL_URL
    )
}

/// Process-wide memo of a backend's availability.
///
/// The status is computed on first use and can be recomputed with
/// [`BackendAvailability::refresh`], e.g. after the user installs ripgrep.
pub struct BackendAvailability {
    executable: String,
    cached: RwLock<Option<BackendStatus>>,
}

impl BackendAvailability {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            cached: RwLock::new(None),
        }
    }

    /// Cached status, checked on first call.
    pub async fn status(&self) -> BackendStatus {
        let cached = self
            .cached
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match cached {
            Some(status) => status,
            None => self.refresh().await,
        }
    }

    /// Check again and replace the cached status.
    pub async fn refresh(&self) -> BackendStatus {
        let status = check_backend_available(&self.executable).await;
        *self.cached.write().unwrap_or_else(|e| e.into_inner()) = Some(status.clone());
        status
    }
}
