//! Shell scripts that impersonate ripgrep for subprocess tests.

use anyhow::Result;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use declgrep::config::BackendConfig;
use declgrep::search::ScriptedBackend;

/// A fake `rg` executable that prints canned JSON lines, writes canned
/// stderr and exits with a fixed code. Each run records its arguments and
/// working directory next to the script.
pub struct FakeRg {
    dir: TempDir,
    lines: Vec<String>,
    exit_code: i32,
    stderr: String,
    hang: bool,
}

impl FakeRg {
    pub fn new(exit_code: i32) -> Self {
        Self {
            dir: TempDir::new().expect("temp dir for fake rg"),
            lines: Vec::new(),
            exit_code,
            stderr: String::new(),
            hang: false,
        }
    }

    pub fn with_match(mut self, path: &str, line: &str) -> Self {
        self.lines.push(ScriptedBackend::match_event(path, line));
        self
    }

    pub fn with_line(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self
    }

    /// Keep running after printing, until killed.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Write the script and return its path.
    pub fn install(&self) -> Result<PathBuf> {
        let dir = self.dir.path();
        let mut script = String::from("#!/bin/sh\n");
        script.push_str(
            "if [ \"$1\" = \"--version\" ]; then echo \"ripgrep 14.1.0 (fake)\"; exit 0; fi\n",
        );
        script.push_str(&format!(
            "printf '%s\\n' \"$@\" > '{}'\n",
            dir.join("args.txt").display()
        ));
        script.push_str(&format!("pwd -P > '{}'\n", dir.join("cwd.txt").display()));
        if !self.lines.is_empty() {
            script.push_str("cat <<'DECLGREP_EOF'\n");
            for line in &self.lines {
                script.push_str(line);
                script.push('\n');
            }
            script.push_str("DECLGREP_EOF\n");
        }
        if !self.stderr.is_empty() {
            script.push_str(&format!("echo '{}' >&2\n", self.stderr));
        }
        if self.hang {
            script.push_str("exec sleep 30\n");
        }
        script.push_str(&format!("exit {}\n", self.exit_code));

        let path = dir.join("rg");
        std::fs::write(&path, script)?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }

    pub fn backend_config(&self) -> Result<BackendConfig> {
        Ok(BackendConfig {
            executable: self.install()?.display().to_string(),
            lean_executable: "declgrep-no-such-lean".to_string(),
        })
    }

    /// Arguments of the last run, one per line.
    pub fn recorded_args(&self) -> Vec<String> {
        read_lines(&self.dir.path().join("args.txt"))
    }

    /// Working directory of the last run.
    pub fn recorded_cwd(&self) -> Option<PathBuf> {
        read_lines(&self.dir.path().join("cwd.txt"))
            .into_iter()
            .next()
            .map(PathBuf::from)
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
