use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".declgrep";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Declaration search configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default number of results to return
    #[serde(default = "default_search_limit")]
    pub default_limit: usize,

    /// Globs a file must match to be searched
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,

    /// Globs excluded from the search (vendored packages are searched)
    #[serde(default = "default_exclude_globs")]
    pub exclude_globs: Vec<String>,

    /// Also search the Lean toolchain's bundled sources
    #[serde(default = "default_true")]
    pub include_toolchain_sources: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_search_limit(),
            include_globs: default_include_globs(),
            exclude_globs: default_exclude_globs(),
            include_toolchain_sources: true,
        }
    }
}

fn default_search_limit() -> usize {
    10
}

fn default_include_globs() -> Vec<String> {
    vec!["*.lean".to_string()]
}

fn default_exclude_globs() -> Vec<String> {
    vec![".git/**".to_string(), ".lake/build/**".to_string()]
}

fn default_true() -> bool {
    true
}

/// External executables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// ripgrep executable name or path
    #[serde(default = "default_rg_executable")]
    pub executable: String,

    /// Lean executable used to locate toolchain sources
    #[serde(default = "default_lean_executable")]
    pub lean_executable: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            executable: default_rg_executable(),
            lean_executable: default_lean_executable(),
        }
    }
}

fn default_rg_executable() -> String {
    "rg".to_string()
}

fn default_lean_executable() -> String {
    "lean".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write logs to rolling files
    #[serde(default)]
    pub enabled: bool,

    /// Write logs to stderr (never stdout; stdout carries MCP traffic)
    #[serde(default = "default_true")]
    pub stderr: bool,

    /// File log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory, relative to the project root unless absolute
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    /// Log file name prefix
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Rotation: minutely, hourly, daily, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stderr: true,
            level: default_log_level(),
            directory: default_log_directory(),
            file_prefix: default_file_prefix(),
            rotation: default_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> PathBuf {
    PathBuf::from(CONFIG_DIR).join("logs")
}

fn default_file_prefix() -> String {
    "declgrep.log".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Config {
    /// Load configuration from the .declgrep directory
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = Self::config_dir(root).join(CONFIG_FILE);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", config_path))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to the .declgrep directory
    pub fn save(&self, root: &Path) -> Result<()> {
        let config_dir = Self::config_dir(root);
        let config_path = config_dir.join(CONFIG_FILE);

        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the path to the .declgrep directory
    pub fn config_dir(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR)
    }

    /// Check if a configuration directory exists in the given directory
    pub fn is_initialized(root: &Path) -> bool {
        Self::config_dir(root).exists()
    }
}
