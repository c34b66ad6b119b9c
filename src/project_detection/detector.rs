//! Project root detection by walking up the directory tree.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

use super::markers::{ProjectMarker, ProjectType, DEFAULT_MARKERS};

/// Maximum number of directories to traverse upward.
pub const MAX_TRAVERSAL_DEPTH: usize = 100;

/// Errors that can occur during project detection.
#[derive(Error, Debug)]
pub enum DetectionError {
    /// No project root was found after traversing the directory tree.
    #[error("No project root found from {starting_dir}")]
    NoProjectRoot { starting_dir: PathBuf },

    /// The working directory could not be determined.
    #[error("Cannot determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    /// Failed to canonicalize a path.
    #[error("Path canonicalization failed for {path}: {source}")]
    Canonicalization {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of successful project detection.
#[derive(Debug, Clone)]
pub struct DetectedProject {
    /// Canonical path to project root
    pub root: PathBuf,
    /// The marker that identified this project
    pub marker: &'static ProjectMarker,
    pub project_type: ProjectType,
}

impl DetectedProject {
    pub fn marker_name(&self) -> &'static str {
        self.marker.name
    }

    /// Whether the root carries vendored Lake packages.
    pub fn has_vendored_packages(&self) -> bool {
        self.root.join(".lake").join("packages").is_dir()
    }
}

/// Detects project roots by traversing up the directory tree.
///
/// At each level the markers are tried in priority order; the first
/// directory with any marker is the root.
pub struct ProjectDetector {
    markers: &'static [ProjectMarker],
    max_depth: usize,
}

impl Default for ProjectDetector {
    fn default() -> Self {
        Self {
            markers: DEFAULT_MARKERS,
            max_depth: MAX_TRAVERSAL_DEPTH,
        }
    }
}

impl ProjectDetector {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            markers: DEFAULT_MARKERS,
            max_depth,
        }
    }

    /// Detect the project root starting from `starting_dir`.
    pub fn detect(&self, starting_dir: &Path) -> Result<DetectedProject, DetectionError> {
        debug!(starting_dir = %starting_dir.display(), "Starting project detection");

        let canonical =
            starting_dir
                .canonicalize()
                .map_err(|e| DetectionError::Canonicalization {
                    path: starting_dir.to_path_buf(),
                    source: e,
                })?;

        let mut current = canonical.as_path();
        for depth in 0..self.max_depth {
            trace!(depth, current_dir = %current.display(), "Checking directory for markers");

            if let Some(marker) = self.marker_in(current) {
                debug!(
                    root = %current.display(),
                    marker = marker.name,
                    project_type = %marker.project_type,
                    "Found project marker"
                );
                return Ok(DetectedProject {
                    root: current.to_path_buf(),
                    marker,
                    project_type: marker.project_type,
                });
            }

            match current.parent() {
                Some(parent) if parent != current => current = parent,
                _ => {
                    trace!("Reached filesystem root without finding project marker");
                    break;
                }
            }
        }

        Err(DetectionError::NoProjectRoot {
            starting_dir: starting_dir.to_path_buf(),
        })
    }

    /// Highest-priority marker present directly in `dir`.
    fn marker_in(&self, dir: &Path) -> Option<&'static ProjectMarker> {
        let mut present: Vec<&'static ProjectMarker> = self
            .markers
            .iter()
            .filter(|marker| {
                let path = dir.join(marker.name);
                match path.try_exists() {
                    Ok(exists) => exists,
                    Err(e) => {
                        trace!(path = %path.display(), error = %e, "Could not check marker");
                        false
                    }
                }
            })
            .collect();
        present.sort_by_key(|m| m.priority);
        present.into_iter().next()
    }
}

/// Pick the project root for a request.
///
/// An explicit root is returned untouched; validating that it exists belongs
/// to the search layer so the error names the path the caller gave. Without
/// one, the root is detected from the working directory, falling back to the
/// working directory itself when no marker is found.
pub fn resolve_project_root(explicit: Option<&Path>) -> Result<PathBuf, DetectionError> {
    if let Some(root) = explicit {
        return Ok(root.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(DetectionError::CurrentDir)?;
    detect_or_fallback(&ProjectDetector::default(), &cwd)
}

fn detect_or_fallback(
    detector: &ProjectDetector,
    start: &Path,
) -> Result<PathBuf, DetectionError> {
    match detector.detect(start) {
        Ok(project) => Ok(project.root),
        Err(DetectionError::NoProjectRoot { .. }) => {
            debug!(dir = %start.display(), "No project marker found, using directory as root");
            start
                .canonicalize()
                .map_err(|e| DetectionError::Canonicalization {
                    path: start.to_path_buf(),
                    source: e,
                })
        }
        Err(e) => Err(e),
    }
}
