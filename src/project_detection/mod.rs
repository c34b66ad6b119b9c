//! Lean project root detection.
//!
//! When a search names no project root, the root is found by walking up from
//! the working directory until a directory holds one of the markers in
//! [`DEFAULT_MARKERS`]:
//!
//! 1. `.declgrep` (created by `declgrep init`)
//! 2. `lakefile.lean` / `lakefile.toml`
//! 3. `lean-toolchain` / `lake-manifest.json`
//! 4. `.git`
//!
//! If nothing is found the working directory itself is used.
//!
//! # Example
//!
//! ```no_run
//! use declgrep::project_detection::resolve_project_root;
//!
//! let root = resolve_project_root(None).unwrap();
//! println!("Searching {}", root.display());
//! ```

mod detector;
mod markers;

pub use detector::{
    resolve_project_root, DetectedProject, DetectionError, ProjectDetector, MAX_TRAVERSAL_DEPTH,
};
pub use markers::{ProjectMarker, ProjectType, DEFAULT_MARKERS};
