//! Markers that identify the root of a Lean project.

/// A file or directory whose presence marks a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMarker {
    /// Name of the marker file or directory
    pub name: &'static str,
    /// Priority (lower = checked first within a directory)
    pub priority: u8,
    /// Project type this marker indicates
    pub project_type: ProjectType,
}

impl ProjectMarker {
    pub const fn new(name: &'static str, priority: u8, project_type: ProjectType) -> Self {
        Self {
            name,
            priority,
            project_type,
        }
    }
}

/// Kind of project root that was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectType {
    /// A Lake package (`lakefile.lean` or `lakefile.toml`)
    Lake,
    /// A directory pinned to a Lean toolchain without a lakefile
    Toolchain,
    /// Git repository without Lean markers
    Git,
    /// Explicitly initialized with `declgrep init`
    Initialized,
}

impl ProjectType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Lake => "Lake package",
            Self::Toolchain => "Lean toolchain directory",
            Self::Git => "Git repository",
            Self::Initialized => "declgrep project",
        }
    }

    /// Whether the marker implies Lean sources live under this root.
    pub fn is_lean(&self) -> bool {
        matches!(self, Self::Lake | Self::Toolchain)
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Default markers in priority order.
///
/// An initialized `.declgrep` directory wins, then Lake's own files, then
/// version control.
pub const DEFAULT_MARKERS: &[ProjectMarker] = &[
    ProjectMarker::new(".declgrep", 0, ProjectType::Initialized),
    ProjectMarker::new("lakefile.lean", 1, ProjectType::Lake),
    ProjectMarker::new("lakefile.toml", 1, ProjectType::Lake),
    ProjectMarker::new("lean-toolchain", 2, ProjectType::Toolchain),
    ProjectMarker::new("lake-manifest.json", 2, ProjectType::Lake),
    ProjectMarker::new(".git", 5, ProjectType::Git),
];
