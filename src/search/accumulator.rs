//! Result accumulation and path normalization.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use super::backend::RawMatchEvent;
use super::declaration::{extract, DeclarationMatch};

/// What happened to an event handed to the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepted {
    /// A declaration was extracted and recorded
    Yes,
    /// The line held no declaration header
    Skipped,
    /// The limit was already reached; the event was discarded
    Full,
}

/// Collects declaration matches in arrival order up to a limit.
///
/// No sorting and no deduplication: identical names from different files
/// (or the same file) are all kept until the limit is reached.
#[derive(Debug)]
pub struct ResultAccumulator {
    root: PathBuf,
    limit: usize,
    matches: Vec<DeclarationMatch>,
}

impl ResultAccumulator {
    /// `root` must already be absolute and canonical.
    pub fn new(root: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            root: root.into(),
            limit,
            matches: Vec::with_capacity(limit.min(64)),
        }
    }

    pub fn push(&mut self, event: RawMatchEvent) -> Accepted {
        if self.is_full() {
            return Accepted::Full;
        }

        match extract(&event.line_text) {
            Some(declaration) => {
                self.matches.push(DeclarationMatch {
                    name: declaration.name,
                    kind: declaration.kind,
                    file: relativize(&event.file, &self.root),
                });
                Accepted::Yes
            }
            None => Accepted::Skipped,
        }
    }

    pub fn is_full(&self) -> bool {
        self.matches.len() >= self.limit
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn into_matches(self) -> Vec<DeclarationMatch> {
        self.matches
    }
}

/// Accumulate a finite sequence of events; see [`ResultAccumulator`].
pub fn accumulate<I>(events: I, limit: usize, root: &Path) -> Vec<DeclarationMatch>
where
    I: IntoIterator<Item = RawMatchEvent>,
{
    let mut accumulator = ResultAccumulator::new(root, limit);
    for event in events {
        if accumulator.push(event) == Accepted::Full {
            break;
        }
    }
    accumulator.into_matches()
}

/// Render `path` relative to `root` with `/` separators.
///
/// Relative paths are taken as relative to `root` already. Absolute paths
/// outside `root` are kept absolute.
pub fn relativize(path: &Path, root: &Path) -> String {
    let path = native_separators(path);

    if path.is_absolute() {
        if let Ok(rest) = path.strip_prefix(root) {
            return join_components(rest);
        }
        // The backend may report a non-canonical spelling of the root.
        if let Ok(canonical) = path.canonicalize() {
            if let Ok(rest) = canonical.strip_prefix(root) {
                return join_components(rest);
            }
        }
        return join_components(&path);
    }

    join_components(&path)
}

#[cfg(windows)]
fn native_separators(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().replace('/', "\\"))
}

#[cfg(not(windows))]
fn native_separators(path: &Path) -> PathBuf {
    path.to_path_buf()
}

fn join_components(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        let part = match component {
            Component::CurDir => continue,
            Component::RootDir => {
                out.push('/');
                continue;
            }
            Component::Prefix(prefix) => {
                out.push_str(&prefix.as_os_str().to_string_lossy());
                continue;
            }
            Component::ParentDir => Cow::Borrowed(".."),
            Component::Normal(part) => part.to_string_lossy(),
        };
        if !out.is_empty() && !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(&part);
    }
    out
}
