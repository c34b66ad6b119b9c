//! Compiles a name fragment into a ripgrep regex over declaration headers.

use super::declaration::{header_prefix, keyword_alternation, IDENT_CHARS};

/// A search expression in the backend's regex dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendPattern(String);

impl BackendPattern {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BackendPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compile `query` into a pattern matching declaration headers whose name's
/// final dot-segment starts with it.
///
/// The query is matched literally and case-sensitively. A qualified query
/// such as `Nat.succ` matches any name that starts with it, including
/// further dotted continuations.
pub fn compile(query: &str) -> BackendPattern {
    let ident = IDENT_CHARS;
    let qualified = query.contains('.');

    let tail = if qualified {
        format!("[{ident}.]*")
    } else {
        format!("[{ident}]*")
    };

    let pattern = format!(
        r"{prefix}(?:{keywords})\s+(?:[{ident}]+\.)*{query}{tail}(?:[^{ident}.]|$)",
        prefix = header_prefix(),
        keywords = keyword_alternation(),
        query = regex::escape(query),
    );

    BackendPattern(pattern)
}
