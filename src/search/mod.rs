//! Local declaration search over Lean sources.
//!
//! This module contains:
//! - `availability` - Backend availability check with install guidance
//! - `pattern` - Query compilation into a ripgrep regex
//! - `backend` - Backend process launch and JSON event decoding
//! - `declaration` - Keyword table and declaration header extraction
//! - `accumulator` - Result limiting and path normalization
//! - `toolchain` - Lean toolchain source discovery
//! - `engine` - The search pipeline tying these together
//!
//! ## Usage
//!
//! ```ignore
//! use declgrep::search::{DeclarationSearch, SearchQuery};
//!
//! let engine = DeclarationSearch::new(&config.search, &config.backend);
//! let query = SearchQuery::new("add_comm", 10, Some(project_root))?;
//! for m in engine.search(&query).await? {
//!     println!("{} {} {}", m.kind, m.name, m.file);
//! }
//! ```

pub mod accumulator;
pub mod availability;
pub mod backend;
pub mod declaration;
mod engine;
mod error;
pub mod pattern;
pub mod toolchain;

// Re-export commonly used types
pub use accumulator::{accumulate, relativize, ResultAccumulator};
pub use availability::{check_backend_available, BackendAvailability, BackendStatus};
pub use backend::{
    decode_event, BackendInvocation, RawMatchEvent, RipgrepBackend, ScriptedBackend,
    SearchBackend,
};
pub use declaration::{extract, DeclarationKind, DeclarationMatch, DECLARATION_KEYWORDS};
pub use engine::{resolve_root, BackendScan, DeclarationSearch, ScanOutcome, SearchQuery};
pub use error::SearchError;
pub use pattern::{compile, BackendPattern};
