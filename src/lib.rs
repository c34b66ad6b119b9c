pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod mcp;
pub mod project_detection;
pub mod search;

pub use config::Config;
pub use search::{DeclarationKind, DeclarationMatch, DeclarationSearch, SearchError, SearchQuery};
