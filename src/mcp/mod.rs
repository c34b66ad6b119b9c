//! MCP (Model Context Protocol) server for declgrep.
//!
//! Exposes declaration search to tool-calling clients as the
//! `lean_local_search` tool over stdio.
//!
//! ## Usage
//!
//! ```ignore
//! use declgrep::mcp::DeclgrepServer;
//!
//! let server = DeclgrepServer::new(engine, default_limit, project_root);
//! server.run().await?;
//! ```

mod server;

pub use server::{DeclgrepServer, LocalSearchRequest};
