use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "declgrep")]
#[command(author, version, about = "Declaration search for Lean projects, as a CLI and MCP server")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase stderr log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find theorems, lemmas, defs and other declarations by name
    Search {
        /// Name or name prefix, optionally namespace-qualified (e.g. `Nat.add`)
        query: String,

        /// Maximum number of results to return
        #[arg(short, long)]
        limit: Option<usize>,

        /// Project root (default: detected from the current directory)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Print results as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Start the MCP server on stdio
    Serve {
        /// Default project root for tool calls that do not name one
        #[arg(short, long)]
        root: Option<PathBuf>,
    },

    /// Check that ripgrep and the Lean toolchain can be found
    Doctor,

    /// Write a default .declgrep/config.toml in the current directory
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
}
