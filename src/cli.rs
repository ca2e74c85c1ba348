//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Look up book metadata by ISBN.
///
/// Answers from the local catalog database when the book is stored there,
/// and from the public online catalog otherwise.
#[derive(Parser, Debug)]
#[command(name = "bookinfo")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: <config_dir>/bookinfo/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file, overriding `database.path`
    #[arg(long, value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Operations.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print a book from the local catalog, crawling the online catalog on a miss
    Get {
        /// ISBN to look up
        isbn: String,
    },

    /// Print a book from the online catalog without touching the database
    Crawl {
        /// ISBN to look up
        isbn: String,
    },

    /// Store a JSON book record with its copy's unique code and tags
    Put {
        /// JSON file to read (stdin when omitted)
        file: Option<PathBuf>,
    },
}
