//! CLI command definitions for the debug/maintenance surface.
//!
//! This is a thin operator tool over the same `core::storage::Storage` the
//! MCP server drives; it exists for scripting and local debugging, not as
//! the primary interface (see spec.md §6.1 — the protocol is the product).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bandvault")]
#[command(about = "Local music-collection indexing service")]
#[command(
    long_about = "Scans band/album folders under a root directory, classifies their structure and compliance against the library's naming conventions, reconciles against stored metadata, and answers queries."
)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Show version information
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the music root for bands and albums and update the collection index.
    Scan {
        /// Path to the music collection root.
        root: PathBuf,
        /// Re-scan every band regardless of mtime.
        #[arg(long)]
        full: bool,
        #[arg(long)]
        json: bool,
    },
    /// List bands from the collection index.
    List {
        root: PathBuf,
        /// Case-insensitive substring match on band name.
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 50)]
        page_size: usize,
        #[arg(long)]
        json: bool,
    },
    /// Validate a prospective metadata change for a band without writing it.
    Validate {
        root: PathBuf,
        band_name: String,
        #[arg(long)]
        json: bool,
    },
    /// Search albums across the collection.
    Search {
        root: PathBuf,
        #[arg(long)]
        band: Option<String>,
        #[arg(long)]
        album: Option<String>,
        #[arg(long)]
        missing_only: bool,
        #[arg(long)]
        json: bool,
    },
    /// Compute collection-wide analytics.
    Analyze {
        root: PathBuf,
        #[arg(long)]
        json: bool,
    },
}
