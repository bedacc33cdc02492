//! # Sideload CLI Module
//!
//! This module implements the CLI interface for sideload.
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP server
//! - `render` - Render one entity with its links to stdout
//! - `types` - List entity types in the fixture file

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::execute;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Sideload - link-graph resolution engine
///
/// Renders an entity together with the transitive closure of its linked
/// entities, deduplicated, from a JSON fixture file.
#[derive(Parser, Debug)]
#[command(name = "sideload")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the fixture file (overrides the config)
    #[arg(short, long, global = true)]
    pub fixtures: Option<PathBuf>,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Serve {
        /// Host to bind to (overrides the config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Render one entity with its links to stdout
    Render {
        /// Entity type
        entity_type: String,

        /// Entity id (integer or string)
        id: String,

        /// Comma-separated link whitelist; omit for every non-deferred
        /// link, pass an empty string for none
        #[arg(short, long)]
        include: Option<String>,
    },

    /// List entity types in the fixture file
    Types,
}
