//! # Application Errors
//!
//! Error type for everything the binary does around the engine: file I/O,
//! fixture parsing, configuration. Engine errors pass through unchanged so
//! the API layer can map them to status codes variant by variant.

use sideload_core::SideloadError;
use thiserror::Error;

// =============================================================================
// APPLICATION ERROR
// =============================================================================

/// Top-level error for the sideload binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Filesystem failure while reading config or fixtures.
    #[error("io error: {0}")]
    Io(String),

    /// The fixture file exists but is not a valid fixture set.
    #[error("fixture error: {0}")]
    Fixture(String),

    /// The config file exists but is not valid TOML config.
    #[error("config error: {0}")]
    Config(String),

    /// An engine fault surfaced by a render operation.
    #[error("engine error: {0}")]
    Engine(#[from] SideloadError),
}
