//! # Sideload Application Library
//!
//! Library surface of the sideload binary: fixture loading, configuration,
//! the HTTP API, and the CLI. The binary in `main.rs` is a thin shell over
//! this crate; integration tests exercise it through these modules.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod fixtures;

pub use error::AppError;
