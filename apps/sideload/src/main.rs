//! # Sideload - Link-Graph Resolution Server
//!
//! The main binary for the sideload engine.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for rendering entities from a fixture file
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │              apps/sideload (THE BINARY)            │
//! │                                                    │
//! │   ┌─────────────┐          ┌─────────────┐         │
//! │   │    CLI      │          │  HTTP API   │         │
//! │   │   (clap)    │          │   (axum)    │         │
//! │   └──────┬──────┘          └──────┬──────┘         │
//! │          │                        │                │
//! │          └────────────┬───────────┘                │
//! │                       ▼                            │
//! │              ┌────────────────┐                    │
//! │              │ sideload-core  │                    │
//! │              │  (THE LOGIC)   │                    │
//! │              └────────────────┘                    │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! sideload serve --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! sideload types
//! sideload render post 1 --include user,team
//! ```

use clap::Parser;
use sideload::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — SIDELOAD_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("SIDELOAD_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sideload=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the sideload startup banner.
fn print_banner() {
    println!(
        r#"
  sideload v{}

  link-graph resolution engine
"#,
        env!("CARGO_PKG_VERSION")
    );
}
