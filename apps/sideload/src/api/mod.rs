//! # Sideload HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /types` - List registered entity types
//! - `GET /render/{type}/{id}?include=a,b` - Render one entity with links
//! - `POST /render` - Render a batch of entities of one type
//!
//! The `include` query parameter is the link whitelist: absent means every
//! non-deferred link, empty means no links at all, and a comma-separated
//! list restricts output to the named types (evaluating deferred links to
//! them on the way).

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `sideload::api::*`)
#[allow(unused_imports)]
pub use handlers::{health_handler, parse_include, render_handler, render_many_handler, types_handler};
#[allow(unused_imports)]
pub use types::{ErrorResponse, HealthResponse, RenderManyRequest, RenderQuery, TypesResponse};

use crate::config::AppConfig;
use crate::error::AppError;
use axum::{
    Router,
    routing::{get, post},
};
use sideload_core::{CacheStore, Registry};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the type registry and the cache settings.
///
/// The registry is immutable after startup, so plain `Arc` sharing is
/// enough; each render creates its own request-scoped cache context from
/// the store.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub cache: CacheStore,
}

impl AppState {
    /// Create new app state from a loaded registry and cache settings.
    #[must_use]
    pub fn new(registry: Registry, cache: CacheStore) -> Self {
        Self {
            registry: Arc::new(registry),
            cache,
        }
    }
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
pub fn create_router(state: AppState, cors_permissive: bool) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/types", get(handlers::types_handler))
        .route("/render/{entity_type}/{id}", get(handlers::render_handler))
        .route("/render", post(handlers::render_many_handler));

    if cors_permissive {
        tracing::warn!("CORS: allowing ALL origins. This is insecure for production!");
        router = router.layer(CorsLayer::permissive());
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run it until the process exits.
pub async fn run_server(config: &AppConfig, registry: Registry) -> Result<(), AppError> {
    let state = AppState::new(registry, config.cache_store());
    let router = create_router(state, config.server.cors_permissive);
    let addr = config.bind_addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Io(format!("bind failed: {e}")))?;

    tracing::info!("sideload HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| AppError::Io(format!("server error: {e}")))
}
