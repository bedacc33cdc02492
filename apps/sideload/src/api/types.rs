//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API. Render
//! responses reuse the engine's own [`Rendered`]/[`RenderedMany`] shapes
//! directly, so only the surrounding envelope lives here.
//!
//! [`Rendered`]: sideload_core::Rendered
//! [`RenderedMany`]: sideload_core::RenderedMany

use serde::{Deserialize, Serialize};
use sideload_core::EntityId;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// TYPES RESPONSE
// =============================================================================

/// Registered entity types, in registry order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypesResponse {
    pub types: Vec<String>,
}

// =============================================================================
// RENDER REQUEST/QUERY
// =============================================================================

/// Batch render request: many ids of one type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderManyRequest {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub ids: Vec<EntityId>,
    /// Link whitelist. Absent means every non-deferred link; an empty list
    /// means no links at all.
    #[serde(default)]
    pub include: Option<Vec<String>>,
}

/// Query parameters for the single-render endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderQuery {
    pub include: Option<String>,
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// JSON error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
