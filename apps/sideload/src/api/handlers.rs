//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers. Each render
//! handler fetches the root entity through its declarator, runs the engine,
//! and maps engine faults to status codes.

use super::{
    AppState,
    types::{ErrorResponse, HealthResponse, RenderManyRequest, RenderQuery, TypesResponse},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use sideload_core::{EntityId, Renderer, SideloadError, TypeHandle, Whitelist};

// =============================================================================
// WHITELIST / ID PARSING
// =============================================================================

/// Parse the `include` query parameter into a whitelist.
///
/// Absent means every non-deferred link. Present but empty means no links
/// at all. Otherwise a comma-separated list of type names.
#[must_use]
pub fn parse_include(include: Option<&str>) -> Whitelist {
    match include {
        None => Whitelist::All,
        Some("") => Whitelist::none(),
        Some(list) => Whitelist::only(
            list.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty()),
        ),
    }
}

/// Parse a path segment into an entity id: integer when it parses, string
/// otherwise.
fn parse_id(raw: &str) -> EntityId {
    match raw.parse::<i64>() {
        Ok(n) => EntityId::Int(n),
        Err(_) => EntityId::Str(raw.to_string()),
    }
}

/// Map an engine fault to an HTTP response.
///
/// Id-decode faults carry a caller-visible reason, so they surface as 422
/// with the reason passed through untouched. Resolver faults are internal.
fn engine_error(err: SideloadError) -> Response {
    let status = match &err {
        SideloadError::UnknownType(_) => StatusCode::BAD_REQUEST,
        SideloadError::IdDecode { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SideloadError::Resolver { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse::new(err.to_string()))).into_response()
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// TYPES HANDLER
// =============================================================================

/// List registered entity types.
pub async fn types_handler(State(state): State<AppState>) -> impl IntoResponse {
    let types = state
        .registry
        .type_names()
        .into_iter()
        .map(|handle| handle.as_str().to_string())
        .collect();
    Json(TypesResponse { types })
}

// =============================================================================
// RENDER HANDLERS
// =============================================================================

/// Render one entity with its transitive links.
pub async fn render_handler(
    State(state): State<AppState>,
    Path((entity_type, id)): Path<(String, String)>,
    Query(query): Query<RenderQuery>,
) -> Response {
    let type_handle = TypeHandle::new(entity_type);
    let whitelist = parse_include(query.include.as_deref());
    let id = parse_id(&id);

    let entity = match fetch_root(&state, &type_handle, &id) {
        Ok(Some(entity)) => entity,
        Ok(None) => return not_found(&type_handle, &id),
        Err(response) => return response,
    };

    let renderer = Renderer::new(state.registry.as_ref(), &state.cache);
    match renderer.resolve_single(&type_handle, &entity, &whitelist) {
        Ok(rendered) => (StatusCode::OK, Json(rendered)).into_response(),
        Err(err) => engine_error(err),
    }
}

/// Render a batch of entities of one type.
pub async fn render_many_handler(
    State(state): State<AppState>,
    Json(request): Json<RenderManyRequest>,
) -> Response {
    let type_handle = TypeHandle::new(request.entity_type);
    let whitelist = match &request.include {
        None => Whitelist::All,
        Some(types) => Whitelist::only(types.iter().map(String::as_str)),
    };

    let mut entities = Vec::with_capacity(request.ids.len());
    for id in &request.ids {
        match fetch_root(&state, &type_handle, id) {
            Ok(Some(entity)) => entities.push(entity),
            Ok(None) => return not_found(&type_handle, id),
            Err(response) => return response,
        }
    }

    let renderer = Renderer::new(state.registry.as_ref(), &state.cache);
    match renderer.resolve_many(&type_handle, &entities, &whitelist) {
        Ok(rendered) => (StatusCode::OK, Json(rendered)).into_response(),
        Err(err) => engine_error(err),
    }
}

/// Fetch a root entity through its declarator.
///
/// An unknown root type is the caller naming a resource that does not
/// exist, so it maps to 404 here rather than the 400 used for unknown
/// types encountered mid-traversal.
fn fetch_root(
    state: &AppState,
    type_handle: &TypeHandle,
    id: &EntityId,
) -> Result<Option<Value>, Response> {
    let Some(declarator) = state.registry.get(type_handle) else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!(
                "unknown entity type '{type_handle}'"
            ))),
        )
            .into_response());
    };
    declarator.get_by_id(id).map_err(engine_error)
}

fn not_found(type_handle: &TypeHandle, id: &EntityId) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(format!(
            "no {type_handle} with id {id}"
        ))),
    )
        .into_response()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_include_is_all() {
        assert!(matches!(parse_include(None), Whitelist::All));
    }

    #[test]
    fn empty_include_is_nothing() {
        let whitelist = parse_include(Some(""));
        assert!(!whitelist.allows(&TypeHandle::new("user")));
    }

    #[test]
    fn include_list_splits_and_trims() {
        let whitelist = parse_include(Some("user, team"));
        assert!(whitelist.allows(&TypeHandle::new("user")));
        assert!(whitelist.allows(&TypeHandle::new("team")));
        assert!(!whitelist.allows(&TypeHandle::new("post")));
    }

    #[test]
    fn numeric_segment_is_integer_id() {
        assert_eq!(parse_id("42"), EntityId::Int(42));
        assert_eq!(parse_id("-7"), EntityId::Int(-7));
    }

    #[test]
    fn other_segments_are_string_ids() {
        assert_eq!(parse_id("alice"), EntityId::Str("alice".to_string()));
        assert_eq!(parse_id("4x"), EntityId::Str("4x".to_string()));
    }
}
