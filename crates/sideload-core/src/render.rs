//! # Render Entry Points
//!
//! The surface an outer rendering layer calls: resolve one entity or a
//! sequence of entities into `{root_view(s), linked_views}`.
//!
//! Both entry points run synchronously to completion with no internal
//! parallelism; isolation between independent renders comes from the
//! caller's own concurrency model, each render taking its own cache
//! context from the store.

use crate::cache::CacheStore;
use crate::collector::collect;
use crate::walker::{VisitedSet, Walker};
use crate::{Registry, SideloadError, TypeHandle, ViewRecord, Whitelist};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// RENDER OUTPUT
// =============================================================================

/// Output of [`Renderer::resolve_single`]: the root's view plus its
/// transitively-linked views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rendered {
    /// The root entity's view.
    pub result: ViewRecord,
    /// Side-loaded linked views, deduplicated, first occurrence first.
    pub links: Vec<ViewRecord>,
}

/// Output of [`Renderer::resolve_many`]: one view per root plus the linked
/// views of all roots combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedMany {
    /// One view per input root, in input order.
    pub result: Vec<ViewRecord>,
    /// Side-loaded linked views, deduplicated across all roots.
    pub links: Vec<ViewRecord>,
}

// =============================================================================
// RENDERER
// =============================================================================

/// Render orchestrator: one registry, one global cache configuration.
#[derive(Debug)]
pub struct Renderer<'a> {
    registry: &'a Registry,
    cache: &'a CacheStore,
}

impl<'a> Renderer<'a> {
    /// Create a renderer over the given registry and cache store.
    #[must_use]
    pub fn new(registry: &'a Registry, cache: &'a CacheStore) -> Self {
        Self { registry, cache }
    }

    /// Resolve a single root entity and its transitive links.
    pub fn resolve_single(
        &self,
        type_handle: &TypeHandle,
        entity: &Value,
        whitelist: &Whitelist,
    ) -> Result<Rendered, SideloadError> {
        let declarator = self
            .registry
            .get(type_handle)
            .ok_or_else(|| SideloadError::UnknownType(type_handle.clone()))?;
        let context = self.cache.create_context();
        let mut visited = VisitedSet::new();
        let walker = Walker::new(self.registry, context.as_ref(), whitelist);
        let produced = walker.walk(entity, type_handle, &mut visited)?;
        let links = collect([produced], whitelist);
        if let Some(context) = &context {
            context.clear();
        }
        Ok(Rendered {
            result: declarator.prepare_for_view(entity),
            links,
        })
    }

    /// Resolve a sequence of root entities with one shared visited set and
    /// one shared cache context, so cross-root duplicates cost one fetch
    /// and appear once.
    pub fn resolve_many(
        &self,
        type_handle: &TypeHandle,
        entities: &[Value],
        whitelist: &Whitelist,
    ) -> Result<RenderedMany, SideloadError> {
        let declarator = self
            .registry
            .get(type_handle)
            .ok_or_else(|| SideloadError::UnknownType(type_handle.clone()))?;
        let context = self.cache.create_context();
        let mut visited = VisitedSet::new();
        let walker = Walker::new(self.registry, context.as_ref(), whitelist);
        let mut groups = Vec::with_capacity(entities.len());
        for entity in entities {
            groups.push(walker.walk(entity, type_handle, &mut visited)?);
        }
        let links = collect(groups, whitelist);
        if let Some(context) = &context {
            context.clear();
        }
        Ok(RenderedMany {
            result: entities
                .iter()
                .map(|entity| declarator.prepare_for_view(entity))
                .collect(),
            links,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
