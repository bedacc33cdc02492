//! # Link Graph Walker
//!
//! Recursive traversal producing the transitive closure of linked entities:
//! visited-set cycle and diamond suppression, whitelist-based pruning, and
//! preloaded-vs-fetch resolution through the memoizing cache.
//!
//! Ordering: depth-first, per-declaration order at each entity. The visited
//! set guarantees each distinct `(type, id)` is expanded at most once per
//! traversal, which is what makes cyclic link graphs terminate.

use crate::cache::{self, CacheContext, CacheKey};
use crate::{
    EntityId, EntityRef, LinkValue, Registry, SideloadError, TypeHandle, ViewRecord, Whitelist,
};
use serde_json::Value;
use std::collections::BTreeSet;

/// Per-traversal set of entity identities already processed.
///
/// Monotonically grows, never shrinks, and is shared across every element
/// of a sequence root - that sharing is what lets N siblings referencing
/// the same entity produce exactly one fetch and one output record.
pub type VisitedSet = BTreeSet<EntityRef>;

// =============================================================================
// WALKER
// =============================================================================

/// One traversal's configuration: the registry to consult, the cache
/// context fetches are deduplicated through, and the active whitelist.
///
/// The context is threaded explicitly as a value; nested recursion reuses
/// the same context rather than re-deriving it from ambient state.
pub struct Walker<'a> {
    registry: &'a Registry,
    context: Option<&'a CacheContext>,
    whitelist: &'a Whitelist,
}

impl<'a> Walker<'a> {
    /// Create a walker over the given registry, context, and whitelist.
    #[must_use]
    pub fn new(
        registry: &'a Registry,
        context: Option<&'a CacheContext>,
        whitelist: &'a Whitelist,
    ) -> Self {
        Self {
            registry,
            context,
            whitelist,
        }
    }

    /// Walk a root - a single entity-data object or a sequence of them -
    /// and return every linked view record, depth-first in declaration
    /// order. The root's own view is not included; that belongs to the
    /// render entry point.
    pub fn walk(
        &self,
        root: &Value,
        type_handle: &TypeHandle,
        visited: &mut VisitedSet,
    ) -> Result<Vec<ViewRecord>, SideloadError> {
        match root {
            Value::Array(items) => {
                let mut records = Vec::new();
                for item in items {
                    records.extend(self.walk_entity(item, type_handle, visited)?);
                }
                Ok(records)
            }
            single => self.walk_entity(single, type_handle, visited),
        }
    }

    /// Expand one entity's declared links.
    fn walk_entity(
        &self,
        data: &Value,
        type_handle: &TypeHandle,
        visited: &mut VisitedSet,
    ) -> Result<Vec<ViewRecord>, SideloadError> {
        // Entities with no extractable identity declare nothing.
        let Some(reference) = EntityRef::from_data(type_handle, data) else {
            return Ok(Vec::new());
        };
        // The cycle and diamond breaker: each identity is expanded once.
        if !visited.insert(reference) {
            return Ok(Vec::new());
        }
        let declarator = self
            .registry
            .get(type_handle)
            .ok_or_else(|| SideloadError::UnknownType(type_handle.clone()))?;

        let mut records = Vec::new();
        for (target, value) in declarator.declare_links(data).into_entries() {
            // Whitelist pruning. Deferred producers run only for explicitly
            // selected types; an absent list drops them unevaluated.
            let selected = match self.whitelist {
                Whitelist::All => match value {
                    LinkValue::Eager(eager) => Some(eager),
                    LinkValue::Deferred(_) => None,
                },
                Whitelist::Only(_) => self.whitelist.selects(&target).then(|| value.force()),
            };
            let Some(selected) = selected else { continue };
            for element in LinkValue::normalize(selected) {
                self.walk_element(&target, &element, visited, &mut records)?;
            }
        }
        Ok(records)
    }

    /// Resolve one element of a normalized link sequence.
    fn walk_element(
        &self,
        target: &TypeHandle,
        element: &Value,
        visited: &mut VisitedSet,
        records: &mut Vec<ViewRecord>,
    ) -> Result<(), SideloadError> {
        match element {
            // Preloaded association: the resolver is never consulted.
            Value::Object(_) => {
                let Some(reference) = EntityRef::from_data(target, element) else {
                    return Ok(());
                };
                if visited.contains(&reference) {
                    return Ok(());
                }
                let declarator = self
                    .registry
                    .get(target)
                    .ok_or_else(|| SideloadError::UnknownType(target.clone()))?;
                records.push(declarator.prepare_for_view(element));
                records.extend(self.walk_entity(element, target, visited)?);
                Ok(())
            }
            // Bare id: resolve through the memoizing cache.
            other => {
                let Some(id) = EntityId::from_json(other) else {
                    // Non-map, non-id values are a silent no-op.
                    return Ok(());
                };
                let reference = EntityRef::new(target.clone(), id.clone());
                if visited.contains(&reference) {
                    return Ok(());
                }
                let declarator = self
                    .registry
                    .get(target)
                    .ok_or_else(|| SideloadError::UnknownType(target.clone()))?;
                let key = CacheKey::get_by_id(target, &id);
                let fetched = cache::fetch(self.context, &key, || declarator.get_by_id(&id))?;
                // An unresolved fetch yields no record and no recursion.
                let Some(data) = fetched else {
                    return Ok(());
                };
                records.push(declarator.prepare_for_view(&data));
                records.extend(self.walk_entity(&data, target, visited)?);
                Ok(())
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
