//! # Entity Declarator Interface
//!
//! The per-type contract the walker consumes, plus the registry mapping
//! type-handle to declarator instance.

use crate::{EntityId, Links, SideloadError, TypeHandle, ViewRecord};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// DECLARATOR TRAIT
// =============================================================================

/// The per-type contract: fetch-by-id, link declaration, view projection.
///
/// # Extension Point
///
/// This trait is intentionally defined without in-crate implementations.
/// Each entity type in the host application supplies one and registers it
/// in a [`Registry`]; the core calls these, it never implements them.
/// Implementations must be `Send + Sync` so one registry can back
/// concurrent renders.
pub trait EntityDeclarator: Send + Sync {
    /// The type-handle this declarator serves.
    fn type_name(&self) -> TypeHandle;

    /// Fetch entity data by id.
    ///
    /// `Ok(None)` means the entity does not exist and is not an error: the
    /// walker produces no record and no recursion for it. An `Err` aborts
    /// the whole traversal.
    fn get_by_id(&self, id: &EntityId) -> Result<Option<Value>, SideloadError>;

    /// Declare the entity's links, in output order.
    fn declare_links(&self, entity: &Value) -> Links;

    /// Project entity data into its finalized output record.
    fn prepare_for_view(&self, entity: &Value) -> ViewRecord;
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Registry mapping type-handle to declarator instance.
///
/// Immutable after startup in the intended usage; `BTreeMap` keeps
/// [`Registry::type_names`] deterministic.
#[derive(Default)]
pub struct Registry {
    declarators: BTreeMap<TypeHandle, Box<dyn EntityDeclarator>>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declarator under its own `type_name`.
    ///
    /// The last registration for a handle wins.
    pub fn register(&mut self, declarator: Box<dyn EntityDeclarator>) {
        self.declarators.insert(declarator.type_name(), declarator);
    }

    /// Look up the declarator for a handle.
    #[must_use]
    pub fn get(&self, type_handle: &TypeHandle) -> Option<&dyn EntityDeclarator> {
        self.declarators.get(type_handle).map(Box::as_ref)
    }

    /// Whether a handle is registered.
    #[must_use]
    pub fn contains(&self, type_handle: &TypeHandle) -> bool {
        self.declarators.contains_key(type_handle)
    }

    /// Registered handles in deterministic order.
    #[must_use]
    pub fn type_names(&self) -> Vec<TypeHandle> {
        self.declarators.keys().cloned().collect()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.type_names())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
