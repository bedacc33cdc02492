//! # Core Type Definitions
//!
//! This module contains all core types for the sideload engine:
//! - Entity identity (`TypeHandle`, `EntityId`, `EntityRef`)
//! - Output structure (`ViewRecord`)
//! - Link filtering (`Whitelist`)
//! - Error types (`SideloadError`)
//!
//! ## Determinism Guarantees
//!
//! All types here implement `Ord` so visited sets and cache maps can use
//! `BTreeSet`/`BTreeMap` for deterministic ordering.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

// =============================================================================
// TYPE HANDLE
// =============================================================================

/// Opaque token naming an entity's kind.
///
/// A type-handle keys the declarator registry and, together with an id,
/// forms the unique identity of an entity across the whole graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeHandle(pub String);

impl TypeHandle {
    /// Create a new type-handle from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeHandle {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TypeHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// =============================================================================
// ENTITY ID
// =============================================================================

/// An entity's identifier: an integer or a string.
///
/// Serialized untagged, so `1` and `"1"` round-trip as themselves (and are
/// distinct identities).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// Integer identifier.
    Int(i64),
    /// String identifier.
    Str(String),
}

impl EntityId {
    /// Extract an identifier from a JSON scalar.
    ///
    /// Integers and strings are identifiers; everything else (objects,
    /// arrays, booleans, floats, null) is not.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().map(Self::Int),
            serde_json::Value::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

// =============================================================================
// ENTITY REFERENCE
// =============================================================================

/// The unique identity of an entity across the whole graph:
/// `(type-handle, id)`.
///
/// This is the element type of the visited set and the dedup key of the
/// result collector.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityRef {
    /// The entity's kind.
    pub type_handle: TypeHandle,
    /// The entity's identifier.
    pub id: EntityId,
}

impl EntityRef {
    /// Create a new entity reference.
    #[must_use]
    pub fn new(type_handle: TypeHandle, id: EntityId) -> Self {
        Self { type_handle, id }
    }

    /// Derive the identity of an entity-data object.
    ///
    /// The `"id"` field wins when present. Objects without one fall back to
    /// a surrogate identity built from their first key-value pair; this
    /// mirrors documented upstream behavior and can mask bugs in entity
    /// data, so it is kept deliberately narrow: non-objects and empty
    /// objects have no identity at all (and therefore declare no links).
    #[must_use]
    pub fn from_data(type_handle: &TypeHandle, data: &serde_json::Value) -> Option<Self> {
        let map = data.as_object()?;
        if let Some(id) = map.get(crate::primitives::ID_FIELD).and_then(EntityId::from_json) {
            return Some(Self::new(type_handle.clone(), id));
        }
        let (key, value) = map.iter().next()?;
        Some(Self::new(
            type_handle.clone(),
            EntityId::Str(format!("{key}:{value}")),
        ))
    }
}

// =============================================================================
// VIEW RECORD
// =============================================================================

/// The finalized output node for one entity.
///
/// The core never interprets `data`; it is an arbitrary projection owned by
/// the entity's declarator, handed as-is to a downstream serializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRecord {
    /// The entity's identifier.
    pub id: EntityId,
    /// The entity's kind.
    #[serde(rename = "type")]
    pub type_handle: TypeHandle,
    /// The declarator's projection of the entity data.
    pub data: serde_json::Value,
}

impl ViewRecord {
    /// Create a new view record.
    #[must_use]
    pub fn new(type_handle: TypeHandle, id: EntityId, data: serde_json::Value) -> Self {
        Self {
            id,
            type_handle,
            data,
        }
    }

    /// The record's `(type, id)` identity, used for deduplication.
    #[must_use]
    pub fn reference(&self) -> EntityRef {
        EntityRef::new(self.type_handle.clone(), self.id.clone())
    }
}

// =============================================================================
// WHITELIST
// =============================================================================

/// The set of link types a render surfaces.
///
/// - `All` (no list given): every non-deferred link is kept; deferred
///   producers are dropped without being evaluated.
/// - `Only(set)`: only listed types are kept; deferred producers for listed
///   types are evaluated. An empty set keeps nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Whitelist {
    /// No list was given: keep all non-deferred links.
    #[default]
    All,
    /// Keep only the listed types; empty keeps none.
    Only(BTreeSet<TypeHandle>),
}

impl Whitelist {
    /// Whitelist naming exactly the given types.
    #[must_use]
    pub fn only<I, T>(types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeHandle>,
    {
        Self::Only(types.into_iter().map(Into::into).collect())
    }

    /// The empty whitelist: no links are surfaced.
    #[must_use]
    pub fn none() -> Self {
        Self::Only(BTreeSet::new())
    }

    /// Whether records of `type_handle` may appear in the output.
    #[must_use]
    pub fn allows(&self, type_handle: &TypeHandle) -> bool {
        match self {
            Self::All => true,
            Self::Only(set) => set.contains(type_handle),
        }
    }

    /// Whether `type_handle` was named explicitly.
    ///
    /// Deferred link values are evaluated only for explicitly named types;
    /// `All` never selects, so unrequested expensive joins never run.
    #[must_use]
    pub fn selects(&self, type_handle: &TypeHandle) -> bool {
        matches!(self, Self::Only(set) if set.contains(type_handle))
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while resolving a render.
///
/// - A resolver returning nothing is NOT an error (no record, no recursion)
/// - A resolver fault propagates untouched and aborts the whole traversal
/// - Cache backend faults never appear here; they fail open as misses
#[derive(Debug, Error)]
pub enum SideloadError {
    /// No declarator is registered for the requested type.
    #[error("Unknown entity type: {0}")]
    UnknownType(TypeHandle),

    /// A declarator's resolver failed. The cache layer neither converts
    /// nor retries this; it aborts the traversal.
    #[error("Resolver failed for {type_handle}/{id}: {reason}")]
    Resolver {
        /// The type whose resolver failed.
        type_handle: TypeHandle,
        /// The identifier being resolved.
        id: EntityId,
        /// Backend-supplied failure description.
        reason: String,
    },

    /// An identifier failed to decode at the external obfuscation boundary.
    ///
    /// Produced by declarators; the core propagates it through its entry
    /// points without reinterpreting the reason.
    #[error("Identifier decoding failed: {reason}")]
    IdDecode {
        /// Why the identifier could not be decoded.
        reason: String,
    },
}

// =============================================================================
// TESTS
// =============================================================================
