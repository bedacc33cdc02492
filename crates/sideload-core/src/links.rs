//! # Link Declarations
//!
//! The raw output of a declarator's `declare_links`: an ordered list of
//! `(type-handle, value)` entries, where each value is either materialized
//! JSON or a deferred producer.
//!
//! Declaration order is traversal order; the walker honors it depth-first.

use crate::TypeHandle;
use serde_json::Value;
use std::fmt;

// =============================================================================
// LINK VALUE
// =============================================================================

/// One declared link value.
///
/// An eager value carries any of the supported shapes directly: a single id
/// (number or string), a single entity-data object, or a sequence of either.
/// A deferred value is a zero-argument producer of the same shapes, run only
/// when the active whitelist names its link's type; an absent whitelist
/// drops it without evaluation, guarding against expensive unrequested
/// joins.
pub enum LinkValue {
    /// A value available immediately.
    Eager(Value),
    /// A producer run on demand.
    Deferred(Box<dyn FnOnce() -> Value>),
}

impl LinkValue {
    /// Evaluate to a concrete JSON value, running a deferred producer.
    #[must_use]
    pub fn force(self) -> Value {
        match self {
            Self::Eager(value) => value,
            Self::Deferred(producer) => producer(),
        }
    }

    /// Normalize a concrete value to a sequence of elements.
    ///
    /// `null` declares nothing, an array declares its elements, anything
    /// else declares a single element.
    #[must_use]
    pub fn normalize(value: Value) -> Vec<Value> {
        match value {
            Value::Null => Vec::new(),
            Value::Array(items) => items,
            other => vec![other],
        }
    }
}

impl fmt::Debug for LinkValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eager(value) => f.debug_tuple("Eager").field(value).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

// =============================================================================
// LINKS
// =============================================================================

/// An ordered set of link declarations for one entity.
#[derive(Debug, Default)]
pub struct Links {
    entries: Vec<(TypeHandle, LinkValue)>,
}

impl Links {
    /// An empty declaration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an eager link.
    #[must_use]
    pub fn link(mut self, type_handle: impl Into<TypeHandle>, value: Value) -> Self {
        self.entries
            .push((type_handle.into(), LinkValue::Eager(value)));
        self
    }

    /// Declare a deferred link.
    #[must_use]
    pub fn link_deferred(
        mut self,
        type_handle: impl Into<TypeHandle>,
        producer: impl FnOnce() -> Value + 'static,
    ) -> Self {
        self.entries
            .push((type_handle.into(), LinkValue::Deferred(Box::new(producer))));
        self
    }

    /// Append a declaration in place.
    pub fn push(&mut self, type_handle: TypeHandle, value: LinkValue) {
        self.entries.push((type_handle, value));
    }

    /// Number of declared entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume into `(type, value)` pairs in declaration order.
    #[must_use]
    pub fn into_entries(self) -> Vec<(TypeHandle, LinkValue)> {
        self.entries
    }
}

// =============================================================================
// TESTS
// =============================================================================
