//! # Innate Constants
//!
//! Hardcoded runtime constants for the sideload CORE.
//!
//! These are compiled into the binary and immutable at runtime; callers
//! override behavior through [`crate::CacheStore`], never by mutating these.

/// The entity-data field an identity is derived from.
///
/// Objects lacking this field fall back to a surrogate identity built from
/// their first key-value pair (see [`crate::EntityRef::from_data`]).
pub const ID_FIELD: &str = "id";

/// Default time-to-live for a cache context, in seconds.
///
/// Wall-clock from context creation, not sliding on access. A context is a
/// per-render scope, so the default only matters when a caller holds one
/// open far longer than a render should take.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
