//! # sideload-core
//!
//! The link-graph resolution engine - THE LOGIC.
//!
//! This crate renders a primary entity plus its transitively-linked entities
//! for an API response: a recursive walker with visited-set cycle and
//! diamond suppression, whitelist-based pruning, and preloaded-vs-fetch
//! resolution, coupled to the request-scoped memoizing cache it deduplicates
//! entity fetches through. The walker's at-most-once-fetch guarantee depends
//! entirely on the cache's scoping and the visited-set discipline, so the
//! two live in one crate.
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Is pure Rust: no async, no network dependencies
//! - Is deterministic: `BTreeMap`/`BTreeSet` only, no `HashMap`
//! - Runs one traversal synchronously to completion; isolation between
//!   renders comes from the caller's own concurrency model
//! - Owns no wire format: output is in-memory [`ViewRecord`]s for a
//!   downstream serializer

// =============================================================================
// MODULES
// =============================================================================

pub mod cache;
pub mod collector;
pub mod declarator;
pub mod links;
pub mod primitives;
pub mod render;
pub mod types;
pub mod walker;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{EntityId, EntityRef, SideloadError, TypeHandle, ViewRecord, Whitelist};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use cache::{
    CacheBackend, CacheContext, CacheError, CacheKey, CacheStore, CachedEntity, MemoryBackend,
    Operation, fetch,
};
pub use collector::collect;
pub use declarator::{EntityDeclarator, Registry};
pub use links::{LinkValue, Links};
pub use render::{Rendered, RenderedMany, Renderer};
pub use walker::{VisitedSet, Walker};
