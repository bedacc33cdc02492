//! # Cache Store
//!
//! Per-render, time-bounded key-value memoization with a global
//! enable/disable switch.
//!
//! One [`CacheContext`] is one render's memoization scope: it is created at
//! the start of a render (or not at all, when caching is disabled), threaded
//! explicitly through the traversal as a value - never looked up from
//! ambient state - and released when the render ends or its TTL elapses.
//!
//! ## Failure Semantics
//!
//! Backend faults fail open: a failed read is a miss, a failed write is
//! discarded, and neither ever reaches the caller. Producer errors are the
//! caller's own and propagate unstored; the cache layer neither converts
//! nor retries them.

use crate::primitives::DEFAULT_CACHE_TTL_SECS;
use crate::{EntityId, SideloadError, TypeHandle};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;

/// A memoized resolver result.
///
/// `None` records that the resolver found nothing, so even absent entities
/// are resolved at most once per context lifetime.
pub type CachedEntity = Option<Value>;

// =============================================================================
// CACHE KEYS
// =============================================================================

/// The operation component of a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    /// Fetch-by-id through a declarator.
    GetById,
}

/// Key for one memoized operation: `(type-handle, operation, id)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CacheKey {
    /// The entity type being operated on.
    pub type_handle: TypeHandle,
    /// The operation kind.
    pub op: Operation,
    /// The identifier the operation targets.
    pub id: EntityId,
}

impl CacheKey {
    /// Key for a fetch-by-id.
    #[must_use]
    pub fn get_by_id(type_handle: &TypeHandle, id: &EntityId) -> Self {
        Self {
            type_handle: type_handle.clone(),
            op: Operation::GetById,
            id: id.clone(),
        }
    }
}

// =============================================================================
// BACKEND
// =============================================================================

/// Errors a cache backend may raise.
///
/// These never escape this module: every backend fault is logged and
/// treated as a miss.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A stored value could not be read.
    #[error("cache read failed: {0}")]
    Read(String),
    /// A value could not be stored.
    #[error("cache write failed: {0}")]
    Write(String),
}

/// Storage seam for one context's memoized values.
///
/// The in-crate implementation is [`MemoryBackend`]; the seam exists so
/// tests can inject faults and hosts can swap in an external store.
pub trait CacheBackend {
    /// Look up a stored value. `Ok(None)` is a miss.
    fn read(&self, key: &CacheKey) -> Result<Option<CachedEntity>, CacheError>;

    /// Store a value under a key, overwriting any previous entry.
    fn write(&self, key: &CacheKey, value: CachedEntity) -> Result<(), CacheError>;

    /// Drop every stored value.
    fn clear(&self) -> Result<(), CacheError>;
}

/// In-memory backend.
///
/// `BTreeMap` for deterministic ordering; `RefCell` because a context is
/// confined to one logical flow.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RefCell<BTreeMap<CacheKey, CachedEntity>>,
}

impl MemoryBackend {
    /// Create a new empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheBackend for MemoryBackend {
    fn read(&self, key: &CacheKey) -> Result<Option<CachedEntity>, CacheError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &CacheKey, value: CachedEntity) -> Result<(), CacheError> {
        self.entries.borrow_mut().insert(key.clone(), value);
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.entries.borrow_mut().clear();
        Ok(())
    }
}

// =============================================================================
// ERROR LOGGING HELPER
// =============================================================================

/// Log a backend fault and convert the result to a miss.
///
/// The CORE stays off the `tracing` dependency; the app layer owns proper
/// logging and can redirect stderr if needed.
fn log_and_miss<T>(result: Result<T, CacheError>, context: &str) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            eprintln!(
                "{{\"level\":\"warn\",\"target\":\"sideload_core::cache\",\"message\":\"cache fault in {}: {}\"}}",
                context, e
            );
            None
        }
    }
}

// =============================================================================
// CACHE CONTEXT
// =============================================================================

/// One render's memoization scope.
///
/// Bound to a fixed wall-clock TTL from creation (not sliding on access).
/// Past the deadline every lookup is a miss; there is no distinction
/// between "expired" and "never seen".
///
/// A context is `!Sync` by construction: the default backend uses
/// `RefCell`, and the walker threads `&CacheContext` through one
/// synchronous flow. "Producer invoked at most once per key" therefore
/// cannot be raced - sharing a context across threads is a compile error,
/// not a runtime hazard. Concurrent renders each take their own context.
pub struct CacheContext {
    backend: Box<dyn CacheBackend>,
    created_at: Instant,
    ttl: Duration,
}

impl CacheContext {
    /// Context over the in-memory backend.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_backend(Box::new(MemoryBackend::new()), ttl)
    }

    /// Context over a caller-supplied backend.
    #[must_use]
    pub fn with_backend(backend: Box<dyn CacheBackend>, ttl: Duration) -> Self {
        Self {
            backend,
            created_at: Instant::now(),
            ttl,
        }
    }

    /// Whether the context's deadline has passed.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }

    /// Release the context's stored values eagerly. Idempotent; backend
    /// faults are swallowed.
    pub fn clear(&self) {
        let _ = log_and_miss(self.backend.clear(), "clear");
    }
}

impl fmt::Debug for CacheContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheContext")
            .field("created_at", &self.created_at)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// CACHE STORE
// =============================================================================

/// Global cache configuration: the enable switch and per-context TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStore {
    enabled: bool,
    ttl: Duration,
}

impl CacheStore {
    /// Create a store with an explicit switch and TTL.
    #[must_use]
    pub fn new(enabled: bool, ttl: Duration) -> Self {
        Self { enabled, ttl }
    }

    /// Allocate a new memoization scope with its TTL starting now, or
    /// `None` when caching is globally disabled.
    #[must_use]
    pub fn create_context(&self) -> Option<CacheContext> {
        self.enabled.then(|| CacheContext::new(self.ttl))
    }

    /// Whether caching is globally enabled.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for CacheStore {
    /// Caching on, [`DEFAULT_CACHE_TTL_SECS`] TTL.
    fn default() -> Self {
        Self::new(true, Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }
}

// =============================================================================
// FETCH
// =============================================================================

/// Memoizing fetch.
///
/// Without a context the producer always runs (no memoization). With one,
/// the first call for a key runs the producer and stores its result; later
/// calls inside the TTL are served from the store without invoking the
/// producer. Backend faults fail open as misses. A producer error
/// propagates unstored.
pub fn fetch<F>(
    context: Option<&CacheContext>,
    key: &CacheKey,
    producer: F,
) -> Result<CachedEntity, SideloadError>
where
    F: FnOnce() -> Result<CachedEntity, SideloadError>,
{
    let Some(context) = context else {
        return producer();
    };
    if context.expired() {
        // Past the deadline nothing is served and nothing stored would
        // ever be servable again, so skip the backend entirely.
        return producer();
    }
    if let Some(Some(stored)) = log_and_miss(context.backend.read(key), "read") {
        return Ok(stored);
    }
    let produced = producer()?;
    let _ = log_and_miss(context.backend.write(key, produced.clone()), "write");
    Ok(produced)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn key(id: i64) -> CacheKey {
        CacheKey::get_by_id(&TypeHandle::new("user"), &EntityId::Int(id))
    }

    fn long_ttl() -> CacheContext {
        CacheContext::new(Duration::from_secs(3600))
    }

    #[test]
    fn first_fetch_invokes_then_serves_from_store() {
        let context = long_ttl();
        let calls = Cell::new(0u32);
        for _ in 0..3 {
            let value = fetch(Some(&context), &key(1), || {
                calls.set(calls.get() + 1);
                Ok(Some(json!({"id": 1})))
            })
            .expect("fetch");
            assert_eq!(value, Some(json!({"id": 1})));
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn absent_context_always_invokes() {
        let calls = Cell::new(0u32);
        for _ in 0..3 {
            let _ = fetch(None, &key(1), || {
                calls.set(calls.get() + 1);
                Ok(None)
            })
            .expect("fetch");
        }
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn distinct_keys_are_distinct_entries() {
        let context = long_ttl();
        let calls = Cell::new(0u32);
        for id in [1, 2, 1, 2] {
            let _ = fetch(Some(&context), &key(id), || {
                calls.set(calls.get() + 1);
                Ok(Some(json!(id)))
            })
            .expect("fetch");
        }
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn absent_results_are_memoized_too() {
        let context = long_ttl();
        let calls = Cell::new(0u32);
        for _ in 0..2 {
            let value = fetch(Some(&context), &key(9), || {
                calls.set(calls.get() + 1);
                Ok(None)
            })
            .expect("fetch");
            assert_eq!(value, None);
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn expired_context_behaves_as_fresh_miss() {
        let context = CacheContext::new(Duration::ZERO);
        let calls = Cell::new(0u32);
        for _ in 0..2 {
            let _ = fetch(Some(&context), &key(1), || {
                calls.set(calls.get() + 1);
                Ok(Some(json!(1)))
            })
            .expect("fetch");
        }
        assert!(context.expired());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn clear_is_eager_and_idempotent() {
        let context = long_ttl();
        let calls = Cell::new(0u32);
        let produce = |calls: &Cell<u32>| {
            calls.set(calls.get() + 1);
            Ok(Some(json!(1)))
        };
        let _ = fetch(Some(&context), &key(1), || produce(&calls)).expect("fetch");
        context.clear();
        context.clear();
        let _ = fetch(Some(&context), &key(1), || produce(&calls)).expect("fetch");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn disabled_store_yields_no_context() {
        let store = CacheStore::new(false, Duration::from_secs(1));
        assert!(store.create_context().is_none());
        assert!(!store.enabled());
    }

    #[test]
    fn default_store_is_enabled() {
        let store = CacheStore::default();
        assert!(store.enabled());
        assert!(store.create_context().is_some());
    }

    #[test]
    fn producer_error_propagates_unstored() {
        let context = long_ttl();
        let first = fetch(Some(&context), &key(1), || {
            Err(SideloadError::Resolver {
                type_handle: TypeHandle::new("user"),
                id: EntityId::Int(1),
                reason: "backend down".to_string(),
            })
        });
        assert!(first.is_err());

        // The failure was not cached; the next fetch runs the producer.
        let calls = Cell::new(0u32);
        let second = fetch(Some(&context), &key(1), || {
            calls.set(calls.get() + 1);
            Ok(Some(json!(1)))
        })
        .expect("fetch");
        assert_eq!(second, Some(json!(1)));
        assert_eq!(calls.get(), 1);
    }

    /// Backend that fails every operation.
    struct FailingBackend;

    impl CacheBackend for FailingBackend {
        fn read(&self, _key: &CacheKey) -> Result<Option<CachedEntity>, CacheError> {
            Err(CacheError::Read("backend offline".to_string()))
        }

        fn write(&self, _key: &CacheKey, _value: CachedEntity) -> Result<(), CacheError> {
            Err(CacheError::Write("backend offline".to_string()))
        }

        fn clear(&self) -> Result<(), CacheError> {
            Err(CacheError::Write("backend offline".to_string()))
        }
    }

    #[test]
    fn backend_faults_fail_open() {
        let context =
            CacheContext::with_backend(Box::new(FailingBackend), Duration::from_secs(3600));
        let calls = Cell::new(0u32);
        for _ in 0..2 {
            let value = fetch(Some(&context), &key(1), || {
                calls.set(calls.get() + 1);
                Ok(Some(json!(1)))
            })
            .expect("fetch never surfaces backend faults");
            assert_eq!(value, Some(json!(1)));
        }
        // Every read failed, so the producer ran every time.
        assert_eq!(calls.get(), 2);
        // clear on a faulty backend is still not an error.
        context.clear();
    }
}
