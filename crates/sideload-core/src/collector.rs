//! # Result Collector
//!
//! The final boundary between the walker and the caller: flattening,
//! deduplication by identity, and a second whitelist pass.

use crate::{EntityRef, ViewRecord, Whitelist};
use std::collections::BTreeSet;

/// Flatten per-root record groups into one ordered sequence, deduplicate
/// by `(type, id)` keeping the first occurrence, then apply the whitelist
/// once more.
///
/// The second whitelist pass is defense in depth, distinct from the
/// traversal-time filter: a record that slipped past pruning - a declarator
/// emitting off-list types, a future walker change - still cannot leave the
/// collector. An empty-set whitelist yields empty output; an absent one
/// leaves the deduplicated sequence unfiltered.
#[must_use]
pub fn collect<I>(groups: I, whitelist: &Whitelist) -> Vec<ViewRecord>
where
    I: IntoIterator<Item = Vec<ViewRecord>>,
{
    let mut seen: BTreeSet<EntityRef> = BTreeSet::new();
    let mut deduped = Vec::new();
    for group in groups {
        for record in group {
            if seen.insert(record.reference()) {
                deduped.push(record);
            }
        }
    }
    deduped
        .into_iter()
        .filter(|record| whitelist.allows(&record.type_handle))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
