//! # Fixture Store
//!
//! Loads a JSON fixture file describing entity types, their records, and
//! their link rules, and turns it into [`EntityDeclarator`] implementations
//! so the engine is usable end-to-end without hand-written types.
//!
//! ## Fixture format
//!
//! ```json
//! {
//!   "types": {
//!     "post": {
//!       "entities": [ { "id": 1, "title": "Hello", "author_id": 2 } ],
//!       "links": [
//!         { "type": "user", "field": "author_id" },
//!         { "type": "comment", "field": "comment_ids", "deferred": true }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! A link rule reads `field` from the entity data and declares its raw
//! value, whatever shape it has: a scalar id, a preloaded object, or an
//! array of either. `deferred: true` keeps the link out of default renders.

use crate::error::AppError;
use serde::Deserialize;
use serde_json::Value;
use sideload_core::{
    EntityDeclarator, EntityId, Links, Registry, SideloadError, TypeHandle, ViewRecord,
};
use std::collections::BTreeMap;
use std::path::Path;

// =============================================================================
// FILE SIZE LIMIT
// =============================================================================

/// Maximum fixture file size (16 MB).
///
/// Fixtures are demo datasets loaded whole into memory, so a modest cap
/// catches a wrong path long before it exhausts memory.
const MAX_FIXTURE_FILE_SIZE: u64 = 16 * 1024 * 1024;

// =============================================================================
// FIXTURE SCHEMA
// =============================================================================

/// Top-level fixture file: a map from type name to that type's fixture.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureSet {
    pub types: BTreeMap<String, TypeFixture>,
}

/// One entity type: its records plus the link rules applied to each record.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeFixture {
    #[serde(default)]
    pub entities: Vec<Value>,
    #[serde(default)]
    pub links: Vec<LinkRule>,
}

/// One link rule: which field to read and which type its targets are.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkRule {
    #[serde(rename = "type")]
    pub target_type: String,
    pub field: String,
    #[serde(default)]
    pub deferred: bool,
}

impl FixtureSet {
    /// Load and parse a fixture file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| AppError::Io(format!("cannot stat fixture file: {e}")))?;
        if metadata.len() > MAX_FIXTURE_FILE_SIZE {
            return Err(AppError::Fixture(format!(
                "fixture file size {} bytes exceeds maximum {} bytes",
                metadata.len(),
                MAX_FIXTURE_FILE_SIZE
            )));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| AppError::Io(format!("cannot read fixture file: {e}")))?;
        serde_json::from_str(&contents)
            .map_err(|e| AppError::Fixture(format!("invalid fixture JSON: {e}")))
    }

    /// Build a registry with one declarator per fixture type.
    ///
    /// Every entity record must carry a decodable `id` field; an entity
    /// without one is a fixture authoring mistake and fails the whole load
    /// rather than silently disappearing.
    pub fn into_registry(self) -> Result<Registry, AppError> {
        let mut registry = Registry::new();
        for (type_name, fixture) in self.types {
            let mut entities = BTreeMap::new();
            for entity in fixture.entities {
                let id = entity
                    .get("id")
                    .and_then(EntityId::from_json)
                    .ok_or_else(|| {
                        AppError::Fixture(format!(
                            "type '{type_name}' has an entity without a decodable id: {entity}"
                        ))
                    })?;
                entities.insert(id, entity);
            }
            registry.register(Box::new(FixtureDeclarator {
                type_name: TypeHandle::new(&type_name),
                entities,
                rules: fixture.links,
            }));
        }
        Ok(registry)
    }
}

// =============================================================================
// FIXTURE DECLARATOR
// =============================================================================

/// [`EntityDeclarator`] backed by in-memory fixture records.
struct FixtureDeclarator {
    type_name: TypeHandle,
    entities: BTreeMap<EntityId, Value>,
    rules: Vec<LinkRule>,
}

impl EntityDeclarator for FixtureDeclarator {
    fn type_name(&self) -> TypeHandle {
        self.type_name.clone()
    }

    fn get_by_id(&self, id: &EntityId) -> Result<Option<Value>, SideloadError> {
        Ok(self.entities.get(id).cloned())
    }

    fn declare_links(&self, entity: &Value) -> Links {
        let mut links = Links::new();
        for rule in &self.rules {
            let Some(raw) = entity.get(&rule.field) else {
                continue;
            };
            if rule.deferred {
                let value = raw.clone();
                links = links.link_deferred(rule.target_type.as_str(), move || value);
            } else {
                links = links.link(rule.target_type.as_str(), raw.clone());
            }
        }
        links
    }

    fn prepare_for_view(&self, entity: &Value) -> ViewRecord {
        let id = entity
            .get("id")
            .and_then(EntityId::from_json)
            .unwrap_or_else(|| EntityId::Str(String::new()));
        ViewRecord::new(self.type_name.clone(), id, entity.clone())
    }
}

// =============================================================================
// TESTS
// =============================================================================
