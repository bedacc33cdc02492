//! # Render Scenarios
//!
//! End-to-end scenarios through the public API: a small blog domain with
//! posts, users, teams, and comments.

use serde_json::{Value, json};
use sideload_core::{
    CacheStore, EntityDeclarator, EntityId, Links, Registry, Renderer, SideloadError, TypeHandle,
    ViewRecord, Whitelist,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Table-backed declarator counting every resolver call.
struct Table {
    name: &'static str,
    entities: BTreeMap<EntityId, Value>,
    links: Vec<(&'static str, &'static str)>,
    deferred: Vec<(&'static str, &'static str)>,
    calls: Arc<AtomicUsize>,
}

impl Table {
    fn new(name: &'static str, entities: Vec<Value>, calls: &Arc<AtomicUsize>) -> Self {
        let entities = entities
            .into_iter()
            .filter_map(|e| EntityId::from_json(e.get("id")?).map(|id| (id, e)))
            .collect();
        Self {
            name,
            entities,
            links: Vec::new(),
            deferred: Vec::new(),
            calls: Arc::clone(calls),
        }
    }

    fn link(mut self, target: &'static str, field: &'static str) -> Self {
        self.links.push((target, field));
        self
    }

    fn deferred_link(mut self, target: &'static str, field: &'static str) -> Self {
        self.deferred.push((target, field));
        self
    }
}

impl EntityDeclarator for Table {
    fn type_name(&self) -> TypeHandle {
        TypeHandle::new(self.name)
    }

    fn get_by_id(&self, id: &EntityId) -> Result<Option<Value>, SideloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.entities.get(id).cloned())
    }

    fn declare_links(&self, entity: &Value) -> Links {
        let mut links = Links::new();
        for (target, field) in &self.links {
            if let Some(value) = entity.get(*field) {
                links = links.link(*target, value.clone());
            }
        }
        for (target, field) in &self.deferred {
            if let Some(value) = entity.get(*field) {
                let value = value.clone();
                links = links.link_deferred(*target, move || value);
            }
        }
        links
    }

    fn prepare_for_view(&self, entity: &Value) -> ViewRecord {
        let id = entity
            .get("id")
            .and_then(EntityId::from_json)
            .unwrap_or(EntityId::Int(0));
        ViewRecord::new(self.type_name(), id, entity.clone())
    }
}

fn refs(records: &[ViewRecord]) -> Vec<(String, EntityId)> {
    records
        .iter()
        .map(|r| (r.type_handle.as_str().to_string(), r.id.clone()))
        .collect()
}

fn blog(calls: &Arc<AtomicUsize>) -> Registry {
    let mut registry = Registry::new();
    registry.register(Box::new(
        Table::new(
            "post",
            vec![
                json!({"id": 1, "title": "hello", "author_id": 2, "team_id": 20}),
                json!({"id": 2, "title": "again", "author_id": 2}),
                json!({"id": 3, "title": "more", "author_id": 2}),
            ],
            calls,
        )
        .link("user", "author_id")
        .link("team", "team_id")
        .deferred_link("comment", "comment_ids"),
    ));
    registry.register(Box::new(
        Table::new("user", vec![json!({"id": 2, "name": "ada", "team_id": 20})], calls)
            .link("team", "team_id"),
    ));
    registry.register(Box::new(Table::new(
        "team",
        vec![json!({"id": 20, "name": "core"})],
        calls,
    )));
    registry.register(Box::new(Table::new(
        "comment",
        vec![json!({"id": 10, "body": "nice"}), json!({"id": 11, "body": "+1"})],
        calls,
    )));
    registry
}

#[test]
fn preloaded_author_with_embedded_team_makes_zero_resolver_calls() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new();
    registry.register(Box::new(
        Table::new("post", vec![], &calls).link("user", "author"),
    ));
    registry.register(Box::new(
        Table::new("user", vec![], &calls).link("team", "team"),
    ));
    registry.register(Box::new(Table::new("team", vec![], &calls)));
    let cache = CacheStore::default();
    let renderer = Renderer::new(&registry, &cache);

    let post = json!({
        "id": 1,
        "author": {"id": 2, "name": "ada", "team": {"id": 20, "name": "core"}}
    });
    let rendered = renderer
        .resolve_single(&TypeHandle::new("post"), &post, &Whitelist::All)
        .expect("resolve");

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        refs(&rendered.links),
        vec![
            ("user".to_string(), EntityId::Int(2)),
            ("team".to_string(), EntityId::Int(20)),
        ]
    );
}

#[test]
fn fan_in_three_posts_one_author() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = blog(&calls);
    let cache = CacheStore::default();
    let renderer = Renderer::new(&registry, &cache);

    let posts = vec![
        json!({"id": 1, "author_id": 2}),
        json!({"id": 2, "author_id": 2}),
        json!({"id": 3, "author_id": 2}),
    ];
    let rendered = renderer
        .resolve_many(&TypeHandle::new("post"), &posts, &Whitelist::only(["user"]))
        .expect("resolve");

    // Exactly one resolver call and one record for the shared author.
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(refs(&rendered.links), vec![("user".to_string(), EntityId::Int(2))]);
    assert_eq!(rendered.result.len(), 3);
}

#[test]
fn diamond_paths_converge_to_one_record() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = blog(&calls);
    let cache = CacheStore::default();
    let renderer = Renderer::new(&registry, &cache);

    // post -> user 2 -> team 20 and post -> team 20 directly.
    let post = json!({"id": 1, "author_id": 2, "team_id": 20});
    let rendered = renderer
        .resolve_single(&TypeHandle::new("post"), &post, &Whitelist::only(["user", "team"]))
        .expect("resolve");

    assert_eq!(
        refs(&rendered.links),
        vec![
            ("user".to_string(), EntityId::Int(2)),
            ("team".to_string(), EntityId::Int(20)),
        ]
    );
}

#[test]
fn empty_include_list_yields_zero_links() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = blog(&calls);
    let cache = CacheStore::default();
    let renderer = Renderer::new(&registry, &cache);

    let rendered = renderer
        .resolve_single(
            &TypeHandle::new("post"),
            &json!({"id": 1, "author_id": 2, "team_id": 20}),
            &Whitelist::none(),
        )
        .expect("resolve");

    assert!(rendered.links.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(rendered.result.id, EntityId::Int(1));
}

#[test]
fn absent_include_surfaces_non_deferred_links_only() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = blog(&calls);
    let cache = CacheStore::default();
    let renderer = Renderer::new(&registry, &cache);

    let rendered = renderer
        .resolve_single(
            &TypeHandle::new("post"),
            &json!({"id": 1, "author_id": 2, "team_id": 20, "comment_ids": [10, 11]}),
            &Whitelist::All,
        )
        .expect("resolve");

    // The author and their team surface; the post's direct team link is a
    // diamond duplicate, and the deferred comments stay unevaluated.
    assert_eq!(
        refs(&rendered.links),
        vec![
            ("user".to_string(), EntityId::Int(2)),
            ("team".to_string(), EntityId::Int(20)),
        ]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn explicit_include_evaluates_deferred_links() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = blog(&calls);
    let cache = CacheStore::default();
    let renderer = Renderer::new(&registry, &cache);

    let rendered = renderer
        .resolve_single(
            &TypeHandle::new("post"),
            &json!({"id": 1, "comment_ids": [10, 11]}),
            &Whitelist::only(["comment"]),
        )
        .expect("resolve");

    assert_eq!(
        refs(&rendered.links),
        vec![
            ("comment".to_string(), EntityId::Int(10)),
            ("comment".to_string(), EntityId::Int(11)),
        ]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn id_decode_fault_passes_through_untouched() {
    struct Opaque;

    impl EntityDeclarator for Opaque {
        fn type_name(&self) -> TypeHandle {
            TypeHandle::new("secret")
        }

        fn get_by_id(&self, _id: &EntityId) -> Result<Option<Value>, SideloadError> {
            Err(SideloadError::IdDecode {
                reason: "checksum mismatch".to_string(),
            })
        }

        fn declare_links(&self, _entity: &Value) -> Links {
            Links::new()
        }

        fn prepare_for_view(&self, entity: &Value) -> ViewRecord {
            ViewRecord::new(self.type_name(), EntityId::Int(0), entity.clone())
        }
    }

    let mut registry = Registry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    registry.register(Box::new(
        Table::new("post", vec![], &calls).link("secret", "secret_id"),
    ));
    registry.register(Box::new(Opaque));
    let cache = CacheStore::default();
    let renderer = Renderer::new(&registry, &cache);

    let result = renderer.resolve_single(
        &TypeHandle::new("post"),
        &json!({"id": 1, "secret_id": 7}),
        &Whitelist::only(["secret"]),
    );
    assert!(
        matches!(result, Err(SideloadError::IdDecode { reason }) if reason == "checksum mismatch")
    );
}

#[test]
fn string_and_integer_ids_are_distinct_identities() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new();
    registry.register(Box::new(
        Table::new("post", vec![], &calls).link("user", "author_id"),
    ));
    registry.register(Box::new(Table::new(
        "user",
        vec![json!({"id": 1, "name": "int"}), json!({"id": "1", "name": "str"})],
        &calls,
    )));
    let cache = CacheStore::default();
    let renderer = Renderer::new(&registry, &cache);

    let rendered = renderer
        .resolve_single(
            &TypeHandle::new("post"),
            &json!({"id": 1, "author_id": [1, "1"]}),
            &Whitelist::only(["user"]),
        )
        .expect("resolve");

    assert_eq!(rendered.links.len(), 2);
}
