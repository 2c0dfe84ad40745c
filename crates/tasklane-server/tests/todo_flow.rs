//! Orchestrator integration tests: read-through caching, invalidation
//! correctness and audit emission, against a real Redis.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::MemoryTodoStore;
use tasklane_core::{CompletedFilter, TodoChanges, TodoDraft, TodoItem};
use tasklane_server::{AuditLogger, RedisConfig, RemoteCache, TodoService};
use tasklane_storage::StorageError;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::redis::Redis;
use time::OffsetDateTime;
use tokio::sync::OnceCell;

static SHARED_REDIS: OnceCell<(ContainerAsync<Redis>, String)> = OnceCell::const_new();

async fn get_redis_url() -> String {
    let (_, url) = SHARED_REDIS
        .get_or_init(|| async {
            let container = Redis::default()
                .start()
                .await
                .expect("start redis container");

            let host_port = container.get_host_port_ipv4(6379).await.expect("get port");
            let url = format!("redis://127.0.0.1:{}", host_port);

            (container, url)
        })
        .await;

    url.clone()
}

async fn connected_cache() -> RemoteCache {
    RemoteCache::connect(&RedisConfig {
        enabled: true,
        url: get_redis_url().await,
        pool_size: 5,
        timeout_ms: 2000,
        fallback_capacity: 100,
        drain_interval_secs: 30,
    })
    .await
}

struct Fixture {
    service: TodoService,
    store: Arc<MemoryTodoStore>,
    audit_dir: tempfile::TempDir,
}

impl Fixture {
    fn audit_lines(&self) -> Vec<serde_json::Value> {
        let contents =
            std::fs::read_to_string(self.audit_dir.path().join("audit.log")).unwrap_or_default();
        contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

fn fixture_with(cache: RemoteCache) -> Fixture {
    let audit_dir = tempfile::tempdir().unwrap();
    let audit = Arc::new(
        AuditLogger::new(&audit_dir.path().join("audit.log"), cache.clone(), 100).unwrap(),
    );
    let store = Arc::new(MemoryTodoStore::default());
    let service = TodoService::new(
        store.clone(),
        cache,
        audit,
        Duration::from_secs(300),
    );
    Fixture {
        service,
        store,
        audit_dir,
    }
}

fn raw_item(id: i64, owner: i64, title: &str, completed: bool) -> TodoItem {
    TodoItem {
        id,
        user_id: owner,
        title: title.to_string(),
        completed,
        created_at: OffsetDateTime::now_utc(),
    }
}

// Owner ids are unique per test: cache keys are owner-scoped and the
// Redis container is shared.

#[tokio::test]
async fn test_cached_list_reflects_create() {
    let fx = fixture_with(connected_cache().await);
    let owner = 101;

    // Cache the active list as empty.
    let before = fx
        .service
        .list(owner, CompletedFilter::Active)
        .await
        .unwrap();
    assert!(before.is_empty());

    // A new active item must show up even though the list was cached.
    fx.service
        .create(
            owner,
            &TodoDraft {
                title: "new and active".into(),
                completed: false,
            },
        )
        .await
        .unwrap();

    let after = fx
        .service
        .list(owner, CompletedFilter::Active)
        .await
        .unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].title, "new and active");
}

#[tokio::test]
async fn test_create_invalidates_every_list_variant() {
    let fx = fixture_with(connected_cache().await);
    let owner = 102;

    // Prime all three list caches.
    for filter in [
        CompletedFilter::Any,
        CompletedFilter::Completed,
        CompletedFilter::Active,
    ] {
        fx.service.list(owner, filter).await.unwrap();
    }

    // The mutation's own context is a *completed* item, but every
    // variant has to reflect it.
    fx.service
        .create(
            owner,
            &TodoDraft {
                title: "already done".into(),
                completed: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(
        fx.service.list(owner, CompletedFilter::Any).await.unwrap().len(),
        1
    );
    assert_eq!(
        fx.service
            .list(owner, CompletedFilter::Completed)
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        fx.service
            .list(owner, CompletedFilter::Active)
            .await
            .unwrap()
            .len(),
        0
    );
}

#[tokio::test]
async fn test_get_populates_single_item_cache() {
    let fx = fixture_with(connected_cache().await);
    let owner = 103;

    let item = fx
        .service
        .create(
            owner,
            &TodoDraft {
                title: "original".into(),
                completed: false,
            },
        )
        .await
        .unwrap();

    // Populate the cache, then change the store behind the cache's back.
    fx.service.get(owner, item.id).await.unwrap();
    fx.store
        .insert_raw(raw_item(item.id, owner, "changed underneath", false));

    // Within TTL the cached snapshot wins: proof the key was populated.
    let cached = fx.service.get(owner, item.id).await.unwrap();
    assert_eq!(cached.title, "original");
}

#[tokio::test]
async fn test_update_refreshes_item_key_with_new_value() {
    let fx = fixture_with(connected_cache().await);
    let owner = 104;

    let item = fx
        .service
        .create(
            owner,
            &TodoDraft {
                title: "before".into(),
                completed: false,
            },
        )
        .await
        .unwrap();
    fx.service.get(owner, item.id).await.unwrap();

    let updated = fx
        .service
        .update(
            owner,
            item.id,
            &TodoChanges {
                title: Some("after".into()),
                completed: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "after");
    assert!(!updated.completed);

    // The refreshed cache entry, not the store, answers this read.
    fx.store
        .insert_raw(raw_item(item.id, owner, "store drifted", false));
    let read_back = fx.service.get(owner, item.id).await.unwrap();
    assert_eq!(read_back.title, "after");
}

#[tokio::test]
async fn test_delete_evicts_item_key() {
    let fx = fixture_with(connected_cache().await);
    let owner = 105;

    let item = fx
        .service
        .create(
            owner,
            &TodoDraft {
                title: "short-lived".into(),
                completed: false,
            },
        )
        .await
        .unwrap();
    fx.service.get(owner, item.id).await.unwrap();

    fx.service.delete(owner, item.id).await.unwrap();

    // A stale cached copy would turn this into an Ok.
    let err = fx.service.get(owner, item.id).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}

#[tokio::test]
async fn test_absence_is_not_cached() {
    let fx = fixture_with(connected_cache().await);
    let owner = 106;

    let err = fx.service.get(owner, 999).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));

    // The item appears later (e.g. another replica wrote it); a cached
    // negative result would hide it.
    fx.store.insert_raw(raw_item(999, owner, "late arrival", false));
    let item = fx.service.get(owner, 999).await.unwrap();
    assert_eq!(item.title, "late arrival");
}

#[tokio::test]
async fn test_every_branch_emits_exactly_one_audit_event() {
    let fx = fixture_with(connected_cache().await);
    let owner = 107;

    // 1: not_found get
    let _ = fx.service.get(owner, 12345).await;
    // 2: create success
    let item = fx
        .service
        .create(
            owner,
            &TodoDraft {
                title: "audited".into(),
                completed: false,
            },
        )
        .await
        .unwrap();
    // 3: get miss -> store success
    fx.service.get(owner, item.id).await.unwrap();
    // 4: get cache hit
    fx.service.get(owner, item.id).await.unwrap();
    // 5: list miss
    fx.service.list(owner, CompletedFilter::Any).await.unwrap();
    // 6: delete success
    fx.service.delete(owner, item.id).await.unwrap();

    let events = fx.audit_lines();
    assert_eq!(events.len(), 6);

    let expected = [
        ("todo_get", "not_found"),
        ("todo_create", "success"),
        ("todo_get", "success"),
        ("todo_get", "cache_hit"),
        ("todo_list", "success"),
        ("todo_delete", "success"),
    ];
    for (event, (action, outcome)) in events.iter().zip(expected) {
        assert_eq!(event["action"], action);
        assert_eq!(event["outcome"], outcome);
        assert_eq!(event["owner_id"], owner);
    }
}

#[tokio::test]
async fn test_degraded_mode_serves_all_operations() {
    // No remote cache at all: every read goes to the store.
    let fx = fixture_with(RemoteCache::disconnected(100));
    let owner = 108;

    let item = fx
        .service
        .create(
            owner,
            &TodoDraft {
                title: "no cache".into(),
                completed: false,
            },
        )
        .await
        .unwrap();

    let fetched = fx.service.get(owner, item.id).await.unwrap();
    assert_eq!(fetched.title, "no cache");

    let listed = fx
        .service
        .list(owner, CompletedFilter::Active)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    let updated = fx
        .service
        .update(
            owner,
            item.id,
            &TodoChanges {
                title: None,
                completed: Some(true),
            },
        )
        .await
        .unwrap();
    assert!(updated.completed);

    fx.service.delete(owner, item.id).await.unwrap();
    let err = fx.service.get(owner, item.id).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}
