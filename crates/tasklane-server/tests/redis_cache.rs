//! Integration tests for the remote cache backend.
//!
//! Tests use testcontainers to spin up a real Redis instance. Most tests
//! share one container; the outage/recovery test gets its own so it can
//! stop and restart it.

use std::time::Duration;

use tasklane_server::{RedisConfig, RemoteCache, SetOutcome};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::redis::Redis;
use tokio::sync::OnceCell;

// Shared Redis container for all tests
static SHARED_REDIS: OnceCell<(ContainerAsync<Redis>, String)> = OnceCell::const_new();

/// Get or create the shared Redis container
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

fn config_for(url: String) -> RedisConfig {
    RedisConfig {
        enabled: true,
        url,
        pool_size: 5,
        timeout_ms: 2000,
        fallback_capacity: 100,
        drain_interval_secs: 30,
    }
}

#[tokio::test]
async fn test_set_and_get_round_trip() {
    let cache = RemoteCache::connect(&config_for(get_redis_url().await)).await;

    let outcome = cache
        .set("roundtrip_key", b"some bytes".to_vec(), Duration::from_secs(60))
        .await;
    assert_eq!(outcome, SetOutcome::Committed);

    let value = cache.get("roundtrip_key").await;
    assert_eq!(value, Some(b"some bytes".to_vec()));
}

#[tokio::test]
async fn test_json_round_trip() {
    let cache = RemoteCache::connect(&config_for(get_redis_url().await)).await;

    let value = vec![1i64, 2, 3];
    cache
        .set_json("json_key", &value, Duration::from_secs(60))
        .await;

    let back: Option<Vec<i64>> = cache.get_json("json_key").await;
    assert_eq!(back, Some(value));
}

#[tokio::test]
async fn test_entry_expires_after_ttl() {
    let cache = RemoteCache::connect(&config_for(get_redis_url().await)).await;

    cache
        .set("expiring_key", b"value".to_vec(), Duration::from_secs(1))
        .await;
    assert!(cache.get("expiring_key").await.is_some());

    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert!(cache.get("expiring_key").await.is_none());
}

#[tokio::test]
async fn test_delete_removes_entries() {
    let cache = RemoteCache::connect(&config_for(get_redis_url().await)).await;

    cache
        .set("delete_a", b"v".to_vec(), Duration::from_secs(60))
        .await;
    cache
        .set("delete_b", b"v".to_vec(), Duration::from_secs(60))
        .await;

    cache
        .delete(&["delete_a".to_string(), "delete_b".to_string()])
        .await;

    assert!(cache.get("delete_a").await.is_none());
    assert!(cache.get("delete_b").await.is_none());
}

#[tokio::test]
async fn test_corrupt_entry_treated_as_miss() {
    let cache = RemoteCache::connect(&config_for(get_redis_url().await)).await;

    cache
        .set("corrupt_key", b"{not valid json".to_vec(), Duration::from_secs(60))
        .await;

    let value: Option<Vec<i64>> = cache.get_json("corrupt_key").await;
    assert_eq!(value, None);
}

#[tokio::test]
async fn test_recent_ring_is_most_recent_first_and_capped() {
    let cache = RemoteCache::connect(&config_for(get_redis_url().await)).await;

    for i in 1..=5 {
        let outcome = cache
            .push_recent("ring_key", format!("event-{i}").into_bytes(), 3)
            .await;
        assert_eq!(outcome, SetOutcome::Committed);
    }

    let entries = cache.recent("ring_key", 10).await;
    assert_eq!(entries.len(), 3, "ring must be capped");
    assert_eq!(entries[0], b"event-5".to_vec(), "most recent first");
    assert_eq!(entries[1], b"event-4".to_vec());
    assert_eq!(entries[2], b"event-3".to_vec());
}

#[tokio::test]
async fn test_unreachable_remote_fails_open() {
    // Closed port: every operation must fail fast and fall back.
    let config = RedisConfig {
        enabled: true,
        url: "redis://127.0.0.1:1".to_string(),
        pool_size: 2,
        timeout_ms: 500,
        fallback_capacity: 10,
        drain_interval_secs: 30,
    };
    let cache = RemoteCache::connect(&config).await;

    assert!(cache.get("whatever").await.is_none());

    let outcome = cache
        .set("buffered_key", b"v".to_vec(), Duration::from_secs(60))
        .await;
    assert_eq!(outcome, SetOutcome::Buffered);
    assert_eq!(cache.fallback_len(), 1);

    assert!(!cache.is_remote_available().await);
}

#[tokio::test]
async fn test_drain_flushes_after_outage() {
    // Dedicated container so we can stop and restart it.
    let container = Redis::default().start().await.expect("start redis");
    let port = container.get_host_port_ipv4(6379).await.expect("get port");
    let config = RedisConfig {
        enabled: true,
        url: format!("redis://127.0.0.1:{port}"),
        pool_size: 2,
        timeout_ms: 1000,
        fallback_capacity: 10,
        drain_interval_secs: 30,
    };
    let cache = RemoteCache::connect(&config).await;

    // Reachable: writes commit.
    let outcome = cache
        .set("outage_before", b"v0".to_vec(), Duration::from_secs(300))
        .await;
    assert_eq!(outcome, SetOutcome::Committed);

    // Outage: writes buffer in arrival order.
    container.stop().await.expect("stop redis");
    for (key, value) in [("outage_k1", "v1"), ("outage_k2", "v2")] {
        let outcome = cache
            .set(key, value.as_bytes().to_vec(), Duration::from_secs(300))
            .await;
        assert_eq!(outcome, SetOutcome::Buffered);
    }
    assert_eq!(cache.fallback_len(), 2);

    // Draining against a dead remote flushes nothing and keeps the queue.
    assert_eq!(cache.drain_fallback().await, 0);
    assert_eq!(cache.fallback_len(), 2);

    // Recovery: the same container comes back on the same port.
    container.start().await.expect("restart redis");
    let mut attempts = 0;
    while !cache.is_remote_available().await {
        attempts += 1;
        assert!(attempts < 50, "redis did not come back");
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    assert_eq!(cache.drain_fallback().await, 2);
    assert_eq!(cache.fallback_len(), 0);
    assert_eq!(cache.get("outage_k1").await, Some(b"v1".to_vec()));
    assert_eq!(cache.get("outage_k2").await, Some(b"v2".to_vec()));
}
