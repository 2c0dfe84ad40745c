//! Remote cache backend with a local fallback queue.
//!
//! The cache is best-effort by contract: the system of record never
//! depends on it. Reads fail open — a miss, a transport error, or a
//! corrupt entry all look the same to the caller (absent). Writes that
//! cannot reach the remote store land in a bounded in-process queue
//! (oldest dropped first) and are flushed opportunistically once the
//! store is reachable again.
//!
//! The fallback queue is the only shared mutable state in the process;
//! a mutex guards every append, pop and purge. The lock is never held
//! across an await point: drains pop one entry, release the lock, try
//! the flush, and push the entry back to the front on failure.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use deadpool_redis::Pool;
use parking_lot::Mutex;
use redis::AsyncCommands;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::RedisConfig;

/// Outcome of a cache write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The write reached the remote store.
    Committed,
    /// The remote store was unreachable; the write sits in the local
    /// fallback queue until a drain succeeds.
    Buffered,
}

/// A write waiting in the fallback queue for the remote store to return.
#[derive(Debug, Clone)]
enum PendingWrite {
    /// A plain entry write (`SETEX`).
    Entry {
        key: String,
        value: Vec<u8>,
        ttl: Duration,
    },
    /// A bounded-ring push (`LPUSH` + `LTRIM`), used by the audit trail.
    RingPush {
        key: String,
        value: Vec<u8>,
        cap: usize,
    },
}

/// Key-value cache over Redis with degrade-to-local-buffer fallback.
///
/// Cheap to clone; clones share the pool and the fallback queue.
#[derive(Clone)]
pub struct RemoteCache {
    redis: Option<Pool>,
    fallback: Arc<Mutex<VecDeque<PendingWrite>>>,
    fallback_capacity: usize,
    op_timeout: Duration,
    /// Serializes concurrent drains so flush order is preserved.
    drain_lock: Arc<tokio::sync::Mutex<()>>,
}

impl RemoteCache {
    /// Creates a cache with no remote store at all.
    ///
    /// Every read misses and every write buffers. This is the configured
    /// mode when Redis is disabled, and the constructor tests use.
    #[must_use]
    pub fn disconnected(fallback_capacity: usize) -> Self {
        Self {
            redis: None,
            fallback: Arc::new(Mutex::new(VecDeque::new())),
            fallback_capacity,
            op_timeout: Duration::from_millis(1000),
            drain_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Creates a cache backend from configuration.
    ///
    /// The pool is kept even when the initial ping fails: connections are
    /// created lazily, so a Redis that comes up later is picked up by the
    /// next operation or drain without a restart.
    pub async fn connect(config: &RedisConfig) -> Self {
        if !config.enabled {
            tracing::info!("Redis disabled, cache degraded to local buffering only");
            return Self::disconnected(config.fallback_capacity);
        }

        tracing::info!(url = %config.url, "Connecting to Redis");

        let mut redis_config = deadpool_redis::Config::from_url(&config.url);
        let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size);
        pool_config.timeouts.wait = Some(Duration::from_millis(config.timeout_ms));
        pool_config.timeouts.create = Some(Duration::from_millis(config.timeout_ms));
        pool_config.timeouts.recycle = Some(Duration::from_millis(config.timeout_ms));
        redis_config.pool = Some(pool_config);

        let pool = match redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Failed to create Redis pool. Cache degraded to local buffering."
                );
                return Self::disconnected(config.fallback_capacity);
            }
        };

        match pool.get().await {
            Ok(_) => tracing::info!("Connected to Redis successfully"),
            Err(e) => {
                tracing::warn!(error = %e, "Redis unreachable; writes buffer until it returns");
            }
        }

        Self {
            redis: Some(pool),
            fallback: Arc::new(Mutex::new(VecDeque::new())),
            fallback_capacity: config.fallback_capacity,
            op_timeout: Duration::from_millis(config.timeout_ms),
            drain_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Runs one remote command with the configured timeout.
    ///
    /// Any failure (command error or timeout) is logged and collapsed to
    /// `None`: the cache never raises to its caller.
    async fn remote<T, F>(&self, fut: F, op: &'static str) -> Option<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, op, "Redis command error");
                None
            }
            Err(_) => {
                tracing::warn!(op, timeout_ms = self.op_timeout.as_millis() as u64, "Redis command timed out");
                None
            }
        }
    }

    /// Gets raw bytes for a key.
    ///
    /// Returns `None` on a miss, on any transport error, or when no
    /// remote store is configured.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let pool = self.redis.as_ref()?;
        let mut conn = match pool.get().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to get Redis connection");
                return None;
            }
        };

        match self
            .remote(conn.get::<_, Option<Vec<u8>>>(key), "GET")
            .await?
        {
            Some(data) => {
                tracing::debug!(key = %key, "cache hit");
                Some(data)
            }
            None => {
                tracing::debug!(key = %key, "cache miss");
                None
            }
        }
    }

    /// Gets a key and deserializes it.
    ///
    /// A corrupt entry is treated as absent.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let data = self.get(key).await?;
        match serde_json::from_slice(&data) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "corrupt cache entry, treating as miss");
                None
            }
        }
    }

    /// Writes an entry with a TTL.
    ///
    /// On any failure the write is appended to the fallback queue and
    /// [`SetOutcome::Buffered`] is returned.
    pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> SetOutcome {
        if let Some(pool) = &self.redis {
            match pool.get().await {
                Ok(mut conn) => {
                    let committed = self
                        .remote(
                            conn.set_ex::<_, _, ()>(key, value.as_slice(), ttl.as_secs()),
                            "SETEX",
                        )
                        .await
                        .is_some();
                    if committed {
                        tracing::debug!(key = %key, ttl_secs = ttl.as_secs(), "cache set");
                        return SetOutcome::Committed;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to get Redis connection");
                }
            }
        }

        self.buffer(PendingWrite::Entry {
            key: key.to_string(),
            value,
            ttl,
        });
        SetOutcome::Buffered
    }

    /// Serializes a value and writes it with a TTL.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> SetOutcome {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.set(key, bytes, ttl).await,
            Err(e) => {
                // Plain DTOs cannot realistically fail to serialize; the
                // write is dropped rather than surfaced.
                tracing::error!(key = %key, error = %e, "failed to serialize cache value");
                SetOutcome::Buffered
            }
        }
    }

    /// Best-effort delete. Failures are logged, never propagated.
    ///
    /// Buffered writes for the deleted keys are purged as well, so a
    /// later drain cannot resurrect an entry that was invalidated during
    /// an outage.
    pub async fn delete(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }

        self.purge_pending(keys);

        let Some(pool) = &self.redis else { return };
        let mut conn = match pool.get().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to get Redis connection");
                return;
            }
        };

        if self.remote(conn.del::<_, ()>(keys), "DEL").await.is_some() {
            tracing::debug!(count = keys.len(), "cache entries invalidated");
        }
    }

    /// Pushes an entry onto a most-recent-first ring capped at `cap`.
    pub async fn push_recent(&self, key: &str, value: Vec<u8>, cap: usize) -> SetOutcome {
        if let Some(pool) = &self.redis {
            match pool.get().await {
                Ok(mut conn) => {
                    let pushed = self
                        .remote(conn.lpush::<_, _, ()>(key, value.as_slice()), "LPUSH")
                        .await
                        .is_some();
                    if pushed {
                        // A failed trim leaves the ring oversized until the
                        // next push; the cap is advisory, not a correctness
                        // bound.
                        self.remote(conn.ltrim::<_, ()>(key, 0, cap as isize - 1), "LTRIM")
                            .await;
                        return SetOutcome::Committed;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to get Redis connection");
                }
            }
        }

        self.buffer(PendingWrite::RingPush {
            key: key.to_string(),
            value,
            cap,
        });
        SetOutcome::Buffered
    }

    /// Reads the newest `limit` entries of a ring, most recent first.
    ///
    /// Empty on any failure.
    pub async fn recent(&self, key: &str, limit: usize) -> Vec<Vec<u8>> {
        let Some(pool) = &self.redis else {
            return Vec::new();
        };
        let mut conn = match pool.get().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to get Redis connection");
                return Vec::new();
            }
        };

        self.remote(
            conn.lrange::<_, Vec<Vec<u8>>>(key, 0, limit as isize - 1),
            "LRANGE",
        )
        .await
        .unwrap_or_default()
    }

    /// Flushes buffered writes to the remote store.
    ///
    /// Entries flush in arrival order. The first entry that fails goes
    /// back to the front of the queue and the drain stops, so a persistent
    /// outage is never busy-looped on. Returns the number flushed.
    pub async fn drain_fallback(&self) -> usize {
        let Some(pool) = self.redis.clone() else {
            return 0;
        };

        let _guard = self.drain_lock.lock().await;

        let mut flushed = 0;
        loop {
            let Some(write) = self.fallback.lock().pop_front() else {
                break;
            };

            if self.flush_one(&pool, &write).await {
                flushed += 1;
            } else {
                self.fallback.lock().push_front(write);
                break;
            }
        }

        if flushed > 0 {
            tracing::info!(flushed, "flushed buffered cache writes");
        }
        flushed
    }

    async fn flush_one(&self, pool: &Pool, write: &PendingWrite) -> bool {
        let mut conn = match pool.get().await {
            Ok(conn) => conn,
            Err(_) => return false,
        };

        match write {
            PendingWrite::Entry { key, value, ttl } => self
                .remote(
                    conn.set_ex::<_, _, ()>(key, value.as_slice(), ttl.as_secs()),
                    "SETEX (drain)",
                )
                .await
                .is_some(),
            PendingWrite::RingPush { key, value, cap } => {
                if self
                    .remote(conn.lpush::<_, _, ()>(key, value.as_slice()), "LPUSH (drain)")
                    .await
                    .is_none()
                {
                    return false;
                }
                self.remote(conn.ltrim::<_, ()>(key, 0, *cap as isize - 1), "LTRIM (drain)")
                    .await;
                true
            }
        }
    }

    /// Number of writes currently waiting in the fallback queue.
    #[must_use]
    pub fn fallback_len(&self) -> usize {
        self.fallback.lock().len()
    }

    /// Checks if the remote store is reachable (for health checks).
    pub async fn is_remote_available(&self) -> bool {
        match &self.redis {
            None => false,
            Some(pool) => pool.get().await.is_ok(),
        }
    }

    fn buffer(&self, write: PendingWrite) {
        let mut queue = self.fallback.lock();
        if queue.len() >= self.fallback_capacity {
            queue.pop_front();
            tracing::warn!("fallback queue full, dropped oldest buffered write");
        }
        queue.push_back(write);
    }

    fn purge_pending(&self, keys: &[String]) {
        self.fallback.lock().retain(|write| match write {
            PendingWrite::Entry { key, .. } => !keys.contains(key),
            PendingWrite::RingPush { .. } => true,
        });
    }
}
