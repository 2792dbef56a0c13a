use super::ProfileCache;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use tracing::{debug, warn};

/// Redis-backed [`ProfileCache`]
///
/// The connection manager is created by the host process and shared;
/// it reconnects on its own after transient failures.
#[derive(Clone)]
pub struct RedisProfileCache {
    client: Arc<ConnectionManager>,
}

impl RedisProfileCache {
    pub fn new(client: Arc<ConnectionManager>) -> Self {
        Self { client }
    }

    /// Open a connection manager for `redis_url`
    pub async fn connect(redis_url: &str) -> redis::RedisResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self::new(Arc::new(manager)))
    }

    /// Ping Redis to check connection health
    pub async fn ping(&self) -> redis::RedisResult<()> {
        redis::cmd("PING")
            .query_async::<_, String>(&mut self.client.as_ref().clone())
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl ProfileCache for RedisProfileCache {
    async fn get(&self, key: &str) -> Option<String> {
        let result: redis::RedisResult<Option<String>> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.client.as_ref().clone())
            .await;

        match result {
            Ok(Some(value)) => {
                debug!("Cache hit for {}", key);
                Some(value)
            }
            Ok(None) => {
                debug!("Cache miss for {}", key);
                None
            }
            Err(e) => {
                warn!("Redis GET failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) {
        let result: redis::RedisResult<()> = redis::cmd("SETEX")
            .arg(key)
            .arg(ttl_secs)
            .arg(value)
            .query_async(&mut self.client.as_ref().clone())
            .await;

        if let Err(e) = result {
            warn!("Redis SETEX failed for {}: {}", key, e);
        } else {
            debug!("Cached {} with TTL={}s", key, ttl_secs);
        }
    }

    async fn delete(&self, key: &str) {
        let result: redis::RedisResult<()> = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut self.client.as_ref().clone())
            .await;

        if let Err(e) = result {
            warn!("Redis DEL failed for {}: {}", key, e);
        }
    }
}
