//! Key-value cache used to memoize derived user data (profiles).
//!
//! Implementations never fail: connectivity or protocol errors are logged
//! and reported as a miss, which makes callers recompute.
//!
//! Keys:
//! - `user-profile:{user_id}` → JSON-serialized `UserProfile`

pub mod memory;
pub mod redis_cache;

pub use memory::InMemoryProfileCache;
pub use redis_cache::RedisProfileCache;

use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait ProfileCache: Send + Sync {
    /// Cached value, `None` on miss or cache failure
    async fn get(&self, key: &str) -> Option<String>;

    /// Store a value with a TTL; failures are swallowed
    async fn set(&self, key: &str, value: &str, ttl_secs: u64);

    async fn delete(&self, key: &str);
}

pub fn user_profile_key(user_id: Uuid) -> String {
    format!("user-profile:{}", user_id)
}
