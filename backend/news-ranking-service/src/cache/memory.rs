use super::ProfileCache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Clone)]
struct CachedEntry {
    value: String,
    expires_at: Instant,
}

/// Process-local TTL cache, used in tests and single-process deployments
#[derive(Default)]
pub struct InMemoryProfileCache {
    entries: RwLock<HashMap<String, CachedEntry>>,
}

impl InMemoryProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ProfileCache for InMemoryProfileCache {
    async fn get(&self, key: &str) -> Option<String> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: evict lazily
        self.entries.write().await.remove(key);
        None
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) {
        let entry = CachedEntry {
            value: value.to_string(),
            expires_at: Instant::now() + Duration::from_secs(ttl_secs),
        };
        self.entries.write().await.insert(key.to_string(), entry);
    }

    async fn delete(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}
