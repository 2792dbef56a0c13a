// ============================================
// User Profile Builder
// ============================================
//
// Cache-first profile access:
// 1. Cached profile (user-profile:{user_id}) is returned untouched
// 2. Otherwise the full activity history is loaded and aggregated
//    by InterestBuilder
// 3. The result is cached with a short TTL (300s by default)
//
// Cache failures are misses; only store errors propagate.

use super::interest_builder::InterestBuilder;
use crate::cache::{user_profile_key, ProfileCache};
use crate::error::Result;
use crate::models::UserProfile;
use crate::store::{ActivityFilter, RankingStore};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Profile builder configuration
#[derive(Debug, Clone)]
pub struct ProfileBuilderConfig {
    pub cache_ttl_secs: u64,
    pub top_keywords_limit: usize,
}

impl Default for ProfileBuilderConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            top_keywords_limit: 20,
        }
    }
}

/// Builds and caches [`UserProfile`]s
pub struct UserProfileBuilder {
    store: Arc<dyn RankingStore>,
    cache: Arc<dyn ProfileCache>,
    interest_builder: InterestBuilder,
    config: ProfileBuilderConfig,
}

impl UserProfileBuilder {
    pub fn new(
        store: Arc<dyn RankingStore>,
        cache: Arc<dyn ProfileCache>,
        config: ProfileBuilderConfig,
    ) -> Self {
        Self {
            store,
            cache,
            interest_builder: InterestBuilder::new(config.top_keywords_limit),
            config,
        }
    }

    /// Cached profile, rebuilt from the activity log on a miss
    pub async fn build_user_profile(&self, user_id: Uuid) -> Result<UserProfile> {
        if let Some(profile) = self.load_cached(user_id).await {
            debug!(user_id = %user_id, "User profile served from cache");
            return Ok(profile);
        }

        self.rebuild(user_id).await
    }

    /// Recompute from the activity log and refresh the cache entry
    pub async fn rebuild(&self, user_id: Uuid) -> Result<UserProfile> {
        let activities = self
            .store
            .fetch_activities(user_id, &ActivityFilter::all())
            .await?;

        let profile = self.interest_builder.build_profile(&activities);
        self.store_cached(user_id, &profile).await;

        info!(
            user_id = %user_id,
            total_interactions = profile.total_interactions,
            sources = profile.source_preferences.len(),
            keywords = profile.top_keywords.len(),
            "User profile rebuilt"
        );

        Ok(profile)
    }

    /// Drop the cached profile so the next read recomputes it
    pub async fn invalidate(&self, user_id: Uuid) {
        self.cache.delete(&user_profile_key(user_id)).await;
    }

    async fn load_cached(&self, user_id: Uuid) -> Option<UserProfile> {
        let key = user_profile_key(user_id);
        let json = self.cache.get(&key).await?;

        match serde_json::from_str::<UserProfile>(&json) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Discarding undecodable cached profile");
                None
            }
        }
    }

    async fn store_cached(&self, user_id: Uuid, profile: &UserProfile) {
        match serde_json::to_string(profile) {
            Ok(json) => {
                self.cache
                    .set(&user_profile_key(user_id), &json, self.config.cache_ttl_secs)
                    .await
            }
            Err(e) => warn!(user_id = %user_id, error = %e, "Failed to serialize user profile"),
        }
    }
}
