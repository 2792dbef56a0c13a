// ============================================
// Profile Refresh Job
// ============================================
//
// Workflow:
// 1. Fetch users with activity inside the lookback window
// 2. Rebuild each profile (refreshing the cache entry)
// 3. Optionally compute and persist personalized scores
//
// A failing user is logged and counted; the pass continues.

use crate::error::RankingError;
use crate::services::{ScoringEngine, UserProfileBuilder};
use crate::store::RankingStore;
use anyhow::Context;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info};
use uuid::Uuid;

/// Profile refresh job configuration, read from `PROFILE_REFRESH_*`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfileRefreshConfig {
    /// Users active within this many hours are refreshed
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: i64,
    /// Maximum number of users per pass
    #[serde(default = "default_max_users")]
    pub max_users: usize,
    /// Users processed between two delays
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    /// Persist personalized scores after rebuilding
    #[serde(default = "default_true")]
    pub write_back_scores: bool,
    #[serde(default = "default_true")]
    pub run_once: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_lookback_hours() -> i64 {
    24
}

fn default_max_users() -> usize {
    1000
}

fn default_batch_size() -> usize {
    100
}

fn default_batch_delay_ms() -> u64 {
    0
}

fn default_true() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    900
}

impl Default for ProfileRefreshConfig {
    fn default() -> Self {
        Self {
            lookback_hours: default_lookback_hours(),
            max_users: default_max_users(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            write_back_scores: true,
            run_once: true,
            interval_secs: default_interval_secs(),
        }
    }
}

impl ProfileRefreshConfig {
    pub fn from_env() -> Result<Self, RankingError> {
        envy::prefixed("PROFILE_REFRESH_")
            .from_env::<Self>()
            .map_err(|e| RankingError::Config(format!("PROFILE_REFRESH_*: {}", e)))
    }
}

/// Statistics of one refresh pass
#[derive(Debug, Clone, Default)]
pub struct RefreshJobStats {
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub users_processed: u32,
    pub users_succeeded: u32,
    pub users_failed: u32,
    pub scores_written: u64,
    pub total_duration_ms: u64,
}

pub struct ProfileRefreshJob {
    config: ProfileRefreshConfig,
    store: Arc<dyn RankingStore>,
    profile_builder: Arc<UserProfileBuilder>,
    scoring: Arc<ScoringEngine>,
}

impl ProfileRefreshJob {
    pub fn new(
        config: ProfileRefreshConfig,
        store: Arc<dyn RankingStore>,
        profile_builder: Arc<UserProfileBuilder>,
        scoring: Arc<ScoringEngine>,
    ) -> Self {
        Self {
            config,
            store,
            profile_builder,
            scoring,
        }
    }

    /// Run passes until `run_once` stops the loop
    pub async fn run(&self) -> anyhow::Result<RefreshJobStats> {
        loop {
            let stats = self.run_single_pass().await?;

            info!(
                processed = stats.users_processed,
                succeeded = stats.users_succeeded,
                failed = stats.users_failed,
                scores_written = stats.scores_written,
                duration_ms = stats.total_duration_ms,
                "Profile refresh pass completed"
            );

            if self.config.run_once {
                return Ok(stats);
            }

            info!(
                interval_secs = self.config.interval_secs,
                "Sleeping until next pass"
            );
            sleep(Duration::from_secs(self.config.interval_secs)).await;
        }
    }

    pub async fn run_single_pass(&self) -> anyhow::Result<RefreshJobStats> {
        let start_time = Instant::now();
        let mut stats = RefreshJobStats {
            started_at: Some(Utc::now()),
            ..Default::default()
        };

        let since = Utc::now() - ChronoDuration::hours(self.config.lookback_hours);
        let users = self
            .store
            .fetch_active_users(since, self.config.max_users)
            .await
            .context("Failed to fetch active users")?;

        info!(
            user_count = users.len(),
            lookback_hours = self.config.lookback_hours,
            write_back_scores = self.config.write_back_scores,
            "Starting profile refresh pass"
        );

        for batch in users.chunks(self.config.batch_size.max(1)) {
            for user_id in batch {
                stats.users_processed += 1;

                match self.refresh_user(*user_id).await {
                    Ok(written) => {
                        stats.users_succeeded += 1;
                        stats.scores_written += written;
                    }
                    Err(e) => {
                        stats.users_failed += 1;
                        error!(user_id = %user_id, error = %e, "Failed to refresh user profile");
                    }
                }
            }

            if self.config.batch_delay_ms > 0 {
                sleep(Duration::from_millis(self.config.batch_delay_ms)).await;
            }
        }

        stats.completed_at = Some(Utc::now());
        stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

        Ok(stats)
    }

    async fn refresh_user(&self, user_id: Uuid) -> Result<u64, RankingError> {
        self.profile_builder.rebuild(user_id).await?;

        if !self.config.write_back_scores {
            return Ok(0);
        }

        let scores = self.scoring.calculate_personalized_scores(user_id).await?;
        self.store.save_personalized_scores(user_id, &scores).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{user_profile_key, InMemoryProfileCache, ProfileCache};
    use crate::config::ScoringWeights;
    use crate::models::{ActivityAction, Article};
    use crate::services::ProfileBuilderConfig;
    use crate::store::InMemoryStore;
    use crate::testing::{MockCache, MockStore};

    fn article(source: &str) -> Article {
        Article {
            id: Uuid::new_v4(),
            title: format!("{} daily digest", source),
            description: None,
            source: source.to_string(),
            url: "https://example.com".to_string(),
            published_at: Utc::now(),
            score: 50.0,
            topics: Vec::new(),
        }
    }

    fn job(
        config: ProfileRefreshConfig,
        store: Arc<dyn RankingStore>,
        cache: Arc<dyn ProfileCache>,
    ) -> ProfileRefreshJob {
        let builder = Arc::new(UserProfileBuilder::new(
            store.clone(),
            cache,
            ProfileBuilderConfig::default(),
        ));
        let scoring = Arc::new(ScoringEngine::new(
            store.clone(),
            builder.clone(),
            ScoringWeights::default(),
        ));
        ProfileRefreshJob::new(config, store, builder, scoring)
    }

    #[test]
    fn test_default_config() {
        let config = ProfileRefreshConfig::default();
        assert_eq!(config.lookback_hours, 24);
        assert!(config.write_back_scores);
        assert!(config.run_once);
    }

    #[test]
    fn test_config_from_env_vars() {
        let vars = vec![
            ("PROFILE_REFRESH_LOOKBACK_HOURS".to_string(), "6".to_string()),
            ("PROFILE_REFRESH_WRITE_BACK_SCORES".to_string(), "false".to_string()),
        ];
        let config: ProfileRefreshConfig = envy::prefixed("PROFILE_REFRESH_")
            .from_iter(vars)
            .unwrap();

        assert_eq!(config.lookback_hours, 6);
        assert!(!config.write_back_scores);
        assert_eq!(config.max_users, 1000);
    }

    #[tokio::test]
    async fn test_pass_warms_cache_and_writes_scores() {
        let store = Arc::new(InMemoryStore::new());
        let cache = Arc::new(InMemoryProfileCache::new());
        let user_id = Uuid::new_v4();

        let read = article("Hacker News");
        let unread = article("Hacker News");
        store.upsert_article(read.clone()).await;
        store.upsert_article(unread.clone()).await;
        store
            .record_activity(user_id, read.id, ActivityAction::Read, Utc::now())
            .await;

        let stats = job(ProfileRefreshConfig::default(), store.clone(), cache.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(stats.users_processed, 1);
        assert_eq!(stats.users_succeeded, 1);
        assert_eq!(stats.scores_written, 2);
        assert!(cache.get(&user_profile_key(user_id)).await.is_some());
        // 50 base + 10 source + 15 recency
        assert_eq!(store.personalized_score(user_id, unread.id).await, Some(75.0));
    }

    #[tokio::test]
    async fn test_user_failures_are_counted_not_fatal() {
        let failing = Uuid::new_v4();
        let healthy = Uuid::new_v4();

        let mut store = MockStore::new();
        store
            .expect_fetch_active_users()
            .returning(move |_, _| Ok(vec![failing, healthy]));
        store.expect_fetch_activities().returning(move |user_id, _| {
            if user_id == failing {
                Err(RankingError::Database("timeout".to_string()))
            } else {
                Ok(Vec::new())
            }
        });
        store.expect_save_personalized_scores().times(0);

        let mut cache = MockCache::new();
        cache.expect_set().times(1).return_const(());

        let config = ProfileRefreshConfig {
            write_back_scores: false,
            ..Default::default()
        };
        let stats = job(config, Arc::new(store), Arc::new(cache))
            .run_single_pass()
            .await
            .unwrap();

        assert_eq!(stats.users_processed, 2);
        assert_eq!(stats.users_failed, 1);
        assert_eq!(stats.users_succeeded, 1);
    }
}
