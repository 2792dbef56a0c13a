// ============================================
// Diversity Config Resolver
// ============================================
//
// Maps the stored per-user preference onto re-ranking thresholds:
//
// | level  | source | topic | penalty |
// |--------|--------|-------|---------|
// | low    |   5    |   6   |    5    |
// | medium |   3    |   4   |   15    |
// | high   |   2    |   3   |   30    |
//
// Settings rows are created lazily with the `medium` default.

use crate::error::Result;
use crate::models::{DiversityConfig, DiversityLevel};
use crate::store::RankingStore;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

impl From<DiversityLevel> for DiversityConfig {
    fn from(level: DiversityLevel) -> Self {
        match level {
            DiversityLevel::Low => DiversityConfig {
                source_threshold: 5,
                topic_threshold: 6,
                penalty_strength: 5,
            },
            DiversityLevel::Medium => DiversityConfig {
                source_threshold: 3,
                topic_threshold: 4,
                penalty_strength: 15,
            },
            DiversityLevel::High => DiversityConfig {
                source_threshold: 2,
                topic_threshold: 3,
                penalty_strength: 30,
            },
        }
    }
}

impl Default for DiversityConfig {
    fn default() -> Self {
        DiversityLevel::default().into()
    }
}

pub struct DiversityConfigResolver {
    store: Arc<dyn RankingStore>,
}

impl DiversityConfigResolver {
    pub fn new(store: Arc<dyn RankingStore>) -> Self {
        Self { store }
    }

    /// Thresholds for the user's stored level, creating default settings on first read
    pub async fn get_diversity_config(&self, user_id: Uuid) -> Result<DiversityConfig> {
        let level = match self.store.get_settings(user_id).await? {
            Some(settings) => settings.diversity_level,
            None => match self.store.create_default_settings(user_id).await {
                Ok(settings) => {
                    debug!(user_id = %user_id, "Created default user settings");
                    settings.diversity_level
                }
                Err(e) => {
                    warn!(
                        user_id = %user_id,
                        error = %e,
                        "Failed to create default settings, using medium diversity"
                    );
                    DiversityLevel::default()
                }
            },
        };

        Ok(level.into())
    }
}
