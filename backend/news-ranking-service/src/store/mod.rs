// ============================================
// Ranking Store
// ============================================
//
// Read-side persistence consumed by the ranking engines:
// - Activity log joined with articles (and their topics)
// - Article catalogue with relevance-ordered topics
// - Per-user settings (diversity preference)
//
// Implement `RankingStore` to integrate another backend. `PgRankingStore`
// is the production adapter, `InMemoryStore` backs tests and local runs.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgRankingStore;

use crate::error::Result;
use crate::models::{ActivityAction, Article, ArticleScore, UserActivity, UserSettings};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Activity query; results are always ordered newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityFilter {
    /// Only activities created at or after this instant
    pub since: Option<DateTime<Utc>>,
    /// Only these actions (`None` = every action)
    pub actions: Option<Vec<ActivityAction>>,
    pub exclude_article_ids: Vec<Uuid>,
    pub limit: Option<usize>,
}

impl ActivityFilter {
    /// Full history, every action
    pub fn all() -> Self {
        Self::default()
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_actions(mut self, actions: &[ActivityAction]) -> Self {
        self.actions = Some(actions.to_vec());
        self
    }

    pub fn excluding(mut self, article_ids: Vec<Uuid>) -> Self {
        self.exclude_article_ids = article_ids;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArticleOrder {
    #[default]
    PublishedDesc,
    ScoreDesc,
}

/// Article query; topics are always loaded, ordered by relevance descending
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleQuery {
    pub order: ArticleOrder,
    /// Only these ids (`None` = no restriction)
    pub ids: Option<Vec<Uuid>>,
    pub exclude_ids: Vec<Uuid>,
    pub limit: Option<usize>,
}

impl ArticleQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn order_by(mut self, order: ArticleOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_ids(mut self, ids: Vec<Uuid>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn excluding(mut self, ids: Vec<Uuid>) -> Self {
        self.exclude_ids = ids;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[async_trait]
pub trait RankingStore: Send + Sync {
    /// Activities of a user joined with their articles
    async fn fetch_activities(
        &self,
        user_id: Uuid,
        filter: &ActivityFilter,
    ) -> Result<Vec<UserActivity>>;

    async fn fetch_articles(&self, query: &ArticleQuery) -> Result<Vec<Article>>;

    async fn get_settings(&self, user_id: Uuid) -> Result<Option<UserSettings>>;

    /// Create the default settings row; returns the existing row if one appeared meanwhile
    async fn create_default_settings(&self, user_id: Uuid) -> Result<UserSettings>;

    /// Users with activity since `since`, most recently active first
    async fn fetch_active_users(&self, since: DateTime<Utc>, limit: usize) -> Result<Vec<Uuid>>;

    /// Denormalized write-back of computed personalized scores
    async fn save_personalized_scores(&self, user_id: Uuid, scores: &[ArticleScore])
        -> Result<u64>;
}
