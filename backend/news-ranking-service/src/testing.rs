//! mockall doubles for the collaborator traits, shared by unit tests.

use crate::cache::ProfileCache;
use crate::error::Result;
use crate::models::{Article, ArticleScore, UserActivity, UserSettings};
use crate::store::{ActivityFilter, ArticleQuery, RankingStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::mock;
use uuid::Uuid;

mock! {
    pub Store {}

    #[async_trait]
    impl RankingStore for Store {
        async fn fetch_activities(
            &self,
            user_id: Uuid,
            filter: &ActivityFilter,
        ) -> Result<Vec<UserActivity>>;
        async fn fetch_articles(&self, query: &ArticleQuery) -> Result<Vec<Article>>;
        async fn get_settings(&self, user_id: Uuid) -> Result<Option<UserSettings>>;
        async fn create_default_settings(&self, user_id: Uuid) -> Result<UserSettings>;
        async fn fetch_active_users(&self, since: DateTime<Utc>, limit: usize) -> Result<Vec<Uuid>>;
        async fn save_personalized_scores(
            &self,
            user_id: Uuid,
            scores: &[ArticleScore],
        ) -> Result<u64>;
    }
}

mock! {
    pub Cache {}

    #[async_trait]
    impl ProfileCache for Cache {
        async fn get(&self, key: &str) -> Option<String>;
        async fn set(&self, key: &str, value: &str, ttl_secs: u64);
        async fn delete(&self, key: &str);
    }
}
