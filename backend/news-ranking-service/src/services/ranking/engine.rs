use super::scorer::ArticleScorer;
use crate::config::ScoringWeights;
use crate::error::Result;
use crate::models::{Article, ArticleScore};
use crate::services::profile_builder::UserProfileBuilder;
use crate::store::{ActivityFilter, ArticleQuery, RankingStore};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Scoring Engine - personalized score for every article in the catalogue
pub struct ScoringEngine {
    store: Arc<dyn RankingStore>,
    profile_builder: Arc<UserProfileBuilder>,
    scorer: ArticleScorer,
    recent_window: Duration,
}

impl ScoringEngine {
    pub fn new(
        store: Arc<dyn RankingStore>,
        profile_builder: Arc<UserProfileBuilder>,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            store,
            profile_builder,
            recent_window: Duration::hours(weights.recent_interaction_window_hours),
            scorer: ArticleScorer::new(weights),
        }
    }

    /// Scores for all articles, highest first
    pub async fn calculate_personalized_scores(&self, user_id: Uuid) -> Result<Vec<ArticleScore>> {
        self.calculate_personalized_scores_at(user_id, Utc::now()).await
    }

    pub async fn calculate_personalized_scores_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<ArticleScore>> {
        let articles = self.store.fetch_articles(&ArticleQuery::all()).await?;
        self.score_articles_at(user_id, &articles, now).await
    }

    /// Score an already-loaded article set (the feed filters by topic first)
    pub async fn score_articles_at(
        &self,
        user_id: Uuid,
        articles: &[Article],
        now: DateTime<Utc>,
    ) -> Result<Vec<ArticleScore>> {
        let profile = self.profile_builder.build_user_profile(user_id).await?;

        let recent_ids: HashSet<Uuid> = self
            .store
            .fetch_activities(user_id, &ActivityFilter::all().since(now - self.recent_window))
            .await?
            .into_iter()
            .map(|activity| activity.article.id)
            .collect();

        let scores = self.scorer.score_all(articles, &profile, &recent_ids, now);

        info!(
            user_id = %user_id,
            article_count = articles.len(),
            recent_interactions = recent_ids.len(),
            top_score = scores.first().map(|s| s.personalized_score).unwrap_or(0.0),
            "Calculated personalized scores"
        );

        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryProfileCache;
    use crate::models::ActivityAction;
    use crate::services::profile_builder::ProfileBuilderConfig;
    use crate::store::InMemoryStore;

    fn article(source: &str, score: f64, published_at: DateTime<Utc>) -> Article {
        Article {
            id: Uuid::new_v4(),
            title: format!("{} headline", source),
            description: None,
            source: source.to_string(),
            url: "https://example.com".to_string(),
            published_at,
            score,
            topics: Vec::new(),
        }
    }

    fn engine(store: Arc<InMemoryStore>) -> ScoringEngine {
        let builder = Arc::new(UserProfileBuilder::new(
            store.clone(),
            Arc::new(InMemoryProfileCache::new()),
            ProfileBuilderConfig::default(),
        ));
        ScoringEngine::new(store, builder, ScoringWeights::default())
    }

    #[tokio::test]
    async fn test_recently_upvoted_article_is_penalized() {
        let now = Utc::now();
        let store = Arc::new(InMemoryStore::new());
        let upvoted = article("Hacker News", 50.0, now - Duration::hours(2));
        let other = article("Hacker News", 50.0, now - Duration::hours(2));
        store.upsert_article(upvoted.clone()).await;
        store.upsert_article(other.clone()).await;

        let user_id = Uuid::new_v4();
        store
            .record_activity(user_id, upvoted.id, ActivityAction::Upvote, now - Duration::hours(1))
            .await;

        let scores = engine(store)
            .calculate_personalized_scores_at(user_id, now)
            .await
            .unwrap();

        let penalized = scores.iter().find(|s| s.article_id == upvoted.id).unwrap();
        let fresh = scores.iter().find(|s| s.article_id == other.id).unwrap();
        assert_eq!(penalized.breakdown.diversity_penalty, -10.0);
        assert_eq!(fresh.breakdown.diversity_penalty, 0.0);
        // Affinity 2.0 × 10 for both; 50 + 20 + 15
        assert_eq!(fresh.personalized_score, 85.0);
        assert_eq!(penalized.personalized_score, 75.0);
        assert_eq!(scores[0].article_id, other.id);
    }

    #[tokio::test]
    async fn test_old_interactions_are_not_penalized() {
        let now = Utc::now();
        let store = Arc::new(InMemoryStore::new());
        let read = article("LWN", 40.0, now - Duration::days(3));
        store.upsert_article(read.clone()).await;

        let user_id = Uuid::new_v4();
        store
            .record_activity(user_id, read.id, ActivityAction::Read, now - Duration::hours(30))
            .await;

        let scores = engine(store)
            .calculate_personalized_scores_at(user_id, now)
            .await
            .unwrap();

        assert_eq!(scores[0].breakdown.diversity_penalty, 0.0);
        assert_eq!(scores[0].breakdown.source_bonus, 10.0);
    }

    #[tokio::test]
    async fn test_cold_start_scores_by_base_and_recency() {
        let now = Utc::now();
        let store = Arc::new(InMemoryStore::new());
        for (score, age) in [(20.0, 1), (60.0, 100), (45.0, 10)] {
            store
                .upsert_article(article("Feed", score, now - Duration::hours(age)))
                .await;
        }

        let scores = engine(store)
            .calculate_personalized_scores_at(Uuid::new_v4(), now)
            .await
            .unwrap();

        let values: Vec<f64> = scores.iter().map(|s| s.personalized_score).collect();
        assert_eq!(values, vec![60.0, 55.0, 35.0]);
    }
}
