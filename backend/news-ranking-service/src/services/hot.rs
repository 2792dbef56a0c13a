// ============================================
// Hot Now
// ============================================
//
// Non-personalized ranking by engagement decayed over age:
//
// hot = max(0, (engagement - 1) / (hours + 2)^gravity × source weight)
//
// Engagement is the article's base score; articles without one count
// as a single point and therefore score 0.

use crate::config::HotWeights;
use crate::error::Result;
use crate::models::{Article, HotArticle};
use crate::store::{ArticleOrder, ArticleQuery, RankingStore};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

/// Pure hotness scoring
#[derive(Debug, Clone)]
pub struct HotScorer {
    weights: HotWeights,
}

impl HotScorer {
    pub fn new(weights: HotWeights) -> Self {
        Self { weights }
    }

    pub fn hot_score(&self, article: &Article, now: DateTime<Utc>) -> f64 {
        let engagement = if article.score > 0.0 { article.score } else { 1.0 };
        let decay =
            (article.age_hours(now) + self.weights.age_offset_hours).powf(self.weights.gravity);
        let score = (engagement - 1.0) / decay * self.weights.source_weight(&article.source);

        score.max(0.0)
    }

    /// Hottest first, at most `limit`, dropping anything below the minimum score
    pub fn rank(
        &self,
        articles: Vec<Article>,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Vec<HotArticle> {
        let mut ranked: Vec<HotArticle> = articles
            .into_iter()
            .map(|article| HotArticle {
                hot_score: self.hot_score(&article, now),
                article,
            })
            .collect();

        ranked.sort_by(|a, b| b.hot_score.partial_cmp(&a.hot_score).unwrap_or(Ordering::Equal));

        debug!(
            count = ranked.len(),
            top_score = ranked.first().map_or(0.0, |hot| hot.hot_score),
            "Scored hot candidates"
        );

        ranked.retain(|hot| hot.hot_score >= self.weights.min_score);
        ranked.truncate(limit);
        ranked
    }
}

/// Loads recent articles and ranks them with [`HotScorer`]
pub struct HotArticleService {
    store: Arc<dyn RankingStore>,
    scorer: HotScorer,
    default_limit: usize,
    max_limit: usize,
    candidate_pool_size: usize,
}

impl HotArticleService {
    pub fn new(store: Arc<dyn RankingStore>, weights: HotWeights) -> Self {
        Self {
            store,
            default_limit: weights.default_limit,
            max_limit: weights.max_limit,
            candidate_pool_size: weights.candidate_pool_size,
            scorer: HotScorer::new(weights),
        }
    }

    /// `limit` defaults to 20 and is clamped to [1, 100]
    pub async fn get_hot_articles(&self, limit: Option<usize>) -> Result<Vec<HotArticle>> {
        self.get_hot_articles_at(limit, Utc::now()).await
    }

    pub async fn get_hot_articles_at(
        &self,
        limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<Vec<HotArticle>> {
        let limit = limit
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1));

        let candidates = self
            .store
            .fetch_articles(
                &ArticleQuery::all()
                    .order_by(ArticleOrder::PublishedDesc)
                    .limit(self.candidate_pool_size),
            )
            .await?;
        let candidate_count = candidates.len();

        let hot = self.scorer.rank(candidates, now, limit);

        info!(candidate_count, returned = hot.len(), "Ranked hot articles");

        Ok(hot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use chrono::Duration;
    use uuid::Uuid;

    fn article(source: &str, score: f64, published_at: DateTime<Utc>) -> Article {
        Article {
            id: Uuid::new_v4(),
            title: format!("{} story", source),
            description: None,
            source: source.to_string(),
            url: "https://example.com".to_string(),
            published_at,
            score,
            topics: Vec::new(),
        }
    }

    fn scorer() -> HotScorer {
        HotScorer::new(HotWeights::default())
    }

    #[test]
    fn test_hot_score_formula() {
        let now = Utc::now();
        let fresh = article("Personal Blog", 51.0, now);
        let aged = article("Personal Blog", 51.0, now - Duration::hours(10));

        let expected_fresh = 50.0 / 2f64.powf(1.8);
        let expected_aged = 50.0 / 12f64.powf(1.8);
        assert!((scorer().hot_score(&fresh, now) - expected_fresh).abs() < 1e-9);
        assert!((scorer().hot_score(&aged, now) - expected_aged).abs() < 1e-9);
    }

    #[test]
    fn test_source_weight_multiplies() {
        let now = Utc::now();
        let blog = article("Personal Blog", 41.0, now - Duration::hours(3));
        let hn = article("Hacker News", 41.0, now - Duration::hours(3));
        let medium = article("Medium", 41.0, now - Duration::hours(3));

        let base = scorer().hot_score(&blog, now);
        assert!((scorer().hot_score(&hn, now) - base * 1.5).abs() < 1e-9);
        assert!((scorer().hot_score(&medium, now) - base * 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_missing_engagement_and_future_dates() {
        let now = Utc::now();
        assert_eq!(scorer().hot_score(&article("Reddit", 0.0, now), now), 0.0);
        assert_eq!(scorer().hot_score(&article("Reddit", 0.5, now), now), 0.0);

        // clock skew counts as zero age
        let ahead = article("Reddit", 11.0, now + Duration::hours(5));
        let expected = 10.0 / 2f64.powf(1.8);
        assert!((scorer().hot_score(&ahead, now) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rank_orders_filters_and_truncates() {
        let now = Utc::now();
        let breaking = article("Reddit", 20.0, now - Duration::minutes(30));
        let yesterday = article("Reddit", 95.0, now - Duration::hours(30));
        let dead = article("Reddit", 1.0, now);
        let ancient = article("Reddit", 60.0, now - Duration::days(60));

        let ranked = scorer().rank(
            vec![yesterday.clone(), dead, breaking.clone(), ancient],
            now,
            10,
        );

        let ids: Vec<Uuid> = ranked.iter().map(|hot| hot.article.id).collect();
        assert_eq!(ids, vec![breaking.id, yesterday.id]);
        assert!(ranked.iter().all(|hot| hot.hot_score >= 0.1));

        let top = scorer().rank(vec![yesterday, breaking.clone()], now, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].article.id, breaking.id);
    }

    #[tokio::test]
    async fn test_service_limits() {
        let now = Utc::now();
        let store = Arc::new(InMemoryStore::new());
        for i in 0..30 {
            store
                .upsert_article(article("TechCrunch", 80.0, now - Duration::minutes(i * 10)))
                .await;
        }

        let service = HotArticleService::new(store, HotWeights::default());

        let default = service.get_hot_articles_at(None, now).await.unwrap();
        assert_eq!(default.len(), 20);
        assert!(default.windows(2).all(|w| w[0].hot_score >= w[1].hot_score));

        let at_least_one = service.get_hot_articles_at(Some(0), now).await.unwrap();
        assert_eq!(at_least_one.len(), 1);
    }

    #[tokio::test]
    async fn test_service_on_empty_catalogue() {
        let service = HotArticleService::new(Arc::new(InMemoryStore::new()), HotWeights::default());
        assert!(service.get_hot_articles(None).await.unwrap().is_empty());
    }
}
