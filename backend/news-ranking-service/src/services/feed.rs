//! Personalized feed: score every article, then diversify the page.

use crate::error::Result;
use crate::models::{Article, PersonalizedFeedItem};
use crate::services::diversity::{apply_diversity_reranking, DiversityConfigResolver};
use crate::services::ranking::ScoringEngine;
use crate::store::{ArticleQuery, RankingStore};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct PersonalizedFeedService {
    store: Arc<dyn RankingStore>,
    scoring: Arc<ScoringEngine>,
    diversity: Arc<DiversityConfigResolver>,
    default_limit: usize,
    max_limit: usize,
}

impl PersonalizedFeedService {
    pub fn new(
        store: Arc<dyn RankingStore>,
        scoring: Arc<ScoringEngine>,
        diversity: Arc<DiversityConfigResolver>,
        default_limit: usize,
        max_limit: usize,
    ) -> Self {
        Self {
            store,
            scoring,
            diversity,
            default_limit,
            max_limit,
        }
    }

    /// One diversified feed page, optionally restricted to a topic slug
    pub async fn get_personalized_feed(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
        topic_slug: Option<&str>,
    ) -> Result<Vec<PersonalizedFeedItem>> {
        self.get_personalized_feed_at(user_id, limit, topic_slug, Utc::now())
            .await
    }

    pub async fn get_personalized_feed_at(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
        topic_slug: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<PersonalizedFeedItem>> {
        let limit = limit
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1));

        let mut articles = self.store.fetch_articles(&ArticleQuery::all()).await?;
        if let Some(slug) = topic_slug {
            articles.retain(|article| article.has_topic_slug(slug));
        }

        let scores = self.scoring.score_articles_at(user_id, &articles, now).await?;
        let config = self.diversity.get_diversity_config(user_id).await?;
        let selected = apply_diversity_reranking(&scores, &articles, limit, config);

        let mut by_id: HashMap<Uuid, Article> = articles
            .into_iter()
            .map(|article| (article.id, article))
            .collect();

        let items: Vec<PersonalizedFeedItem> = selected
            .into_iter()
            .filter_map(|score| {
                by_id
                    .remove(&score.article_id)
                    .map(|article| PersonalizedFeedItem { article, score })
            })
            .collect();

        info!(
            user_id = %user_id,
            topic = topic_slug.unwrap_or("all"),
            limit,
            returned = items.len(),
            source_threshold = config.source_threshold,
            penalty_strength = config.penalty_strength,
            "Built personalized feed"
        );

        Ok(items)
    }
}
