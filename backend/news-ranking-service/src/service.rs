use crate::cache::ProfileCache;
use crate::config::RankingConfig;
use crate::error::Result;
use crate::models::{
    ArticleScore, DiversityConfig, HotArticle, PersonalizedFeedItem, RecommendationScore,
    UserProfile,
};
use crate::services::{
    DiversityConfigResolver, HotArticleService, PersonalizedFeedService, ProfileBuilderConfig,
    RecommendationEngine, ScoringEngine, UserProfileBuilder,
};
use crate::store::RankingStore;
use std::sync::Arc;
use uuid::Uuid;

/// Entry point for the hosting layer: every ranking operation behind one handle
#[derive(Clone)]
pub struct RankingService {
    profile_builder: Arc<UserProfileBuilder>,
    diversity: Arc<DiversityConfigResolver>,
    scoring: Arc<ScoringEngine>,
    feed: Arc<PersonalizedFeedService>,
    recommendations: Arc<RecommendationEngine>,
    hot: Arc<HotArticleService>,
}

impl RankingService {
    pub fn new(
        store: Arc<dyn RankingStore>,
        cache: Arc<dyn ProfileCache>,
        config: &RankingConfig,
    ) -> Self {
        let profile_builder = Arc::new(UserProfileBuilder::new(
            store.clone(),
            cache,
            ProfileBuilderConfig {
                cache_ttl_secs: config.profile_cache_ttl_secs,
                top_keywords_limit: config.top_keywords_limit,
            },
        ));
        let diversity = Arc::new(DiversityConfigResolver::new(store.clone()));
        let scoring = Arc::new(ScoringEngine::new(
            store.clone(),
            profile_builder.clone(),
            config.scoring.clone(),
        ));
        let feed = Arc::new(PersonalizedFeedService::new(
            store.clone(),
            scoring.clone(),
            diversity.clone(),
            config.default_feed_limit,
            config.max_feed_limit,
        ));
        let recommendations = Arc::new(RecommendationEngine::new(
            store.clone(),
            profile_builder.clone(),
            config.recommendation.clone(),
        ));
        let hot = Arc::new(HotArticleService::new(store, config.hot.clone()));

        Self {
            profile_builder,
            diversity,
            scoring,
            feed,
            recommendations,
            hot,
        }
    }

    pub async fn get_personalized_feed(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
        topic_slug: Option<&str>,
    ) -> Result<Vec<PersonalizedFeedItem>> {
        self.feed
            .get_personalized_feed(user_id, limit, topic_slug)
            .await
    }

    pub async fn calculate_personalized_scores(&self, user_id: Uuid) -> Result<Vec<ArticleScore>> {
        self.scoring.calculate_personalized_scores(user_id).await
    }

    pub async fn get_recommendations(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<RecommendationScore>> {
        self.recommendations.get_recommendations(user_id, limit).await
    }

    /// Same list for every user; not personalized
    pub async fn get_hot_articles(&self, limit: Option<usize>) -> Result<Vec<HotArticle>> {
        self.hot.get_hot_articles(limit).await
    }

    pub async fn build_user_profile(&self, user_id: Uuid) -> Result<UserProfile> {
        self.profile_builder.build_user_profile(user_id).await
    }

    pub async fn get_diversity_config(&self, user_id: Uuid) -> Result<DiversityConfig> {
        self.diversity.get_diversity_config(user_id).await
    }

    /// Drop the cached profile after new activity was recorded
    pub async fn invalidate_profile(&self, user_id: Uuid) {
        self.profile_builder.invalidate(user_id).await
    }

    pub fn profile_builder(&self) -> Arc<UserProfileBuilder> {
        self.profile_builder.clone()
    }

    pub fn scoring(&self) -> Arc<ScoringEngine> {
        self.scoring.clone()
    }
}
