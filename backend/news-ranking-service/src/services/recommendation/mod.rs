// ============================================
// Recommendation Engine
// ============================================
//
// "More like what you liked" for articles the user has never touched:
//
// score = similarity  (max over the engaged set of 0.6·keyword% + 0.4·topic%)
//       + topic       (40 × candidate topics in the top-5 / 5)
//       + source      (source affinity × 15)
//       + serendipity (20 for unseen sources with base score > 50)
//       + recency     (12h/24h/48h → 15/10/5)
//
// Engaged set = 20 most recent upvotes/saves. Candidates = 100 most recent
// articles without any interaction. Cold-start users still get results
// driven by recency and serendipity.

pub mod similarity;

pub use similarity::{top_topics, ContentSignature};

use crate::config::RecommendationWeights;
use crate::error::Result;
use crate::models::{
    ActivityAction, Article, RecommendationBreakdown, RecommendationScore, Topic, UserProfile,
};
use crate::services::keywords::KeywordExtractor;
use crate::services::profile_builder::UserProfileBuilder;
use crate::store::{ActivityFilter, ArticleOrder, ArticleQuery, RankingStore};
use crate::utils::{clamp_score, recency_bonus};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const REASON_SIMILAR: &str = "Similar to articles you upvoted";
const REASON_NEW_SOURCE: &str = "Discover new sources";
const REASON_DEFAULT: &str = "Recommended for you";

/// Per-request view of the user's engagement
struct EngagementContext<'a> {
    profile: &'a UserProfile,
    engaged: Vec<ContentSignature>,
    engaged_sources: HashSet<String>,
    top_topics: Vec<Topic>,
}

pub struct RecommendationEngine {
    store: Arc<dyn RankingStore>,
    profile_builder: Arc<UserProfileBuilder>,
    extractor: KeywordExtractor,
    weights: RecommendationWeights,
}

impl RecommendationEngine {
    pub fn new(
        store: Arc<dyn RankingStore>,
        profile_builder: Arc<UserProfileBuilder>,
        weights: RecommendationWeights,
    ) -> Self {
        Self {
            store,
            profile_builder,
            extractor: KeywordExtractor::new(),
            weights,
        }
    }

    /// Unseen articles, best first; `limit` defaults to 10 and is capped at 50
    pub async fn get_recommendations(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<RecommendationScore>> {
        self.get_recommendations_at(user_id, limit, Utc::now()).await
    }

    pub async fn get_recommendations_at(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RecommendationScore>> {
        let limit = limit
            .unwrap_or(self.weights.default_limit)
            .min(self.weights.max_limit);

        let profile = self.profile_builder.build_user_profile(user_id).await?;

        let seen_ids: Vec<Uuid> = self
            .store
            .fetch_activities(user_id, &ActivityFilter::all())
            .await?
            .into_iter()
            .map(|activity| activity.article.id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let engaged_articles: Vec<Article> = self
            .store
            .fetch_activities(
                user_id,
                &ActivityFilter::all()
                    .with_actions(&[ActivityAction::Upvote, ActivityAction::Save])
                    .limit(self.weights.engaged_set_size),
            )
            .await?
            .into_iter()
            .map(|activity| activity.article)
            .collect();

        let candidates = self
            .store
            .fetch_articles(
                &ArticleQuery::all()
                    .order_by(ArticleOrder::PublishedDesc)
                    .excluding(seen_ids)
                    .limit(self.weights.candidate_pool_size),
            )
            .await?;

        let context = EngagementContext {
            profile: &profile,
            engaged: engaged_articles
                .iter()
                .map(|article| ContentSignature::of(article, &self.extractor))
                .collect(),
            engaged_sources: engaged_articles
                .iter()
                .map(|article| article.source.clone())
                .collect(),
            top_topics: top_topics(&engaged_articles, self.weights.top_topics_limit),
        };

        debug!(
            user_id = %user_id,
            engaged_count = context.engaged.len(),
            top_topics = context.top_topics.len(),
            candidate_count = candidates.len(),
            "Scoring recommendation candidates"
        );

        let mut recommendations: Vec<RecommendationScore> = candidates
            .iter()
            .map(|candidate| self.score_candidate(candidate, &context, now))
            .filter(|recommendation| recommendation.score > self.weights.min_score)
            .collect();

        recommendations.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        recommendations.truncate(limit);

        info!(
            user_id = %user_id,
            candidate_count = candidates.len(),
            returned = recommendations.len(),
            "Generated recommendations"
        );

        Ok(recommendations)
    }

    fn score_candidate(
        &self,
        candidate: &Article,
        context: &EngagementContext<'_>,
        now: DateTime<Utc>,
    ) -> RecommendationScore {
        let weights = &self.weights;
        let signature = ContentSignature::of(candidate, &self.extractor);

        let similarity_score = signature.max_similarity(&context.engaged, weights);

        let matched_topic = candidate.topics.iter().find_map(|relation| {
            context
                .top_topics
                .iter()
                .find(|topic| topic.id == relation.topic.id)
        });
        let topic_matches = context
            .top_topics
            .iter()
            .filter(|topic| signature.topic_ids.contains(&topic.id))
            .count();
        let topic_affinity_score =
            weights.topic_affinity_max * topic_matches as f64 / weights.topic_affinity_denominator;

        let source_affinity_score = context
            .profile
            .source_affinity(&candidate.source)
            .map(|affinity| affinity * weights.source_affinity_multiplier)
            .unwrap_or(0.0);

        let serendipity_bonus = if !context.engaged_sources.contains(&candidate.source)
            && candidate.score > weights.serendipity_min_score
        {
            weights.serendipity_bonus
        } else {
            0.0
        };

        let breakdown = RecommendationBreakdown {
            similarity_score,
            topic_affinity_score,
            source_affinity_score,
            serendipity_bonus,
            recency_bonus: recency_bonus(candidate.age_hours(now), &weights.recency_tiers),
        };

        let reason = if similarity_score > weights.similarity_reason_threshold {
            REASON_SIMILAR.to_string()
        } else if let Some(topic) = matched_topic {
            format!("Based on your interest in {}", topic.name)
        } else if serendipity_bonus > 0.0 {
            REASON_NEW_SOURCE.to_string()
        } else {
            REASON_DEFAULT.to_string()
        };

        RecommendationScore {
            article_id: candidate.id,
            score: clamp_score(breakdown.total()),
            breakdown,
            reason,
        }
    }
}
