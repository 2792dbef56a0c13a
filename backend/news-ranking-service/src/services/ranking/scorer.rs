use crate::config::ScoringWeights;
use crate::models::{Article, ArticleScore, ScoreBreakdown, UserProfile};
use crate::services::keywords::KeywordExtractor;
use crate::utils::{clamp_score, recency_bonus};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;
use uuid::Uuid;

/// Pure personalized scoring
#[derive(Debug, Clone)]
pub struct ArticleScorer {
    weights: ScoringWeights,
    extractor: KeywordExtractor,
}

impl ArticleScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            extractor: KeywordExtractor::new(),
        }
    }

    /// Score one article; `recent_ids` are articles the user touched inside the penalty window
    pub fn score_article(
        &self,
        article: &Article,
        profile: &UserProfile,
        recent_ids: &HashSet<Uuid>,
        now: DateTime<Utc>,
    ) -> ArticleScore {
        let source_bonus = profile
            .source_affinity(&article.source)
            .map(|affinity| affinity * self.weights.source_bonus_multiplier)
            .unwrap_or(0.0);

        let topic_bonus = if profile.top_keywords.is_empty() {
            0.0
        } else {
            let keywords = self.extractor.extract_keywords(&article.content_text());
            let matches = profile
                .top_keywords
                .iter()
                .filter(|keyword| keywords.contains(keyword.as_str()))
                .count();
            matches as f64 * self.weights.topic_bonus_per_keyword
        };

        let diversity_penalty = if recent_ids.contains(&article.id) {
            -self.weights.recent_interaction_penalty
        } else {
            0.0
        };

        let breakdown = ScoreBreakdown {
            base_score: article.score,
            source_bonus,
            topic_bonus,
            recency_bonus: recency_bonus(article.age_hours(now), &self.weights.recency_tiers),
            diversity_penalty,
        };

        ArticleScore {
            article_id: article.id,
            personalized_score: clamp_score(breakdown.total()),
            breakdown,
        }
    }

    /// Score every article, highest first; equal scores keep catalogue order
    pub fn score_all(
        &self,
        articles: &[Article],
        profile: &UserProfile,
        recent_ids: &HashSet<Uuid>,
        now: DateTime<Utc>,
    ) -> Vec<ArticleScore> {
        let mut scores: Vec<ArticleScore> = articles
            .iter()
            .map(|article| self.score_article(article, profile, recent_ids, now))
            .collect();

        scores.sort_by(|a, b| {
            b.personalized_score
                .partial_cmp(&a.personalized_score)
                .unwrap_or(Ordering::Equal)
        });

        scores
    }
}
