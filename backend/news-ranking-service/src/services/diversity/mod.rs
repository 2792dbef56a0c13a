pub mod config;

pub use config::DiversityConfigResolver;

use crate::models::{Article, ArticleScore, DiversityConfig};
use std::collections::HashMap;
use uuid::Uuid;

/// Diversity Layer - greedy penalty-based re-ranking
///
/// Each round picks the candidate with the highest adjusted score, where
/// every source / primary topic already selected at least `threshold`
/// times costs `penalty_strength × (count - threshold + 1)` points.
pub struct DiversityLayer {
    config: DiversityConfig,
}

impl DiversityLayer {
    pub fn new(config: DiversityConfig) -> Self {
        Self { config }
    }

    /// Select and order at most `limit` scores
    ///
    /// Scores without a matching article stay eligible but add no counts.
    pub fn rerank(
        &self,
        scores: &[ArticleScore],
        articles: &[Article],
        limit: usize,
    ) -> Vec<ArticleScore> {
        let lookup: HashMap<Uuid, &Article> =
            articles.iter().map(|article| (article.id, article)).collect();

        let mut selected: Vec<ArticleScore> = Vec::with_capacity(limit.min(scores.len()));
        let mut remaining: Vec<&ArticleScore> = scores.iter().collect();
        let mut source_counts: HashMap<&str, u32> = HashMap::new();
        let mut topic_counts: HashMap<Uuid, u32> = HashMap::new();

        while selected.len() < limit && !remaining.is_empty() {
            let mut best_idx = 0;
            let mut best_adjusted = f64::NEG_INFINITY;

            for (i, candidate) in remaining.iter().enumerate() {
                let penalty = lookup
                    .get(&candidate.article_id)
                    .map(|article| self.penalty(article, &source_counts, &topic_counts))
                    .unwrap_or(0.0);
                let adjusted = candidate.personalized_score - penalty;

                // Strict comparison: the first candidate wins ties
                if adjusted > best_adjusted {
                    best_adjusted = adjusted;
                    best_idx = i;
                }
            }

            let chosen = remaining.remove(best_idx);
            if let Some(article) = lookup.get(&chosen.article_id) {
                *source_counts.entry(article.source.as_str()).or_insert(0) += 1;
                if let Some(topic) = article.primary_topic() {
                    *topic_counts.entry(topic.id).or_insert(0) += 1;
                }
            }
            selected.push(chosen.clone());
        }

        selected
    }

    fn penalty(
        &self,
        article: &Article,
        source_counts: &HashMap<&str, u32>,
        topic_counts: &HashMap<Uuid, u32>,
    ) -> f64 {
        let source_count = source_counts
            .get(article.source.as_str())
            .copied()
            .unwrap_or(0);
        let mut penalty = self.excess_penalty(source_count, self.config.source_threshold);

        if let Some(topic) = article.primary_topic() {
            let topic_count = topic_counts.get(&topic.id).copied().unwrap_or(0);
            penalty += self.excess_penalty(topic_count, self.config.topic_threshold);
        }

        penalty
    }

    fn excess_penalty(&self, count: u32, threshold: u32) -> f64 {
        if count >= threshold {
            f64::from(self.config.penalty_strength) * f64::from(count - threshold + 1)
        } else {
            0.0
        }
    }
}

/// Re-rank `scores` for a feed page of `limit` items under `config`
pub fn apply_diversity_reranking(
    scores: &[ArticleScore],
    articles: &[Article],
    limit: usize,
    config: DiversityConfig,
) -> Vec<ArticleScore> {
    DiversityLayer::new(config).rerank(scores, articles, limit)
}
