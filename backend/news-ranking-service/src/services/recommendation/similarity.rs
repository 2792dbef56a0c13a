//! Content similarity between candidates and the user's engaged articles.

use crate::config::RecommendationWeights;
use crate::models::{Article, Topic};
use crate::services::keywords::KeywordExtractor;
use crate::utils::overlap_percent;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Keyword and topic fingerprint of one article
#[derive(Debug, Clone)]
pub struct ContentSignature {
    pub source: String,
    pub keywords: HashSet<String>,
    pub topic_ids: HashSet<Uuid>,
}

impl ContentSignature {
    pub fn of(article: &Article, extractor: &KeywordExtractor) -> Self {
        Self {
            source: article.source.clone(),
            keywords: extractor.extract_keywords(&article.content_text()),
            topic_ids: article.topics.iter().map(|relation| relation.topic.id).collect(),
        }
    }

    /// `keyword% × 0.6 + topic% × 0.4`
    pub fn similarity(&self, other: &ContentSignature, weights: &RecommendationWeights) -> f64 {
        weights.keyword_similarity_weight * overlap_percent(&self.keywords, &other.keywords)
            + weights.topic_similarity_weight * overlap_percent(&self.topic_ids, &other.topic_ids)
    }

    /// Best similarity against the engaged set, 0 when it is empty
    pub fn max_similarity(
        &self,
        engaged: &[ContentSignature],
        weights: &RecommendationWeights,
    ) -> f64 {
        engaged
            .iter()
            .map(|other| self.similarity(other, weights))
            .fold(0.0, f64::max)
    }
}

/// Most frequent topics across `articles`; ties keep first-seen order
pub fn top_topics(articles: &[Article], limit: usize) -> Vec<Topic> {
    let mut counts: HashMap<Uuid, (u64, usize, &Topic)> = HashMap::new();

    for relation in articles.iter().flat_map(|article| article.topics.iter()) {
        let next_rank = counts.len();
        let entry = counts
            .entry(relation.topic.id)
            .or_insert((0, next_rank, &relation.topic));
        entry.0 += 1;
    }

    let mut ranked: Vec<(u64, usize, &Topic)> = counts.into_values().collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(_, _, topic)| topic.clone())
        .collect()
}
