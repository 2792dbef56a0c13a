// ============================================
// Interest Builder
// ============================================
//
// Aggregates a user's activity log into a behavioral profile:
//
// source affinity = (upvotes × 2 + reads) / interactions with that source
// top keywords    = most frequent keywords of engaged articles
//                   (upvote / read / save), frequency descending
// rates           = upvotes / total, reads / total

use crate::models::{ActivityAction, UserActivity, UserProfile};
use crate::services::keywords::KeywordExtractor;
use std::collections::HashMap;
use tracing::debug;

/// Weight of an upvote in the source affinity numerator
const UPVOTE_AFFINITY_WEIGHT: f64 = 2.0;
/// Weight of a read in the source affinity numerator
const READ_AFFINITY_WEIGHT: f64 = 1.0;

#[derive(Debug, Default, Clone, Copy)]
struct SourceTally {
    upvotes: u64,
    reads: u64,
    total: u64,
}

impl SourceTally {
    fn affinity(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.upvotes as f64 * UPVOTE_AFFINITY_WEIGHT + self.reads as f64 * READ_AFFINITY_WEIGHT)
            / self.total as f64
    }
}

/// Pure profile aggregation over an already-loaded activity history
#[derive(Debug, Clone)]
pub struct InterestBuilder {
    extractor: KeywordExtractor,
    top_keywords_limit: usize,
}

impl InterestBuilder {
    pub fn new(top_keywords_limit: usize) -> Self {
        Self {
            extractor: KeywordExtractor::new(),
            top_keywords_limit,
        }
    }

    /// Build a profile from the full activity history
    pub fn build_profile(&self, activities: &[UserActivity]) -> UserProfile {
        if activities.is_empty() {
            return UserProfile::empty();
        }

        let total = activities.len() as u64;
        let upvotes = count_action(activities, ActivityAction::Upvote);
        let reads = count_action(activities, ActivityAction::Read);

        let profile = UserProfile {
            source_preferences: self.source_preferences(activities),
            top_keywords: self.top_keywords(activities),
            total_interactions: total,
            upvote_rate: upvotes as f64 / total as f64,
            read_rate: reads as f64 / total as f64,
        };

        debug!(
            total_interactions = total,
            source_count = profile.source_preferences.len(),
            keyword_count = profile.top_keywords.len(),
            "Aggregated user interests"
        );

        profile
    }

    /// Per-source affinity; each source is divided by its own interaction count
    fn source_preferences(&self, activities: &[UserActivity]) -> HashMap<String, f64> {
        let mut tallies: HashMap<&str, SourceTally> = HashMap::new();

        for activity in activities {
            let tally = tallies.entry(activity.article.source.as_str()).or_default();
            tally.total += 1;
            match activity.action {
                ActivityAction::Upvote => tally.upvotes += 1,
                ActivityAction::Read => tally.reads += 1,
                _ => {}
            }
        }

        tallies
            .into_iter()
            .map(|(source, tally)| (source.to_string(), tally.affinity()))
            .collect()
    }

    /// Most frequent keywords across engaged articles; ties keep first-seen order
    fn top_keywords(&self, activities: &[UserActivity]) -> Vec<String> {
        let mut counts: HashMap<String, (u64, usize)> = HashMap::new();
        let mut next_rank = 0usize;

        for activity in activities.iter().filter(|a| a.action.is_engagement()) {
            let text = activity.article.content_text();
            for keyword in self.extractor.extract_ordered_keywords(&text) {
                let entry = counts.entry(keyword).or_insert_with(|| {
                    next_rank += 1;
                    (0, next_rank)
                });
                entry.0 += 1;
            }
        }

        let mut ranked: Vec<(String, u64, usize)> = counts
            .into_iter()
            .map(|(keyword, (count, first_seen))| (keyword, count, first_seen))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));
        ranked.truncate(self.top_keywords_limit);

        ranked.into_iter().map(|(keyword, _, _)| keyword).collect()
    }
}

fn count_action(activities: &[UserActivity], action: ActivityAction) -> u64 {
    activities.iter().filter(|a| a.action == action).count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;
    use chrono::Utc;
    use uuid::Uuid;

    fn activity(source: &str, title: &str, action: ActivityAction) -> UserActivity {
        UserActivity {
            user_id: Uuid::nil(),
            action,
            created_at: Utc::now(),
            article: Article {
                id: Uuid::new_v4(),
                title: title.to_string(),
                description: None,
                source: source.to_string(),
                url: "https://example.com".to_string(),
                published_at: Utc::now(),
                score: 50.0,
                topics: Vec::new(),
            },
        }
    }

    #[test]
    fn test_empty_history_yields_empty_profile() {
        let builder = InterestBuilder::new(20);
        assert_eq!(builder.build_profile(&[]), UserProfile::empty());
    }

    #[test]
    fn test_source_affinity_uses_per_source_denominator() {
        let builder = InterestBuilder::new(20);
        let activities = vec![
            activity("Hacker News", "Compilers", ActivityAction::Upvote),
            activity("Hacker News", "Kernels", ActivityAction::Read),
            activity("Hacker News", "Browsers", ActivityAction::View),
            activity("Ars Technica", "Satellites", ActivityAction::Downvote),
        ];

        let profile = builder.build_profile(&activities);

        let hn = profile.source_affinity("Hacker News").unwrap();
        assert!((hn - 1.0).abs() < 1e-9, "(2 + 1) / 3 = 1.0, got {}", hn);
        assert_eq!(profile.source_affinity("Ars Technica"), Some(0.0));
        assert_eq!(profile.total_interactions, 4);
        assert!((profile.upvote_rate - 0.25).abs() < 1e-9);
        assert!((profile.read_rate - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_top_keywords_only_from_engaged_articles() {
        let builder = InterestBuilder::new(20);
        let activities = vec![
            activity("Lobsters", "Rust compiler internals", ActivityAction::Save),
            activity("Lobsters", "Rust borrow checker", ActivityAction::Read),
            activity("Lobsters", "Gardening tips", ActivityAction::View),
            activity("Lobsters", "Celebrity gossip", ActivityAction::Downvote),
        ];

        let profile = builder.build_profile(&activities);

        assert_eq!(profile.top_keywords[0], "rust");
        assert!(profile.top_keywords.contains(&"compiler".to_string()));
        assert!(!profile.top_keywords.contains(&"gardening".to_string()));
        assert!(!profile.top_keywords.contains(&"gossip".to_string()));
    }

    #[test]
    fn test_top_keywords_limit_and_tie_order() {
        let builder = InterestBuilder::new(2);
        let activities = vec![
            activity("Lobsters", "alpha bravo charlie", ActivityAction::Upvote),
            activity("Lobsters", "charlie delta", ActivityAction::Upvote),
        ];

        let profile = builder.build_profile(&activities);

        // charlie appears twice; alpha wins the tie at count 1 by first-seen order
        assert_eq!(profile.top_keywords, vec!["charlie", "alpha"]);
    }
}
