use crate::error::{RankingError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub ranking: RankingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
    pub log_format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

/// Age-bucketed bonus: the first tier whose `max_age_hours` exceeds the age wins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecencyTier {
    pub max_age_hours: f64,
    pub bonus: f64,
}

/// Tunables of the personalized feed score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringWeights {
    /// Multiplier applied to the source affinity
    pub source_bonus_multiplier: f64,
    /// Points per article keyword found in the profile's top keywords
    pub topic_bonus_per_keyword: f64,
    /// Points removed for articles the user touched recently
    pub recent_interaction_penalty: f64,
    pub recent_interaction_window_hours: i64,
    pub recency_tiers: Vec<RecencyTier>,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            source_bonus_multiplier: 10.0,
            topic_bonus_per_keyword: 5.0,
            recent_interaction_penalty: 10.0,
            recent_interaction_window_hours: 24,
            recency_tiers: vec![
                RecencyTier {
                    max_age_hours: 6.0,
                    bonus: 15.0,
                },
                RecencyTier {
                    max_age_hours: 24.0,
                    bonus: 10.0,
                },
                RecencyTier {
                    max_age_hours: 48.0,
                    bonus: 5.0,
                },
            ],
        }
    }
}

/// Tunables of the content-similarity recommender
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationWeights {
    pub keyword_similarity_weight: f64,
    pub topic_similarity_weight: f64,
    /// Score granted when every top topic matches
    pub topic_affinity_max: f64,
    /// Fixed divisor of the topic affinity term, independent of how many top topics exist
    pub topic_affinity_denominator: f64,
    pub top_topics_limit: usize,
    pub source_affinity_multiplier: f64,
    pub serendipity_bonus: f64,
    /// Base score a candidate needs to earn the serendipity bonus
    pub serendipity_min_score: f64,
    /// Similarity above which the "similar articles" reason is used
    pub similarity_reason_threshold: f64,
    /// Results must score strictly above this
    pub min_score: f64,
    pub default_limit: usize,
    pub max_limit: usize,
    pub engaged_set_size: usize,
    pub candidate_pool_size: usize,
    pub recency_tiers: Vec<RecencyTier>,
}

impl Default for RecommendationWeights {
    fn default() -> Self {
        Self {
            keyword_similarity_weight: 0.6,
            topic_similarity_weight: 0.4,
            topic_affinity_max: 40.0,
            topic_affinity_denominator: 5.0,
            top_topics_limit: 5,
            source_affinity_multiplier: 15.0,
            serendipity_bonus: 20.0,
            serendipity_min_score: 50.0,
            similarity_reason_threshold: 30.0,
            min_score: 10.0,
            default_limit: 10,
            max_limit: 50,
            engaged_set_size: 20,
            candidate_pool_size: 100,
            recency_tiers: vec![
                RecencyTier {
                    max_age_hours: 12.0,
                    bonus: 15.0,
                },
                RecencyTier {
                    max_age_hours: 24.0,
                    bonus: 10.0,
                },
                RecencyTier {
                    max_age_hours: 48.0,
                    bonus: 5.0,
                },
            ],
        }
    }
}

/// Tunables of the non-personalized "hot now" ranking
#[derive(Debug, Clone, PartialEq)]
pub struct HotWeights {
    /// Exponent of the age decay; higher decays faster
    pub gravity: f64,
    /// Hours added to the age so brand-new articles do not divide by zero
    pub age_offset_hours: f64,
    /// Results must score at or above this
    pub min_score: f64,
    pub default_limit: usize,
    pub max_limit: usize,
    /// Most recent articles considered per request
    pub candidate_pool_size: usize,
    /// Multiplier per source label; unlisted sources weigh 1.0
    pub source_weights: HashMap<String, f64>,
}

impl HotWeights {
    pub fn source_weight(&self, source: &str) -> f64 {
        self.source_weights.get(source).copied().unwrap_or(1.0)
    }
}

impl Default for HotWeights {
    fn default() -> Self {
        let source_weights = [
            ("Hacker News", 1.5),
            ("Reddit", 1.0),
            ("Medium", 0.8),
            ("Substack", 1.2),
            ("Google News", 1.0),
            ("TechCrunch", 1.3),
            ("The Verge", 1.2),
            ("Ars Technica", 1.2),
        ]
        .into_iter()
        .map(|(source, weight)| (source.to_string(), weight))
        .collect();

        Self {
            gravity: 1.8,
            age_offset_hours: 2.0,
            min_score: 0.1,
            default_limit: 20,
            max_limit: 100,
            candidate_pool_size: 500,
            source_weights,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingConfig {
    pub profile_cache_ttl_secs: u64,
    pub top_keywords_limit: usize,
    pub default_feed_limit: usize,
    pub max_feed_limit: usize,
    pub scoring: ScoringWeights,
    pub recommendation: RecommendationWeights,
    pub hot: HotWeights,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            profile_cache_ttl_secs: 300,
            top_keywords_limit: 20,
            default_feed_limit: 20,
            max_feed_limit: 100,
            scoring: ScoringWeights::default(),
            recommendation: RecommendationWeights::default(),
            hot: HotWeights::default(),
        }
    }
}

impl RankingConfig {
    /// Defaults overridden by `RANKING_*` environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let scoring = defaults.scoring;
        let recommendation = defaults.recommendation;
        let hot = defaults.hot;

        Ok(Self {
            profile_cache_ttl_secs: env_or(
                "RANKING_PROFILE_CACHE_TTL_SECS",
                defaults.profile_cache_ttl_secs,
            )?,
            top_keywords_limit: env_or("RANKING_TOP_KEYWORDS_LIMIT", defaults.top_keywords_limit)?,
            default_feed_limit: env_or("RANKING_DEFAULT_FEED_LIMIT", defaults.default_feed_limit)?,
            max_feed_limit: env_or("RANKING_MAX_FEED_LIMIT", defaults.max_feed_limit)?,
            scoring: ScoringWeights {
                source_bonus_multiplier: env_or(
                    "RANKING_SOURCE_BONUS_MULTIPLIER",
                    scoring.source_bonus_multiplier,
                )?,
                topic_bonus_per_keyword: env_or(
                    "RANKING_TOPIC_BONUS_PER_KEYWORD",
                    scoring.topic_bonus_per_keyword,
                )?,
                recent_interaction_penalty: env_or(
                    "RANKING_RECENT_INTERACTION_PENALTY",
                    scoring.recent_interaction_penalty,
                )?,
                recent_interaction_window_hours: env_or(
                    "RANKING_RECENT_INTERACTION_WINDOW_HOURS",
                    scoring.recent_interaction_window_hours,
                )?,
                recency_tiers: scoring.recency_tiers,
            },
            recommendation: RecommendationWeights {
                min_score: env_or("RANKING_RECOMMENDATION_MIN_SCORE", recommendation.min_score)?,
                max_limit: env_or("RANKING_RECOMMENDATION_MAX_LIMIT", recommendation.max_limit)?,
                engaged_set_size: env_or(
                    "RANKING_RECOMMENDATION_ENGAGED_SET_SIZE",
                    recommendation.engaged_set_size,
                )?,
                candidate_pool_size: env_or(
                    "RANKING_RECOMMENDATION_CANDIDATE_POOL_SIZE",
                    recommendation.candidate_pool_size,
                )?,
                ..recommendation
            },
            hot: HotWeights {
                gravity: env_or("RANKING_HOT_GRAVITY", hot.gravity)?,
                min_score: env_or("RANKING_HOT_MIN_SCORE", hot.min_score)?,
                candidate_pool_size: env_or(
                    "RANKING_HOT_CANDIDATE_POOL_SIZE",
                    hot.candidate_pool_size,
                )?,
                ..hot
            },
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            service: ServiceConfig {
                service_name: env::var("SERVICE_NAME")
                    .unwrap_or_else(|_| "news-ranking-service".to_string()),
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .map_err(|_| RankingError::Config("DATABASE_URL must be set".to_string()))?,
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            },
            ranking: RankingConfig::from_env()?,
        })
    }
}

/// Parse `key` from the environment, falling back to `default` when unset
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| RankingError::Config(format!("{} is invalid: {}", key, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ranking_config() {
        let config = RankingConfig::default();
        assert_eq!(config.profile_cache_ttl_secs, 300);
        assert_eq!(config.top_keywords_limit, 20);
        assert_eq!(config.scoring.recency_tiers.len(), 3);
        assert_eq!(config.recommendation.topic_affinity_denominator, 5.0);
        assert_eq!(config.recommendation.max_limit, 50);
        assert_eq!(config.hot.gravity, 1.8);
        assert_eq!(config.hot.source_weight("Hacker News"), 1.5);
        assert_eq!(config.hot.source_weight("Personal Blog"), 1.0);
    }

    #[test]
    fn test_env_or_parses_and_rejects() {
        env::set_var("RANKING_TEST_ENV_OR_OK", " 42 ");
        env::set_var("RANKING_TEST_ENV_OR_BAD", "forty-two");

        assert_eq!(env_or("RANKING_TEST_ENV_OR_OK", 0u32).unwrap(), 42);
        assert_eq!(env_or("RANKING_TEST_ENV_OR_MISSING", 7u32).unwrap(), 7);
        assert!(matches!(
            env_or("RANKING_TEST_ENV_OR_BAD", 0u32),
            Err(RankingError::Config(_))
        ));
    }
}
