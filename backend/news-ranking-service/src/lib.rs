pub mod cache;
pub mod config;
pub mod error;
pub mod jobs;
pub mod models;
pub mod service;
pub mod services;
pub mod store;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use error::{RankingError, Result};
pub use service::RankingService;
pub use services::{
    apply_diversity_reranking, DiversityConfigResolver, DiversityLayer, HotArticleService,
    HotScorer, KeywordExtractor, PersonalizedFeedService, RecommendationEngine, ScoringEngine,
    UserProfileBuilder,
};
