pub mod diversity;
pub mod feed;
pub mod hot;
pub mod keywords;
pub mod profile_builder;
pub mod ranking;
pub mod recommendation;

pub use diversity::{apply_diversity_reranking, DiversityConfigResolver, DiversityLayer};
pub use feed::PersonalizedFeedService;
pub use hot::{HotArticleService, HotScorer};
pub use keywords::KeywordExtractor;
pub use profile_builder::{ProfileBuilderConfig, UserProfileBuilder};
pub use ranking::{ArticleScorer, ScoringEngine};
pub use recommendation::RecommendationEngine;
