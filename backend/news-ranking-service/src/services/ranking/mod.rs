/// Ranking Module
///
/// Personalized, explainable scoring of every candidate article.
///
/// # Architecture
/// - **Scorer**: pure arithmetic over (article, profile, recent ids, now)
/// - **Engine**: loads profile, catalogue and recent activity, then scores
///
/// # Score
/// ```text
/// personalized = clamp(base + source×10 + 5×keyword matches
///                      + recency(6h/24h/48h → 15/10/5)
///                      − 10 if interacted within 24h, 0, 100)
/// ```
pub mod engine;
pub mod scorer;

pub use engine::ScoringEngine;
pub use scorer::ArticleScorer;
