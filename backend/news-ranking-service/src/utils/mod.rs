// Utility functions for news-ranking-service

use crate::config::RecencyTier;
use std::collections::HashSet;
use std::hash::Hash;

/// Upper bound of every published score
pub const MAX_SCORE: f64 = 100.0;

/// Clamp a raw score into [0, 100]
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, MAX_SCORE)
}

/// Bonus of the first tier the age falls under, 0 when older than every tier
pub fn recency_bonus(age_hours: f64, tiers: &[RecencyTier]) -> f64 {
    tiers
        .iter()
        .find(|tier| age_hours < tier.max_age_hours)
        .map(|tier| tier.bonus)
        .unwrap_or(0.0)
}

/// `|A ∩ B| / max(|A|, |B|) × 100`; 0 when both sets are empty
pub fn overlap_percent<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let larger = a.len().max(b.len());
    if larger == 0 {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    shared as f64 / larger as f64 * 100.0
}
