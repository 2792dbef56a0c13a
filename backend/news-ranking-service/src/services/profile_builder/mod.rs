// ============================================
// User Profile Builder
// ============================================
//
// Builds the behavioral profile every ranking engine reads:
// source affinities, top engaged keywords, engagement rates.
//
// ┌──────────────────────────────────────────────┐
// │              UserProfileBuilder              │
// │   cache (user-profile:{id}, TTL 300s)        │
// │        │ miss                                │
// │  ┌─────▼──────────┐     ┌─────────────────┐  │
// │  │ RankingStore   │────▶│ InterestBuilder │  │
// │  │ (activity log) │     │ (aggregation)   │  │
// │  └────────────────┘     └─────────────────┘  │
// └──────────────────────────────────────────────┘

pub mod interest_builder;
pub mod profile_updater;

pub use interest_builder::InterestBuilder;
pub use profile_updater::{ProfileBuilderConfig, UserProfileBuilder};
