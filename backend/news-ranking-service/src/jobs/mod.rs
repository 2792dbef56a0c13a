// ============================================
// Background Jobs Module
// ============================================
//
// Profile refresh: rebuilds the profiles of recently active users so the
// cache stays warm, and optionally persists their personalized scores.
//
// Runs inside the service binary, either once or on an interval
// (PROFILE_REFRESH_RUN_ONCE / PROFILE_REFRESH_INTERVAL_SECS).

pub mod profile_refresh;

pub use profile_refresh::{ProfileRefreshConfig, ProfileRefreshJob, RefreshJobStats};
