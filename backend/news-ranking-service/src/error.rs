use thiserror::Error;

/// Errors surfaced by the ranking service.
///
/// Ranking itself degrades instead of failing; only collaborator failures
/// (store queries, payload encoding) and startup configuration reach callers.
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for RankingError {
    fn from(err: sqlx::Error) -> Self {
        RankingError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for RankingError {
    fn from(err: serde_json::Error) -> Self {
        RankingError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RankingError>;
