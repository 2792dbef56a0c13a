//! PostgreSQL Ranking Store
//!
//! Expected tables:
//! - `articles(id, title, description, source, url, published_at, score)`
//! - `topics(id, name, slug)` and `article_topics(article_id, topic_id, relevance)`
//! - `user_activities(user_id, article_id, action, created_at)`
//! - `user_settings(user_id PRIMARY KEY, diversity_level, created_at, updated_at)`
//! - `article_personalized_scores(user_id, article_id, personalized_score, computed_at)`
//!   with a unique key on `(user_id, article_id)`

use super::{ActivityFilter, ArticleOrder, ArticleQuery, RankingStore};
use crate::error::{RankingError, Result};
use crate::models::{
    ActivityAction, Article, ArticleScore, ArticleTopic, DiversityLevel, Topic, UserActivity,
    UserSettings,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, error, warn};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct ArticleRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    source: String,
    url: String,
    published_at: DateTime<Utc>,
    score: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    user_id: Uuid,
    action: String,
    created_at: DateTime<Utc>,
    article_id: Uuid,
    title: String,
    description: Option<String>,
    source: String,
    url: String,
    published_at: DateTime<Utc>,
    score: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct TopicRow {
    article_id: Uuid,
    topic_id: Uuid,
    name: String,
    slug: String,
    relevance: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    user_id: Uuid,
    diversity_level: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            id: row.id,
            title: row.title,
            description: row.description,
            source: row.source,
            url: row.url,
            published_at: row.published_at,
            score: row.score,
            topics: Vec::new(),
        }
    }
}

impl From<SettingsRow> for UserSettings {
    fn from(row: SettingsRow) -> Self {
        let diversity_level = row.diversity_level.parse().unwrap_or_else(|e| {
            warn!(user_id = %row.user_id, error = %e, "Falling back to medium diversity");
            DiversityLevel::default()
        });

        UserSettings {
            user_id: row.user_id,
            diversity_level,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `RankingStore` backed by PostgreSQL
pub struct PgRankingStore {
    pool: PgPool,
}

impl PgRankingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Topics for the given articles, relevance descending per article
    async fn fetch_topics(&self, article_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<ArticleTopic>>> {
        if article_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, TopicRow>(
            r#"
            SELECT
                at.article_id,
                t.id AS topic_id,
                t.name,
                t.slug,
                at.relevance::FLOAT8 AS relevance
            FROM article_topics at
            JOIN topics t ON t.id = at.topic_id
            WHERE at.article_id = ANY($1)
            ORDER BY at.article_id, at.relevance DESC
            "#,
        )
        .bind(article_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to fetch article topics: {}", e);
            RankingError::Database(e.to_string())
        })?;

        let mut topics: HashMap<Uuid, Vec<ArticleTopic>> = HashMap::new();
        for row in rows {
            topics.entry(row.article_id).or_default().push(ArticleTopic {
                article_id: row.article_id,
                topic: Topic {
                    id: row.topic_id,
                    name: row.name,
                    slug: row.slug,
                },
                relevance: row.relevance,
            });
        }

        Ok(topics)
    }

    async fn attach_topics(&self, articles: &mut [Article]) -> Result<()> {
        let ids: Vec<Uuid> = articles.iter().map(|a| a.id).collect();
        let mut topics = self.fetch_topics(&ids).await?;
        for article in articles.iter_mut() {
            article.topics = topics.remove(&article.id).unwrap_or_default();
        }
        Ok(())
    }
}

fn to_limit(limit: Option<usize>) -> Option<i64> {
    limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX))
}

#[async_trait]
impl RankingStore for PgRankingStore {
    async fn fetch_activities(
        &self,
        user_id: Uuid,
        filter: &ActivityFilter,
    ) -> Result<Vec<UserActivity>> {
        let actions: Option<Vec<String>> = filter
            .actions
            .as_ref()
            .map(|actions| actions.iter().map(|a| a.as_str().to_string()).collect());

        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT
                ua.user_id,
                ua.action,
                ua.created_at,
                a.id AS article_id,
                a.title,
                a.description,
                a.source,
                a.url,
                a.published_at,
                a.score::FLOAT8 AS score
            FROM user_activities ua
            JOIN articles a ON a.id = ua.article_id
            WHERE ua.user_id = $1
                AND ($2::TIMESTAMPTZ IS NULL OR ua.created_at >= $2)
                AND ($3::TEXT[] IS NULL OR ua.action = ANY($3))
                AND NOT (ua.article_id = ANY($4))
            ORDER BY ua.created_at DESC
            LIMIT $5
            "#,
        )
        .bind(user_id)
        .bind(filter.since)
        .bind(actions)
        .bind(&filter.exclude_article_ids)
        .bind(to_limit(filter.limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(user_id = %user_id, "Failed to fetch user activities: {}", e);
            RankingError::Database(e.to_string())
        })?;

        let mut activities = Vec::with_capacity(rows.len());
        for row in rows {
            let action: ActivityAction = match row.action.parse() {
                Ok(action) => action,
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Skipping activity with unknown action");
                    continue;
                }
            };
            activities.push(UserActivity {
                user_id: row.user_id,
                action,
                created_at: row.created_at,
                article: Article {
                    id: row.article_id,
                    title: row.title,
                    description: row.description,
                    source: row.source,
                    url: row.url,
                    published_at: row.published_at,
                    score: row.score,
                    topics: Vec::new(),
                },
            });
        }

        let mut article_ids: Vec<Uuid> = activities.iter().map(|a| a.article.id).collect();
        article_ids.sort_unstable();
        article_ids.dedup();
        let topics = self.fetch_topics(&article_ids).await?;
        for activity in &mut activities {
            if let Some(article_topics) = topics.get(&activity.article.id) {
                activity.article.topics = article_topics.clone();
            }
        }

        debug!(user_id = %user_id, count = activities.len(), "Fetched user activities");
        Ok(activities)
    }

    async fn fetch_articles(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        let order_clause = match query.order {
            ArticleOrder::PublishedDesc => "a.published_at DESC",
            ArticleOrder::ScoreDesc => "a.score DESC, a.published_at DESC",
        };

        let sql = format!(
            r#"
            SELECT
                a.id,
                a.title,
                a.description,
                a.source,
                a.url,
                a.published_at,
                a.score::FLOAT8 AS score
            FROM articles a
            WHERE ($1::UUID[] IS NULL OR a.id = ANY($1))
                AND NOT (a.id = ANY($2))
            ORDER BY {}
            LIMIT $3
            "#,
            order_clause
        );

        let rows = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(query.ids.as_deref())
            .bind(&query.exclude_ids)
            .bind(to_limit(query.limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to fetch articles: {}", e);
                RankingError::Database(e.to_string())
            })?;

        let mut articles: Vec<Article> = rows.into_iter().map(Article::from).collect();
        self.attach_topics(&mut articles).await?;

        Ok(articles)
    }

    async fn get_settings(&self, user_id: Uuid) -> Result<Option<UserSettings>> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT user_id, diversity_level, created_at, updated_at
            FROM user_settings
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(user_id = %user_id, "Failed to fetch user settings: {}", e);
            RankingError::Database(e.to_string())
        })?;

        Ok(row.map(UserSettings::from))
    }

    async fn create_default_settings(&self, user_id: Uuid) -> Result<UserSettings> {
        // The no-op update makes RETURNING yield the row even when it already exists
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            INSERT INTO user_settings (user_id, diversity_level, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING user_id, diversity_level, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(DiversityLevel::default().as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(user_id = %user_id, "Failed to create default settings: {}", e);
            RankingError::Database(e.to_string())
        })?;

        Ok(row.into())
    }

    async fn fetch_active_users(&self, since: DateTime<Utc>, limit: usize) -> Result<Vec<Uuid>> {
        let users = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id
            FROM user_activities
            WHERE created_at >= $1
            GROUP BY user_id
            ORDER BY MAX(created_at) DESC
            LIMIT $2
            "#,
        )
        .bind(since)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to fetch active users: {}", e);
            RankingError::Database(e.to_string())
        })?;

        Ok(users)
    }

    async fn save_personalized_scores(
        &self,
        user_id: Uuid,
        scores: &[ArticleScore],
    ) -> Result<u64> {
        if scores.is_empty() {
            return Ok(0);
        }

        let article_ids: Vec<Uuid> = scores.iter().map(|s| s.article_id).collect();
        let values: Vec<f64> = scores.iter().map(|s| s.personalized_score).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO article_personalized_scores
                (user_id, article_id, personalized_score, computed_at)
            SELECT $1, s.article_id, s.personalized_score, NOW()
            FROM UNNEST($2::UUID[], $3::FLOAT8[]) AS s(article_id, personalized_score)
            ON CONFLICT (user_id, article_id) DO UPDATE
            SET personalized_score = EXCLUDED.personalized_score,
                computed_at = EXCLUDED.computed_at
            "#,
        )
        .bind(user_id)
        .bind(&article_ids)
        .bind(&values)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(user_id = %user_id, "Failed to save personalized scores: {}", e);
            RankingError::Database(e.to_string())
        })?;

        Ok(result.rows_affected())
    }
}
