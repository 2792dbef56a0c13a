use super::{ActivityFilter, ArticleOrder, ArticleQuery, RankingStore};
use crate::error::Result;
use crate::models::{
    ActivityAction, Article, ArticleScore, DiversityLevel, UserActivity, UserSettings,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct ActivityRecord {
    user_id: Uuid,
    article_id: Uuid,
    action: ActivityAction,
    created_at: DateTime<Utc>,
}

/// Process-local store used by tests and local runs
#[derive(Default)]
pub struct InMemoryStore {
    articles: RwLock<Vec<Article>>,
    activities: RwLock<Vec<ActivityRecord>>,
    settings: RwLock<HashMap<Uuid, UserSettings>>,
    personalized_scores: RwLock<HashMap<(Uuid, Uuid), f64>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an article
    pub async fn upsert_article(&self, article: Article) {
        let mut articles = self.articles.write().await;
        match articles.iter_mut().find(|existing| existing.id == article.id) {
            Some(existing) => *existing = article,
            None => articles.push(article),
        }
    }

    pub async fn record_activity(
        &self,
        user_id: Uuid,
        article_id: Uuid,
        action: ActivityAction,
        created_at: DateTime<Utc>,
    ) {
        self.activities.write().await.push(ActivityRecord {
            user_id,
            article_id,
            action,
            created_at,
        });
    }

    pub async fn set_diversity_level(&self, user_id: Uuid, level: DiversityLevel) {
        let now = Utc::now();
        self.settings
            .write()
            .await
            .entry(user_id)
            .and_modify(|settings| {
                settings.diversity_level = level;
                settings.updated_at = now;
            })
            .or_insert(UserSettings {
                user_id,
                diversity_level: level,
                created_at: now,
                updated_at: now,
            });
    }

    pub async fn personalized_score(&self, user_id: Uuid, article_id: Uuid) -> Option<f64> {
        self.personalized_scores
            .read()
            .await
            .get(&(user_id, article_id))
            .copied()
    }
}

#[async_trait]
impl RankingStore for InMemoryStore {
    async fn fetch_activities(
        &self,
        user_id: Uuid,
        filter: &ActivityFilter,
    ) -> Result<Vec<UserActivity>> {
        let articles = self.articles.read().await;
        let by_id: HashMap<Uuid, &Article> = articles.iter().map(|a| (a.id, a)).collect();
        let excluded: HashSet<&Uuid> = filter.exclude_article_ids.iter().collect();

        let mut records: Vec<ActivityRecord> = self
            .activities
            .read()
            .await
            .iter()
            .filter(|record| record.user_id == user_id)
            .filter(|record| filter.since.map_or(true, |since| record.created_at >= since))
            .filter(|record| {
                filter
                    .actions
                    .as_ref()
                    .map_or(true, |actions| actions.contains(&record.action))
            })
            .filter(|record| !excluded.contains(&record.article_id))
            .cloned()
            .collect();

        // Newest first; stable sort keeps later inserts ahead on equal timestamps
        records.reverse();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let activities = records
            .into_iter()
            // Activities always reference an existing article
            .filter_map(|record| {
                by_id.get(&record.article_id).map(|article| UserActivity {
                    user_id: record.user_id,
                    action: record.action,
                    created_at: record.created_at,
                    article: (*article).clone(),
                })
            })
            .take(filter.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(activities)
    }

    async fn fetch_articles(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        let excluded: HashSet<&Uuid> = query.exclude_ids.iter().collect();
        let mut articles: Vec<Article> = self
            .articles
            .read()
            .await
            .iter()
            .filter(|article| {
                query
                    .ids
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&article.id))
            })
            .filter(|article| !excluded.contains(&article.id))
            .cloned()
            .collect();

        match query.order {
            ArticleOrder::PublishedDesc => {
                articles.sort_by(|a, b| b.published_at.cmp(&a.published_at))
            }
            ArticleOrder::ScoreDesc => {
                articles.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
            }
        }

        for article in &mut articles {
            article
                .topics
                .sort_by(|a, b| b.relevance.partial_cmp(&a.relevance).unwrap_or(Ordering::Equal));
        }

        if let Some(limit) = query.limit {
            articles.truncate(limit);
        }

        Ok(articles)
    }

    async fn get_settings(&self, user_id: Uuid) -> Result<Option<UserSettings>> {
        Ok(self.settings.read().await.get(&user_id).cloned())
    }

    async fn create_default_settings(&self, user_id: Uuid) -> Result<UserSettings> {
        let now = Utc::now();
        let settings = self
            .settings
            .write()
            .await
            .entry(user_id)
            .or_insert(UserSettings {
                user_id,
                diversity_level: DiversityLevel::default(),
                created_at: now,
                updated_at: now,
            })
            .clone();
        Ok(settings)
    }

    async fn fetch_active_users(&self, since: DateTime<Utc>, limit: usize) -> Result<Vec<Uuid>> {
        let mut last_seen: HashMap<Uuid, DateTime<Utc>> = HashMap::new();
        for record in self.activities.read().await.iter() {
            if record.created_at < since {
                continue;
            }
            let entry = last_seen.entry(record.user_id).or_insert(record.created_at);
            if record.created_at > *entry {
                *entry = record.created_at;
            }
        }

        let mut users: Vec<(Uuid, DateTime<Utc>)> = last_seen.into_iter().collect();
        users.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(users.into_iter().take(limit).map(|(user_id, _)| user_id).collect())
    }

    async fn save_personalized_scores(
        &self,
        user_id: Uuid,
        scores: &[ArticleScore],
    ) -> Result<u64> {
        let mut stored = self.personalized_scores.write().await;
        for score in scores {
            stored.insert((user_id, score.article_id), score.personalized_score);
        }
        Ok(scores.len() as u64)
    }
}
