use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Topic assigned to articles by the ingestion pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// Article ↔ topic relation with a relevance weight in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleTopic {
    pub article_id: Uuid,
    pub topic: Topic,
    pub relevance: f64,
}

/// Normalized feed article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Publication label, e.g. "Hacker News"
    pub source: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    /// Editorial/base quality score (0-100)
    pub score: f64,
    /// Topic relations, loaded by relevance descending
    #[serde(default)]
    pub topics: Vec<ArticleTopic>,
}

impl Article {
    /// Title and description joined for keyword extraction
    pub fn content_text(&self) -> String {
        match self.description.as_deref() {
            Some(description) => format!("{} {}", self.title, description),
            None => self.title.clone(),
        }
    }

    /// Highest-relevance topic; the first one wins on equal relevance
    pub fn primary_topic(&self) -> Option<&Topic> {
        self.topics
            .iter()
            .fold(None::<&ArticleTopic>, |best, candidate| match best {
                Some(current) if current.relevance >= candidate.relevance => Some(current),
                _ => Some(candidate),
            })
            .map(|relation| &relation.topic)
    }

    pub fn has_topic_slug(&self, slug: &str) -> bool {
        self.topics.iter().any(|relation| relation.topic.slug == slug)
    }

    /// Age in fractional hours relative to `now` (never negative)
    pub fn age_hours(&self, now: DateTime<Utc>) -> f64 {
        let seconds = (now - self.published_at).num_seconds().max(0);
        seconds as f64 / 3600.0
    }
}

/// Interaction kinds recorded in the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    View,
    Read,
    Upvote,
    Downvote,
    Save,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Read => "read",
            Self::Upvote => "upvote",
            Self::Downvote => "downvote",
            Self::Save => "save",
        }
    }

    /// Actions that count as positive engagement for keyword interests
    pub fn is_engagement(&self) -> bool {
        matches!(self, Self::Upvote | Self::Read | Self::Save)
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view" => Ok(Self::View),
            "read" => Ok(Self::Read),
            "upvote" => Ok(Self::Upvote),
            "downvote" => Ok(Self::Downvote),
            "save" => Ok(Self::Save),
            other => Err(format!("unknown activity action: {}", other)),
        }
    }
}

/// One row of the activity log joined with the article it references
#[derive(Debug, Clone, PartialEq)]
pub struct UserActivity {
    pub user_id: Uuid,
    pub action: ActivityAction,
    pub created_at: DateTime<Utc>,
    pub article: Article,
}

/// Stored diversity preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiversityLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl DiversityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for DiversityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DiversityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown diversity level: {}", other)),
        }
    }
}

/// Per-user settings row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub user_id: Uuid,
    pub diversity_level: DiversityLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Re-ranking thresholds derived from [`DiversityLevel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiversityConfig {
    /// Repeats of one source allowed before penalties apply
    pub source_threshold: u32,
    /// Repeats of one primary topic allowed before penalties apply
    pub topic_threshold: u32,
    /// Points subtracted per excess repeat
    pub penalty_strength: u32,
}

/// Behavioral profile derived from the activity log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// source → (upvotes×2 + reads) / interactions with that source
    pub source_preferences: HashMap<String, f64>,
    /// Most frequent engaged keywords, frequency descending
    pub top_keywords: Vec<String>,
    pub total_interactions: u64,
    pub upvote_rate: f64,
    pub read_rate: f64,
}

impl UserProfile {
    /// Cold-start profile
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.total_interactions == 0
    }

    pub fn source_affinity(&self, source: &str) -> Option<f64> {
        self.source_preferences.get(source).copied()
    }
}

/// Explainable parts of a personalized score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub base_score: f64,
    pub source_bonus: f64,
    pub topic_bonus: f64,
    pub recency_bonus: f64,
    /// Zero or negative
    pub diversity_penalty: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.base_score
            + self.source_bonus
            + self.topic_bonus
            + self.recency_bonus
            + self.diversity_penalty
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleScore {
    pub article_id: Uuid,
    /// Clamped to [0, 100]
    pub personalized_score: f64,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationBreakdown {
    pub similarity_score: f64,
    pub topic_affinity_score: f64,
    pub source_affinity_score: f64,
    pub serendipity_bonus: f64,
    pub recency_bonus: f64,
}

impl RecommendationBreakdown {
    pub fn total(&self) -> f64 {
        self.similarity_score
            + self.topic_affinity_score
            + self.source_affinity_score
            + self.serendipity_bonus
            + self.recency_bonus
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationScore {
    pub article_id: Uuid,
    /// Clamped to [0, 100]
    pub score: f64,
    pub breakdown: RecommendationBreakdown,
    pub reason: String,
}

/// A feed entry: the selected score joined with its article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedFeedItem {
    pub article: Article,
    pub score: ArticleScore,
}

/// Article ranked by engagement decayed over its age
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotArticle {
    pub article: Article,
    pub hot_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn topic(slug: &str) -> Topic {
        Topic {
            id: Uuid::new_v4(),
            name: slug.to_uppercase(),
            slug: slug.to_string(),
        }
    }

    fn article_with_topics(topics: Vec<(Topic, f64)>) -> Article {
        let id = Uuid::new_v4();
        Article {
            id,
            title: "Rust async runtimes compared".to_string(),
            description: None,
            source: "Lobsters".to_string(),
            url: "https://example.com/rust".to_string(),
            published_at: Utc::now(),
            score: 40.0,
            topics: topics
                .into_iter()
                .map(|(topic, relevance)| ArticleTopic {
                    article_id: id,
                    topic,
                    relevance,
                })
                .collect(),
        }
    }

    #[test]
    fn test_primary_topic_uses_highest_relevance() {
        let article = article_with_topics(vec![
            (topic("programming"), 0.4),
            (topic("rust"), 0.9),
            (topic("async"), 0.9),
        ]);

        assert_eq!(article.primary_topic().map(|t| t.slug.as_str()), Some("rust"));
    }

    #[test]
    fn test_primary_topic_absent_without_topics() {
        let article = article_with_topics(Vec::new());
        assert!(article.primary_topic().is_none());
    }

    #[test]
    fn test_content_text_without_description() {
        let mut article = article_with_topics(Vec::new());
        assert_eq!(article.content_text(), "Rust async runtimes compared");

        article.description = Some("tokio vs smol".to_string());
        assert_eq!(article.content_text(), "Rust async runtimes compared tokio vs smol");
    }

    #[test]
    fn test_age_hours_never_negative() {
        let mut article = article_with_topics(Vec::new());
        let now = Utc::now();
        article.published_at = now + Duration::hours(3);
        assert_eq!(article.age_hours(now), 0.0);

        article.published_at = now - Duration::minutes(90);
        assert!((article.age_hours(now) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_action_and_level() {
        assert_eq!("UPVOTE".parse::<ActivityAction>(), Ok(ActivityAction::Upvote));
        assert!("like".parse::<ActivityAction>().is_err());
        assert_eq!(" High ".parse::<DiversityLevel>(), Ok(DiversityLevel::High));
        assert_eq!(DiversityLevel::default(), DiversityLevel::Medium);
    }

    #[test]
    fn test_empty_profile_serializes_in_camel_case() {
        let json = serde_json::to_value(UserProfile::empty()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sourcePreferences": {},
                "topKeywords": [],
                "totalInteractions": 0,
                "upvoteRate": 0.0,
                "readRate": 0.0
            })
        );
    }
}
