use chrono::{Duration, Utc};
use news_ranking_service::{
    cache::InMemoryProfileCache,
    config::RankingConfig,
    models::{ActivityAction, Article, ArticleTopic, DiversityLevel, Topic},
    store::InMemoryStore,
    RankingService,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

fn topic(slug: &str) -> Topic {
    Topic {
        id: Uuid::new_v5(&Uuid::NAMESPACE_OID, slug.as_bytes()),
        name: slug.to_string(),
        slug: slug.to_string(),
    }
}

fn article(source: &str, title: &str, slug: &str, score: f64, hours_old: i64) -> Article {
    let id = Uuid::new_v4();
    Article {
        id,
        title: title.to_string(),
        description: Some(format!("{} coverage from {}", slug, source)),
        source: source.to_string(),
        url: format!("https://example.com/{}", id),
        published_at: Utc::now() - Duration::hours(hours_old),
        score,
        topics: vec![ArticleTopic {
            article_id: id,
            topic: topic(slug),
            relevance: 0.9,
        }],
    }
}

struct Fixture {
    store: Arc<InMemoryStore>,
    service: RankingService,
    user_id: Uuid,
    upvoted: Article,
}

async fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let service = RankingService::new(
        store.clone(),
        Arc::new(InMemoryProfileCache::new()),
        &RankingConfig::default(),
    );
    let user_id = Uuid::new_v4();

    let upvoted = article("Hacker News", "Rust compiler performance", "programming", 60.0, 3);
    store.upsert_article(upvoted.clone()).await;
    store
        .record_activity(
            user_id,
            upvoted.id,
            ActivityAction::Upvote,
            Utc::now() - Duration::hours(1),
        )
        .await;

    for i in 0..8 {
        store
            .upsert_article(article(
                "Hacker News",
                &format!("Rust compiler story {}", i),
                "programming",
                70.0,
                2 + i,
            ))
            .await;
    }
    for (i, source) in ["Ars Technica", "The Verge", "LWN"].iter().enumerate() {
        store
            .upsert_article(article(source, "Satellite launch window", "space", 65.0, 4 + i as i64))
            .await;
    }

    Fixture {
        store,
        service,
        user_id,
        upvoted,
    }
}

#[tokio::test]
async fn test_profile_is_cached_between_calls() {
    let f = fixture().await;

    let first = f.service.build_user_profile(f.user_id).await.unwrap();
    // New activity is invisible until the cached profile is invalidated
    f.store
        .record_activity(f.user_id, f.upvoted.id, ActivityAction::Read, Utc::now())
        .await;
    let second = f.service.build_user_profile(f.user_id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.total_interactions, 1);
    assert_eq!(first.source_affinity("Hacker News"), Some(2.0));

    f.service.invalidate_profile(f.user_id).await;
    let third = f.service.build_user_profile(f.user_id).await.unwrap();
    assert_eq!(third.total_interactions, 2);
}

#[tokio::test]
async fn test_zero_activity_user_profile() {
    let f = fixture().await;
    let profile = f.service.build_user_profile(Uuid::new_v4()).await.unwrap();

    assert_eq!(
        serde_json::to_value(&profile).unwrap(),
        serde_json::json!({
            "sourcePreferences": {},
            "topKeywords": [],
            "totalInteractions": 0,
            "upvoteRate": 0.0,
            "readRate": 0.0
        })
    );
}

#[tokio::test]
async fn test_scores_sorted_and_bounded() {
    let f = fixture().await;
    let scores = f.service.calculate_personalized_scores(f.user_id).await.unwrap();

    assert_eq!(scores.len(), 12);
    assert!(scores.windows(2).all(|w| w[0].personalized_score >= w[1].personalized_score));
    assert!(scores
        .iter()
        .all(|s| (0.0..=100.0).contains(&s.personalized_score)));

    let upvoted = scores.iter().find(|s| s.article_id == f.upvoted.id).unwrap();
    assert_eq!(upvoted.breakdown.diversity_penalty, -10.0);
}

#[tokio::test]
async fn test_feed_diversity_follows_user_setting() {
    let f = fixture().await;

    let count_hn = |feed: &[news_ranking_service::models::PersonalizedFeedItem]| {
        feed.iter().filter(|item| item.article.source == "Hacker News").count()
    };

    f.store.set_diversity_level(f.user_id, DiversityLevel::Low).await;
    let low = f.service.get_personalized_feed(f.user_id, Some(6), None).await.unwrap();

    f.store.set_diversity_level(f.user_id, DiversityLevel::High).await;
    let high = f.service.get_personalized_feed(f.user_id, Some(6), None).await.unwrap();

    assert_eq!(low.len(), 6);
    assert_eq!(high.len(), 6);
    assert!(count_hn(&high) < count_hn(&low));
}

#[tokio::test]
async fn test_default_diversity_config_is_medium() {
    let f = fixture().await;
    let config = f.service.get_diversity_config(Uuid::new_v4()).await.unwrap();

    assert_eq!(
        (config.source_threshold, config.topic_threshold, config.penalty_strength),
        (3, 4, 15)
    );
}

#[tokio::test]
async fn test_recommendations_exclude_seen_articles() {
    let f = fixture().await;
    let recommendations = f.service.get_recommendations(f.user_id, None).await.unwrap();

    let ids: HashSet<Uuid> = recommendations.iter().map(|r| r.article_id).collect();
    assert!(!ids.contains(&f.upvoted.id));
    assert!(!recommendations.is_empty());
    assert!(recommendations.len() <= 10);
    assert!(recommendations.iter().all(|r| r.score > 10.0 && r.score <= 100.0));
    assert_eq!(recommendations[0].reason, "Similar to articles you upvoted");
}

#[tokio::test]
async fn test_hot_articles_are_not_personalized() {
    let f = fixture().await;
    let hot = f.service.get_hot_articles(Some(5)).await.unwrap();

    assert_eq!(hot.len(), 5);
    assert!(hot.windows(2).all(|w| w[0].hot_score >= w[1].hot_score));
    // freshest high-engagement story with the heaviest source weight
    assert_eq!(hot[0].article.title, "Rust compiler story 0");

    let everything = f.service.get_hot_articles(None).await.unwrap();
    assert_eq!(everything.len(), 12);
    assert!(everything.iter().any(|h| h.article.id == f.upvoted.id));
}
