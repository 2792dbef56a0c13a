use anyhow::Context;
use news_ranking_service::{
    cache::RedisProfileCache,
    jobs::{ProfileRefreshConfig, ProfileRefreshJob},
    store::PgRankingStore,
    Config, RankingService,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load config")?;

    // Initialize tracing
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.service.log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }

    info!("Starting {}", config.service.service_name);

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    let cache = RedisProfileCache::connect(&config.redis.url)
        .await
        .context("Failed to connect to Redis")?;
    if let Err(e) = cache.ping().await {
        warn!(error = %e, "Redis ping failed; profiles will be recomputed on every read");
    }

    let store = Arc::new(PgRankingStore::new(pool));
    let service = RankingService::new(store.clone(), Arc::new(cache), &config.ranking);

    let refresh_config = ProfileRefreshConfig::from_env()?;
    let job = ProfileRefreshJob::new(
        refresh_config,
        store,
        service.profile_builder(),
        service.scoring(),
    );

    tokio::select! {
        result = job.run() => {
            let stats = result.map_err(|e| {
                error!("Profile refresh job failed: {:#}", e);
                e
            })?;
            info!(
                processed = stats.users_processed,
                succeeded = stats.users_succeeded,
                failed = stats.users_failed,
                "Profile refresh job completed"
            );
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}
