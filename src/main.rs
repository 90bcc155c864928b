mod analysis;
mod api;
mod cache;
mod config;
mod engine;
mod error;
mod fetcher;
mod mapper;
mod news;
mod normalize;
mod screens;
mod types;

use std::str::FromStr;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Cache store over SQLite ---
    let options = sqlx::sqlite::SqliteConnectOptions::from_str(&format!("sqlite:{}", cfg.db_path))?
        .create_if_missing(true);
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .connect_with(options)
        .await?;
    let cache = CacheStore::new(pool);
    cache.init().await?;
    info!("Cache database ready at {}", cfg.db_path);

    // --- Enrichment engine ---
    let engine = Engine::new(cfg.clone(), cache)?;
    info!(
        "Engine ready: {} markets/poll, velocity threshold {:.0}%, cache TTL {}s, {} feeds",
        cfg.max_markets,
        cfg.velocity_threshold * 100.0,
        cfg.cache_ttl_secs,
        cfg.rss_feeds.len(),
    );
    if cfg.polygonscan_api_key.is_none() {
        info!("POLYGONSCAN_API_KEY not set — wallet freshness will report unknown");
    }

    // --- HTTP API server ---
    let state = ApiState {
        engine: Arc::new(engine),
    };
    let app = router(state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
