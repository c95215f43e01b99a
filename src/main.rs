//! Mini Cache - smoke runner
//!
//! Builds the configured backend and exercises it once.

use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_cache::{create_cache, CacheError, Config};

/// Main entry point for the smoke runner.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cache through the factory
/// 4. Run a set/get/delete pass and log the outcome
/// 5. Close the backend
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mini Cache smoke run");

    let config = Config::from_env().context("loading cache configuration")?;
    info!(strategy = %config.strategy, "Configuration loaded");

    let cache = create_cache::<String>(config.strategy, config.cache)
        .context("building cache backend")?;

    let key = "mini_cache:smoke";
    cache
        .set(key, "ok".to_string(), Duration::from_secs(30))
        .await
        .context("smoke set")?;
    let value = cache.get(key).await.context("smoke get")?;
    info!(key, value = %value, "Smoke read succeeded");

    cache.delete(key).await.context("smoke delete")?;
    match cache.get(key).await {
        Err(CacheError::NotFound) => info!(key, "Smoke delete confirmed"),
        Ok(_) => warn!(key, "Key still present after delete"),
        Err(e) => return Err(e).context("smoke verify"),
    }

    cache.close().await.context("closing cache")?;
    info!("Smoke run complete");
    Ok(())
}
