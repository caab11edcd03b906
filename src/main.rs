//! Cacher demo - exercises the cache engine from a long-running process
//!
//! Builds a cache from environment configuration, runs a short workload,
//! prints the diagnostics and keeps the background sweeper alive until
//! shutdown.

use std::time::Duration;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cacher::{CacheConfig, CacheError, Cacher, EvictionPolicy};

/// Main entry point for the cache demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache (starts the expiry sweeper)
/// 4. Run a sample workload and print statistics
/// 5. Wait for SIGINT/SIGTERM, then close the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cacher=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cacher demo");

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: capacity={}, clearing_interval={:?}, policy={}",
        config.capacity, config.clearing_interval, config.eviction_policy
    );

    let cache: Cacher<String, String> = Cacher::with_config(config);

    run_workload(&cache).await?;

    let stats = cache.stats().await;
    println!("{}", stats);
    println!("{}", serde_json::to_string_pretty(&stats)?);

    shutdown_signal().await;

    cache.close().await;
    info!("Shutdown complete");
    Ok(())
}

/// Touches every public operation once.
async fn run_workload(cache: &Cacher<String, String>) -> anyhow::Result<()> {
    let short_ttl = Duration::from_secs(2);
    let long_ttl = Duration::from_secs(300);

    for i in 0..5 {
        cache
            .set(format!("user:{}", i), format!("profile-{}", i), long_ttl)
            .await;
    }
    cache
        .set("session:tmp".to_string(), "token".to_string(), short_ttl)
        .await;

    let hot = "user:0".to_string();
    for _ in 0..3 {
        cache.get(&hot).await?;
    }
    info!("Counter for {}: {}", hot, cache.counter(&hot).await?);

    cache.set_ttl(&hot, Duration::ZERO).await?;
    info!("TTL for {} is now {:?}", hot, cache.ttl(&hot).await?);

    match cache.delete(&"user:4".to_string()).await {
        Ok(()) => info!("Deleted user:4"),
        Err(CacheError::NotFound) => warn!("user:4 was already gone"),
        Err(err) => return Err(err.into()),
    }

    cache.set_eviction_policy(EvictionPolicy::Lfu).await?;
    if let Err(err) = cache.set_capacity(-1).await {
        info!("Rejected capacity change: {}", err);
    }

    let keys = cache.keys().await?;
    info!("{} live keys, {} values", keys.len(), cache.get_all().await.len());

    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
