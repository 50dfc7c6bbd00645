use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{info, Level};

use consent_engine::bus::log_signals;
use consent_engine::config::Config;
use consent_engine::repository::JsonFileRepository;
use consent_engine::ConsentEngine;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting meetup consent engine");

    let config = Config::from_env()?;

    let snapshot_path = config.snapshot_path();
    info!("Using consent snapshot: {}", snapshot_path.display());
    let repository = JsonFileRepository::new(snapshot_path)?;

    let engine = Arc::new(ConsentEngine::new(config, Arc::new(repository)).await?);

    // One explicit sweep at startup; expiry is never checked implicitly.
    let removed = engine.cleanup_expired().await;
    if removed > 0 {
        info!("Removed {} expired consent session(s)", removed);
    }

    // Log every outbound signal so the daemon is observable on its own.
    tokio::spawn(log_signals(engine.subscribe()));

    let (inbound_tx, inbound_rx) = mpsc::channel(32);
    tokio::spawn(Arc::clone(&engine).run(inbound_rx));

    info!("Consent engine ready");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    drop(inbound_tx);

    Ok(())
}
