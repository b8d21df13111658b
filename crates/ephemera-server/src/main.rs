mod config;

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ephemera_store::{Clock, SessionIdentity, StoryStore, SystemClock, fixtures, run_sweep_loop};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ephemera=debug,ephemera_store=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Nobody is signed in until the host application says so
    let identity = Arc::new(SessionIdentity::signed_out());
    let store = StoryStore::builder(Arc::new(SystemClock), identity)
        .config(config.store.clone())
        .build();

    let cancel = CancellationToken::new();
    let events = tokio::spawn(log_events(store.clone(), cancel.clone()));

    if config.preview {
        store.restore(fixtures::preview_snapshot(store.clock().now()))?;
        info!("Preview mode: seeded {} reels", store.reel_count());
    }

    let sweeper = tokio::spawn(run_sweep_loop(
        store.clone(),
        config.sweep_interval,
        cancel.clone(),
    ));

    info!(
        "Ephemera story engine running (sweep every {}s)",
        config.sweep_interval.as_secs()
    );

    shutdown_signal().await?;
    cancel.cancel();

    sweeper.await?;
    events.await?;
    info!("Stopped with {} reels, {} stories", store.reel_count(), store.item_count());

    Ok(())
}

/// Mirror store events into the log until shutdown.
async fn log_events(store: StoryStore, cancel: CancellationToken) {
    let mut rx = store.subscribe();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => debug!("event {}", json),
                    Err(e) => warn!("Could not encode event: {}", e),
                },
                Err(RecvError::Lagged(n)) => warn!("Event log fell behind, skipped {} events", n),
                Err(RecvError::Closed) => break,
            },
            _ = cancel.cancelled() => break,
        }
    }
}

async fn shutdown_signal() -> anyhow::Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await?;
        info!("Received Ctrl+C, shutting down...");
    }
    Ok(())
}
