use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::store::StoryStore;

/// Background task that evicts expired stories.
///
/// Sweeps on every tick against the store's clock until `cancel` fires. The
/// first tick completes immediately, so content that expired while the
/// process was down is cleared at startup.
pub async fn run_sweep_loop(store: StoryStore, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Sweep loop started (every {}s)", interval.as_secs());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let result = store.sweep_now();
                if result.is_empty() {
                    debug!("Sweep: nothing expired");
                }
            }
            _ = cancel.cancelled() => {
                info!("Sweep loop shutting down");
                break;
            }
        }
    }
}
