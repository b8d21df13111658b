use std::time::Duration;

use anyhow::{Context, Result};

use ephemera_store::StoreConfig;
use ephemera_store::config::{
    DEFAULT_EVENT_CAPACITY, DEFAULT_FALLBACK_AVATAR, DEFAULT_FALLBACK_NAME, DEFAULT_SWEEP_INTERVAL,
};

/// Process settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub sweep_interval: Duration,
    /// Seed the canned preview reels at startup.
    pub preview: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let sweep_secs: u64 = match get("EPHEMERA_SWEEP_INTERVAL_SECS") {
            Some(v) => v.parse().context("EPHEMERA_SWEEP_INTERVAL_SECS must be a number")?,
            None => DEFAULT_SWEEP_INTERVAL.as_secs(),
        };
        if sweep_secs == 0 {
            anyhow::bail!("EPHEMERA_SWEEP_INTERVAL_SECS must be greater than zero");
        }

        let event_capacity: usize = match get("EPHEMERA_EVENT_CAPACITY") {
            Some(v) => v.parse().context("EPHEMERA_EVENT_CAPACITY must be a number")?,
            None => DEFAULT_EVENT_CAPACITY,
        };

        let preview = get("EPHEMERA_PREVIEW")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            store: StoreConfig {
                fallback_display_name: get("EPHEMERA_FALLBACK_NAME")
                    .unwrap_or_else(|| DEFAULT_FALLBACK_NAME.into()),
                fallback_avatar_ref: get("EPHEMERA_FALLBACK_AVATAR")
                    .unwrap_or_else(|| DEFAULT_FALLBACK_AVATAR.into()),
                event_capacity,
            },
            sweep_interval: Duration::from_secs(sweep_secs),
            preview,
        })
    }
}
