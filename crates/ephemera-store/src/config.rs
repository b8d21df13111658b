use std::time::Duration;

/// Display name given to a reel whose author has no profile name.
pub const DEFAULT_FALLBACK_NAME: &str = "You";

/// Avatar given to a reel whose author has no profile picture.
pub const DEFAULT_FALLBACK_AVATAR: &str = "avatar:default";

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub fallback_display_name: String,
    pub fallback_avatar_ref: String,
    /// Buffered events per subscriber before slow receivers start lagging.
    pub event_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            fallback_display_name: DEFAULT_FALLBACK_NAME.into(),
            fallback_avatar_ref: DEFAULT_FALLBACK_AVATAR.into(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}
