//! Ephemeral story engine.
//!
//! `StoryStore` owns per-author reels of expiring stories, `sweep` is the
//! pure eviction pass, and `run_sweep_loop` drives it on a timer.
//! `ViewerSession` tracks which reel is open and knows nothing about content.

pub mod config;
pub mod error;
pub mod fixtures;
pub mod ports;
pub mod session;
pub mod store;
pub mod sweep;
pub mod sweeper;

pub use config::StoreConfig;
pub use error::StoreError;
pub use ports::{Clock, IdentityProvider, ManualClock, MediaReleaser, SessionIdentity, SystemClock};
pub use session::{SessionState, ViewerSession};
pub use store::{StoryStore, StoryStoreBuilder};
pub use sweeper::run_sweep_loop;
