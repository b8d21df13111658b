//! Shared data model for the story engine.
//!
//! Everything here is plain data: serde-friendly, cloneable, and free of
//! any store or runtime concerns.

pub mod events;
pub mod models;

pub use events::StoryEvent;
pub use models::{
    Identity, MediaKind, MediaUpload, ModelError, Reel, Retention, SourceSegment, StoreSnapshot,
    StoryItem, SweepResult,
};
