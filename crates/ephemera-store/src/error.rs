use thiserror::Error;
use uuid::Uuid;

use ephemera_types::ModelError;

/// Failures returned by store mutations. A failed call leaves the store untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no signed-in identity to attribute the story to")]
    NotAuthenticated,

    #[error("retention of {0} hours is not allowed (expected 1, 6, 12 or 24)")]
    InvalidRetention(u32),

    #[error("source segment end ({end}s) must be after start ({start}s)")]
    InvalidSegment { start: u32, end: u32 },

    #[error("story {item_id} is malformed: {reason}")]
    InvalidItem { item_id: Uuid, reason: &'static str },

    #[error("snapshot holds more than one reel for {0}")]
    DuplicateReel(String),
}

impl From<ModelError> for StoreError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InvalidRetention(hours) => Self::InvalidRetention(hours),
            ModelError::InvalidSegment { start, end } => Self::InvalidSegment { start, end },
            ModelError::InvalidItem { item_id, reason } => Self::InvalidItem { item_id, reason },
        }
    }
}
