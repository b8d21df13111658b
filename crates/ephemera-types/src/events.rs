use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::MediaKind;

/// Change notifications published by the story store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StoryEvent {
    /// First story posted by an author
    ReelCreated {
        author_id: String,
        author_display_name: String,
    },

    /// A story was appended to a reel
    ItemAdded {
        author_id: String,
        item_id: Uuid,
        media_kind: MediaKind,
        expires_at: chrono::DateTime<chrono::Utc>,
    },

    /// A story was deleted by its author
    ItemRemoved { author_id: String, item_id: Uuid },

    /// A reel lost its last story
    ReelRemoved { author_id: String },

    /// A story was opened for the first time
    ItemViewed { author_id: String, item_id: Uuid },

    /// The expiry sweep evicted content
    Swept {
        removed_item_ids: Vec<Uuid>,
        removed_reel_ids: Vec<String>,
    },

    /// Store contents were replaced from a snapshot
    Restored { reel_count: usize },

    /// Store contents were handed off and the store is now empty
    Cleared { reel_count: usize },
}

impl StoryEvent {
    /// Returns the author whose reel this event touches.
    /// Events that return `None` span the whole store.
    pub fn author_id(&self) -> Option<&str> {
        match self {
            Self::ReelCreated { author_id, .. }
            | Self::ItemAdded { author_id, .. }
            | Self::ItemRemoved { author_id, .. }
            | Self::ReelRemoved { author_id }
            | Self::ItemViewed { author_id, .. } => Some(author_id),
            Self::Swept { .. } | Self::Restored { .. } | Self::Cleared { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged() {
        let event = StoryEvent::ReelRemoved {
            author_id: "user1".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ReelRemoved");
        assert_eq!(json["data"]["author_id"], "user1");
        assert_eq!(event.author_id(), Some("user1"));
    }

    #[test]
    fn store_wide_events_have_no_author() {
        let event = StoryEvent::Restored { reel_count: 3 };
        assert_eq!(event.author_id(), None);
    }
}
