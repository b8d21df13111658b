use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation failures for model values built from caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("retention of {0} hours is not allowed (expected 1, 6, 12 or 24)")]
    InvalidRetention(u32),

    #[error("source segment end ({end}s) must be after start ({start}s)")]
    InvalidSegment { start: u32, end: u32 },

    #[error("story {item_id} is malformed: {reason}")]
    InvalidItem { item_id: Uuid, reason: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Display time used when an item is not cut from a longer clip.
    pub fn default_duration_secs(self) -> u32 {
        match self {
            Self::Image => 5,
            Self::Video => 15,
        }
    }
}

/// Trim window into a longer source clip, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSegment")]
pub struct SourceSegment {
    start: u32,
    end: u32,
}

#[derive(Deserialize)]
struct RawSegment {
    start: u32,
    end: u32,
}

impl TryFrom<RawSegment> for SourceSegment {
    type Error = ModelError;

    fn try_from(raw: RawSegment) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl SourceSegment {
    pub fn new(start: u32, end: u32) -> Result<Self, ModelError> {
        if end <= start {
            return Err(ModelError::InvalidSegment { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Length of the window. Always positive.
    pub fn length_secs(&self) -> u32 {
        self.end - self.start
    }
}

/// Lifetimes a story may be posted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Retention {
    OneHour,
    SixHours,
    TwelveHours,
    TwentyFourHours,
}

impl Retention {
    pub const ALL: [Retention; 4] = [
        Self::OneHour,
        Self::SixHours,
        Self::TwelveHours,
        Self::TwentyFourHours,
    ];

    pub fn hours(self) -> u32 {
        match self {
            Self::OneHour => 1,
            Self::SixHours => 6,
            Self::TwelveHours => 12,
            Self::TwentyFourHours => 24,
        }
    }

    pub fn as_duration(self) -> Duration {
        Duration::hours(i64::from(self.hours()))
    }
}

impl TryFrom<u32> for Retention {
    type Error = ModelError;

    fn try_from(hours: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|r| r.hours() == hours)
            .ok_or(ModelError::InvalidRetention(hours))
    }
}

impl From<Retention> for u32 {
    fn from(r: Retention) -> u32 {
        r.hours()
    }
}

/// Signed-in user as reported by the external auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub display_name: Option<String>,
    pub avatar_ref: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            avatar_ref: None,
        }
    }
}

/// Media that the upload collaborator has already persisted.
/// The store only keeps the locator; it never owns the blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUpload {
    pub kind: MediaKind,
    pub media_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryItem {
    pub id: Uuid,
    pub media_kind: MediaKind,
    pub media_ref: String,
    pub duration_secs: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_segment: Option<SourceSegment>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub viewed: bool,
}

impl StoryItem {
    /// Build a fresh, unviewed item posted at `now`.
    pub fn new(
        upload: MediaUpload,
        retention: Retention,
        segment: Option<SourceSegment>,
        now: DateTime<Utc>,
    ) -> Self {
        let duration_secs = segment
            .map(|s| s.length_secs())
            .unwrap_or_else(|| upload.kind.default_duration_secs());

        Self {
            id: Uuid::new_v4(),
            media_kind: upload.kind,
            media_ref: upload.media_ref,
            duration_secs,
            source_segment: segment,
            created_at: now,
            expires_at: now + retention.as_duration(),
            viewed: false,
        }
    }

    /// Check an item built outside `new`, e.g. one read back from a snapshot.
    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |reason| ModelError::InvalidItem {
            item_id: self.id,
            reason,
        };

        if self.duration_secs == 0 {
            return Err(invalid("duration must be positive"));
        }
        if self.expires_at <= self.created_at {
            return Err(invalid("expiry must be after creation"));
        }
        if let Some(segment) = self.source_segment {
            if segment.length_secs() != self.duration_secs {
                return Err(invalid("duration must match the source segment"));
            }
        }
        Ok(())
    }

    /// Swept once `now` reaches `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// One author's stories, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reel {
    pub author_id: String,
    pub author_display_name: String,
    pub author_avatar_ref: String,
    pub items: Vec<StoryItem>,
}

impl Reel {
    pub fn has_unviewed(&self) -> bool {
        self.items.iter().any(|i| !i.viewed)
    }

    pub fn latest_created_at(&self) -> Option<DateTime<Utc>> {
        self.items.iter().map(|i| i.created_at).max()
    }

    pub fn find(&self, item_id: Uuid) -> Option<&StoryItem> {
        self.items.iter().find(|i| i.id == item_id)
    }
}

/// What a sweep evicted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepResult {
    pub removed_item_ids: Vec<Uuid>,
    pub removed_reel_ids: Vec<String>,
}

impl SweepResult {
    pub fn is_empty(&self) -> bool {
        self.removed_item_ids.is_empty() && self.removed_reel_ids.is_empty()
    }
}

/// Full store contents, for collaborators that want to persist and rebuild it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub reels: Vec<Reel>,
}
