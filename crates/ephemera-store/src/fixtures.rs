//! Canned reels for offline preview, when no real users are posting.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use ephemera_types::{MediaKind, Reel, Retention, StoreSnapshot, StoryItem};

/// (author id, display name, ages in minutes of each story)
const PREVIEW_AUTHORS: &[(&str, &str, &[i64])] = &[
    ("user1", "creative_artist", &[120, 60]),
    ("user2", "digital_dreams", &[240]),
    ("user3", "modern_creator", &[30]),
    ("user4", "visual_arts", &[15]),
    ("user5", "design_daily", &[300]),
    ("user6", "pixel_perfect", &[45]),
    ("user7", "art_collective", &[480]),
    ("user8", "motion_graphics", &[720]),
];

/// Eight unviewed image reels, posted with 24h retention at various points
/// before `now`.
pub fn preview_snapshot(now: DateTime<Utc>) -> StoreSnapshot {
    let reels = PREVIEW_AUTHORS
        .iter()
        .map(|(author_id, name, ages)| Reel {
            author_id: (*author_id).to_string(),
            author_display_name: (*name).to_string(),
            author_avatar_ref: format!("preview://avatars/{}", author_id),
            items: ages
                .iter()
                .enumerate()
                .map(|(n, age)| {
                    let created_at = now - Duration::minutes(*age);
                    StoryItem {
                        id: Uuid::new_v4(),
                        media_kind: MediaKind::Image,
                        media_ref: format!("preview://stories/{}/{}", author_id, n),
                        duration_secs: MediaKind::Image.default_duration_secs(),
                        source_segment: None,
                        created_at,
                        expires_at: created_at + Retention::TwentyFourHours.as_duration(),
                        viewed: false,
                    }
                })
                .collect(),
        })
        .collect();

    StoreSnapshot { reels }
}
