//! End-to-end story lifecycle against a hand-driven clock.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use ephemera_store::{ManualClock, SessionIdentity, StoreError, StoryStore, ViewerSession};
use ephemera_types::{
    Identity, MediaKind, MediaUpload, Reel, SourceSegment, StoreSnapshot, StoryItem,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
}

fn upload(kind: MediaKind) -> MediaUpload {
    MediaUpload {
        kind,
        media_ref: "s3://stories/blob".into(),
    }
}

struct Harness {
    store: StoryStore,
    clock: Arc<ManualClock>,
    identity: Arc<SessionIdentity>,
}

fn harness(author: &str) -> Harness {
    let clock = Arc::new(ManualClock::new(t0()));
    let identity = Arc::new(SessionIdentity::signed_in(Identity::new(author)));
    let store = StoryStore::new(clock.clone(), identity.clone());
    Harness {
        store,
        clock,
        identity,
    }
}

#[test]
fn expiry_is_creation_plus_retention_and_sweep_clears_it() {
    let h = harness("alice");

    let mut items = Vec::new();
    for hours in [1, 6, 12, 24] {
        let item = h.store.add_item(upload(MediaKind::Image), hours, None).unwrap();
        assert_eq!(item.created_at, t0());
        assert_eq!(item.expires_at, t0() + Duration::seconds(i64::from(hours) * 3600));
        items.push(item);
    }

    for now in [t0() + Duration::hours(6), t0() + Duration::hours(13)] {
        h.store.sweep_expired(now);
        let remaining = h.store.get_reel("alice").unwrap();
        assert!(remaining.items.iter().all(|i| i.expires_at > now));
    }

    let result = h.store.sweep_expired(t0() + Duration::hours(24));
    assert_eq!(result.removed_item_ids, vec![items[3].id]);
    assert_eq!(result.removed_reel_ids, vec!["alice".to_string()]);
    assert!(h.store.get_reel("alice").is_none());
}

#[test]
fn first_add_creates_reel_and_last_delete_removes_it() {
    let h = harness("alice");
    assert!(h.store.get_reel("alice").is_none());

    let a = h.store.add_item(upload(MediaKind::Image), 24, None).unwrap();
    assert_eq!(h.store.reel_count(), 1);

    let b = h.store.add_item(upload(MediaKind::Video), 24, None).unwrap();
    assert_eq!(h.store.reel_count(), 1);

    h.store.delete_item("alice", a.id);
    assert_eq!(h.store.get_reel("alice").unwrap().items, vec![b.clone()]);

    h.store.delete_item("alice", b.id);
    assert!(h.store.get_reel("alice").is_none());
    assert_eq!(h.store.reel_count(), 0);

    // Deleting again is harmless
    assert!(!h.store.delete_item("alice", b.id));
}

#[test]
fn viewing_twice_is_idempotent() {
    let h = harness("alice");
    let item = h.store.add_item(upload(MediaKind::Image), 24, None).unwrap();

    h.store.mark_viewed("alice", item.id);
    h.store.mark_viewed("alice", item.id);

    let reel = h.store.get_reel("alice").unwrap();
    assert_eq!(reel.items.len(), 1);
    assert!(reel.items[0].viewed);
    assert!(!reel.has_unviewed());
}

#[test]
fn duration_comes_from_segment_or_kind() {
    let h = harness("alice");
    let seg = SourceSegment::new(2, 9).unwrap();

    for kind in [MediaKind::Image, MediaKind::Video] {
        let clipped = h.store.add_item(upload(kind), 24, Some(seg)).unwrap();
        assert_eq!(clipped.duration_secs, 7);
        assert_eq!(clipped.source_segment, Some(seg));
    }

    let image = h.store.add_item(upload(MediaKind::Image), 24, None).unwrap();
    let video = h.store.add_item(upload(MediaKind::Video), 24, None).unwrap();
    assert_eq!(image.duration_secs, 5);
    assert_eq!(video.duration_secs, 15);
}

#[test]
fn has_active_reel_checks_the_clock_without_a_sweep() {
    let clock = Arc::new(ManualClock::new(t0()));
    let identity = Arc::new(SessionIdentity::signed_out());
    let expired = StoryItem {
        id: uuid::Uuid::new_v4(),
        media_kind: MediaKind::Image,
        media_ref: "s3://old".into(),
        duration_secs: 5,
        source_segment: None,
        created_at: t0() - Duration::hours(2),
        expires_at: t0() - Duration::hours(1),
        viewed: false,
    };
    let store = StoryStore::builder(clock.clone(), identity)
        .snapshot(StoreSnapshot {
            reels: vec![Reel {
                author_id: "alice".into(),
                author_display_name: "Alice".into(),
                author_avatar_ref: String::new(),
                items: vec![expired],
            }],
        })
        .unwrap()
        .build();

    // Still stored, but not active
    assert!(store.get_reel("alice").is_some());
    assert!(!store.has_active_reel("alice"));
    assert!(!store.has_active_reel("nobody"));
}

#[test]
fn has_active_reel_turns_false_at_the_expiry_instant() {
    let h = harness("alice");
    let item = h.store.add_item(upload(MediaKind::Image), 1, None).unwrap();
    assert!(h.store.has_active_reel("alice"));

    h.clock.set(item.expires_at - Duration::seconds(1));
    assert!(h.store.has_active_reel("alice"));

    h.clock.set(item.expires_at);
    assert!(!h.store.has_active_reel("alice"));
}

#[test]
fn invalid_retention_is_rejected_without_side_effects() {
    let h = harness("alice");
    h.store.add_item(upload(MediaKind::Image), 6, None).unwrap();
    let before = h.store.snapshot();
    let mut rx = h.store.subscribe();

    let err = h.store.add_item(upload(MediaKind::Image), 5, None).unwrap_err();

    assert_eq!(err, StoreError::InvalidRetention(5));
    assert_eq!(h.store.snapshot(), before);
    assert!(rx.try_recv().is_err());
}

#[test]
fn short_story_expires_while_long_one_survives() {
    let h = harness("alice");

    let x = h.store.add_item(upload(MediaKind::Image), 24, None).unwrap();
    h.clock.advance(Duration::minutes(30));
    let y = h.store.add_item(upload(MediaKind::Video), 1, None).unwrap();

    h.clock.set(t0() + Duration::minutes(61));
    // Y expires at t0+90m, so it is still live here
    assert!(h.store.sweep_now().is_empty());

    h.clock.set(t0() + Duration::minutes(91));
    let result = h.store.sweep_now();

    assert_eq!(result.removed_item_ids, vec![y.id]);
    assert!(result.removed_reel_ids.is_empty());
    assert_eq!(h.store.get_reel("alice").unwrap().items, vec![x]);
}

#[test]
fn authors_are_isolated() {
    let h = harness("alice");
    let a = h.store.add_item(upload(MediaKind::Image), 1, None).unwrap();
    h.identity.sign_in(Identity::new("bob"));
    let b = h.store.add_item(upload(MediaKind::Image), 24, None).unwrap();

    // Bob cannot delete Alice's story through his own session
    assert_eq!(h.store.delete_own_item(a.id), Ok(false));
    assert_eq!(h.store.get_reel("alice").unwrap().items, vec![a]);

    h.clock.advance(Duration::hours(1));
    h.store.sweep_now();
    assert!(h.store.get_reel("alice").is_none());
    assert_eq!(h.store.get_reel("bob").unwrap().items, vec![b]);
}

#[test]
fn viewer_can_open_a_reel_that_has_expired() {
    let h = harness("alice");
    let session = ViewerSession::new();
    h.store.add_item(upload(MediaKind::Image), 1, None).unwrap();

    session.open("alice");
    h.clock.advance(Duration::hours(1));
    h.store.sweep_now();

    assert!(session.is_focused_on("alice"));
    assert!(h.store.get_reel("alice").is_none());

    session.close();
    assert!(!session.state().is_open);
    assert!(session.state().focused_author_id.is_none());
}
