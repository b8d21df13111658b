//! Collaborators the store calls out to.
//!
//! The store never reads the wall clock, the signed-in user, or the media
//! backend directly; each is injected behind one of these traits so tests
//! can drive time and identity by hand.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use ephemera_types::{Identity, StoryItem};

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The external auth collaborator, queried synchronously at call time.
pub trait IdentityProvider: Send + Sync {
    /// Returns `None` when nobody is signed in.
    fn current(&self) -> Option<Identity>;
}

/// Identity slot the host application flips on sign-in and sign-out.
#[derive(Default)]
pub struct SessionIdentity {
    current: Mutex<Option<Identity>>,
}

impl SessionIdentity {
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            current: Mutex::new(Some(identity)),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, identity: Identity) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(identity);
    }

    pub fn sign_out(&self) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl IdentityProvider for SessionIdentity {
    fn current(&self) -> Option<Identity> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Hook for freeing the media blob behind an item once the store drops it.
///
/// Called after the store lock is released, once per removed item, for both
/// explicit deletes and sweep evictions.
pub trait MediaReleaser: Send + Sync {
    fn release(&self, author_id: &str, item: &StoryItem);
}

/// Default releaser: the blob's owner cleans up on its own schedule.
pub struct KeepMedia;

impl MediaReleaser for KeepMedia {
    fn release(&self, _author_id: &str, _item: &StoryItem) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_told() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::minutes(61));
        assert_eq!(clock.now(), start + Duration::minutes(61));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn session_identity_tracks_sign_in_state() {
        let identity = SessionIdentity::signed_out();
        assert!(identity.current().is_none());

        identity.sign_in(Identity::new("user1"));
        assert_eq!(identity.current().map(|i| i.id), Some("user1".to_string()));

        identity.sign_out();
        assert!(identity.current().is_none());
    }
}
