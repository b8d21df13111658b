use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use ephemera_types::{
    MediaUpload, Reel, Retention, SourceSegment, StoreSnapshot, StoryEvent, StoryItem, SweepResult,
};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::ports::{Clock, IdentityProvider, KeepMedia, MediaReleaser};
use crate::sweep::{self, StoreState};

/// In-memory story reels, one per author.
///
/// Handles are cheap to clone and all point at the same state. Every
/// operation takes the state lock for its whole duration, so a sweep never
/// interleaves with an add, delete or view.
#[derive(Clone)]
pub struct StoryStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: Mutex<StoreState>,

    /// Change feed; every subscriber sees every event
    events: broadcast::Sender<StoryEvent>,

    clock: Arc<dyn Clock>,
    identity: Arc<dyn IdentityProvider>,
    releaser: Arc<dyn MediaReleaser>,
    config: StoreConfig,
}

pub struct StoryStoreBuilder {
    clock: Arc<dyn Clock>,
    identity: Arc<dyn IdentityProvider>,
    releaser: Arc<dyn MediaReleaser>,
    config: StoreConfig,
    initial: StoreState,
}

impl StoryStoreBuilder {
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn releaser(mut self, releaser: Arc<dyn MediaReleaser>) -> Self {
        self.releaser = releaser;
        self
    }

    /// Start from a snapshot instead of an empty store. Fails on the same
    /// malformed snapshots `StoryStore::restore` rejects.
    pub fn snapshot(mut self, snapshot: StoreSnapshot) -> Result<Self, StoreError> {
        self.initial = StoreState::from_reels(snapshot.reels)?;
        Ok(self)
    }

    pub fn build(self) -> StoryStore {
        let (events, _) = broadcast::channel(self.config.event_capacity.max(1));
        StoryStore {
            inner: Arc::new(StoreInner {
                state: Mutex::new(self.initial),
                events,
                clock: self.clock,
                identity: self.identity,
                releaser: self.releaser,
                config: self.config,
            }),
        }
    }
}

impl StoryStore {
    pub fn builder(clock: Arc<dyn Clock>, identity: Arc<dyn IdentityProvider>) -> StoryStoreBuilder {
        StoryStoreBuilder {
            clock,
            identity,
            releaser: Arc::new(KeepMedia),
            config: StoreConfig::default(),
            initial: StoreState::default(),
        }
    }

    pub fn new(clock: Arc<dyn Clock>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self::builder(clock, identity).build()
    }

    /// Subscribe to change events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<StoryEvent> {
        self.inner.events.subscribe()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }

    // Operations never fail half-way, so a poisoned lock still holds consistent state.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: StoryEvent) {
        // No receivers is fine
        let _ = self.inner.events.send(event);
    }

    /// Post a story for the signed-in user.
    ///
    /// Creates the author's reel on their first story. Fails without touching
    /// the store if nobody is signed in or `retention_hours` is not one of
    /// 1, 6, 12 or 24.
    pub fn add_item(
        &self,
        upload: MediaUpload,
        retention_hours: u32,
        segment: Option<SourceSegment>,
    ) -> Result<StoryItem, StoreError> {
        let author = self
            .inner
            .identity
            .current()
            .ok_or(StoreError::NotAuthenticated)?;
        let retention = Retention::try_from(retention_hours)?;
        let item = StoryItem::new(upload, retention, segment, self.inner.clock.now());

        let mut state = self.lock();
        match state.reel_mut(&author.id) {
            Some(reel) => reel.items.push(item.clone()),
            None => {
                let display_name = author
                    .display_name
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| self.inner.config.fallback_display_name.clone());
                let avatar_ref = author
                    .avatar_ref
                    .filter(|a| !a.is_empty())
                    .unwrap_or_else(|| self.inner.config.fallback_avatar_ref.clone());

                self.emit(StoryEvent::ReelCreated {
                    author_id: author.id.clone(),
                    author_display_name: display_name.clone(),
                });
                state.insert_reel(Reel {
                    author_id: author.id.clone(),
                    author_display_name: display_name,
                    author_avatar_ref: avatar_ref,
                    items: vec![item.clone()],
                });
            }
        }

        self.emit(StoryEvent::ItemAdded {
            author_id: author.id.clone(),
            item_id: item.id,
            media_kind: item.media_kind,
            expires_at: item.expires_at,
        });
        drop(state);

        debug!(
            "Story {} added for {} ({}h, {}s)",
            item.id, author.id, retention.hours(), item.duration_secs
        );
        Ok(item)
    }

    /// Remove one story from an author's reel. Missing reel or item is a no-op.
    /// Returns whether anything was removed.
    pub fn delete_item(&self, author_id: &str, item_id: Uuid) -> bool {
        let mut state = self.lock();

        let Some(reel) = state.reel_mut(author_id) else {
            return false;
        };
        let Some(pos) = reel.items.iter().position(|i| i.id == item_id) else {
            return false;
        };

        let removed = reel.items.remove(pos);
        let emptied = reel.items.is_empty();
        if emptied {
            state.remove_reel(author_id);
        }

        self.emit(StoryEvent::ItemRemoved {
            author_id: author_id.to_string(),
            item_id,
        });
        if emptied {
            self.emit(StoryEvent::ReelRemoved {
                author_id: author_id.to_string(),
            });
        }
        drop(state);

        self.inner.releaser.release(author_id, &removed);
        debug!("Story {} deleted by {}", item_id, author_id);
        true
    }

    /// Delete one of the signed-in user's own stories.
    pub fn delete_own_item(&self, item_id: Uuid) -> Result<bool, StoreError> {
        let author = self
            .inner
            .identity
            .current()
            .ok_or(StoreError::NotAuthenticated)?;
        Ok(self.delete_item(&author.id, item_id))
    }

    /// Flag a story as seen. Returns true only on the first call for that item.
    pub fn mark_viewed(&self, author_id: &str, item_id: Uuid) -> bool {
        let mut state = self.lock();

        let Some(item) = state
            .reel_mut(author_id)
            .and_then(|r| r.items.iter_mut().find(|i| i.id == item_id))
        else {
            return false;
        };
        if item.viewed {
            return false;
        }
        item.viewed = true;

        self.emit(StoryEvent::ItemViewed {
            author_id: author_id.to_string(),
            item_id,
        });
        true
    }

    /// Current reel for an author, as last swept. May still hold items that
    /// expired since the previous sweep.
    pub fn get_reel(&self, author_id: &str) -> Option<Reel> {
        self.lock().reel(author_id).cloned()
    }

    /// Whether the author has at least one story that is live right now.
    /// Checked against the clock, so it is correct even before a sweep.
    pub fn has_active_reel(&self, author_id: &str) -> bool {
        let now = self.inner.clock.now();
        self.lock()
            .reel(author_id)
            .is_some_and(|r| r.items.iter().any(|i| i.is_active_at(now)))
    }

    /// All reels, most recently posted to first.
    pub fn reels(&self) -> Vec<Reel> {
        let mut reels: Vec<Reel> = self.lock().reels().cloned().collect();
        sort_newest_first(&mut reels);
        reels
    }

    /// Reels with live content, each trimmed to the items live right now.
    pub fn active_reels(&self) -> Vec<Reel> {
        let now = self.inner.clock.now();
        let mut reels: Vec<Reel> = self
            .lock()
            .reels()
            .filter_map(|r| {
                let items: Vec<StoryItem> = r
                    .items
                    .iter()
                    .filter(|i| i.is_active_at(now))
                    .cloned()
                    .collect();
                (!items.is_empty()).then(|| Reel {
                    items,
                    ..r.clone()
                })
            })
            .collect();
        sort_newest_first(&mut reels);
        reels
    }

    pub fn reel_count(&self) -> usize {
        self.lock().len()
    }

    pub fn item_count(&self) -> usize {
        self.lock().item_count()
    }

    /// Evict everything that expired at or before `now`.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> SweepResult {
        let mut state = self.lock();
        let current = std::mem::take(&mut *state);
        let outcome = sweep::sweep(current, now);
        *state = outcome.state;

        if !outcome.result.is_empty() {
            self.emit(StoryEvent::Swept {
                removed_item_ids: outcome.result.removed_item_ids.clone(),
                removed_reel_ids: outcome.result.removed_reel_ids.clone(),
            });
        }
        drop(state);

        for (author_id, item) in &outcome.evicted {
            self.inner.releaser.release(author_id, item);
        }
        if !outcome.result.is_empty() {
            info!(
                "Sweep: evicted {} expired stories, {} reels",
                outcome.result.removed_item_ids.len(),
                outcome.result.removed_reel_ids.len()
            );
        }

        outcome.result
    }

    /// Sweep against the store's own clock.
    pub fn sweep_now(&self) -> SweepResult {
        self.sweep_expired(self.inner.clock.now())
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            reels: self.lock().reels().cloned().collect(),
        }
    }

    /// Replace the whole store with `snapshot`. Empty reels are dropped.
    /// Media of the replaced content is not released.
    ///
    /// A snapshot with a malformed item or two reels for one author is
    /// rejected and the store is left as it was.
    pub fn restore(&self, snapshot: StoreSnapshot) -> Result<(), StoreError> {
        let next = StoreState::from_reels(snapshot.reels)?;

        let mut state = self.lock();
        *state = next;
        let reel_count = state.len();
        self.emit(StoryEvent::Restored { reel_count });
        drop(state);

        info!("Store restored with {} reels", reel_count);
        Ok(())
    }

    /// Consume the current state, leaving the store empty. Used by hosts that
    /// hand state to another process.
    ///
    /// Media is not released: the blobs travel with the returned snapshot.
    pub fn take_snapshot(&self) -> StoreSnapshot {
        let mut state = self.lock();
        let taken = std::mem::take(&mut *state);
        let reel_count = taken.len();
        self.emit(StoryEvent::Cleared { reel_count });
        drop(state);

        info!("Store handed off {} reels", reel_count);
        StoreSnapshot {
            reels: taken.into_reels().collect(),
        }
    }
}

fn sort_newest_first(reels: &mut [Reel]) {
    reels.sort_by(|a, b| {
        b.latest_created_at()
            .cmp(&a.latest_created_at())
            .then_with(|| a.author_id.cmp(&b.author_id))
    });
}
