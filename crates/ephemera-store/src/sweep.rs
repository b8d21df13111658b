use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::{DateTime, Utc};

use ephemera_types::{Reel, StoryItem, SweepResult};

use crate::error::StoreError;

/// Reels keyed by author. A key is present only while its reel has items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    reels: BTreeMap<String, Reel>,
}

impl StoreState {
    /// Build state from a set of reels, dropping any that are empty.
    ///
    /// Every item must pass `StoryItem::validate` and each author may appear
    /// at most once; otherwise nothing is built.
    pub fn from_reels(reels: impl IntoIterator<Item = Reel>) -> Result<Self, StoreError> {
        let mut map = BTreeMap::new();

        for reel in reels {
            for item in &reel.items {
                item.validate()?;
            }
            match map.entry(reel.author_id.clone()) {
                Entry::Occupied(_) => return Err(StoreError::DuplicateReel(reel.author_id)),
                Entry::Vacant(slot) => {
                    slot.insert(reel);
                }
            }
        }

        map.retain(|_, r: &mut Reel| !r.items.is_empty());
        Ok(Self { reels: map })
    }

    pub fn reel(&self, author_id: &str) -> Option<&Reel> {
        self.reels.get(author_id)
    }

    pub fn reels(&self) -> impl Iterator<Item = &Reel> {
        self.reels.values()
    }

    pub fn len(&self) -> usize {
        self.reels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reels.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.reels.values().map(|r| r.items.len()).sum()
    }

    pub(crate) fn reel_mut(&mut self, author_id: &str) -> Option<&mut Reel> {
        self.reels.get_mut(author_id)
    }

    pub(crate) fn insert_reel(&mut self, reel: Reel) {
        self.reels.insert(reel.author_id.clone(), reel);
    }

    pub(crate) fn remove_reel(&mut self, author_id: &str) -> Option<Reel> {
        self.reels.remove(author_id)
    }

    pub(crate) fn into_reels(self) -> impl Iterator<Item = Reel> {
        self.reels.into_values()
    }
}

/// Result of one sweep pass.
#[derive(Debug)]
pub struct SweepOutcome {
    pub state: StoreState,
    pub result: SweepResult,
    /// Items that were evicted, paired with their author, in reel order.
    pub evicted: Vec<(String, StoryItem)>,
}

/// Drop every item with `expires_at <= now`, and every reel left empty.
///
/// Reels with nothing expired pass through untouched; survivors keep their order.
pub fn sweep(state: StoreState, now: DateTime<Utc>) -> SweepOutcome {
    let mut next = BTreeMap::new();
    let mut result = SweepResult::default();
    let mut evicted = Vec::new();

    for (author_id, mut reel) in state.reels {
        if !reel.items.iter().any(|i| i.is_expired_at(now)) {
            next.insert(author_id, reel);
            continue;
        }

        let (expired, active): (Vec<_>, Vec<_>) = reel
            .items
            .into_iter()
            .partition(|i| i.is_expired_at(now));

        for item in expired {
            result.removed_item_ids.push(item.id);
            evicted.push((author_id.clone(), item));
        }

        if active.is_empty() {
            result.removed_reel_ids.push(author_id);
        } else {
            reel.items = active;
            next.insert(author_id, reel);
        }
    }

    SweepOutcome {
        state: StoreState { reels: next },
        result,
        evicted,
    }
}
