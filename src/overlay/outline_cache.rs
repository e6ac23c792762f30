//! Outline cache keyed by (generation, region id).

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::mask_outline::Highlight;
use crate::model::{Generation, RegionId};

/// Finished highlights for the current generation only.
///
/// Entries are written once per key and never overwritten; a new generation
/// clears the map before any work for it is scheduled, so ids reused across
/// batches cannot show a stale outline.
#[derive(Debug, Default)]
pub struct OutlineCache {
    generation: Generation,
    entries: HashMap<RegionId, Highlight>,
}

impl OutlineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all entries and start accepting results for `generation`.
    pub fn reset(&mut self, generation: Generation) {
        self.generation = generation;
        self.entries.clear();
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Store a result. Returns `false` for results of another generation
    /// or for keys that already hold a highlight.
    pub fn insert(&mut self, generation: Generation, id: RegionId, highlight: Highlight) -> bool {
        if generation != self.generation {
            return false;
        }
        match self.entries.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(highlight);
                true
            }
        }
    }

    pub fn get(&self, generation: Generation, id: RegionId) -> Option<&Highlight> {
        if generation != self.generation {
            return None;
        }
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
