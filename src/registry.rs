//! Ownership of every subject's smoothing buffer.
//!
//! Buffers are created lazily the first time a subject id is referenced and
//! live for the rest of the process unless an eviction age is configured.

use crate::{
    smoothing::{SubjectBuffer, WeightScheme},
    types::{SubjectId, Timestamp},
};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

struct Entry {
    buffer: SubjectBuffer,
    last_seen: Option<Timestamp>,
}

/// Map from subject id to its smoothing buffer
pub struct SubjectRegistry {
    scheme: Arc<WeightScheme>,
    entries: HashMap<SubjectId, Entry>,
}

impl SubjectRegistry {
    /// Create an empty registry; new buffers use `scheme`
    #[must_use]
    pub fn new(scheme: WeightScheme) -> Self {
        Self {
            scheme: Arc::new(scheme),
            entries: HashMap::new(),
        }
    }

    /// Buffer of `id`, created empty on first reference
    pub fn get_or_create(&mut self, id: SubjectId) -> &mut SubjectBuffer {
        let scheme = &self.scheme;
        &mut self
            .entries
            .entry(id)
            .or_insert_with(|| {
                debug!("Creating smoothing buffer for subject {}", id);
                Entry {
                    buffer: SubjectBuffer::new(Arc::clone(scheme)),
                    last_seen: None,
                }
            })
            .buffer
    }

    /// Buffer of `id`, if one exists
    #[must_use]
    pub fn get(&self, id: SubjectId) -> Option<&SubjectBuffer> {
        self.entries.get(&id).map(|entry| &entry.buffer)
    }

    /// Record that `id` appeared in a frame stamped `at`
    pub fn record_seen(&mut self, id: SubjectId, at: Timestamp) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.last_seen = Some(entry.last_seen.map_or(at, |prev| prev.max(at)));
        }
    }

    /// Last frame time `id` appeared in
    #[must_use]
    pub fn last_seen(&self, id: SubjectId) -> Option<Timestamp> {
        self.entries.get(&id).and_then(|entry| entry.last_seen)
    }

    /// Remove subjects not seen for at least `max_age` before `now`.
    ///
    /// Returns the removed ids in ascending order.
    pub fn evict_unseen(&mut self, now: Timestamp, max_age: Duration) -> Vec<SubjectId> {
        let mut evicted: Vec<SubjectId> = self
            .entries
            .iter()
            .filter(|(_, entry)| {
                entry
                    .last_seen
                    .is_some_and(|seen| (now - seen).exceeds_or_equals(max_age))
            })
            .map(|(id, _)| *id)
            .collect();
        evicted.sort_unstable();

        for id in &evicted {
            self.entries.remove(id);
            debug!("Evicted smoothing buffer for subject {}", id);
        }
        evicted
    }

    /// Known subject ids in ascending order
    #[must_use]
    pub fn ids(&self) -> Vec<SubjectId> {
        let mut ids: Vec<SubjectId> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of subjects tracked
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no subject has been seen yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Weighting scheme applied to every buffer
    #[must_use]
    pub fn scheme(&self) -> &WeightScheme {
        &self.scheme
    }
}

impl Default for SubjectRegistry {
    fn default() -> Self {
        Self::new(WeightScheme::default())
    }
}
