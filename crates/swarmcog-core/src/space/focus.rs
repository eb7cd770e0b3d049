use std::collections::VecDeque;

use crate::model::AtomId;

/// Maximum number of ids held in the attentional focus.
pub const FOCUS_CAPACITY: usize = 20;

/// Bounded, recency-ordered list of salient atom ids.
///
/// Re-adding an id moves it to the back. When full, the oldest entry is
/// evicted regardless of its importance.
#[derive(Debug, Clone)]
pub struct AttentionalFocus {
    ids: VecDeque<AtomId>,
    capacity: usize,
}

impl AttentionalFocus {
    pub fn new() -> Self {
        Self::with_capacity(FOCUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: VecDeque::with_capacity(capacity + 1),
            capacity: capacity.max(1),
        }
    }

    /// Add an id, returning the evicted id if the list overflowed.
    pub fn push(&mut self, id: AtomId) -> Option<AtomId> {
        self.ids.retain(|existing| existing != &id);
        self.ids.push_back(id);
        if self.ids.len() > self.capacity {
            self.ids.pop_front()
        } else {
            None
        }
    }

    pub fn remove(&mut self, id: &AtomId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        self.ids.len() != before
    }

    pub fn contains(&self, id: &AtomId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Oldest first.
    pub fn to_vec(&self) -> Vec<AtomId> {
        self.ids.iter().cloned().collect()
    }
}

impl Default for AttentionalFocus {
    fn default() -> Self {
        Self::new()
    }
}
