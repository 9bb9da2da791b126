//! Selection state: the ordered set of selected entities and the click
//! tracker used to drill into groups.

use crate::shapes::EntityId;
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

/// Window in which a second click on a grouped entity selects it alone.
pub const DRILL_DOWN_WINDOW: Duration = Duration::from_millis(500);

/// Ordered set of selected entity ids.
///
/// Insertion order is kept; the first entry is the one whose properties are
/// shown when several entities are selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<EntityId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.ids.iter().copied()
    }

    /// The entity selected first.
    pub fn first(&self) -> Option<EntityId> {
        self.ids.first().copied()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Replace the selection with `targets`, keeping their order.
    pub fn replace(&mut self, targets: impl IntoIterator<Item = EntityId>) {
        self.ids.clear();
        for id in targets {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    /// Symmetric difference: selected targets are dropped, the rest are
    /// appended. Toggling the same set twice restores the selection as a set.
    pub fn toggle(&mut self, targets: impl IntoIterator<Item = EntityId>) {
        for id in targets {
            if let Some(index) = self.ids.iter().position(|s| *s == id) {
                self.ids.remove(index);
            } else {
                self.ids.push(id);
            }
        }
    }

    /// Drop an id, e.g. after the entity was deleted.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|s| *s != id);
        self.ids.len() != before
    }
}

/// Remembers the last grouped entity clicked so that a quick second click
/// can select it on its own.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    last: Option<(EntityId, Instant)>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a click on a grouped entity.
    pub fn record(&mut self, id: EntityId, at: Instant) {
        self.last = Some((id, at));
    }

    /// Whether a click on `id` at `at` follows the recorded one within
    /// `window`.
    pub fn is_repeat(&self, id: EntityId, at: Instant, window: Duration) -> bool {
        self.last
            .is_some_and(|(last_id, last_at)| last_id == id && at.saturating_duration_since(last_at) < window)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn last_clicked(&self) -> Option<EntityId> {
        self.last.map(|(id, _)| id)
    }
}
