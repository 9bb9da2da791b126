//! Multi-select drag propagation.
//!
//! While a drag is in flight the document keeps its authoritative
//! positions; the [`DragSession`] holds the pre-drag origins and the current
//! delta, from which every selected entity's render position is derived.
//! Positions are written back once, when the drag ends.

use crate::shapes::EntityId;
use kurbo::{Point, Vec2};

/// State for moving every selected entity at once.
#[derive(Debug, Clone)]
pub struct DragSession {
    /// The entity under the pointer.
    dragged: EntityId,
    /// Pre-drag positions of all moved entities, in selection order.
    origins: Vec<(EntityId, Point)>,
    /// Offset of the dragged entity from its origin.
    delta: Vec2,
}

impl DragSession {
    /// Start a drag. `origins` must contain the dragged entity.
    pub fn new(dragged: EntityId, origins: Vec<(EntityId, Point)>) -> Self {
        Self {
            dragged,
            origins,
            delta: Vec2::ZERO,
        }
    }

    pub fn dragged(&self) -> EntityId {
        self.dragged
    }

    /// Get the drag delta.
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    pub fn origin(&self, id: EntityId) -> Option<Point> {
        self.origins
            .iter()
            .find_map(|(entry, origin)| (*entry == id).then_some(*origin))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.origin(id).is_some()
    }

    /// Get the entity IDs being moved.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.origins.iter().map(|(id, _)| *id).collect()
    }

    /// Place the dragged entity at `position` and return the new delta.
    pub fn move_to(&mut self, position: Point) -> Vec2 {
        if let Some(origin) = self.origin(self.dragged) {
            self.delta = position - origin;
        }
        self.delta
    }

    /// Transient position of a moved entity, `None` if it is not part of
    /// the drag.
    pub fn render_position(&self, id: EntityId) -> Option<Point> {
        self.origin(id).map(|origin| origin + self.delta)
    }

    /// Render overrides for every entity except the dragged one, which the
    /// host already positions under the pointer.
    pub fn overrides(&self) -> impl Iterator<Item = (EntityId, Point)> + '_ {
        self.origins
            .iter()
            .filter(|(id, _)| *id != self.dragged)
            .map(|(id, origin)| (*id, *origin + self.delta))
    }

    /// Stop tracking an entity, e.g. when it is deleted mid-drag.
    pub fn forget(&mut self, id: EntityId) {
        self.origins.retain(|(entry, _)| *entry != id);
    }

    /// Final positions to commit, one per moved entity.
    pub fn into_commits(self) -> Vec<(EntityId, Point)> {
        let delta = self.delta;
        self.origins
            .into_iter()
            .map(|(id, origin)| (id, origin + delta))
            .collect()
    }
}
