//! Fixed-size machine blocks.

use super::{EntityId, EntityKind, GroupId, Placeable, SerializableColor, unrotate};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A placed piece of equipment. Machines have no locks and no area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineBlock {
    pub(crate) id: EntityId,
    pub name: String,
    /// Top-left corner in canvas pixels.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    pub color: SerializableColor,
    #[serde(default)]
    pub group: Option<GroupId>,
}

impl MachineBlock {
    pub const DEFAULT_SIZE: f64 = 50.0;

    pub fn new(name: impl Into<String>, position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            position,
            width,
            height,
            rotation: 0.0,
            color: SerializableColor::orange(),
            group: None,
        }
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }
}

impl Placeable for MachineBlock {
    fn id(&self) -> EntityId {
        self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Machine
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn rotation(&self) -> f64 {
        self.rotation
    }

    fn group(&self) -> Option<GroupId> {
        self.group
    }

    fn set_group(&mut self, group: Option<GroupId>) {
        self.group = group;
    }

    fn bounds(&self) -> Option<Rect> {
        Some(self.as_rect())
    }

    fn hit_test(&self, point: Point) -> bool {
        self.as_rect()
            .contains(unrotate(point, self.position, self.rotation))
    }
}
