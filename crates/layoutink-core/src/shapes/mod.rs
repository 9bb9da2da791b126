//! Entity definitions for the layout canvas.

mod layout;
mod machine;

pub use layout::{LayoutKind, LayoutShape, LockKind, Locks};
pub use machine::MachineBlock;

use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for layout shapes and machine blocks.
pub type EntityId = Uuid;

/// Identifier shared by every member of a group.
pub type GroupId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn blue() -> Self {
        Self::new(0, 0, 255, 255)
    }

    pub const fn red() -> Self {
        Self::new(255, 0, 0, 255)
    }

    pub const fn green() -> Self {
        Self::new(0, 128, 0, 255)
    }

    pub const fn orange() -> Self {
        Self::new(255, 165, 0, 255)
    }

    /// Default translucent grey fill for new layout shapes.
    pub const fn layout_fill() -> Self {
        Self::new(200, 200, 200, 128)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Which collection an entity lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Layout,
    Machine,
}

/// Behavior shared by layout shapes and machine blocks.
///
/// Positions are the canvas-space anchor of the entity (top-left for
/// rectangles and machines, the origin of the vertex offsets for polygons).
pub trait Placeable {
    fn id(&self) -> EntityId;

    fn kind(&self) -> EntityKind;

    fn position(&self) -> Point;

    fn set_position(&mut self, position: Point);

    /// Rotation in degrees around the anchor.
    fn rotation(&self) -> f64;

    fn group(&self) -> Option<GroupId>;

    fn set_group(&mut self, group: Option<GroupId>);

    /// Unrotated bounding box in canvas coordinates.
    fn bounds(&self) -> Option<Rect>;

    /// Check if a canvas point hits this entity, honoring rotation.
    fn hit_test(&self, point: Point) -> bool;
}

/// Map a canvas point into the entity's unrotated frame.
///
/// Rotation is applied around the anchor, matching how the renderer places
/// rotated nodes.
pub(crate) fn unrotate(point: Point, anchor: Point, rotation_degrees: f64) -> Point {
    if rotation_degrees == 0.0 {
        return point;
    }
    let inverse = kurbo::Affine::rotate_about(-rotation_degrees.to_radians(), anchor);
    inverse * point
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_roundtrip_through_peniko() {
        let color = SerializableColor::layout_fill();
        let peniko: Color = color.into();
        assert_eq!(SerializableColor::from(peniko), color);
    }

    #[test]
    fn test_unrotate_quarter_turn() {
        let anchor = Point::new(10.0, 10.0);
        let p = unrotate(Point::new(10.0, 20.0), anchor, 90.0);
        assert!((p.x - 20.0).abs() < 1e-9);
        assert!((p.y - 10.0).abs() < 1e-9);
    }
}
