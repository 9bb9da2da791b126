//! User-drawn layout shapes (rectangles and polygons).

use super::{EntityId, EntityKind, GroupId, Placeable, SerializableColor, unrotate};
use crate::geometry;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-shape locks for rectangle layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locks {
    pub x: bool,
    pub y: bool,
    pub width: bool,
    pub height: bool,
    /// Keep the area constant by redirecting a single-axis resize to the
    /// other dimension.
    pub area: bool,
}

/// Identifies one lock flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockKind {
    X,
    Y,
    Width,
    Height,
    Area,
}

impl Locks {
    pub fn get(&self, kind: LockKind) -> bool {
        match kind {
            LockKind::X => self.x,
            LockKind::Y => self.y,
            LockKind::Width => self.width,
            LockKind::Height => self.height,
            LockKind::Area => self.area,
        }
    }

    pub fn set(&mut self, kind: LockKind, value: bool) {
        match kind {
            LockKind::X => self.x = value,
            LockKind::Y => self.y = value,
            LockKind::Width => self.width = value,
            LockKind::Height => self.height = value,
            LockKind::Area => self.area = value,
        }
    }
}

/// Geometry of a layout shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayoutKind {
    Rectangle {
        width: f64,
        height: f64,
        #[serde(default)]
        locks: Locks,
    },
    /// Vertex offsets relative to the shape anchor.
    Polygon { points: Vec<Point> },
}

/// A rectangle or polygon drawn by the user, with optional area tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutShape {
    pub(crate) id: EntityId,
    /// Anchor in canvas pixels.
    pub position: Point,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    pub color: SerializableColor,
    #[serde(default)]
    pub name: Option<String>,
    /// Area in px², `None` until first computed.
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub group: Option<GroupId>,
    pub kind: LayoutKind,
    /// Bumped whenever size or vertices change. Area responses computed for
    /// an older revision are discarded.
    #[serde(skip)]
    pub(crate) geometry_revision: u64,
}

impl LayoutShape {
    /// Default size for a freshly added rectangle.
    pub const DEFAULT_SIZE: f64 = 100.0;

    fn with_kind(position: Point, kind: LayoutKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            rotation: 0.0,
            color: SerializableColor::layout_fill(),
            name: None,
            area: None,
            group: None,
            kind,
            geometry_revision: 0,
        }
    }

    /// Create a new unlocked rectangle.
    pub fn rectangle(position: Point, width: f64, height: f64) -> Self {
        Self::with_kind(
            position,
            LayoutKind::Rectangle {
                width,
                height,
                locks: Locks::default(),
            },
        )
    }

    /// Create a new polygon from vertex offsets relative to `position`.
    pub fn polygon(position: Point, points: Vec<Point>) -> Self {
        Self::with_kind(position, LayoutKind::Polygon { points })
    }

    /// The five-vertex "house" polygon placed by the toolbar.
    pub fn default_polygon(position: Point) -> Self {
        Self::polygon(
            position,
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
                Point::new(50.0, 150.0),
                Point::new(0.0, 100.0),
            ],
        )
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_area(mut self, area: f64) -> Self {
        self.area = Some(area);
        self
    }

    pub fn with_locks(mut self, new_locks: Locks) -> Self {
        if let LayoutKind::Rectangle { locks, .. } = &mut self.kind {
            *locks = new_locks;
        }
        self
    }

    pub fn is_rectangle(&self) -> bool {
        matches!(self.kind, LayoutKind::Rectangle { .. })
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self.kind, LayoutKind::Polygon { .. })
    }

    /// Width and height for rectangles.
    pub fn size(&self) -> Option<(f64, f64)> {
        match self.kind {
            LayoutKind::Rectangle { width, height, .. } => Some((width, height)),
            LayoutKind::Polygon { .. } => None,
        }
    }

    /// Lock flags; polygons have none.
    pub fn locks(&self) -> Option<&Locks> {
        match &self.kind {
            LayoutKind::Rectangle { locks, .. } => Some(locks),
            LayoutKind::Polygon { .. } => None,
        }
    }

    pub fn locks_mut(&mut self) -> Option<&mut Locks> {
        match &mut self.kind {
            LayoutKind::Rectangle { locks, .. } => Some(locks),
            LayoutKind::Polygon { .. } => None,
        }
    }

    /// Vertex offsets for polygons.
    pub fn points(&self) -> Option<&[Point]> {
        match &self.kind {
            LayoutKind::Polygon { points } => Some(points),
            LayoutKind::Rectangle { .. } => None,
        }
    }

    /// Polygon vertices translated into canvas coordinates.
    pub fn absolute_points(&self) -> Option<Vec<Point>> {
        let origin = self.position.to_vec2();
        self.points()
            .map(|points| points.iter().map(|p| *p + origin).collect())
    }

    /// Area computed locally from the current geometry.
    pub fn geometric_area(&self) -> f64 {
        match &self.kind {
            LayoutKind::Rectangle { width, height, .. } => geometry::rectangle_area(*width, *height),
            LayoutKind::Polygon { points } => geometry::polygon_area(points),
        }
    }

    pub fn geometry_revision(&self) -> u64 {
        self.geometry_revision
    }

    pub(crate) fn bump_geometry(&mut self) {
        self.geometry_revision += 1;
    }

    /// Whether area must be recomputed after a geometry change.
    pub fn tracks_area(&self) -> bool {
        !self.locks().is_some_and(|l| l.area)
    }
}

impl Placeable for LayoutShape {
    fn id(&self) -> EntityId {
        self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Layout
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
        match &self.kind {
            LayoutKind::Rectangle { width, height, .. } => Some(Rect::new(
                self.position.x,
                self.position.y,
                self.position.x + width,
                self.position.y + height,
            )),
            LayoutKind::Polygon { points } => {
                geometry::polygon_bounding_box(points).map(|r| r + self.position.to_vec2())
            }
        }
    }

    fn hit_test(&self, point: Point) -> bool {
        let local = unrotate(point, self.position, self.rotation) - self.position.to_vec2();
        match &self.kind {
            LayoutKind::Rectangle { width, height, .. } => {
                Rect::new(0.0, 0.0, *width, *height).contains(local)
            }
            LayoutKind::Polygon { points } => geometry::point_in_polygon(points, local),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_creation() {
        let rect = LayoutShape::rectangle(Point::new(10.0, 20.0), 100.0, 50.0);
        assert!(rect.is_rectangle());
        assert_eq!(rect.size(), Some((100.0, 50.0)));
        assert_eq!(rect.locks(), Some(&Locks::default()));
        assert!(rect.area.is_none());
        assert!(rect.points().is_none());
    }

    #[test]
    fn test_polygon_has_no_locks() {
        let poly = LayoutShape::default_polygon(Point::new(300.0, 100.0));
        assert!(poly.locks().is_none());
        assert!(poly.tracks_area());
        assert_eq!(poly.points().map(<[Point]>::len), Some(5));
    }

    #[test]
    fn test_with_locks_ignored_for_polygon() {
        let locks = Locks { area: true, ..Locks::default() };
        let poly = LayoutShape::default_polygon(Point::ZERO).with_locks(locks);
        assert!(poly.locks().is_none());
        let rect = LayoutShape::rectangle(Point::ZERO, 10.0, 10.0).with_locks(locks);
        assert!(!rect.tracks_area());
    }

    #[test]
    fn test_polygon_bounds_are_offset() {
        let poly = LayoutShape::default_polygon(Point::new(300.0, 100.0));
        assert_eq!(poly.bounds(), Some(Rect::new(300.0, 100.0, 400.0, 250.0)));
    }

    #[test]
    fn test_hit_test_rectangle() {
        let rect = LayoutShape::rectangle(Point::new(0.0, 0.0), 100.0, 50.0);
        assert!(rect.hit_test(Point::new(50.0, 25.0)));
        assert!(!rect.hit_test(Point::new(50.0, 75.0)));
    }

    #[test]
    fn test_hit_test_rotated_rectangle() {
        let mut rect = LayoutShape::rectangle(Point::new(0.0, 0.0), 100.0, 20.0);
        rect.rotation = 90.0;
        // Rotated clockwise about the anchor, the long side now points down
        assert!(rect.hit_test(Point::new(-10.0, 50.0)));
        assert!(!rect.hit_test(Point::new(50.0, 10.0)));
    }

    #[test]
    fn test_hit_test_polygon() {
        let poly = LayoutShape::default_polygon(Point::new(300.0, 100.0));
        assert!(poly.hit_test(Point::new(350.0, 220.0)));
        assert!(!poly.hit_test(Point::new(305.0, 245.0)));
    }

    #[test]
    fn test_geometric_area() {
        let rect = LayoutShape::rectangle(Point::ZERO, 100.0, 50.0);
        assert!((rect.geometric_area() - 5000.0).abs() < f64::EPSILON);
        let poly = LayoutShape::default_polygon(Point::ZERO);
        assert!((poly.geometric_area() - 12500.0).abs() < 1e-9);
    }

    #[test]
    fn test_lock_accessors() {
        let mut locks = Locks::default();
        locks.set(LockKind::Height, true);
        assert!(locks.get(LockKind::Height));
        assert!(!locks.get(LockKind::Width));
    }
}
