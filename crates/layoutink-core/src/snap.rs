//! Snap functionality for aligning drag positions to the grid and to other
//! layout shapes.

use crate::geometry;
use crate::shapes::{EntityId, LayoutKind, LayoutShape};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Per-axis distance threshold for object snapping (in canvas units).
pub const SHAPE_SNAP_THRESHOLD: f64 = 10.0;

/// Which snapping passes are active.
///
/// `vertex` and `center` both turn on the same object pass; they are kept
/// apart because hosts expose them as separate toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    pub enabled: bool,
    pub grid: bool,
    pub vertex: bool,
    pub center: bool,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            grid: true,
            vertex: false,
            center: false,
        }
    }
}

impl SnapConfig {
    /// Everything off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Check if the object pass runs.
    pub fn snaps_to_shapes(&self) -> bool {
        self.enabled && (self.vertex || self.center)
    }

    /// Check if the grid pass runs.
    pub fn snaps_to_grid(&self) -> bool {
        self.enabled && self.grid
    }
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
    /// Target the X axis locked onto during the object pass.
    pub target_x: Option<SnapTargetKind>,
    /// Target the Y axis locked onto during the object pass.
    pub target_y: Option<SnapTargetKind>,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
            target_x: None,
            target_y: None,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// A point that can be snapped to on a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTarget {
    /// The snap point location.
    pub point: Point,
    /// Type of snap target for visual feedback.
    pub kind: SnapTargetKind,
}

impl SnapTarget {
    fn new(x: f64, y: f64, kind: SnapTargetKind) -> Self {
        Self {
            point: Point::new(x, y),
            kind,
        }
    }
}

/// Type of snap target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapTargetKind {
    /// Corner of a rectangle.
    Corner,
    /// Midpoint of an edge.
    Midpoint,
    /// Center of a rectangle.
    Center,
    /// Point a quarter or three quarters along an edge.
    Quarter,
    /// Polygon vertex.
    Vertex,
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> SnapResult {
    let snapped_x = (point.x / grid_size).round() * grid_size;
    let snapped_y = (point.y / grid_size).round() * grid_size;

    SnapResult {
        point: Point::new(snapped_x, snapped_y),
        snapped_x: true,
        snapped_y: true,
        target_x: None,
        target_y: None,
    }
}

/// Collect the 17 snap targets of a rectangle's unrotated bounds.
///
/// Order matters: the object pass takes the first target within reach on
/// each axis.
pub fn get_snap_targets_from_bounds(bounds: Rect) -> Vec<SnapTarget> {
    use SnapTargetKind::*;

    let (left, top, right, bottom) = (bounds.x0, bounds.y0, bounds.x1, bounds.y1);
    let center = bounds.center();
    let q1x = left + bounds.width() / 4.0;
    let q3x = left + bounds.width() * 3.0 / 4.0;
    let q1y = top + bounds.height() / 4.0;
    let q3y = top + bounds.height() * 3.0 / 4.0;

    vec![
        SnapTarget::new(left, top, Corner),
        SnapTarget::new(right, top, Corner),
        SnapTarget::new(left, bottom, Corner),
        SnapTarget::new(right, bottom, Corner),
        SnapTarget::new(center.x, top, Midpoint),
        SnapTarget::new(center.x, bottom, Midpoint),
        SnapTarget::new(left, center.y, Midpoint),
        SnapTarget::new(right, center.y, Midpoint),
        SnapTarget::new(center.x, center.y, Center),
        SnapTarget::new(q1x, top, Quarter),
        SnapTarget::new(q3x, top, Quarter),
        SnapTarget::new(q1x, bottom, Quarter),
        SnapTarget::new(q3x, bottom, Quarter),
        SnapTarget::new(left, q1y, Quarter),
        SnapTarget::new(right, q1y, Quarter),
        SnapTarget::new(left, q3y, Quarter),
        SnapTarget::new(right, q3y, Quarter),
    ]
}

/// Collect snap targets from absolute polygon vertices: every vertex, then
/// for each edge (wrapping) its midpoint, 25% point and 75% point.
pub fn get_snap_targets_from_polygon(points: &[Point]) -> Vec<SnapTarget> {
    let mut targets = Vec::with_capacity(points.len() * 4);
    targets.extend(points.iter().map(|p| SnapTarget {
        point: *p,
        kind: SnapTargetKind::Vertex,
    }));

    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        targets.push(SnapTarget {
            point: geometry::midpoint(*a, b),
            kind: SnapTargetKind::Midpoint,
        });
        targets.push(SnapTarget {
            point: geometry::lerp(*a, b, 0.25),
            kind: SnapTargetKind::Quarter,
        });
        targets.push(SnapTarget {
            point: geometry::lerp(*a, b, 0.75),
            kind: SnapTargetKind::Quarter,
        });
    }

    targets
}

/// Snap targets of one layout shape in canvas coordinates.
pub fn get_snap_targets(shape: &LayoutShape) -> Vec<SnapTarget> {
    match &shape.kind {
        LayoutKind::Rectangle { width, height, .. } => get_snap_targets_from_bounds(Rect::new(
            shape.position.x,
            shape.position.y,
            shape.position.x + width,
            shape.position.y + height,
        )),
        LayoutKind::Polygon { .. } => shape
            .absolute_points()
            .map(|points| get_snap_targets_from_polygon(&points))
            .unwrap_or_default(),
    }
}

/// Snap each axis independently to the first target within `threshold`.
///
/// An axis that has snapped is never reconsidered, and scanning stops once
/// both axes have snapped.
pub fn snap_to_shapes(point: Point, targets: &[SnapTarget], threshold: f64) -> SnapResult {
    let mut result = SnapResult::none(point);

    for target in targets {
        if !result.snapped_x && (point.x - target.point.x).abs() < threshold {
            result.point.x = target.point.x;
            result.snapped_x = true;
            result.target_x = Some(target.kind);
        }
        if !result.snapped_y && (point.y - target.point.y).abs() < threshold {
            result.point.y = target.point.y;
            result.snapped_y = true;
            result.target_y = Some(target.kind);
        }
        if result.snapped_x && result.snapped_y {
            break;
        }
    }

    result
}

/// Resolve a candidate drag position against the grid and the layout shapes
/// not listed in `excluded`.
///
/// The grid pass runs first; the object pass then works on the grid-snapped
/// coordinates and may move them again.
pub fn resolve(
    candidate: Point,
    excluded: &[EntityId],
    shapes: &[LayoutShape],
    config: &SnapConfig,
    grid_size: f64,
    threshold: f64,
) -> SnapResult {
    if !config.enabled {
        return SnapResult::none(candidate);
    }

    let grid = if config.snaps_to_grid() {
        snap_to_grid(candidate, grid_size)
    } else {
        SnapResult::none(candidate)
    };

    if !config.snaps_to_shapes() {
        return grid;
    }

    let targets: Vec<SnapTarget> = shapes
        .iter()
        .filter(|shape| !excluded.contains(&shape.id))
        .flat_map(get_snap_targets)
        .collect();

    let object = snap_to_shapes(grid.point, &targets, threshold);
    SnapResult {
        point: object.point,
        snapped_x: grid.snapped_x || object.snapped_x,
        snapped_y: grid.snapped_y || object.snapped_y,
        target_x: object.target_x,
        target_y: object.target_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objects_only() -> SnapConfig {
        SnapConfig {
            enabled: true,
            grid: false,
            vertex: true,
            center: false,
        }
    }

    #[test]
    fn test_disabled_returns_candidate() {
        let p = Point::new(13.3, 27.7);
        let result = resolve(p, &[], &[], &SnapConfig::disabled(), GRID_SIZE, SHAPE_SNAP_THRESHOLD);
        assert_eq!(result.point, p);
        assert!(!result.is_snapped());
    }

    #[test]
    fn test_grid_snap_multiples_of_grid() {
        let config = SnapConfig::default();
        for (x, y) in [(13.3, 27.7), (-9.9, 31.0), (1234.5, -0.4), (10.0, 30.0)] {
            let result = resolve(Point::new(x, y), &[], &[], &config, GRID_SIZE, SHAPE_SNAP_THRESHOLD);
            assert!((result.point.x / GRID_SIZE).fract().abs() < 1e-9);
            assert!((result.point.y / GRID_SIZE).fract().abs() < 1e-9);
            assert!((result.point.x - x).abs() <= GRID_SIZE / 2.0);
        }
        let result = snap_to_grid(Point::new(13.0, 27.0), GRID_SIZE);
        assert_eq!(result.point, Point::new(20.0, 20.0));
    }

    #[test]
    fn test_rect_targets_order() {
        let targets = get_snap_targets_from_bounds(Rect::new(0.0, 0.0, 100.0, 40.0));
        assert_eq!(targets.len(), 17);
        assert_eq!(targets[0].point, Point::new(0.0, 0.0));
        assert_eq!(targets[2].point, Point::new(0.0, 40.0));
        assert_eq!(targets[4].point, Point::new(50.0, 0.0));
        assert_eq!(targets[8].kind, SnapTargetKind::Center);
        assert_eq!(targets[9].point, Point::new(25.0, 0.0));
        assert_eq!(targets[16].point, Point::new(100.0, 30.0));
    }

    #[test]
    fn test_polygon_targets() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        let targets = get_snap_targets_from_polygon(&square);
        assert_eq!(targets.len(), 16);
        assert_eq!(targets[3].kind, SnapTargetKind::Vertex);
        assert_eq!(targets[4].point, Point::new(50.0, 0.0));
        assert_eq!(targets[5].point, Point::new(25.0, 0.0));
        assert_eq!(targets[6].point, Point::new(75.0, 0.0));
        // Closing edge runs from the last vertex back to the first
        assert_eq!(targets[13].point, Point::new(0.0, 50.0));
    }

    #[test]
    fn test_first_match_wins_per_axis() {
        // x=103 is within reach of both the right corner (100) and x=108 of
        // the second shape; the first target scanned wins.
        let a = LayoutShape::rectangle(Point::new(0.0, 0.0), 100.0, 100.0);
        let b = LayoutShape::rectangle(Point::new(108.0, 500.0), 10.0, 10.0);
        let result = resolve(
            Point::new(103.0, 503.0),
            &[],
            &[a, b],
            &objects_only(),
            GRID_SIZE,
            SHAPE_SNAP_THRESHOLD,
        );
        assert!((result.point.x - 100.0).abs() < f64::EPSILON);
        assert!((result.point.y - 500.0).abs() < f64::EPSILON);
        assert_eq!(result.target_x, Some(SnapTargetKind::Corner));
    }

    #[test]
    fn test_threshold_is_strict() {
        let shape = LayoutShape::rectangle(Point::new(0.0, 0.0), 100.0, 100.0);
        let result = resolve(
            Point::new(-10.0, 300.0),
            &[],
            &[shape],
            &objects_only(),
            GRID_SIZE,
            SHAPE_SNAP_THRESHOLD,
        );
        assert!(!result.snapped_x);
        assert!((result.point.x + 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_excluded_shapes_ignored() {
        let shape = LayoutShape::rectangle(Point::new(0.0, 0.0), 100.0, 100.0);
        let id = shape.id;
        let result = resolve(
            Point::new(3.0, 3.0),
            &[id],
            &[shape],
            &objects_only(),
            GRID_SIZE,
            SHAPE_SNAP_THRESHOLD,
        );
        assert!(!result.is_snapped());
    }

    #[test]
    fn test_object_pass_runs_on_grid_result() {
        let config = SnapConfig {
            center: true,
            ..SnapConfig::default()
        };
        let shape = LayoutShape::rectangle(Point::new(0.0, 0.0), 128.0, 128.0);
        // Grid takes 127 to 120, then the object pass pulls it to 128
        let result = resolve(Point::new(127.0, 400.0), &[], &[shape], &config, GRID_SIZE, SHAPE_SNAP_THRESHOLD);
        assert!((result.point.x - 128.0).abs() < f64::EPSILON);
        assert!((result.point.y - 400.0).abs() < f64::EPSILON);
        assert!(result.snapped_x && result.snapped_y);
        assert!(result.target_y.is_none());
    }

    #[test]
    fn test_resolve_does_not_mutate_shapes() {
        let shapes = vec![LayoutShape::default_polygon(Point::new(300.0, 100.0))];
        let before = shapes.clone();
        let _ = resolve(Point::new(305.0, 98.0), &[], &shapes, &objects_only(), GRID_SIZE, SHAPE_SNAP_THRESHOLD);
        assert_eq!(shapes, before);
    }
}
