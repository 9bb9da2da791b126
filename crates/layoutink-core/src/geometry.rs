//! Geometry kernel shared by snapping, hit testing and vertex editing.
//!
//! Everything here is a pure function over `kurbo` points. Polygon vertex
//! sequences are treated as closed: the last vertex connects back to the first.

use kurbo::{Point, Rect, Vec2};

/// Area of an axis-aligned rectangle.
///
/// Negative inputs are a caller bug and are not validated.
pub fn rectangle_area(width: f64, height: f64) -> f64 {
    width * height
}

/// Area of a simple polygon using the shoelace formula.
///
/// Returns 0 for fewer than 3 vertices. The result is independent of
/// winding direction and of which vertex is listed first.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for (i, p1) in points.iter().enumerate() {
        let p2 = points[(i + 1) % points.len()];
        sum += p1.x * p2.y - p2.x * p1.y;
    }
    sum.abs() / 2.0
}

/// Distance from a point to a line segment (a→b).
///
/// A zero-length segment degrades to the distance between `point` and `a`.
pub fn point_to_segment_distance(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Closest polygon edge to a test point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Index at which a new vertex splits the closest edge.
    pub insert_index: usize,
    /// Distance from the test point to that edge.
    pub distance: f64,
}

/// Find where a new vertex should be inserted so it splits the edge
/// closest to `point`.
///
/// Every edge is scanned, including the closing edge from the last vertex
/// back to the first. Ties resolve to the lowest edge index. Returns `None`
/// for an empty vertex list.
pub fn nearest_segment_insertion_index(points: &[Point], point: Point) -> Option<SegmentHit> {
    let mut best: Option<SegmentHit> = None;
    for (i, &a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        let distance = point_to_segment_distance(point, a, b);
        if best.is_none_or(|hit| distance < hit.distance) {
            best = Some(SegmentHit {
                insert_index: i + 1,
                distance,
            });
        }
    }
    best
}

/// Axis-aligned bounding box of a vertex list, `None` when empty.
pub fn polygon_bounding_box(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let init = Rect::from_points(*first, *first);
    Some(points[1..].iter().fold(init, |r, p| r.union_pt(*p)))
}

/// Point at parameter `t` along the segment a→b.
pub fn lerp(a: Point, b: Point, t: f64) -> Point {
    a.lerp(b, t)
}

/// Midpoint of the segment a→b.
pub fn midpoint(a: Point, b: Point) -> Point {
    a.midpoint(b)
}

/// Vertex average of a polygon. Used to anchor labels, not a true centroid.
pub fn polygon_centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
    Some((sum / points.len() as f64).to_point())
}

/// Non-zero winding containment test for a closed polygon.
pub fn point_in_polygon(points: &[Point], point: Point) -> bool {
    if points.len() < 3 {
        return false;
    }

    let mut winding = 0i32;
    for (i, &a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        let cross = (b.x - a.x) * (point.y - a.y) - (point.x - a.x) * (b.y - a.y);
        if a.y <= point.y {
            if b.y > point.y && cross > 0.0 {
                winding += 1;
            }
        } else if b.y <= point.y && cross < 0.0 {
            winding -= 1;
        }
    }
    winding != 0
}
