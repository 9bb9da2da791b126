//! Declarative scene description for the external renderer.
//!
//! [`Document::scene`] flattens the store into one [`ShapeView`] per entity,
//! with drag overrides already applied.

use crate::document::Document;
use crate::geometry;
use crate::shapes::{EntityId, EntityKind, LayoutKind, LayoutShape, MachineBlock, SerializableColor};
use kurbo::{Affine, BezPath, Point, Rect, Shape};

/// Base label font size at 100% zoom.
pub const BASE_FONT_SIZE: f64 = 14.0;
pub const MIN_FONT_SIZE: f64 = 8.0;
pub const MAX_FONT_SIZE: f64 = 48.0;
/// Font size for polygons too degenerate to fit a label into.
pub const FALLBACK_FONT_SIZE: f64 = 12.0;

/// Label fonts grow at most this much when zoomed out.
const MAX_ZOOM_COMPENSATION: f64 = 3.0;
const LINE_HEIGHT: f64 = 1.5;
/// Rough glyph width as a fraction of the font size.
const CHAR_WIDTH: f64 = 0.6;
/// Share of the container width a label may use.
const LABEL_WIDTH_RATIO: f64 = 0.9;

/// Shape geometry in the entity's local frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeometry {
    Rectangle { width: f64, height: f64 },
    Polygon { points: Vec<Point> },
}

impl ShapeGeometry {
    /// Closed outline in local coordinates.
    pub fn outline(&self) -> BezPath {
        match self {
            ShapeGeometry::Rectangle { width, height } => {
                Rect::new(0.0, 0.0, *width, *height).to_path(0.1)
            }
            ShapeGeometry::Polygon { points } => {
                let mut path = BezPath::new();
                let Some(first) = points.first() else {
                    return path;
                };
                path.move_to(*first);
                for point in points.iter().skip(1) {
                    path.line_to(*point);
                }
                path.close_path();
                path
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: SerializableColor,
    pub width: f64,
}

/// Text drawn inside a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub font_size: f64,
    /// Center of the label in local coordinates.
    pub anchor: Point,
}

/// Everything the renderer needs to draw one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub geometry: ShapeGeometry,
    /// Anchor in canvas coordinates, including any drag in flight.
    pub position: Point,
    pub rotation: f64,
    pub fill: SerializableColor,
    pub stroke: Stroke,
    pub label: Option<Label>,
    pub selected: bool,
    /// Local vertex positions to draw handles at; only for selected polygons.
    pub vertex_handles: Vec<Point>,
}

impl ShapeView {
    /// Local to canvas transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.position.to_vec2()) * Affine::rotate(self.rotation.to_radians())
    }
}

/// The whole canvas, layouts first, then machines.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneView {
    /// Canvas to screen transform.
    pub view: Affine,
    pub scale: f64,
    pub shapes: Vec<ShapeView>,
}

impl SceneView {
    pub fn shape(&self, id: EntityId) -> Option<&ShapeView> {
        self.shapes.iter().find(|s| s.id == id)
    }
}

/// Label font size that fits `text` into a `width` × `height` container and
/// stays readable at the current zoom.
pub fn label_font_size(width: f64, height: f64, text: &str, scale: f64) -> f64 {
    let lines = text.lines().count().max(1) as f64;
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);

    let fit = if longest == 0 {
        BASE_FONT_SIZE
    } else {
        let by_height = height / (lines * LINE_HEIGHT);
        let by_width = width * LABEL_WIDTH_RATIO / (longest as f64 * CHAR_WIDTH);
        by_height.min(by_width)
    };
    let zoomed = BASE_FONT_SIZE * (1.0 / scale).min(MAX_ZOOM_COMPENSATION);

    fit.min(zoomed).min(MAX_FONT_SIZE).max(MIN_FONT_SIZE)
}

fn label_text(name: Option<&str>, area: Option<String>) -> String {
    [name.map(str::to_string), area]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

impl Document {
    fn layout_view(&self, shape: &LayoutShape, scale: f64) -> ShapeView {
        let selected = self.is_selected(shape.id);
        let area_text = shape
            .area
            .filter(|area| *area != 0.0)
            .map(|area| self.unit.format_area(area, self.config.pixels_per_mm));
        let text = label_text(shape.name.as_deref(), area_text);

        let (geometry, stroke_width, label_box) = match &shape.kind {
            LayoutKind::Rectangle { width, height, .. } => (
                ShapeGeometry::Rectangle {
                    width: *width,
                    height: *height,
                },
                1.0,
                Some(Rect::new(0.0, 0.0, *width, *height)),
            ),
            LayoutKind::Polygon { points } => (
                ShapeGeometry::Polygon {
                    points: points.clone(),
                },
                2.0,
                geometry::polygon_bounding_box(points),
            ),
        };

        let label = (!text.is_empty()).then(|| {
            let points = shape.points().unwrap_or_default();
            let (font_size, anchor) = match label_box {
                Some(bounds) if shape.is_rectangle() => (
                    label_font_size(bounds.width(), bounds.height(), &text, scale),
                    bounds.center(),
                ),
                Some(bounds) if points.len() >= 2 => (
                    label_font_size(bounds.width(), bounds.height(), &text, scale),
                    geometry::polygon_centroid(points).unwrap_or(bounds.center()),
                ),
                _ => (
                    FALLBACK_FONT_SIZE,
                    geometry::polygon_centroid(points).unwrap_or(Point::ZERO),
                ),
            };
            Label {
                text,
                font_size,
                anchor,
            }
        });

        let vertex_handles = match &shape.kind {
            LayoutKind::Polygon { points } if selected => points.clone(),
            _ => Vec::new(),
        };

        ShapeView {
            id: shape.id,
            kind: EntityKind::Layout,
            geometry,
            position: self.render_position(shape.id).unwrap_or(shape.position),
            rotation: shape.rotation,
            fill: shape.color,
            stroke: Stroke {
                color: if selected {
                    SerializableColor::blue()
                } else {
                    SerializableColor::black()
                },
                width: stroke_width,
            },
            label,
            selected,
            vertex_handles,
        }
    }

    fn machine_view(&self, machine: &MachineBlock, scale: f64) -> ShapeView {
        let selected = self.is_selected(machine.id);
        let label = (!machine.name.is_empty()).then(|| Label {
            font_size: label_font_size(machine.width, machine.height, &machine.name, scale),
            text: machine.name.clone(),
            anchor: Point::new(machine.width / 2.0, machine.height / 2.0),
        });

        ShapeView {
            id: machine.id,
            kind: EntityKind::Machine,
            geometry: ShapeGeometry::Rectangle {
                width: machine.width,
                height: machine.height,
            },
            position: self.render_position(machine.id).unwrap_or(machine.position),
            rotation: machine.rotation,
            fill: machine.color,
            stroke: if selected {
                Stroke {
                    color: SerializableColor::red(),
                    width: 2.0,
                }
            } else {
                Stroke {
                    color: SerializableColor::green(),
                    width: 1.0,
                }
            },
            label,
            selected,
            vertex_handles: Vec::new(),
        }
    }

    /// Describe every entity for the renderer.
    pub fn scene(&self) -> SceneView {
        let scale = self.view.scale();
        let shapes = self
            .layouts
            .iter()
            .map(|shape| self.layout_view(shape, scale))
            .chain(self.machines.iter().map(|m| self.machine_view(m, scale)))
            .collect();
        SceneView {
            view: self.view.transform(),
            scale,
            shapes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snap::SnapConfig;
    use crate::units::Unit;

    #[test]
    fn test_font_size_zoom_compensation() {
        assert!((label_font_size(100.0, 100.0, "AB", 1.0) - 14.0).abs() < f64::EPSILON);
        // Zoomed out to 25%: capped at three times the base size
        assert!((label_font_size(100.0, 100.0, "AB", 0.25) - 42.0).abs() < 1e-9);
        assert!((label_font_size(1000.0, 1000.0, "AB", 0.1) - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_font_size_fits_container() {
        // Height-bound: 30 / (2 lines * 1.5) = 10
        let size = label_font_size(200.0, 30.0, "Office\n12.00 mm²", 0.5);
        assert!((size - 10.0).abs() < 1e-9);
        // Tiny boxes never go below the minimum
        assert!((label_font_size(10.0, 10.0, "Machine 1", 1.0) - MIN_FONT_SIZE).abs() < f64::EPSILON);
        // Empty text uses the base size
        assert!((label_font_size(1.0, 1.0, "", 1.0) - BASE_FONT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_label_text_joins_non_empty_parts() {
        assert_eq!(label_text(Some("Hall"), Some("1.00 mm²".into())), "Hall\n1.00 mm²");
        assert_eq!(label_text(None, Some("1.00 mm²".into())), "1.00 mm²");
        assert_eq!(label_text(Some(""), None), "");
    }

    #[test]
    fn test_layout_view_strokes_and_label() {
        let mut doc = Document::new();
        doc.unit = Unit::Pixels;
        let rect = doc.add_layout(
            LayoutShape::rectangle(Point::new(10.0, 20.0), 200.0, 100.0)
                .with_name("Office")
                .with_area(20000.0),
        );
        let poly = doc.add_default_polygon();
        doc.select(Some(poly), false, true).unwrap();

        let scene = doc.scene();
        let rect_view = scene.shape(rect).unwrap();
        assert_eq!(rect_view.stroke.color, SerializableColor::black());
        assert!((rect_view.stroke.width - 1.0).abs() < f64::EPSILON);
        let label = rect_view.label.as_ref().unwrap();
        assert_eq!(label.text, "Office\n20000 px²");
        assert_eq!(label.anchor, Point::new(100.0, 50.0));
        assert!(rect_view.vertex_handles.is_empty());

        let poly_view = scene.shape(poly).unwrap();
        assert_eq!(poly_view.stroke.color, SerializableColor::blue());
        assert!((poly_view.stroke.width - 2.0).abs() < f64::EPSILON);
        assert_eq!(poly_view.vertex_handles.len(), 5);
        // No name and no area yet
        assert!(poly_view.label.is_none());
    }

    #[test]
    fn test_zero_area_hidden_from_label() {
        let mut doc = Document::new();
        let id = doc.add_layout(
            LayoutShape::rectangle(Point::ZERO, 100.0, 100.0)
                .with_name("Store")
                .with_area(0.0),
        );
        let unnamed = doc.add_layout(LayoutShape::rectangle(Point::ZERO, 10.0, 10.0).with_area(0.0));

        let scene = doc.scene();
        let label = scene.shape(id).and_then(|s| s.label.clone()).unwrap();
        assert_eq!(label.text, "Store");
        assert!(scene.shape(unnamed).and_then(|s| s.label.clone()).is_none());
    }

    #[test]
    fn test_polygon_label_at_centroid() {
        let mut doc = Document::new();
        let id = doc.add_layout(
            LayoutShape::polygon(
                Point::ZERO,
                vec![
                    Point::new(0.0, 0.0),
                    Point::new(100.0, 0.0),
                    Point::new(100.0, 100.0),
                    Point::new(0.0, 100.0),
                ],
            )
            .with_name("Yard"),
        );
        let scene = doc.scene();
        let label = scene.shape(id).and_then(|s| s.label.clone()).unwrap();
        assert_eq!(label.anchor, Point::new(50.0, 50.0));
        assert!((label.font_size - 14.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_degenerate_polygon_label() {
        let mut doc = Document::new();
        let id = doc.add_layout(
            LayoutShape::polygon(Point::ZERO, vec![Point::new(5.0, 5.0)]).with_name("Dot"),
        );
        let scene = doc.scene();
        let label = scene.shape(id).and_then(|s| s.label.clone()).unwrap();
        assert!((label.font_size - FALLBACK_FONT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_machine_view() {
        let mut doc = Document::new();
        let id = doc.add_default_machine();
        let view = doc.scene().shape(id).cloned().unwrap();
        assert_eq!(view.stroke.color, SerializableColor::green());
        assert!((view.stroke.width - 1.0).abs() < f64::EPSILON);
        assert_eq!(view.label.map(|l| l.text).as_deref(), Some("Machine 1"));

        doc.select(Some(id), false, true).unwrap();
        let view = doc.scene().shape(id).cloned().unwrap();
        assert_eq!(view.stroke.color, SerializableColor::red());
        assert!((view.stroke.width - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scene_applies_drag_overrides() {
        let mut doc = Document::new();
        doc.snapping = SnapConfig::disabled();
        let a = doc.add_default_rectangle();
        let b = doc.add_default_machine();
        doc.select_all();
        doc.begin_drag(a, false).unwrap();
        doc.drag_to(Point::new(130.0, 100.0));

        let scene = doc.scene();
        assert_eq!(scene.shape(b).map(|s| s.position), Some(Point::new(230.0, 200.0)));
        assert_eq!(doc.machine(b).map(|m| m.position), Some(Point::new(200.0, 200.0)));
    }

    #[test]
    fn test_outline_and_transform() {
        let square = ShapeGeometry::Polygon {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
            ],
        };
        assert!((square.outline().area().abs() - 50.0).abs() < 1e-9);
        assert!(ShapeGeometry::Polygon { points: Vec::new() }.outline().elements().is_empty());

        let mut doc = Document::new();
        let id = doc.add_default_rectangle();
        doc.set_rotation(id, 90.0).unwrap();
        let view = doc.scene().shape(id).cloned().unwrap();
        let corner = view.transform() * Point::new(100.0, 0.0);
        assert!((corner.x - 100.0).abs() < 1e-9);
        assert!((corner.y - 200.0).abs() < 1e-9);
    }
}
