//! View state for the zoomable, pannable canvas.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 10.0;

/// Zoom multipliers applied per wheel event.
pub const WHEEL_ZOOM_IN: f64 = 1.1;
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Zoom multipliers for the toolbar zoom buttons.
pub const STEP_ZOOM_IN: f64 = 1.2;
pub const STEP_ZOOM_OUT: f64 = 0.8;

/// ViewState manages the stage transform of the canvas.
///
/// A canvas point `p` appears on screen at `p * scale + position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Current zoom level (1.0 = 100%)
    scale: f64,
    /// Screen-space offset of the canvas origin (pan)
    pub position: Vec2,
    pub min_scale: f64,
    pub max_scale: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            position: Vec2::ZERO,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            zoom_in_factor: WHEEL_ZOOM_IN,
            zoom_out_factor: WHEEL_ZOOM_OUT,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a view state with custom zoom limits.
    pub fn with_limits(min_scale: f64, max_scale: f64) -> Self {
        Self {
            min_scale,
            max_scale,
            ..Self::default()
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the zoom level, clamped to the allowed range.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.max(self.min_scale).min(self.max_scale);
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Get the affine transform converting canvas coordinates to screen
    /// coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.position) * Affine::scale(self.scale)
    }

    /// Convert a screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        ((screen_point.to_vec2() - self.position) / self.scale).to_point()
    }

    /// Convert a canvas point to screen coordinates.
    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// Pan the view by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Zoom in response to a wheel event, keeping the canvas point under
    /// `pointer` fixed on screen. Positive `delta_y` zooms out.
    pub fn zoom_at(&mut self, pointer: Point, delta_y: f64) {
        let factor = if delta_y > 0.0 {
            self.zoom_out_factor
        } else {
            self.zoom_in_factor
        };
        let anchor = self.screen_to_canvas(pointer);
        self.set_scale(self.scale * factor);
        self.position = pointer.to_vec2() - anchor.to_vec2() * self.scale;
        log::debug!("Zoomed to {:.3} at {:?}", self.scale, pointer);
    }

    /// Zoom in by one toolbar step, keeping the pan.
    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale * STEP_ZOOM_IN);
    }

    /// Zoom out by one toolbar step, keeping the pan.
    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale * STEP_ZOOM_OUT);
    }

    /// Reset to 100% with no pan.
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.position = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view() {
        let view = ViewState::new();
        assert_eq!(view.position, Vec2::ZERO);
        assert!((view.scale() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_scale_clamps() {
        let mut view = ViewState::new();
        view.set_scale(0.01);
        assert!((view.scale() - MIN_SCALE).abs() < f64::EPSILON);
        view.set_scale(50.0);
        assert!((view.scale() - MAX_SCALE).abs() < f64::EPSILON);
        view.set_scale(2.5);
        assert!((view.scale() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_canvas_with_offset_and_scale() {
        let mut view = ViewState::new();
        view.set_position(Vec2::new(50.0, 100.0));
        view.set_scale(2.0);
        let canvas = view.screen_to_canvas(Point::new(150.0, 300.0));
        assert!((canvas.x - 50.0).abs() < f64::EPSILON);
        assert!((canvas.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut view = ViewState::new();
        view.set_position(Vec2::new(30.0, -20.0));
        view.set_scale(1.5);

        let original = Point::new(123.0, 456.0);
        let back = view.canvas_to_screen(view.screen_to_canvas(original));

        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_wheel_direction() {
        let mut view = ViewState::new();
        view.zoom_at(Point::ZERO, 120.0);
        assert!((view.scale() - 0.9).abs() < 1e-12);
        view.reset();
        view.zoom_at(Point::ZERO, -120.0);
        assert!((view.scale() - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_steps() {
        let mut view = ViewState::new();
        view.zoom_in();
        assert!((view.scale() - 1.2).abs() < 1e-12);
        view.zoom_out();
        assert!((view.scale() - 0.96).abs() < 1e-12);
        view.set_scale(9.5);
        view.zoom_in();
        assert!((view.scale() - MAX_SCALE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut view = ViewState::new();
        for _ in 0..100 {
            view.zoom_at(Point::new(40.0, 40.0), 1.0);
            assert!(view.scale() >= MIN_SCALE);
        }
        assert!((view.scale() - MIN_SCALE).abs() < f64::EPSILON);

        for _ in 0..200 {
            view.zoom_at(Point::new(40.0, 40.0), -1.0);
            assert!(view.scale() <= MAX_SCALE);
        }
        assert!((view.scale() - MAX_SCALE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_keeps_pointer_fixed() {
        let mut view = ViewState::new();
        view.pan(Vec2::new(15.0, -35.0));
        let pointer = Point::new(200.0, 120.0);
        let before = view.screen_to_canvas(pointer);
        view.zoom_at(pointer, -1.0);
        view.zoom_at(pointer, -1.0);
        let after = view.screen_to_canvas(pointer);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }
}
