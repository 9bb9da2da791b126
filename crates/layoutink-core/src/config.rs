//! Editor configuration.
//!
//! All tunables of the interaction engine live here so hosts can override
//! them from a JSON file. Missing fields fall back to the defaults below.

use crate::error::{EditorError, EditorResult};
use crate::snap::SnapConfig;
use crate::units::{PIXELS_PER_MM_96_DPI, Unit};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for snapping, constraints, selection and zoom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Grid cell size in canvas pixels.
    pub grid_size: f64,
    /// Per-axis distance within which object snapping engages.
    pub snap_threshold: f64,
    /// Smallest width or height a rectangle may be resized to.
    pub min_size: f64,
    /// Scale factors closer than this to 1 count as "unchanged".
    pub scale_tolerance: f64,
    /// Window for the second click that drills into a group.
    pub drill_down_ms: u64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Zoom multiplier per wheel notch towards the user.
    pub zoom_in_factor: f64,
    /// Zoom multiplier per wheel notch away from the user.
    pub zoom_out_factor: f64,
    /// Screen distance a marquee must be dragged before it counts.
    pub marquee_threshold: f64,
    pub pixels_per_mm: f64,
    pub unit: Unit,
    pub snapping: SnapConfig,
    /// Fewest vertices a polygon may be reduced to by vertex deletion.
    pub min_polygon_vertices: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: 20.0,
            snap_threshold: 10.0,
            min_size: 0.01,
            scale_tolerance: 0.001,
            drill_down_ms: 500,
            min_scale: 0.1,
            max_scale: 10.0,
            zoom_in_factor: 1.1,
            zoom_out_factor: 0.9,
            marquee_threshold: 5.0,
            pixels_per_mm: PIXELS_PER_MM_96_DPI,
            unit: Unit::Millimeters,
            snapping: SnapConfig::default(),
            min_polygon_vertices: 3,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON, filling gaps with defaults.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        log::debug!("Loaded editor config: {:?}", config);
        Ok(config)
    }

    /// Serialize the configuration to pretty JSON.
    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would break snapping, zooming or unit conversion.
    pub fn validate(&self) -> EditorResult<()> {
        let positive = [
            ("grid_size", self.grid_size),
            ("snap_threshold", self.snap_threshold),
            ("min_size", self.min_size),
            ("pixels_per_mm", self.pixels_per_mm),
            ("min_scale", self.min_scale),
        ];
        for (name, value) in positive {
            if value <= 0.0 || !value.is_finite() {
                return Err(EditorError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.max_scale.is_nan() || self.min_scale > self.max_scale {
            return Err(EditorError::InvalidConfig(format!(
                "min_scale {} exceeds max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        Ok(())
    }

    pub fn drill_down_window(&self) -> Duration {
        Duration::from_millis(self.drill_down_ms)
    }
}
