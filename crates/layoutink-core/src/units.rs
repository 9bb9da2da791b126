//! Display units and conversions between canvas pixels and real-world
//! lengths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixels per millimeter at 96 DPI.
pub const PIXELS_PER_MM_96_DPI: f64 = 3.7795275591;

/// Unit used when presenting lengths and areas to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Pixels,
    #[default]
    Millimeters,
    Meters,
}

impl Unit {
    pub const ALL: [Unit; 3] = [Unit::Pixels, Unit::Millimeters, Unit::Meters];

    /// Short label, e.g. `mm`.
    pub fn label(self) -> &'static str {
        match self {
            Unit::Pixels => "px",
            Unit::Millimeters => "mm",
            Unit::Meters => "m",
        }
    }

    /// Label for areas, e.g. `mm²`.
    pub fn area_label(self) -> String {
        format!("{}²", self.label())
    }

    /// Parse a short label back into a unit.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.label() == label)
    }

    /// Convert a pixel length into this unit.
    pub fn from_pixels(self, pixels: f64, pixels_per_mm: f64) -> f64 {
        match self {
            Unit::Pixels => pixels,
            Unit::Millimeters => pixels / pixels_per_mm,
            Unit::Meters => pixels / pixels_per_mm / 1000.0,
        }
    }

    /// Convert a length in this unit into pixels.
    pub fn to_pixels(self, value: f64, pixels_per_mm: f64) -> f64 {
        match self {
            Unit::Pixels => value,
            Unit::Millimeters => value * pixels_per_mm,
            Unit::Meters => value * 1000.0 * pixels_per_mm,
        }
    }

    /// Convert an area in px² into this unit squared.
    pub fn area_from_pixels(self, area: f64, pixels_per_mm: f64) -> f64 {
        let factor = self.from_pixels(1.0, pixels_per_mm);
        area * factor * factor
    }

    /// Format a pixel length for display (m: 3 decimals, mm: 1, px: whole).
    pub fn format_length(self, pixels: f64, pixels_per_mm: f64) -> String {
        let value = self.from_pixels(pixels, pixels_per_mm);
        match self {
            Unit::Pixels => format!("{}", value.round()),
            Unit::Millimeters => format!("{value:.1}"),
            Unit::Meters => format!("{value:.3}"),
        }
    }

    /// Format a px² area for display with its unit label
    /// (m²: 6 decimals, mm²: 2, px²: whole).
    pub fn format_area(self, area: f64, pixels_per_mm: f64) -> String {
        let value = self.area_from_pixels(area, pixels_per_mm);
        let number = match self {
            Unit::Pixels => format!("{}", value.round()),
            Unit::Millimeters => format!("{value:.2}"),
            Unit::Meters => format!("{value:.6}"),
        };
        format!("{number} {}", self.area_label())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
