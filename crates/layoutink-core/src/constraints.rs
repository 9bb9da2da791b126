//! Lock and area reconciliation for rectangle transforms.
//!
//! A finished resize or move gesture produces a [`TransformProposal`].
//! [`reconcile`] applies the rectangle's locks to it and returns the values
//! to commit. Nothing here touches the document.

use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::shapes::{LayoutKind, LayoutShape, Placeable};
use kurbo::Point;

/// Smallest width or height a rectangle can be reconciled to.
pub const MIN_SIZE: f64 = 0.01;

/// Scale factors within this distance of 1 count as unchanged.
pub const SCALE_TOLERANCE: f64 = 0.001;

/// Values proposed by a gesture or a property edit. `None` keeps the
/// current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformProposal {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
}

impl TransformProposal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a proposal from the node state at the end of a transform
    /// gesture: its position, the scale factors applied to the current size
    /// and its rotation.
    pub fn from_gesture(
        shape: &LayoutShape,
        position: Point,
        scale_x: f64,
        scale_y: f64,
        rotation: f64,
    ) -> Self {
        let (width, height) = shape.size().unwrap_or_default();
        Self {
            x: Some(position.x),
            y: Some(position.y),
            width: Some(width * scale_x),
            height: Some(height * scale_y),
            rotation: Some(rotation),
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.x = Some(position.x);
        self.y = Some(position.y);
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }
}

/// Floors and tolerances used during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcileLimits {
    pub min_size: f64,
    pub scale_tolerance: f64,
}

impl Default for ReconcileLimits {
    fn default() -> Self {
        Self {
            min_size: MIN_SIZE,
            scale_tolerance: SCALE_TOLERANCE,
        }
    }
}

impl From<&EditorConfig> for ReconcileLimits {
    fn from(config: &EditorConfig) -> Self {
        Self {
            min_size: config.min_size,
            scale_tolerance: config.scale_tolerance,
        }
    }
}

/// Final values to commit for a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciled {
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    /// The area is not locked, so the caller must recompute it.
    pub area_needs_refresh: bool,
    /// The area lock redirected the resize to the other dimension.
    pub area_corrected: bool,
}

fn changed(current: f64, proposed: f64, tolerance: f64) -> bool {
    if current.abs() < f64::EPSILON {
        return (proposed - current).abs() > tolerance;
    }
    (proposed / current - 1.0).abs() > tolerance
}

/// Apply the rectangle's locks to a proposal.
///
/// Rules run in order: position locks, dimension locks with the size floor,
/// then the area lock, which only acts when exactly one dimension changed.
pub fn reconcile(
    shape: &LayoutShape,
    proposal: &TransformProposal,
    limits: ReconcileLimits,
) -> EditorResult<Reconciled> {
    let LayoutKind::Rectangle {
        width: current_width,
        height: current_height,
        locks,
    } = &shape.kind
    else {
        return Err(EditorError::NotARectangle(shape.id()));
    };
    let (current_width, current_height) = (*current_width, *current_height);

    let x = match proposal.x {
        Some(x) if !locks.x => x,
        _ => shape.position.x,
    };
    let y = match proposal.y {
        Some(y) if !locks.y => y,
        _ => shape.position.y,
    };

    let mut width = if locks.width {
        current_width.max(limits.min_size)
    } else {
        proposal.width.unwrap_or(current_width).max(limits.min_size)
    };
    let mut height = if locks.height {
        current_height.max(limits.min_size)
    } else {
        proposal.height.unwrap_or(current_height).max(limits.min_size)
    };

    let mut area_corrected = false;
    let target_area = shape
        .area
        .filter(|area| *area > 0.0 && locks.area && !locks.width && !locks.height);
    if let Some(target_area) = target_area {
        let width_changed = proposal
            .width
            .is_some_and(|w| changed(current_width, w, limits.scale_tolerance));
        let height_changed = proposal
            .height
            .is_some_and(|h| changed(current_height, h, limits.scale_tolerance));

        match (width_changed, height_changed) {
            (true, false) => {
                height = (target_area / width).max(limits.min_size);
                area_corrected = true;
            }
            (false, true) => {
                width = (target_area / height).max(limits.min_size);
                area_corrected = true;
            }
            (true, true) => {
                log::debug!(
                    "Both dimensions of {} changed, skipping area correction",
                    shape.id()
                );
            }
            (false, false) => {}
        }
    }

    Ok(Reconciled {
        position: Point::new(x, y),
        width,
        height,
        rotation: proposal.rotation.unwrap_or(shape.rotation),
        area_needs_refresh: !locks.area,
        area_corrected,
    })
}
