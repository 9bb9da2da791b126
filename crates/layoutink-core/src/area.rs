//! Area calculation seam.
//!
//! Area is computed by an [`AreaService`], which hosts may back with a
//! native library. Requests carry the shape's geometry revision so that a
//! response arriving after a newer edit can be told apart and dropped.

use crate::geometry;
use crate::shapes::{EntityId, LayoutKind, LayoutShape};
use kurbo::Point;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Area service errors.
#[derive(Debug, Error)]
pub enum AreaError {
    #[error("Area service unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Result type for area calculations.
pub type AreaResult<T> = Result<T, AreaError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Computes areas in px².
pub trait AreaService {
    fn rectangle_area(&self, width: f64, height: f64) -> BoxFuture<'_, AreaResult<f64>>;

    /// Area of a polygon given its vertices in order.
    fn polygon_area(&self, points: Vec<Point>) -> BoxFuture<'_, AreaResult<f64>>;
}

/// Area service backed by the in-crate geometry kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelAreaService;

impl KernelAreaService {
    pub fn new() -> Self {
        Self
    }
}

impl AreaService for KernelAreaService {
    fn rectangle_area(&self, width: f64, height: f64) -> BoxFuture<'_, AreaResult<f64>> {
        Box::pin(async move {
            if !width.is_finite() || !height.is_finite() {
                return Err(AreaError::InvalidGeometry(format!("{width} x {height}")));
            }
            Ok(geometry::rectangle_area(width, height))
        })
    }

    fn polygon_area(&self, points: Vec<Point>) -> BoxFuture<'_, AreaResult<f64>> {
        Box::pin(async move { Ok(geometry::polygon_area(&points)) })
    }
}

/// Geometry snapshot sent to the area service.
#[derive(Debug, Clone, PartialEq)]
pub enum AreaGeometry {
    Rectangle { width: f64, height: f64 },
    Polygon(Vec<Point>),
}

/// A pending area computation for one layout shape.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaRequest {
    pub id: EntityId,
    /// Geometry revision the request was taken at.
    pub revision: u64,
    pub geometry: AreaGeometry,
}

impl AreaRequest {
    /// Snapshot the current geometry of a shape.
    pub fn for_shape(shape: &LayoutShape) -> Self {
        let geometry = match &shape.kind {
            LayoutKind::Rectangle { width, height, .. } => AreaGeometry::Rectangle {
                width: *width,
                height: *height,
            },
            LayoutKind::Polygon { points } => AreaGeometry::Polygon(points.clone()),
        };
        Self {
            id: shape.id,
            revision: shape.geometry_revision,
            geometry,
        }
    }

    /// Run the request against a service.
    pub fn compute<'a>(&self, service: &'a dyn AreaService) -> BoxFuture<'a, AreaResult<f64>> {
        match &self.geometry {
            AreaGeometry::Rectangle { width, height } => service.rectangle_area(*width, *height),
            AreaGeometry::Polygon(points) => service.polygon_area(points.clone()),
        }
    }
}

/// Outcome of committing an area response to the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaCommit {
    /// The area was stored.
    Applied(f64),
    /// The geometry changed since the request; the value was dropped.
    Stale,
    /// The shape no longer exists.
    Missing,
    /// The service failed; area was set to zero.
    Fallback,
}
