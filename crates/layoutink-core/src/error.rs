//! Error types for editor operations.

use crate::area::AreaError;
use crate::shapes::EntityId;
use thiserror::Error;

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors that can occur while editing a layout document.
#[derive(Debug, Error)]
pub enum EditorError {
    /// No layout shape or machine block has this id.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The operation needs a rectangle layout.
    #[error("Entity {0} is not a rectangle layout")]
    NotARectangle(EntityId),

    /// The operation needs a polygon layout.
    #[error("Entity {0} is not a polygon layout")]
    NotAPolygon(EntityId),

    /// Machine blocks carry no area.
    #[error("Entity {0} does not track area")]
    NoArea(EntityId),

    /// Vertex index past the end of the polygon.
    #[error("Vertex {index} out of range for polygon with {len} vertices")]
    VertexOutOfRange { index: usize, len: usize },

    /// Deleting would leave fewer than three vertices.
    #[error("Polygon must keep at least {min} vertices")]
    VertexFloor { min: usize },

    /// The area service failed to produce a value.
    #[error("Area calculation failed: {0}")]
    Area(#[from] AreaError),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Editor configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
