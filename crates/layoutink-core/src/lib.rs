//! LayoutInk Core Library
//!
//! Geometry, snapping, lock reconciliation, selection and drag handling for
//! the LayoutInk floor-plan editor. Rendering is left to the host, which
//! draws a [`SceneView`] and feeds pointer and keyboard events back through
//! [`Document`].

pub mod area;
pub mod camera;
pub mod config;
pub mod constraints;
pub mod document;
pub mod error;
pub mod geometry;
pub mod properties;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod snap;
pub mod transform;
pub mod units;

pub use area::{AreaCommit, AreaRequest, AreaService, KernelAreaService};
pub use camera::ViewState;
pub use config::EditorConfig;
pub use constraints::{Reconciled, TransformProposal, reconcile};
pub use document::Document;
pub use error::{EditorError, EditorResult};
pub use properties::{Axis, Dimension, SelectionSummary};
pub use scene::{SceneView, ShapeView, label_font_size};
pub use selection::{ClickTracker, Selection};
pub use shapes::{
    EntityId, EntityKind, GroupId, LayoutKind, LayoutShape, LockKind, Locks, MachineBlock,
    Placeable, SerializableColor,
};
pub use snap::{GRID_SIZE, SnapConfig, SnapResult, SnapTarget, SnapTargetKind, snap_to_grid};
pub use transform::DragSession;
pub use units::Unit;
