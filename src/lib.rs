//! Interactive diagram canvas engine.
//!
//! Headless core for a flowchart editor: a shape registry with spatial
//! indexing and z-ordering, a connection engine with facing-aware anchor
//! selection and path routing, a pan/zoom viewport with grid snapping,
//! pointer gesture controllers (selection, marquee, drag, group resize),
//! and an export pipeline producing SVG, PNG and PDF from frozen scene
//! snapshots.
//!
//! The crate renders nothing on screen itself; a host embeds it and maps
//! pointer/keyboard events onto the controllers.

pub mod connection;
pub mod constants;
pub mod error;
pub mod export;
pub mod geometry;
pub mod input;
pub mod registry;
pub mod scene;
pub mod spatial_index;
pub mod types;
pub mod viewport;

pub use connection::{ConnectionSet, RouteStyle};
pub use error::{ConnectionError, ExportError, SceneError};
pub use export::{ExportArtifact, ExportFormat, ExportOptions, Exporter};
pub use geometry::{Point, Rect};
pub use input::{DragSession, GestureState, GroupResizeSession, ResizeHandle, SelectionManager};
pub use registry::ComponentRegistry;
pub use scene::{LinkInput, Scene, SceneSnapshot, ShapeInput};
pub use types::{
    Connection, ConnectionPoint, ConnectionStyle, Endpoint, PointKind, Shape, ShapeId, ShapeKind,
    ShapeStyle, ShapeUpdate, Side, Size,
};
pub use viewport::{CanvasTransform, GridSettings, ViewportController, ViewportSize};
