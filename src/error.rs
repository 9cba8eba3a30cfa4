//! Error types for the canvas engine.
//!
//! Failures are structured results scoped to the single requested
//! operation; nothing in the core is fatal to the process and nothing
//! panics across the crate boundary.

use thiserror::Error;

/// Reasons a connection cannot be created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Both endpoints belong to the same shape
    #[error("cannot connect a shape to itself")]
    SelfConnection,

    /// The referenced shape does not exist in the registry
    #[error("unknown shape: {0}")]
    UnknownShape(String),

    /// The referenced point id does not exist on its shape
    #[error("unknown connection point: {0}")]
    UnknownPoint(String),

    /// Point kinds are not compatible (output must meet input, or either
    /// side must be bidirectional)
    #[error("incompatible point kinds: {from:?} -> {to:?}")]
    IncompatibleKinds {
        from: crate::types::PointKind,
        to: crate::types::PointKind,
    },

    /// An equivalent connection (in either direction) already exists
    #[error("duplicate connection between the same points")]
    Duplicate,
}

/// Errors raised while loading a serialized scene.
#[derive(Error, Debug)]
pub enum SceneError {
    /// The payload is not valid JSON
    #[error("scene parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The payload decoded but violates the scene schema
    #[error("invalid scene: {0}")]
    Invalid(String),
}

/// Errors surfaced by the export pipeline. Partial output is never
/// written: every handler produces its bytes fully in memory first.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The requested format string is not one of svg/png/pdf
    #[error("unknown export format: {0}")]
    UnknownFormat(String),

    /// Another export is already in flight for this exporter
    #[error("an export is already in progress")]
    Busy,

    /// The snapshot could not be parsed back as SVG for rasterization
    #[error("failed to prepare render tree: {0}")]
    InvalidSnapshot(String),

    /// The raster surface could not be allocated (zero or absurd size)
    #[error("failed to allocate {width}x{height} raster surface")]
    RasterSurface { width: u32, height: u32 },

    /// Bitmap encoding failed
    #[error("image encode error: {0}")]
    Encode(#[from] image::ImageError),

    /// PDF document generation failed
    #[error("pdf generation error: {0}")]
    Pdf(String),
}
