//! Engine-wide constants.
//!
//! Centralizes magic numbers and layout values to make the codebase
//! more maintainable and self-documenting.

// ============================================================================
// Zoom & Pan
// ============================================================================

/// Minimum zoom level
pub const MIN_ZOOM: f32 = 0.1;

/// Maximum zoom level
pub const MAX_ZOOM: f32 = 5.0;

/// Default zoom level
pub const DEFAULT_ZOOM: f32 = 1.0;

/// Multiplier applied to pan deltas before they hit the transform
pub const PAN_SENSITIVITY: f32 = 1.0;

// ============================================================================
// Grid
// ============================================================================

/// Default grid cell size in canvas units
pub const DEFAULT_GRID_SIZE: f32 = 20.0;

/// Minimum configurable grid size
pub const MIN_GRID_SIZE: f32 = 5.0;

/// Maximum configurable grid size
pub const MAX_GRID_SIZE: f32 = 100.0;

// ============================================================================
// Shape Defaults
// ============================================================================

/// Default shape size for template-created shapes
pub const DEFAULT_SHAPE_SIZE: (f32, f32) = (120.0, 60.0);

/// Minimum shape size enforced by updates and resize
pub const MIN_SHAPE_SIZE: (f32, f32) = (20.0, 20.0);

/// Offset applied to a duplicated shape so it does not cover its source
pub const DUPLICATE_OFFSET: f32 = 20.0;

// ============================================================================
// Group Resize
// ============================================================================

/// Minimum bounding-box size a group resize may shrink to
pub const MIN_GROUP_SIZE: (f32, f32) = (100.0, 60.0);

// ============================================================================
// Connection Routing
// ============================================================================

/// Distance a routed endpoint is pushed outward along its side normal,
/// so strokes do not overlap the shape border
pub const CONNECTION_ENDPOINT_OFFSET: f32 = 6.0;

/// Total symmetric shortening applied to a routed segment
pub const CONNECTION_TRIM: f32 = 12.0;

/// Maximum horizontal control-point offset for curved routing
pub const CURVE_MAX_CONTROL_OFFSET: f32 = 100.0;

/// Default connector stroke color
pub const DEFAULT_CONNECTION_STROKE: &str = "#4b5563";

/// Default connector stroke width
pub const DEFAULT_CONNECTION_STROKE_WIDTH: f32 = 2.0;

// ============================================================================
// Export
// ============================================================================

/// Padding added on every side of the exported scene bounding box
pub const EXPORT_PADDING: f32 = 50.0;

/// Default raster scale for PNG/PDF export (2x for crisp output)
pub const DEFAULT_EXPORT_SCALE: f32 = 2.0;

/// Default export quality
pub const DEFAULT_EXPORT_QUALITY: f32 = 0.92;

/// Minimum accepted export quality
pub const MIN_EXPORT_QUALITY: f32 = 0.1;

/// Default export background color
pub const DEFAULT_EXPORT_BACKGROUND: &str = "#ffffff";

/// Fallback project name used in suggested export filenames
pub const DEFAULT_EXPORT_PROJECT: &str = "diagram";

/// A4 page size in millimeters (portrait)
pub const A4_MM: (f32, f32) = (210.0, 297.0);

// ============================================================================
// Colors (default hex values)
// ============================================================================

/// Default shape background color
pub const DEFAULT_SHAPE_FILL: &str = "#ffffff";

/// Default shape border color
pub const DEFAULT_SHAPE_BORDER: &str = "#374151";

/// Default shape text color
pub const DEFAULT_SHAPE_TEXT_COLOR: &str = "#111827";

/// Default shape border width
pub const DEFAULT_BORDER_WIDTH: f32 = 2.0;
