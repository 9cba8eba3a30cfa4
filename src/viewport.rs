//! Viewport/transform controller - pan, zoom and screen/canvas
//! coordinate conversion.
//!
//! Owns the canvas transform `{x, y, scale}` and the grid sub-state.
//! `screen_to_canvas` and `canvas_to_screen` are exact inverses; zooming
//! around a center point keeps that point visually fixed.

use crate::constants::{
    DEFAULT_GRID_SIZE, DEFAULT_ZOOM, MAX_GRID_SIZE, MAX_ZOOM, MIN_GRID_SIZE, MIN_ZOOM,
    PAN_SENSITIVITY,
};
use crate::geometry::{Point, Rect, snap_to_grid};
use crate::types::Shape;
use serde::{Deserialize, Serialize};

/// The pan/zoom mapping between screen and canvas space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasTransform {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: DEFAULT_ZOOM,
        }
    }
}

/// Grid visibility and snapping configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSettings {
    pub size: f32,
    pub visible: bool,
    pub snap_enabled: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
            visible: true,
            snap_enabled: true,
        }
    }
}

/// Host viewport dimensions in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Controller over the canvas transform, grid and viewport dimensions.
pub struct ViewportController {
    pub transform: CanvasTransform,
    pub grid: GridSettings,
    pub viewport: ViewportSize,
    min_zoom: f32,
    max_zoom: f32,
    pan_sensitivity: f32,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportController {
    pub fn new() -> Self {
        Self {
            transform: CanvasTransform::default(),
            grid: GridSettings::default(),
            viewport: ViewportSize::default(),
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            pan_sensitivity: PAN_SENSITIVITY,
        }
    }

    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = ViewportSize { width, height };
        self
    }

    /// Scale factor applied to every pan delta. Hosts with high-resolution
    /// trackpad deltas tune this down, coarse wheel events tune it up.
    pub fn with_pan_sensitivity(mut self, sensitivity: f32) -> Self {
        self.pan_sensitivity = sensitivity;
        self
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = ViewportSize { width, height };
    }

    // ------------------------------------------------------------------
    // Pan & zoom
    // ------------------------------------------------------------------

    /// Shift the canvas offset by a screen-space delta (scaled by the pan
    /// sensitivity).
    pub fn pan(&mut self, delta: Point) {
        self.transform.x += delta.x * self.pan_sensitivity;
        self.transform.y += delta.y * self.pan_sensitivity;
    }

    /// Multiply the current scale, optionally keeping `center` (a screen
    /// point) visually fixed. Returns true when the scale changed.
    pub fn zoom_by(&mut self, delta_scale: f32, center: Option<Point>) -> bool {
        self.set_zoom(self.transform.scale * delta_scale, center)
    }

    /// Set an absolute zoom level, clamped to the configured range.
    ///
    /// A no-op (clamped target equals the current scale) must not alter
    /// the offsets.
    pub fn set_zoom(&mut self, scale: f32, center: Option<Point>) -> bool {
        let new_scale = scale.clamp(self.min_zoom, self.max_zoom);
        let old_scale = self.transform.scale;
        if new_scale == old_scale {
            return false;
        }

        if let Some(center) = center {
            // Solve for the offset that keeps `center` over the same
            // canvas point: newOffset = c - (c - oldOffset) * (new/old)
            let ratio = new_scale / old_scale;
            self.transform.x = center.x - (center.x - self.transform.x) * ratio;
            self.transform.y = center.y - (center.y - self.transform.y) * ratio;
        }
        self.transform.scale = new_scale;
        true
    }

    pub fn zoom_range(&self) -> (f32, f32) {
        (self.min_zoom, self.max_zoom)
    }

    // ------------------------------------------------------------------
    // Coordinate conversion
    // ------------------------------------------------------------------

    /// `(p - offset) / scale`
    #[inline]
    pub fn screen_to_canvas(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.transform.x) / self.transform.scale,
            (p.y - self.transform.y) / self.transform.scale,
        )
    }

    /// `p * scale + offset`
    #[inline]
    pub fn canvas_to_screen(&self, p: Point) -> Point {
        Point::new(
            p.x * self.transform.scale + self.transform.x,
            p.y * self.transform.scale + self.transform.y,
        )
    }

    /// Convert a screen-space delta into canvas units.
    #[inline]
    pub fn delta_screen_to_canvas(&self, delta: Point) -> Point {
        Point::new(
            delta.x / self.transform.scale,
            delta.y / self.transform.scale,
        )
    }

    // ------------------------------------------------------------------
    // Fit to content
    // ------------------------------------------------------------------

    /// Center the union bounding box of `shapes` in the viewport at a
    /// fixed scale of 1.0. Shapes with a non-finite position are skipped;
    /// an empty or fully invalid list resets to the default transform.
    ///
    /// The engine deliberately does not auto-fit scale - it only centers.
    pub fn fit_to_content<'a, I>(&mut self, shapes: I)
    where
        I: IntoIterator<Item = &'a Shape>,
    {
        let mut bounds: Option<Rect> = None;
        for shape in shapes {
            if !shape.position.is_finite() {
                continue;
            }
            let b = shape.bounds();
            bounds = Some(match bounds {
                Some(acc) => acc.union(&b),
                None => b,
            });
        }

        let Some(bounds) = bounds else {
            self.transform = CanvasTransform::default();
            return;
        };

        let content_center = bounds.center();
        self.transform.scale = 1.0;
        self.transform.x = self.viewport.width / 2.0 - content_center.x;
        self.transform.y = self.viewport.height / 2.0 - content_center.y;
    }

    // ------------------------------------------------------------------
    // Grid
    // ------------------------------------------------------------------

    pub fn toggle_grid(&mut self) {
        self.grid.visible = !self.grid.visible;
    }

    pub fn toggle_snap(&mut self) {
        self.grid.snap_enabled = !self.grid.snap_enabled;
    }

    /// Set the grid cell size, clamped to `[5, 100]`.
    pub fn set_grid_size(&mut self, size: f32) {
        self.grid.size = size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE);
    }

    /// Snap a canvas point to the grid when snapping is enabled, else
    /// return it unchanged.
    #[inline]
    pub fn snap_if_enabled(&self, p: Point) -> Point {
        if self.grid.snap_enabled {
            snap_to_grid(p, self.grid.size)
        } else {
            p
        }
    }
}
