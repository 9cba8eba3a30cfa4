//! Export pipeline - SVG, PNG and PDF output from a frozen scene
//! snapshot.
//!
//! Exports never touch live state: callers hand over a [`SceneSnapshot`]
//! and the pipeline works entirely from that copy. One export may run at
//! a time per [`Exporter`]; a second request while one is in flight is
//! rejected with [`ExportError::Busy`] rather than queued.

mod pdf;
pub(crate) mod raster;
mod svg;

pub use raster::{Rasterize, ResvgRasterizer};
pub use svg::SvgSnapshot;

use crate::connection::path_points;
use crate::constants::{
    DEFAULT_EXPORT_BACKGROUND, DEFAULT_EXPORT_PROJECT, DEFAULT_EXPORT_QUALITY,
    DEFAULT_EXPORT_SCALE, EXPORT_PADDING, MIN_EXPORT_QUALITY,
};
use crate::error::ExportError;
use crate::geometry::Rect;
use crate::scene::SceneSnapshot;
use anyhow::Context as _;
use chrono::Local;
use parking_lot::Mutex;
use std::fmt;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, info_span, warn};

/// Output format for a scene export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Options for a single export request.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Raster scale factor for PNG/PDF (canvas units to pixels).
    pub scale: f32,
    /// PNG: compression effort. PDF: embedded JPEG quality.
    pub quality: f32,
    /// Any CSS color, or `"transparent"` for no background rect.
    pub background_color: String,
    /// Draw the grid into the artifact. Off by default.
    pub include_grid: bool,
    /// Project name used for the suggested filename.
    pub project_name: Option<String>,
    /// Explicit output filename; overrides the suggested one.
    pub filename: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Svg,
            scale: DEFAULT_EXPORT_SCALE,
            quality: DEFAULT_EXPORT_QUALITY,
            background_color: DEFAULT_EXPORT_BACKGROUND.to_string(),
            include_grid: false,
            project_name: None,
            filename: None,
        }
    }
}

impl ExportOptions {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    fn effective_quality(&self) -> f32 {
        if self.quality.is_finite() && self.quality >= MIN_EXPORT_QUALITY {
            self.quality.min(1.0)
        } else {
            warn!(quality = self.quality, "quality out of range, using default");
            DEFAULT_EXPORT_QUALITY
        }
    }

    fn effective_scale(&self) -> f32 {
        if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            warn!(scale = self.scale, "scale out of range, using default");
            DEFAULT_EXPORT_SCALE
        }
    }
}

/// A finished export: the raw bytes plus naming metadata.
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub suggested_name: String,
}

/// Runs exports. Holds the shared rasterizer (font database) and the
/// single-in-flight guard.
pub struct Exporter<R = ResvgRasterizer> {
    rasterizer: R,
    in_flight: Mutex<()>,
}

impl Default for Exporter<ResvgRasterizer> {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter<ResvgRasterizer> {
    pub fn new() -> Self {
        Self::with_rasterizer(ResvgRasterizer::new())
    }
}

impl<R: Rasterize> Exporter<R> {
    pub fn with_rasterizer(rasterizer: R) -> Self {
        Self {
            rasterizer,
            in_flight: Mutex::new(()),
        }
    }

    /// Produce an export artifact from a frozen snapshot.
    ///
    /// Returns [`ExportError::Busy`] if another export is running on this
    /// exporter.
    pub fn export(
        &self,
        snapshot: &SceneSnapshot,
        options: &ExportOptions,
    ) -> Result<ExportArtifact, ExportError> {
        let _guard = self.in_flight.try_lock().ok_or(ExportError::Busy)?;
        let _span = info_span!("export", format = %options.format).entered();

        let bounds = compute_bounds(snapshot);
        let svg = SvgSnapshot::prepare(snapshot, bounds, options);
        info!(
            format = %options.format,
            width = svg.width,
            height = svg.height,
            shapes = snapshot.shapes.len(),
            "exporting scene"
        );

        let bytes = match options.format {
            ExportFormat::Svg => svg.document.into_bytes(),
            ExportFormat::Png => {
                let (w, h) = raster_size(&svg, options.effective_scale());
                let pixmap = self.rasterizer.rasterize(&svg.document, w, h)?;
                raster::encode_png(&pixmap, options.effective_quality())?
            }
            ExportFormat::Pdf => {
                let (w, h) = raster_size(&svg, options.effective_scale());
                let pixmap = self.rasterizer.rasterize(&svg.document, w, h)?;
                let jpeg = raster::encode_jpeg(&pixmap, options.effective_quality())?;
                pdf::render_pdf(&jpeg, w, h)?
            }
        };

        let suggested_name = match &options.filename {
            Some(name) => name.clone(),
            None => suggested_filename(options.project_name.as_deref(), options.format),
        };
        Ok(ExportArtifact {
            bytes,
            mime_type: options.format.mime_type(),
            suggested_name,
        })
    }

    /// Export and write the artifact under `dir`, atomically (write to a
    /// temp file, then rename). Returns the final path.
    pub fn export_to_file(
        &self,
        snapshot: &SceneSnapshot,
        options: &ExportOptions,
        dir: &Path,
    ) -> anyhow::Result<PathBuf> {
        let artifact = self.export(snapshot, options)?;
        let path = dir.join(&artifact.suggested_name);
        let tmp = path.with_extension("tmp");

        let mut file = std::fs::File::create(&tmp)
            .with_context(|| format!("creating {}", tmp.display()))?;
        file.write_all(&artifact.bytes)?;
        file.sync_all()?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("renaming into {}", path.display()))?;

        info!(path = %path.display(), bytes = artifact.bytes.len(), "export written");
        Ok(path)
    }
}

fn raster_size(svg: &SvgSnapshot, scale: f32) -> (u32, u32) {
    let w = (svg.width * scale).round().max(1.0) as u32;
    let h = (svg.height * scale).round().max(1.0) as u32;
    (w, h)
}

/// Tight bounding box of all rendered geometry, padded on every side.
/// An empty scene falls back to a fixed default page.
pub fn compute_bounds(snapshot: &SceneSnapshot) -> Rect {
    let mut bounds: Option<Rect> = None;
    let mut extend = |r: Rect| {
        bounds = Some(match bounds {
            Some(acc) => acc.union(&r),
            None => r,
        });
    };

    for shape in &snapshot.shapes {
        if shape.is_visible() && shape.position.is_finite() {
            extend(shape.bounds());
        }
    }
    for connection in &snapshot.connections {
        for point in path_points(&connection.path) {
            extend(Rect::new(point.x, point.y, 0.0, 0.0));
        }
    }

    match bounds {
        Some(b) => b.expanded(EXPORT_PADDING),
        None => Rect::new(0.0, 0.0, 400.0, 300.0),
    }
}

/// `<project>-flow-<date>-<time>.<ext>`, time colons replaced with
/// dashes so the name is valid on every filesystem.
pub fn suggested_filename(project: Option<&str>, format: ExportFormat) -> String {
    let project = match project {
        Some(p) if !p.trim().is_empty() => p.trim(),
        _ => DEFAULT_EXPORT_PROJECT,
    };
    let now = Local::now();
    format!(
        "{}-flow-{}-{}.{}",
        project,
        now.format("%Y-%m-%d"),
        now.format("%H-%M-%S"),
        format.extension()
    )
}
