//! SVG rasterization and bitmap encoding.
//!
//! Vector output is the single source of truth for every format: PNG and
//! PDF both start from the prepared SVG document and rasterize it with
//! resvg into an offscreen pixmap.

use crate::error::ExportError;
use image::ImageEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use resvg::tiny_skia::Pixmap;
use std::sync::Arc;
use tracing::debug;
use usvg::fontdb;

/// Renders an SVG document into a pixel surface. The seam exists so
/// tests can exercise the encoding path without a font database.
pub trait Rasterize {
    fn rasterize(&self, svg: &str, width: u32, height: u32) -> Result<Pixmap, ExportError>;
}

/// resvg-backed rasterizer sharing one font database across exports.
pub struct ResvgRasterizer {
    fontdb: Arc<fontdb::Database>,
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResvgRasterizer {
    pub fn new() -> Self {
        let mut fontdb = fontdb::Database::new();
        fontdb.load_system_fonts();
        Self {
            fontdb: Arc::new(fontdb),
        }
    }
}

impl Rasterize for ResvgRasterizer {
    fn rasterize(&self, svg: &str, width: u32, height: u32) -> Result<Pixmap, ExportError> {
        let mut options = usvg::Options::default();
        options.fontdb = Arc::clone(&self.fontdb);
        let tree = usvg::Tree::from_data(svg.as_bytes(), &options)
            .map_err(|e| ExportError::InvalidSnapshot(e.to_string()))?;

        let mut pixmap =
            Pixmap::new(width, height).ok_or(ExportError::RasterSurface { width, height })?;

        let svg_size = tree.size();
        let sx = width as f32 / svg_size.width().max(1.0);
        let sy = height as f32 / svg_size.height().max(1.0);
        let transform = resvg::tiny_skia::Transform::from_scale(sx, sy);
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        debug!(width, height, "rasterized svg snapshot");
        Ok(pixmap)
    }
}

/// Encode a pixmap as PNG. PNG is lossless, so the quality knob maps to
/// compression effort instead of fidelity.
pub fn encode_png(pixmap: &Pixmap, quality: f32) -> Result<Vec<u8>, ExportError> {
    let rgba = unpremultiply(pixmap);
    let compression = if quality >= 0.8 {
        CompressionType::Best
    } else if quality >= 0.4 {
        CompressionType::Default
    } else {
        CompressionType::Fast
    };

    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut out, compression, FilterType::Adaptive);
    encoder
        .write_image(
            &rgba,
            pixmap.width(),
            pixmap.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(ExportError::Encode)?;
    Ok(out)
}

/// Encode a pixmap as JPEG at the given quality, compositing any
/// transparency over white (JPEG has no alpha channel).
pub fn encode_jpeg(pixmap: &Pixmap, quality: f32) -> Result<Vec<u8>, ExportError> {
    let rgb = flatten_over_white(pixmap);
    let q = (quality.clamp(0.1, 1.0) * 100.0).round() as u8;

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, q);
    encoder
        .write_image(
            &rgb,
            pixmap.width(),
            pixmap.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(ExportError::Encode)?;
    Ok(out)
}

fn unpremultiply(pixmap: &Pixmap) -> Vec<u8> {
    let mut data = Vec::with_capacity(pixmap.pixels().len() * 4);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    data
}

fn flatten_over_white(pixmap: &Pixmap) -> Vec<u8> {
    let mut data = Vec::with_capacity(pixmap.pixels().len() * 3);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        let a = c.alpha() as f32 / 255.0;
        let blend = |ch: u8| (ch as f32 * a + 255.0 * (1.0 - a)).round() as u8;
        data.extend_from_slice(&[blend(c.red()), blend(c.green()), blend(c.blue())]);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_pixmap(w: u32, h: u32) -> Pixmap {
        let mut pixmap = Pixmap::new(w, h).unwrap();
        pixmap.fill(resvg::tiny_skia::Color::from_rgba8(255, 0, 0, 255));
        pixmap
    }

    #[test]
    fn test_png_encoding_produces_valid_signature() {
        let pixmap = solid_pixmap(8, 8);
        let bytes = encode_png(&pixmap, 0.92).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn test_jpeg_encoding_produces_valid_signature() {
        let pixmap = solid_pixmap(8, 8);
        let bytes = encode_jpeg(&pixmap, 0.8).unwrap();
        assert_eq!(&bytes[..2], &[0xff, 0xd8]);
    }

    #[test]
    fn test_transparent_pixels_flatten_to_white() {
        let pixmap = Pixmap::new(2, 2).unwrap();
        let rgb = flatten_over_white(&pixmap);
        assert!(rgb.iter().all(|&b| b == 255));
    }
}
