//! SVG snapshot preparation.
//!
//! Builds a standalone vector document from a frozen scene snapshot:
//! every visual property is resolved to explicit attributes, the
//! coordinate frame is shifted to the export bounds, and interaction
//! overlays (marquee, connection points, in-progress connectors) never
//! enter the document because the snapshot carries none of them.

use crate::connection::path_points;
use crate::export::ExportOptions;
use crate::geometry::Rect;
use crate::scene::SceneSnapshot;
use crate::types::{Shape, ShapeKind};
use std::fmt::Write as _;

/// A self-contained SVG document plus its pixel dimensions.
pub struct SvgSnapshot {
    pub document: String,
    pub width: f32,
    pub height: f32,
}

impl SvgSnapshot {
    /// Serialize the snapshot into a standalone SVG clipped to `bounds`.
    pub fn prepare(snapshot: &SceneSnapshot, bounds: Rect, options: &ExportOptions) -> Self {
        let width = bounds.width.max(1.0);
        let height = bounds.height.max(1.0);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\" viewBox=\"0 0 {:.0} {:.0}\">",
            width, height, width, height
        );

        let _ = writeln!(out, "<defs>");
        let _ = writeln!(
            out,
            "  <marker id=\"arrow\" markerWidth=\"10\" markerHeight=\"7\" refX=\"10\" refY=\"3.5\" orient=\"auto\">\n    <polygon points=\"0 0, 10 3.5, 0 7\" fill=\"#4b5563\"/>\n  </marker>"
        );
        let _ = writeln!(out, "</defs>");

        if options.background_color != "transparent" {
            let _ = writeln!(
                out,
                "<rect x=\"0\" y=\"0\" width=\"{:.0}\" height=\"{:.0}\" fill=\"{}\" />",
                width,
                height,
                escape_xml(&options.background_color)
            );
        }

        if options.include_grid {
            write_grid(&mut out, bounds, snapshot.grid.size);
        }

        // Shift the scene frame so the padded bounds origin lands at 0,0.
        let _ = writeln!(
            out,
            "<g transform=\"translate({:.1},{:.1})\">",
            -bounds.x, -bounds.y
        );

        for connection in &snapshot.connections {
            if connection.path.is_empty() {
                continue;
            }
            let dash = connection
                .style
                .dash
                .as_deref()
                .map(|d| format!(" stroke-dasharray=\"{}\"", escape_xml(d)))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.1}\"{} marker-end=\"url(#arrow)\" />",
                connection.path,
                escape_xml(&connection.style.stroke),
                connection.style.stroke_width,
                dash
            );
            if let Some(label) = &connection.label {
                if let Some((cx, cy)) = path_midpoint(&connection.path) {
                    let _ = writeln!(
                        out,
                        "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" fill=\"#374151\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
                        cx,
                        cy - 8.0,
                        escape_xml(label)
                    );
                }
            }
        }

        for shape in &snapshot.shapes {
            if !shape.is_visible() {
                continue;
            }
            write_shape(&mut out, shape);
        }

        let _ = writeln!(out, "</g>");
        let _ = writeln!(out, "</svg>");

        Self {
            document: out,
            width,
            height,
        }
    }
}

fn write_grid(out: &mut String, bounds: Rect, grid: f32) {
    let grid = grid.max(4.0);
    let _ = writeln!(
        out,
        "<g stroke=\"#d1d5db\" stroke-opacity=\"0.4\" stroke-width=\"1\">"
    );
    let mut x = (bounds.x / grid).floor() * grid - bounds.x;
    while x <= bounds.width {
        if x >= 0.0 {
            let _ = writeln!(
                out,
                "  <line x1=\"{x:.1}\" y1=\"0\" x2=\"{x:.1}\" y2=\"{h:.0}\" />",
                h = bounds.height
            );
        }
        x += grid;
    }
    let mut y = (bounds.y / grid).floor() * grid - bounds.y;
    while y <= bounds.height {
        if y >= 0.0 {
            let _ = writeln!(
                out,
                "  <line x1=\"0\" y1=\"{y:.1}\" x2=\"{w:.0}\" y2=\"{y:.1}\" />",
                w = bounds.width
            );
        }
        y += grid;
    }
    let _ = writeln!(out, "</g>");
}

fn write_shape(out: &mut String, shape: &Shape) {
    let b = shape.bounds();
    let stroke_width = shape.style.border_width.unwrap_or(2.0);
    let opacity = shape
        .style
        .opacity
        .map(|o| format!(" opacity=\"{o:.2}\""))
        .unwrap_or_default();
    let fill = escape_xml(&shape.style.background_color);
    let stroke = escape_xml(&shape.style.border_color);

    match shape.kind {
        ShapeKind::Decision => {
            // Diamond spanning the bounding box.
            let c = b.center();
            let _ = writeln!(
                out,
                "<polygon points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.1}\"{} />",
                c.x, b.y, b.max_x(), c.y, c.x, b.max_y(), b.x, c.y,
                fill, stroke, stroke_width, opacity
            );
        }
        ShapeKind::Connector => {
            let c = b.center();
            let _ = writeln!(
                out,
                "<ellipse cx=\"{:.1}\" cy=\"{:.1}\" rx=\"{:.1}\" ry=\"{:.1}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.1}\"{} />",
                c.x,
                c.y,
                b.width / 2.0,
                b.height / 2.0,
                fill,
                stroke,
                stroke_width,
                opacity
            );
        }
        _ => {
            // Start/end use a large radius (stadium look); process uses
            // its configured corner radius.
            let radius = shape
                .style
                .border_radius
                .unwrap_or(if shape.kind == ShapeKind::Process { 0.0 } else { b.height / 2.0 });
            let _ = writeln!(
                out,
                "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"{:.1}\" ry=\"{:.1}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.1}\"{} />",
                b.x, b.y, b.width, b.height, radius, radius,
                fill, stroke, stroke_width, opacity
            );
        }
    }

    if !shape.text.is_empty() {
        let c = b.center();
        let _ = writeln!(
            out,
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"14\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
            c.x,
            c.y,
            escape_xml(&shape.style.text_color),
            escape_xml(&shape.text)
        );
    }
}

/// Average of the coordinates appearing in a generated path string; good
/// enough for label placement on our own `M/L/C` output.
fn path_midpoint(path: &str) -> Option<(f32, f32)> {
    let points = path_points(path);
    if points.len() < 2 {
        return None;
    }
    let (mut sx, mut sy) = (0.0, 0.0);
    for p in &points {
        sx += p.x;
        sy += p.y;
    }
    let n = points.len() as f32;
    Some((sx / n, sy / n))
}

pub(crate) fn escape_xml(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(ch),
        }
    }
    s
}
