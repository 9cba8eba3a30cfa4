//! PDF assembly: the rasterized diagram is embedded as a JPEG on a page
//! at least A4 sized, oriented to match the bitmap's aspect ratio.

use crate::constants::A4_MM;
use crate::error::ExportError;
use printpdf::{Image, ImageTransform, Mm, PdfDocument};
use std::io::Cursor;

const EMBED_DPI: f32 = 150.0;
const PAGE_MARGIN_MM: f32 = 10.0;

pub fn render_pdf(jpeg: &[u8], px_width: u32, px_height: u32) -> Result<Vec<u8>, ExportError> {
    let img_w_mm = px_width as f32 * 25.4 / EMBED_DPI;
    let img_h_mm = px_height as f32 * 25.4 / EMBED_DPI;

    let (a4_w, a4_h) = A4_MM;
    let (mut page_w, mut page_h) = if px_width > px_height {
        (a4_h, a4_w)
    } else {
        (a4_w, a4_h)
    };
    // Grow past A4 when the bitmap would not fit at the embed dpi.
    page_w = page_w.max(img_w_mm + 2.0 * PAGE_MARGIN_MM);
    page_h = page_h.max(img_h_mm + 2.0 * PAGE_MARGIN_MM);

    let (doc, page, layer) =
        PdfDocument::new("diagram export", Mm(page_w), Mm(page_h), "diagram");
    let layer_ref = doc.get_page(page).get_layer(layer);

    let mut reader = Cursor::new(jpeg);
    let decoder = printpdf::image_crate::codecs::jpeg::JpegDecoder::new(&mut reader)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let image = Image::try_from(decoder).map_err(|e| ExportError::Pdf(e.to_string()))?;

    image.add_to_layer(
        layer_ref,
        ImageTransform {
            translate_x: Some(Mm((page_w - img_w_mm) / 2.0)),
            translate_y: Some(Mm((page_h - img_h_mm) / 2.0)),
            dpi: Some(EMBED_DPI),
            ..Default::default()
        },
    );

    doc.save_to_bytes().map_err(|e| ExportError::Pdf(e.to_string()))
}
