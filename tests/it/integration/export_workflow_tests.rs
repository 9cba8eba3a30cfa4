//! Full export pipeline tests: rasterization, encoding, file output and
//! the single-in-flight guard.

use crate::helpers::{TestSceneBuilder, init_tracing};
use flowcanvas::export::Rasterize;
use flowcanvas::{ExportError, ExportFormat, ExportOptions, Exporter, SceneSnapshot, ShapeKind};
use std::sync::mpsc;

fn snapshot() -> SceneSnapshot {
    let (scene, _) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Start, (0.0, 0.0))
        .with_shape(ShapeKind::End, (300.0, 0.0))
        .with_link(0, 1)
        .build();
    scene.snapshot()
}

#[test]
fn test_png_export_has_scaled_dimensions() {
    init_tracing();
    let exporter = Exporter::new();
    let mut options = ExportOptions::new(ExportFormat::Png);
    options.scale = 1.0;

    let artifact = exporter.export(&snapshot(), &options).unwrap();
    let decoded = image::load_from_memory(&artifact.bytes).unwrap();
    // Padded bounds are 520x160 at scale 1.
    assert_eq!(decoded.width(), 520);
    assert_eq!(decoded.height(), 160);
    assert_eq!(artifact.mime_type, "image/png");
}

#[test]
fn test_png_default_scale_doubles_resolution() {
    let exporter = Exporter::new();
    let artifact = exporter
        .export(&snapshot(), &ExportOptions::new(ExportFormat::Png))
        .unwrap();
    let decoded = image::load_from_memory(&artifact.bytes).unwrap();
    assert_eq!(decoded.width(), 1040);
    assert_eq!(decoded.height(), 320);
}

#[test]
fn test_pdf_export_produces_document() {
    let exporter = Exporter::new();
    let artifact = exporter
        .export(&snapshot(), &ExportOptions::new(ExportFormat::Pdf))
        .unwrap();
    assert!(artifact.bytes.starts_with(b"%PDF"));
    assert!(artifact.suggested_name.ends_with(".pdf"));
}

#[test]
fn test_export_to_file_writes_named_artifact() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::new();
    let mut options = ExportOptions::new(ExportFormat::Svg);
    options.project_name = Some("onboarding".into());

    let path = exporter
        .export_to_file(&snapshot(), &options, dir.path())
        .unwrap();

    assert!(path.exists());
    let name = path.file_name().unwrap().to_string_lossy();
    assert!(name.starts_with("onboarding-flow-"));
    assert!(name.ends_with(".svg"));
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("</svg>"));
}

#[test]
fn test_second_export_rejected_while_first_runs() {
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let exporter = Exporter::with_rasterizer(BlockingRasterizer {
        started: std::sync::Mutex::new(started_tx),
        release: std::sync::Mutex::new(release_rx),
    });
    let snapshot = snapshot();
    let options = ExportOptions::new(ExportFormat::Png);

    std::thread::scope(|scope| {
        let first = scope.spawn(|| exporter.export(&snapshot, &options));

        started_rx.recv().unwrap();
        let second = exporter.export(&snapshot, &options);
        assert!(matches!(second, Err(ExportError::Busy)));

        release_tx.send(()).unwrap();
        assert!(first.join().unwrap().is_ok());
    });
}

/// Rasterizer that parks inside the export until released, so the test
/// can observe the in-flight guard deterministically.
struct BlockingRasterizer {
    started: std::sync::Mutex<mpsc::Sender<()>>,
    release: std::sync::Mutex<mpsc::Receiver<()>>,
}

impl Rasterize for BlockingRasterizer {
    fn rasterize(
        &self,
        _svg: &str,
        width: u32,
        height: u32,
    ) -> Result<resvg::tiny_skia::Pixmap, ExportError> {
        let _ = self.started.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv();
        resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or(ExportError::RasterSurface { width, height })
    }
}
