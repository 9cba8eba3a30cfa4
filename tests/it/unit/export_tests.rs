//! SVG export document tests (no rasterization).

use crate::helpers::TestSceneBuilder;
use flowcanvas::export::SvgSnapshot;
use flowcanvas::export::compute_bounds;
use flowcanvas::{ExportFormat, ExportOptions, ShapeKind, ShapeUpdate};

fn svg_for(options: &ExportOptions) -> String {
    let (scene, _) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Start, (0.0, 0.0))
        .with_shape(ShapeKind::Process, (300.0, 0.0))
        .with_link(0, 1)
        .build();
    let snapshot = scene.snapshot();
    let bounds = compute_bounds(&snapshot);
    SvgSnapshot::prepare(&snapshot, bounds, options).document
}

#[test]
fn test_document_dimensions_come_from_padded_bounds() {
    let doc = svg_for(&ExportOptions::new(ExportFormat::Svg));
    // Content spans 0..420 x 0..60, plus 50 units of padding per side.
    assert!(doc.contains("width=\"520\" height=\"160\""));
    assert!(doc.contains("viewBox=\"0 0 520 160\""));
}

#[test]
fn test_grid_only_rendered_when_requested() {
    let without = svg_for(&ExportOptions::new(ExportFormat::Svg));
    assert!(!without.contains("<line"));

    let mut options = ExportOptions::new(ExportFormat::Svg);
    options.include_grid = true;
    let with = svg_for(&options);
    assert!(with.contains("<line"));
}

#[test]
fn test_hidden_shape_not_rendered() {
    let (mut scene, ids) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Start, (0.0, 0.0))
        .with_shape(ShapeKind::Process, (300.0, 0.0))
        .build();
    scene.update_shape(
        &ids[1],
        ShapeUpdate {
            text: Some("classified".into()),
            visible: Some(false),
            ..Default::default()
        },
    );

    let snapshot = scene.snapshot();
    let bounds = compute_bounds(&snapshot);
    let doc = SvgSnapshot::prepare(&snapshot, bounds, &ExportOptions::new(ExportFormat::Svg))
        .document;
    assert!(!doc.contains("classified"));
}

#[test]
fn test_text_is_xml_escaped() {
    let (mut scene, ids) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Process, (0.0, 0.0))
        .build();
    scene.update_shape(
        &ids[0],
        ShapeUpdate {
            text: Some("a < b & \"c\"".into()),
            ..Default::default()
        },
    );

    let snapshot = scene.snapshot();
    let bounds = compute_bounds(&snapshot);
    let doc = SvgSnapshot::prepare(&snapshot, bounds, &ExportOptions::new(ExportFormat::Svg))
        .document;
    assert!(doc.contains("a &lt; b &amp; &quot;c&quot;"));
    assert!(!doc.contains("a < b &"));
}

#[test]
fn test_connection_label_rendered() {
    let (mut scene, ids) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Decision, (0.0, 0.0))
        .with_shape(ShapeKind::Process, (300.0, 0.0))
        .build();
    scene
        .connect_with_label(&ids[0], &ids[1], Some("approved".into()))
        .unwrap();

    let snapshot = scene.snapshot();
    let bounds = compute_bounds(&snapshot);
    let doc = SvgSnapshot::prepare(&snapshot, bounds, &ExportOptions::new(ExportFormat::Svg))
        .document;
    assert!(doc.contains("approved"));
}

#[test]
fn test_decision_renders_as_polygon() {
    let (scene, _) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Decision, (0.0, 0.0))
        .build();
    let snapshot = scene.snapshot();
    let bounds = compute_bounds(&snapshot);
    let doc = SvgSnapshot::prepare(&snapshot, bounds, &ExportOptions::new(ExportFormat::Svg))
        .document;
    assert!(doc.contains("<polygon"));
}
