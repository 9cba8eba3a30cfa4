//! Wire-format tests: camelCase scene documents, atomic reload behavior.

use crate::helpers::TestSceneBuilder;
use flowcanvas::{Point, Scene, ShapeKind};
use serde_json::Value;

#[test]
fn test_document_uses_camel_case_keys() {
    let (scene, _) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Start, (0.0, 0.0))
        .build();

    let doc: Value = serde_json::from_slice(&scene.save()).unwrap();
    assert!(doc.get("components").is_some());
    assert!(doc.get("nextZIndex").is_some());
    assert!(doc.get("next_z_index").is_none());

    let shape = &doc["components"][0];
    assert!(shape.get("type").is_some(), "kind serializes as `type`");
    assert!(shape.get("zIndex").is_some());
    assert!(shape.get("connectionPoints").is_some());
    assert!(shape["style"].get("backgroundColor").is_some());
}

#[test]
fn test_connection_points_carry_side_and_kind() {
    let (scene, ids) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Start, (0.0, 0.0))
        .build();

    let shape = scene.registry.get(&ids[0]).unwrap();
    let json = serde_json::to_value(shape).unwrap();
    let points = json["connectionPoints"].as_array().unwrap();
    assert_eq!(points.len(), 4);
    for point in points {
        assert!(point.get("side").is_some());
        // Start shapes expose outputs only.
        assert_eq!(point["kind"], "output");
    }
}

#[test]
fn test_load_replaces_scene_wholesale() {
    let (source, _) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Start, (0.0, 0.0))
        .with_shape(ShapeKind::Process, (300.0, 0.0))
        .with_shape(ShapeKind::End, (600.0, 0.0))
        .build();
    let bytes = source.save();

    let (mut target, _) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Decision, (0.0, 0.0))
        .build();

    assert!(target.load(&bytes));
    assert_eq!(target.registry.len(), 3);
    assert!(target.registry.by_kind(ShapeKind::Decision).is_empty());
}

#[test]
fn test_malformed_load_preserves_current_scene() {
    let (mut scene, ids) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Start, (0.0, 0.0))
        .build();

    assert!(!scene.load(b"not json at all"));
    assert!(!scene.load(br#"{"components": "wat", "nextZIndex": 5}"#));
    assert!(!scene.load(br#"{"components": [{"id": ""}], "nextZIndex": 5}"#));

    assert!(scene.registry.contains(&ids[0]));
    assert_eq!(scene.registry.len(), 1);
}

#[test]
fn test_z_counter_survives_roundtrip() {
    let mut scene = Scene::new();
    for i in 0..5 {
        let id = scene.add_shape(ShapeKind::Process, Point::new(i as f32 * 200.0, 0.0));
        if i < 4 {
            scene.remove_shape(&id);
        }
    }
    let next_before = scene.registry.next_z_index();

    let mut reloaded = Scene::new();
    assert!(reloaded.load(&scene.save()));
    assert_eq!(reloaded.registry.next_z_index(), next_before);

    // New shapes still land on top after the reload.
    let top = reloaded.add_shape(ShapeKind::End, Point::new(0.0, 0.0));
    let max_other = reloaded
        .registry
        .all()
        .filter(|s| s.id != top)
        .map(|s| s.z_index)
        .max()
        .unwrap();
    assert!(reloaded.registry.get(&top).unwrap().z_index > max_other);
}
