//! End-to-end canvas workflows: selection, drag, routing, viewport.

use crate::helpers::{TestSceneBuilder, endpoint_distance, path_endpoints};
use flowcanvas::input::GestureState;
use flowcanvas::{
    DragSession, GroupResizeSession, Point, ResizeHandle, RouteStyle, SelectionManager,
    ShapeKind, ViewportController,
};

#[test]
fn test_routed_connector_clears_both_shapes() {
    let (scene, ids) = TestSceneBuilder::new()
        .with_route_style(RouteStyle::Straight)
        .with_sized_shape(ShapeKind::Process, (0.0, 0.0), (100.0, 50.0))
        .with_sized_shape(ShapeKind::Process, (300.0, 0.0), (100.0, 50.0))
        .with_link(0, 1)
        .build();

    let snapshot = scene.snapshot();
    let path = &snapshot.connections[0].path;
    assert_eq!(path, "M 106.0 25.0 L 294.0 25.0");

    // The anchors sit 200 units apart; the routed segment is 12 shorter
    // and both ends clear the shape borders by more than the 6-unit
    // endpoint offset margin.
    let length = endpoint_distance(path);
    assert!((188.0..=200.0).contains(&length), "length {length}");
    let (start, end) = path_endpoints(path);
    assert!(start.x >= 100.0 + 6.0);
    assert!(end.x <= 300.0 - 6.0);
    let _ = ids;
}

#[test]
fn test_drag_reroutes_connections_live() {
    let (mut scene, ids) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Start, (0.0, 0.0))
        .with_shape(ShapeKind::End, (300.0, 0.0))
        .with_link(0, 1)
        .build();
    let vp = ViewportController::new();
    let mut sel = SelectionManager::new();

    let before = scene.snapshot().connections[0].path.clone();

    let session = DragSession::begin(
        &scene.registry,
        &mut sel,
        &ids[1],
        Point::new(310.0, 10.0),
    )
    .unwrap();
    session.update(&mut scene.registry, &vp, Point::new(310.0, 210.0));
    for id in session.end() {
        scene
            .connections
            .reroute_for_shape(&id, &scene.registry, scene.route_style);
    }

    assert_eq!(
        scene.registry.get(&ids[1]).unwrap().position,
        Point::new(300.0, 200.0)
    );
    let after = scene.connections.iter().next().unwrap().path.clone();
    assert_ne!(before, after);
}

#[test]
fn test_marquee_then_group_drag_moves_selection_only() {
    let (mut scene, ids) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Start, (0.0, 0.0))
        .with_shape(ShapeKind::Process, (200.0, 0.0))
        .with_shape(ShapeKind::End, (800.0, 0.0))
        .build();
    let mut vp = ViewportController::new();
    vp.toggle_snap();
    let mut sel = SelectionManager::new();

    // Marquee over the first two shapes only.
    sel.start_box(Point::new(-10.0, -10.0));
    sel.update_box(Point::new(340.0, 80.0));
    sel.end_box(&scene.registry, false);
    assert_eq!(sel.len(), 2);

    let session =
        DragSession::begin(&scene.registry, &mut sel, &ids[0], Point::new(5.0, 5.0)).unwrap();
    session.update(&mut scene.registry, &vp, Point::new(55.0, 35.0));
    session.end();

    assert_eq!(
        scene.registry.get(&ids[0]).unwrap().position,
        Point::new(50.0, 30.0)
    );
    assert_eq!(
        scene.registry.get(&ids[1]).unwrap().position,
        Point::new(250.0, 30.0)
    );
    assert_eq!(
        scene.registry.get(&ids[2]).unwrap().position,
        Point::new(800.0, 0.0)
    );
}

#[test]
fn test_gesture_cancel_restores_geometry() {
    let (mut scene, ids) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Process, (0.0, 0.0))
        .with_shape(ShapeKind::Process, (200.0, 100.0))
        .build();
    let mut vp = ViewportController::new();
    vp.toggle_snap();
    let mut sel = SelectionManager::new();
    let mut gesture = GestureState::default();

    let session =
        DragSession::begin(&scene.registry, &mut sel, &ids[0], Point::ZERO).unwrap();
    gesture.replace_with_drag(&mut scene.registry, session);
    if let GestureState::Dragging(active) = &gesture {
        active.update(&mut scene.registry, &vp, Point::new(400.0, 400.0));
    }
    assert_ne!(scene.registry.get(&ids[0]).unwrap().position, Point::ZERO);

    gesture.cancel(&mut scene.registry);
    assert!(gesture.is_idle());
    assert_eq!(scene.registry.get(&ids[0]).unwrap().position, Point::ZERO);
}

#[test]
fn test_group_resize_workflow_keeps_layout_proportional() {
    let (mut scene, ids) = TestSceneBuilder::new()
        .with_sized_shape(ShapeKind::Process, (0.0, 0.0), (100.0, 60.0))
        .with_sized_shape(ShapeKind::Process, (100.0, 60.0), (100.0, 60.0))
        .build();
    let mut sel = SelectionManager::new();
    sel.select(&ids[0], true);
    sel.select(&ids[1], true);

    let session =
        GroupResizeSession::begin(&scene.registry, &sel, ResizeHandle::Se).unwrap();
    session.update(&mut scene.registry, Point::new(200.0, 120.0));
    for id in session.end() {
        scene
            .connections
            .reroute_for_shape(&id, &scene.registry, scene.route_style);
    }

    let a = scene.registry.get(&ids[0]).unwrap();
    let b = scene.registry.get(&ids[1]).unwrap();
    assert_eq!(a.size.width, 200.0);
    assert_eq!(b.position, Point::new(200.0, 120.0));
}

#[test]
fn test_fit_to_content_centers_scene() {
    let (scene, _) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Start, (0.0, 0.0))
        .with_shape(ShapeKind::End, (300.0, 0.0))
        .build();
    let mut vp = ViewportController::new().with_viewport(800.0, 600.0);
    vp.pan(Point::new(-900.0, 250.0));
    vp.set_zoom(3.0, None);

    vp.fit_to_content(scene.registry.all());

    assert_eq!(vp.transform.scale, 1.0);
    // Content box spans 0..420 x 0..60; its center maps to the middle of
    // the viewport.
    assert_eq!(
        vp.canvas_to_screen(Point::new(210.0, 30.0)),
        Point::new(400.0, 300.0)
    );
}

#[test]
fn test_duplicate_copies_geometry_but_not_links() {
    let (mut scene, ids) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Start, (0.0, 0.0))
        .with_shape(ShapeKind::Process, (300.0, 0.0))
        .with_link(0, 1)
        .build();

    let copy = scene.duplicate_shape(&ids[1]).unwrap();
    let copied = scene.registry.get(&copy).unwrap();
    assert_eq!(copied.position, Point::new(320.0, 20.0));
    assert_eq!(scene.connections.len(), 1);
    assert!(
        scene
            .connections
            .iter()
            .all(|c| c.from.shape_id != copy && c.to.shape_id != copy)
    );
}

#[test]
fn test_zoomed_drag_uses_canvas_deltas() {
    let (mut scene, ids) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Process, (100.0, 100.0))
        .build();
    let mut vp = ViewportController::new();
    vp.toggle_snap();
    vp.set_zoom(2.0, None);
    let mut sel = SelectionManager::new();

    // A 100px screen movement is 50 canvas units at 2x zoom.
    let start_screen = Point::new(400.0, 300.0);
    let end_screen = Point::new(500.0, 300.0);
    let start = vp.screen_to_canvas(start_screen);
    let end = vp.screen_to_canvas(end_screen);

    let session = DragSession::begin(&scene.registry, &mut sel, &ids[0], start).unwrap();
    session.update(&mut scene.registry, &vp, end);

    assert_eq!(
        scene.registry.get(&ids[0]).unwrap().position,
        Point::new(150.0, 100.0)
    );
}

#[test]
fn test_orthogonal_style_reroutes_everything() {
    let (mut scene, _) = TestSceneBuilder::new()
        .with_shape(ShapeKind::Start, (0.0, 0.0))
        .with_shape(ShapeKind::Process, (400.0, 200.0))
        .with_link(0, 1)
        .build();

    scene.set_route_style(RouteStyle::Orthogonal);
    let path = scene.connections.iter().next().unwrap().path.clone();
    assert_eq!(path.matches(" L ").count(), 3, "orthogonal path has a bend");
}
