//! Property tests for the geometric core.

use flowcanvas::geometry::{Rect, snap_to_grid};
use flowcanvas::{Point, ViewportController};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_screen_canvas_roundtrip(
        pan_x in -1000.0f32..1000.0,
        pan_y in -1000.0f32..1000.0,
        scale in 0.1f32..5.0,
        px in -2000.0f32..2000.0,
        py in -2000.0f32..2000.0,
    ) {
        let mut vp = ViewportController::new();
        vp.pan(Point::new(pan_x, pan_y));
        vp.set_zoom(scale, None);

        let p = Point::new(px, py);
        let back = vp.canvas_to_screen(vp.screen_to_canvas(p));
        prop_assert!((back.x - p.x).abs() < 0.1);
        prop_assert!((back.y - p.y).abs() < 0.1);
    }

    #[test]
    fn prop_snap_is_idempotent(
        x in -10_000.0f32..10_000.0,
        y in -10_000.0f32..10_000.0,
        grid in 5.0f32..100.0,
    ) {
        let snapped = snap_to_grid(Point::new(x, y), grid);
        let twice = snap_to_grid(snapped, grid);
        prop_assert_eq!(snapped, twice);
    }

    #[test]
    fn prop_zoom_always_within_range(factor in 0.0001f32..1000.0) {
        let mut vp = ViewportController::new();
        vp.zoom_by(factor, Some(Point::new(400.0, 300.0)));
        let (min, max) = vp.zoom_range();
        prop_assert!(vp.transform.scale >= min);
        prop_assert!(vp.transform.scale <= max);
    }

    #[test]
    fn prop_rect_from_corners_contains_both(
        ax in -1000.0f32..1000.0,
        ay in -1000.0f32..1000.0,
        bx in -1000.0f32..1000.0,
        by in -1000.0f32..1000.0,
    ) {
        let a = Point::new(ax, ay);
        let b = Point::new(bx, by);
        let rect = Rect::from_corners(a, b);
        prop_assert!(rect.width >= 0.0 && rect.height >= 0.0);
        prop_assert!(rect.contains(a));
        prop_assert!(rect.contains(b));
    }
}
