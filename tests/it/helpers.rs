//! Test helpers and builders for reducing boilerplate in tests.
//!
//! This module provides:
//! - `TestSceneBuilder` - Builder pattern for creating scenes with shapes
//!   and connections
//! - Path-string parsing helpers for asserting on routed connectors

use flowcanvas::{Point, RouteStyle, Scene, ShapeId, ShapeKind, ShapeUpdate, Size};

/// Install a test subscriber once so `RUST_LOG` surfaces engine tracing
/// during test runs. Safe to call from every test.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builder for creating test scenes with shapes and links.
///
/// # Example
/// ```ignore
/// let (scene, ids) = TestSceneBuilder::new()
///     .with_shape(ShapeKind::Start, (0.0, 0.0))
///     .with_shape(ShapeKind::End, (300.0, 0.0))
///     .with_link(0, 1)
///     .build();
/// ```
pub struct TestSceneBuilder {
    shapes: Vec<(ShapeKind, Point, Option<Size>)>,
    links: Vec<(usize, usize)>,
    route_style: RouteStyle,
}

impl Default for TestSceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSceneBuilder {
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            links: Vec::new(),
            route_style: RouteStyle::default(),
        }
    }

    pub fn with_route_style(mut self, style: RouteStyle) -> Self {
        self.route_style = style;
        self
    }

    /// Add a template-sized shape at the given position.
    pub fn with_shape(mut self, kind: ShapeKind, pos: (f32, f32)) -> Self {
        self.shapes.push((kind, Point::new(pos.0, pos.1), None));
        self
    }

    /// Add a shape with an explicit size.
    pub fn with_sized_shape(mut self, kind: ShapeKind, pos: (f32, f32), size: (f32, f32)) -> Self {
        self.shapes.push((
            kind,
            Point::new(pos.0, pos.1),
            Some(Size::new(size.0, size.1)),
        ));
        self
    }

    /// Connect two shapes by their builder index.
    pub fn with_link(mut self, from: usize, to: usize) -> Self {
        self.links.push((from, to));
        self
    }

    pub fn build(self) -> (Scene, Vec<ShapeId>) {
        let mut scene = Scene::new();
        scene.route_style = self.route_style;

        let mut ids = Vec::with_capacity(self.shapes.len());
        for (kind, position, size) in self.shapes {
            let id = scene.add_shape(kind, position);
            if let Some(size) = size {
                scene.update_shape(&id, ShapeUpdate::size(size));
            }
            ids.push(id);
        }
        for (from, to) in self.links {
            scene
                .connect(&ids[from], &ids[to])
                .expect("builder link must be valid");
        }
        (scene, ids)
    }
}

pub use flowcanvas::connection::path_points;

/// First and last on-path point of a routed connector.
pub fn path_endpoints(path: &str) -> (Point, Point) {
    let points = path_points(path);
    assert!(points.len() >= 2, "path has too few points: {path}");
    (points[0], *points.last().unwrap())
}

/// Euclidean distance between the two endpoints of a path.
pub fn endpoint_distance(path: &str) -> f32 {
    let (start, end) = path_endpoints(path);
    ((end.x - start.x).powi(2) + (end.y - start.y).powi(2)).sqrt()
}
