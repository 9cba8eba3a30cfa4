//! Scene facade - ties the shape registry and the connection set
//! together, and produces the frozen snapshots the export pipeline
//! consumes.

use crate::connection::{ConnectionSet, RouteStyle, find_best_connection_point, route};
use crate::error::ConnectionError;
use crate::geometry::Point;
use crate::registry::ComponentRegistry;
use crate::types::{Connection, Shape, ShapeId, ShapeKind, ShapeUpdate};
use crate::viewport::GridSettings;
use serde::Deserialize;
use tracing::warn;

/// A shape handed in by an upstream producer. Everything except the kind
/// is optional; missing positions get an automatic grid placement.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeInput {
    pub kind: ShapeKind,
    #[serde(default)]
    pub id: Option<ShapeId>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub position: Option<Point>,
}

/// A link handed in alongside ingested shapes. Links are only created
/// when listed explicitly; nothing is inferred from shape order.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkInput {
    pub from: ShapeId,
    pub to: ShapeId,
    #[serde(default)]
    pub label: Option<String>,
}

/// Immutable copy of everything an export renders. Taking the snapshot
/// routes every connection against the shape geometry at that instant.
#[derive(Clone)]
pub struct SceneSnapshot {
    pub shapes: Vec<Shape>,
    pub connections: Vec<Connection>,
    pub grid: GridSettings,
}

/// The live diagram: shapes, connections and the active routing style.
#[derive(Default)]
pub struct Scene {
    pub registry: ComponentRegistry,
    pub connections: ConnectionSet,
    pub route_style: RouteStyle,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Shapes
    // ------------------------------------------------------------------

    pub fn add_shape(&mut self, kind: ShapeKind, position: Point) -> ShapeId {
        self.registry.add_from_template(kind, position)
    }

    /// Remove a shape and every connection attached to it.
    pub fn remove_shape(&mut self, id: &str) -> bool {
        let removed = self.registry.remove(id);
        if removed {
            self.connections.remove_for_shape(id);
        }
        removed
    }

    /// Apply a partial update and reroute the shape's connections when
    /// its geometry changed.
    pub fn update_shape(&mut self, id: &str, update: ShapeUpdate) -> bool {
        let geometry_changed = update.position.is_some() || update.size.is_some();
        let updated = self.registry.update(id, update);
        if updated && geometry_changed {
            self.connections
                .reroute_for_shape(id, &self.registry, self.route_style);
        }
        updated
    }

    /// Duplicate a shape; the copy has no connections.
    pub fn duplicate_shape(&mut self, id: &str) -> Option<ShapeId> {
        self.registry.duplicate(id)
    }

    // ------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------

    /// Connect two shapes, picking the best-facing anchor on each side.
    pub fn connect(&mut self, from: &str, to: &str) -> Result<String, ConnectionError> {
        self.connect_with_label(from, to, None)
    }

    pub fn connect_with_label(
        &mut self,
        from: &str,
        to: &str,
        label: Option<String>,
    ) -> Result<String, ConnectionError> {
        let from_shape = self
            .registry
            .get(from)
            .ok_or_else(|| ConnectionError::UnknownShape(from.to_string()))?;
        let to_shape = self
            .registry
            .get(to)
            .ok_or_else(|| ConnectionError::UnknownShape(to.to_string()))?;

        let from_point = find_best_connection_point(from_shape, to_shape.center())
            .ok_or_else(|| ConnectionError::UnknownPoint(from.to_string()))?;
        let to_point = find_best_connection_point(to_shape, from_shape.center())
            .ok_or_else(|| ConnectionError::UnknownPoint(to.to_string()))?;

        self.connect_points(from, &from_point.point_id, to, &to_point.point_id, label)
    }

    /// Connect two explicit anchor points.
    pub fn connect_points(
        &mut self,
        from_shape: &str,
        from_point: &str,
        to_shape: &str,
        to_point: &str,
        label: Option<String>,
    ) -> Result<String, ConnectionError> {
        let id = self
            .connections
            .add(&self.registry, from_shape, from_point, to_shape, to_point, label)?;
        self.connections
            .reroute_for_shape(from_shape, &self.registry, self.route_style);
        Ok(id)
    }

    pub fn disconnect(&mut self, connection_id: &str) -> bool {
        self.connections.remove(connection_id)
    }

    pub fn set_route_style(&mut self, style: RouteStyle) {
        self.route_style = style;
        self.connections.route_all(&self.registry, style);
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Build a scene from upstream-produced shapes and links. Shapes
    /// without a position land on a coarse placement grid in input order.
    /// Links that fail validation are skipped with a warning rather than
    /// aborting the whole ingest.
    pub fn ingest(&mut self, shapes: Vec<ShapeInput>, links: Vec<LinkInput>) -> Vec<ShapeId> {
        let mut ids = Vec::with_capacity(shapes.len());
        for (i, input) in shapes.into_iter().enumerate() {
            let position = input.position.unwrap_or_else(|| auto_position(i));
            let mut shape = Shape::from_template(input.kind, position);
            if let Some(id) = input.id {
                shape.id = id;
            }
            if let Some(text) = input.text {
                shape.text = text;
            }
            ids.push(self.registry.add(shape));
        }

        for link in links {
            if let Err(err) = self.connect_with_label(&link.from, &link.to, link.label) {
                warn!(from = %link.from, to = %link.to, %err, "skipping invalid link");
            }
        }
        ids
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    pub fn save(&self) -> Vec<u8> {
        self.registry.serialize()
    }

    /// Load serialized shapes. Connections referencing shapes that no
    /// longer exist are dropped; the rest are rerouted against the new
    /// geometry. Malformed input leaves the scene untouched.
    pub fn load(&mut self, bytes: &[u8]) -> bool {
        if !self.registry.deserialize(bytes) {
            return false;
        }
        let dangling: Vec<String> = self
            .connections
            .iter()
            .filter(|c| {
                !self.registry.contains(&c.from.shape_id) || !self.registry.contains(&c.to.shape_id)
            })
            .map(|c| c.id.clone())
            .collect();
        for id in dangling {
            self.connections.remove(&id);
        }
        self.connections.route_all(&self.registry, self.route_style);
        true
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> SceneSnapshot {
        self.snapshot_with_grid(GridSettings::default())
    }

    /// Freeze the scene for export: shapes in paint order, connections
    /// routed against current geometry, and the grid settings to honor
    /// when the export opts into grid rendering.
    pub fn snapshot_with_grid(&self, grid: GridSettings) -> SceneSnapshot {
        SceneSnapshot {
            shapes: self.registry.in_paint_order().into_iter().cloned().collect(),
            connections: self
                .connections
                .iter()
                .map(|c| route(c, &self.registry, self.route_style))
                .collect(),
            grid,
        }
    }
}

fn auto_position(index: usize) -> Point {
    let col = (index % 4) as f32;
    let row = (index / 4) as f32;
    Point::new(60.0 + col * 200.0, 60.0 + row * 140.0)
}
