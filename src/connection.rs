//! Connection engine - validates, creates and routes connectors between
//! shapes.
//!
//! Routing picks concrete anchor positions (substituting a better-facing
//! point when the stored one no longer faces the peer shape), pushes both
//! endpoints off the shape border, trims the segment so auto-routed lines
//! visually clear both shapes, and emits an SVG path string. The emitted
//! path is a cache on the connection; the endpoints stay authoritative.

use crate::constants::{CONNECTION_ENDPOINT_OFFSET, CONNECTION_TRIM, CURVE_MAX_CONTROL_OFFSET};
use crate::error::ConnectionError;
use crate::geometry::{Point, distance, point_segment_distance};
use crate::registry::ComponentRegistry;
use crate::types::{Connection, ConnectionStyle, Endpoint, Shape, new_id};
use std::collections::HashSet;
use tracing::debug;

/// How a routed connector path is shaped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RouteStyle {
    Straight,
    #[default]
    Curved,
    Orthogonal,
}

/// A resolved connection point: its id plus absolute canvas position.
#[derive(Clone, Debug, PartialEq)]
pub struct BestPoint {
    pub point_id: String,
    pub position: Point,
}

/// Check that a connection between the two points is allowed.
pub fn validate(
    from_shape: &Shape,
    from_point_id: &str,
    to_shape: &Shape,
    to_point_id: &str,
) -> Result<(), ConnectionError> {
    if from_shape.id == to_shape.id {
        return Err(ConnectionError::SelfConnection);
    }
    let from = from_shape
        .connection_point(from_point_id)
        .ok_or_else(|| ConnectionError::UnknownPoint(from_point_id.to_string()))?;
    let to = to_shape
        .connection_point(to_point_id)
        .ok_or_else(|| ConnectionError::UnknownPoint(to_point_id.to_string()))?;
    if !from.kind.accepts(to.kind) {
        return Err(ConnectionError::IncompatibleKinds {
            from: from.kind,
            to: to.kind,
        });
    }
    Ok(())
}

/// Whether a connection point geometrically faces `target`: the vector
/// toward the target has a positive component along the side's outward
/// normal (a top point faces things above the shape, and so on).
fn faces(shape: &Shape, point: &crate::types::ConnectionPoint, target: Point) -> bool {
    let pos = shape.connection_point_position(point);
    let normal = point.side.normal();
    let to_target = target - pos;
    normal.x * to_target.x + normal.y * to_target.y > 0.0
}

/// Pick the connection point best suited for reaching `target`.
///
/// Points whose side faces the target are preferred; within that set (or
/// among all points when none face it) the nearest by Euclidean distance
/// wins. Ties keep the first point in stored order, so the result is
/// stable for a fixed input order.
pub fn find_best_connection_point(shape: &Shape, target: Point) -> Option<BestPoint> {
    if shape.connection_points.is_empty() {
        return None;
    }

    let facing: Vec<&crate::types::ConnectionPoint> = shape
        .connection_points
        .iter()
        .filter(|p| faces(shape, p, target))
        .collect();

    let candidates: Vec<&crate::types::ConnectionPoint> = if facing.is_empty() {
        shape.connection_points.iter().collect()
    } else {
        facing
    };

    let mut best: Option<(&crate::types::ConnectionPoint, f32)> = None;
    for point in candidates {
        let d = distance(shape.connection_point_position(point), target);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((point, d)),
        }
    }

    best.map(|(point, _)| BestPoint {
        point_id: point.id.clone(),
        position: shape.connection_point_position(point),
    })
}

/// Create a new (unrouted) connection with a fresh id and the default
/// stroke. The path stays empty until [`route`] fills it in.
pub fn create(
    from_shape_id: &str,
    from_point_id: &str,
    to_shape_id: &str,
    to_point_id: &str,
    label: Option<String>,
) -> Connection {
    Connection {
        id: new_id(),
        from: Endpoint {
            shape_id: from_shape_id.to_string(),
            point_id: from_point_id.to_string(),
        },
        to: Endpoint {
            shape_id: to_shape_id.to_string(),
            point_id: to_point_id.to_string(),
        },
        path: String::new(),
        label,
        style: ConnectionStyle::default(),
    }
}

/// Undirected duplicate detection: `(A.p1 -> B.p2)` and `(B.p2 -> A.p1)`
/// are the same connection.
pub fn exists(
    from_shape_id: &str,
    from_point_id: &str,
    to_shape_id: &str,
    to_point_id: &str,
    connections: &[Connection],
) -> bool {
    connections.iter().any(|c| {
        let forward = c.from.shape_id == from_shape_id
            && c.from.point_id == from_point_id
            && c.to.shape_id == to_shape_id
            && c.to.point_id == to_point_id;
        let reversed = c.from.shape_id == to_shape_id
            && c.from.point_id == to_point_id
            && c.to.shape_id == from_shape_id
            && c.to.point_id == from_point_id;
        forward || reversed
    })
}

/// Resolve one endpoint to an anchor position and outward normal.
///
/// The stored point id is kept only while it still faces the peer shape's
/// center; otherwise the best-facing point substitutes for it (the stored
/// endpoint on the connection is left untouched).
fn resolve_endpoint(shape: &Shape, point_id: &str, peer_center: Point) -> Option<(Point, Point)> {
    if let Some(point) = shape.connection_point(point_id) {
        if faces(shape, point, peer_center) {
            return Some((shape.connection_point_position(point), point.side.normal()));
        }
    }
    let best = find_best_connection_point(shape, peer_center)?;
    let point = shape.connection_point(&best.point_id)?;
    Some((best.position, point.side.normal()))
}

/// Recompute a connection's cached path against the current shape
/// geometry. Returns the connection with a fresh `path`; unknown shapes
/// or shapes without anchors leave the path empty.
pub fn route(connection: &Connection, registry: &ComponentRegistry, style: RouteStyle) -> Connection {
    let mut routed = connection.clone();
    routed.path = String::new();

    let (Some(from_shape), Some(to_shape)) = (
        registry.get(&connection.from.shape_id),
        registry.get(&connection.to.shape_id),
    ) else {
        return routed;
    };

    let Some((from_pos, from_normal)) =
        resolve_endpoint(from_shape, &connection.from.point_id, to_shape.center())
    else {
        return routed;
    };
    let Some((to_pos, to_normal)) =
        resolve_endpoint(to_shape, &connection.to.point_id, from_shape.center())
    else {
        return routed;
    };

    // Push both endpoints off the shape border along their side normals.
    let mut start = from_pos + scale(from_normal, CONNECTION_ENDPOINT_OFFSET);
    let mut end = to_pos + scale(to_normal, CONNECTION_ENDPOINT_OFFSET);

    // Symmetric trim so the stroke clears both shapes: the segment ends up
    // a fixed 12 units shorter than the anchor-to-anchor distance. For
    // facing sides the normal offsets already account for all of it; any
    // remainder is split between the two ends. Segments shorter than the
    // trim budget are left alone rather than inverted.
    let len = distance(start, end);
    let already_trimmed = distance(from_pos, to_pos) - len;
    let remaining = (CONNECTION_TRIM - already_trimmed).clamp(0.0, CONNECTION_TRIM);
    if remaining > 0.0 && len > remaining {
        let dir = Point::new((end.x - start.x) / len, (end.y - start.y) / len);
        let half = remaining / 2.0;
        start = start + scale(dir, half);
        end = end + scale(dir, -half);
    }

    routed.path = build_path(start, end, style);
    routed
}

#[inline]
fn scale(p: Point, factor: f32) -> Point {
    Point::new(p.x * factor, p.y * factor)
}

/// Coordinate pairs of an `M/L/C` path string, in order. Control points
/// of curved segments are included; callers treating the result as a
/// polyline get a close-enough approximation of the curve.
pub fn path_points(path: &str) -> Vec<Point> {
    let numbers: Vec<f32> = path
        .split(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    numbers
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect()
}

fn build_path(start: Point, end: Point, style: RouteStyle) -> String {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    match style {
        RouteStyle::Straight => format!(
            "M {:.1} {:.1} L {:.1} {:.1}",
            start.x, start.y, end.x, end.y
        ),
        RouteStyle::Curved => {
            // Horizontal S-curve; the control offset collapses toward zero
            // for near-vertical connections, degrading to a straight drop.
            let control = (dx.abs() * 0.5).min(CURVE_MAX_CONTROL_OFFSET) * dx.signum();
            format!(
                "M {:.1} {:.1} C {:.1} {:.1}, {:.1} {:.1}, {:.1} {:.1}",
                start.x,
                start.y,
                start.x + control,
                start.y,
                end.x - control,
                end.y,
                end.x,
                end.y
            )
        }
        RouteStyle::Orthogonal => {
            // Bend at the midpoint of whichever axis has the larger delta.
            if dx.abs() >= dy.abs() {
                let mid_x = start.x + dx / 2.0;
                format!(
                    "M {:.1} {:.1} L {:.1} {:.1} L {:.1} {:.1} L {:.1} {:.1}",
                    start.x, start.y, mid_x, start.y, mid_x, end.y, end.x, end.y
                )
            } else {
                let mid_y = start.y + dy / 2.0;
                format!(
                    "M {:.1} {:.1} L {:.1} {:.1} L {:.1} {:.1} L {:.1} {:.1}",
                    start.x, start.y, start.x, mid_y, end.x, mid_y, end.x, end.y
                )
            }
        }
    }
}

/// Owns the connection list plus connection-level selection state.
///
/// Selection and editing of connections mirrors shape selection but never
/// mutates shape geometry.
#[derive(Default)]
pub struct ConnectionSet {
    connections: Vec<Connection>,
    selected: HashSet<String>,
    hovered: Option<String>,
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// Validate, reject duplicates, then create and store a connection.
    /// Returns the new connection's id.
    pub fn add(
        &mut self,
        registry: &ComponentRegistry,
        from_shape_id: &str,
        from_point_id: &str,
        to_shape_id: &str,
        to_point_id: &str,
        label: Option<String>,
    ) -> Result<String, ConnectionError> {
        let from_shape = registry
            .get(from_shape_id)
            .ok_or_else(|| ConnectionError::UnknownShape(from_shape_id.to_string()))?;
        let to_shape = registry
            .get(to_shape_id)
            .ok_or_else(|| ConnectionError::UnknownShape(to_shape_id.to_string()))?;

        validate(from_shape, from_point_id, to_shape, to_point_id)?;

        if exists(
            from_shape_id,
            from_point_id,
            to_shape_id,
            to_point_id,
            &self.connections,
        ) {
            return Err(ConnectionError::Duplicate);
        }

        let connection = create(from_shape_id, from_point_id, to_shape_id, to_point_id, label);
        let id = connection.id.clone();
        debug!(connection = %id, from = %from_shape_id, to = %to_shape_id, "connection created");
        self.connections.push(connection);
        Ok(id)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != id);
        self.selected.remove(id);
        if self.hovered.as_deref() == Some(id) {
            self.hovered = None;
        }
        self.connections.len() != before
    }

    /// Drop every connection attached to a deleted shape.
    pub fn remove_for_shape(&mut self, shape_id: &str) -> usize {
        let before = self.connections.len();
        let dropped: Vec<String> = self
            .connections
            .iter()
            .filter(|c| c.from.shape_id == shape_id || c.to.shape_id == shape_id)
            .map(|c| c.id.clone())
            .collect();
        for id in &dropped {
            self.selected.remove(id);
        }
        self.connections
            .retain(|c| c.from.shape_id != shape_id && c.to.shape_id != shape_id);
        before - self.connections.len()
    }

    pub fn set_label(&mut self, id: &str, label: Option<String>) -> bool {
        match self.connections.iter_mut().find(|c| c.id == id) {
            Some(c) => {
                c.label = label;
                true
            }
            None => false,
        }
    }

    pub fn set_style(&mut self, id: &str, style: ConnectionStyle) -> bool {
        match self.connections.iter_mut().find(|c| c.id == id) {
            Some(c) => {
                c.style = style;
                true
            }
            None => false,
        }
    }

    /// Recompute cached paths for every connection touching `shape_id`
    /// (called after that shape moved or resized).
    pub fn reroute_for_shape(
        &mut self,
        shape_id: &str,
        registry: &ComponentRegistry,
        style: RouteStyle,
    ) {
        for i in 0..self.connections.len() {
            if self.connections[i].from.shape_id == shape_id
                || self.connections[i].to.shape_id == shape_id
            {
                self.connections[i] = route(&self.connections[i], registry, style);
            }
        }
    }

    /// Recompute every cached path (after deserialize or bulk mutation).
    pub fn route_all(&mut self, registry: &ComponentRegistry, style: RouteStyle) {
        for i in 0..self.connections.len() {
            self.connections[i] = route(&self.connections[i], registry, style);
        }
    }

    /// Last-drawn connection whose cached path passes within `tolerance`
    /// of `p` (canvas coordinates). The path's control points stand in
    /// for the curve itself, which is close enough for a click target.
    pub fn at_point(&self, p: Point, tolerance: f32) -> Option<&Connection> {
        self.connections.iter().rev().find(|c| {
            let points = path_points(&c.path);
            points
                .windows(2)
                .any(|seg| point_segment_distance(p, seg[0], seg[1]) <= tolerance)
        })
    }

    // ------------------------------------------------------------------
    // Selection - mirrors shape selection semantics
    // ------------------------------------------------------------------

    pub fn select(&mut self, id: &str, multi: bool) {
        if multi {
            if !self.selected.remove(id) {
                self.selected.insert(id.to_string());
            }
        } else {
            self.selected.clear();
            self.selected.insert(id.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self) -> &HashSet<String> {
        &self.selected
    }

    pub fn set_hover(&mut self, id: Option<&str>) {
        self.hovered = id.map(|s| s.to_string());
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }
}
