//! Core types for the flowcanvas scene model.
//!
//! This module defines the fundamental data structures used throughout the
//! engine: shapes, their connection points, connections, and the template
//! factory that stamps out new shapes with a standard anchor layout.
//!
//! All wire names are camelCase so serialized scenes match the external
//! `{components: [...], nextZIndex}` format consumed by host applications.

use crate::constants::{
    DEFAULT_BORDER_WIDTH, DEFAULT_CONNECTION_STROKE, DEFAULT_CONNECTION_STROKE_WIDTH,
    DEFAULT_SHAPE_SIZE, DEFAULT_SHAPE_TEXT_COLOR, DUPLICATE_OFFSET,
};
use crate::geometry::{Point, Rect};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Shapes and connections are identified by opaque string ids. Upstream
/// collaborators may supply their own ids; engine-created objects use UUIDs.
pub type ShapeId = String;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// The diagram role of a shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Start,
    Process,
    Decision,
    End,
    /// A standalone connector marker (junction dot placed by the user).
    Connector,
}

impl ShapeKind {
    pub fn all() -> &'static [ShapeKind] {
        &[
            ShapeKind::Start,
            ShapeKind::Process,
            ShapeKind::Decision,
            ShapeKind::End,
            ShapeKind::Connector,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Start => "Start",
            ShapeKind::Process => "Process",
            ShapeKind::Decision => "Decision",
            ShapeKind::End => "End",
            ShapeKind::Connector => "Connector",
        }
    }
}

/// Which border of a shape a connection point sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Outward unit normal of this side.
    #[inline]
    pub fn normal(&self) -> Point {
        match self {
            Side::Top => Point::new(0.0, -1.0),
            Side::Right => Point::new(1.0, 0.0),
            Side::Bottom => Point::new(0.0, 1.0),
            Side::Left => Point::new(-1.0, 0.0),
        }
    }
}

/// Directionality of a connection point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Input,
    Output,
    #[default]
    Both,
}

impl PointKind {
    /// Whether a connection may run from a point of kind `self` to a point
    /// of kind `other`. `Both` is compatible with everything.
    pub fn accepts(&self, other: PointKind) -> bool {
        match (self, other) {
            (PointKind::Both, _) | (_, PointKind::Both) => true,
            (PointKind::Output, PointKind::Input) => true,
            (PointKind::Input, PointKind::Output) => true,
            _ => false,
        }
    }
}

/// A named anchor on a shape's border where connections attach.
///
/// Lifetime is tied to the owning shape; duplicating a shape regenerates
/// every point id so ids are never reused across shapes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionPoint {
    pub id: String,
    pub side: Side,
    /// Fractional position along the side, in `[0, 1]`.
    pub offset: f32,
    #[serde(default)]
    pub kind: PointKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ConnectionPoint {
    pub fn new(side: Side, offset: f32, kind: PointKind) -> Self {
        Self {
            id: new_id(),
            side,
            offset: offset.clamp(0.0, 1.0),
            kind,
            label: None,
        }
    }
}

/// Width/height pair for a shape.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Visual styling of a shape, resolved to explicit values at export time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    pub background_color: String,
    pub border_color: String,
    pub text_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            background_color: crate::constants::DEFAULT_SHAPE_FILL.to_string(),
            border_color: crate::constants::DEFAULT_SHAPE_BORDER.to_string(),
            text_color: DEFAULT_SHAPE_TEXT_COLOR.to_string(),
            border_width: Some(DEFAULT_BORDER_WIDTH),
            border_radius: None,
            opacity: None,
        }
    }
}

/// A positioned, typed, styled diagram element.
///
/// Shapes are owned exclusively by the [`ComponentRegistry`]; all other
/// components hold ids and re-query rather than caching references.
///
/// [`ComponentRegistry`]: crate::registry::ComponentRegistry
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: ShapeId,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    /// Top-left corner in canvas coordinates.
    pub position: Point,
    pub size: Size,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub style: ShapeStyle,
    #[serde(default)]
    pub connection_points: Vec<ConnectionPoint>,
    #[serde(default)]
    pub z_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

/// Per-kind template defaults used by the factory.
struct ShapeTemplate {
    text: &'static str,
    fill: &'static str,
    border: &'static str,
    point_kind: PointKind,
    border_radius: Option<f32>,
}

static SHAPE_TEMPLATES: Lazy<HashMap<ShapeKind, ShapeTemplate>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(
        ShapeKind::Start,
        ShapeTemplate {
            text: "Start",
            fill: "#dcfce7",
            border: "#16a34a",
            point_kind: PointKind::Output,
            border_radius: Some(30.0),
        },
    );
    m.insert(
        ShapeKind::Process,
        ShapeTemplate {
            text: "Process",
            fill: "#dbeafe",
            border: "#2563eb",
            point_kind: PointKind::Both,
            border_radius: Some(4.0),
        },
    );
    m.insert(
        ShapeKind::Decision,
        ShapeTemplate {
            text: "Decision",
            fill: "#fef3c7",
            border: "#d97706",
            point_kind: PointKind::Both,
            border_radius: None,
        },
    );
    m.insert(
        ShapeKind::End,
        ShapeTemplate {
            text: "End",
            fill: "#fee2e2",
            border: "#dc2626",
            point_kind: PointKind::Input,
            border_radius: Some(30.0),
        },
    );
    m.insert(
        ShapeKind::Connector,
        ShapeTemplate {
            text: "",
            fill: "#e5e7eb",
            border: "#6b7280",
            point_kind: PointKind::Both,
            border_radius: Some(30.0),
        },
    );
    m
});

impl Shape {
    /// Stamp out a new shape of `kind` at `position` with the standard
    /// four-anchor layout (midpoint of each side) and the kind's default
    /// palette.
    pub fn from_template(kind: ShapeKind, position: Point) -> Self {
        let tpl = &SHAPE_TEMPLATES[&kind];
        let (width, height) = DEFAULT_SHAPE_SIZE;
        Self {
            id: new_id(),
            kind,
            position,
            size: Size::new(width, height),
            text: tpl.text.to_string(),
            style: ShapeStyle {
                background_color: tpl.fill.to_string(),
                border_color: tpl.border.to_string(),
                border_radius: tpl.border_radius,
                ..ShapeStyle::default()
            },
            connection_points: vec![
                ConnectionPoint::new(Side::Top, 0.5, tpl.point_kind),
                ConnectionPoint::new(Side::Right, 0.5, tpl.point_kind),
                ConnectionPoint::new(Side::Bottom, 0.5, tpl.point_kind),
                ConnectionPoint::new(Side::Left, 0.5, tpl.point_kind),
            ],
            z_index: 0,
            locked: None,
            visible: None,
            metadata: None,
        }
    }

    /// Clone this shape with a fresh id and regenerated connection-point
    /// ids, offset slightly so the copy does not cover the original.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = new_id();
        copy.position = copy.position.offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
        for point in &mut copy.connection_points {
            point.id = new_id();
        }
        copy
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.size.width,
            self.size.height,
        )
    }

    #[inline]
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.bounds().contains(p)
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.unwrap_or(false)
    }

    pub fn connection_point(&self, point_id: &str) -> Option<&ConnectionPoint> {
        self.connection_points.iter().find(|p| p.id == point_id)
    }

    /// Absolute canvas position of a connection point on this shape's border.
    pub fn connection_point_position(&self, point: &ConnectionPoint) -> Point {
        let b = self.bounds();
        match point.side {
            Side::Top => Point::new(b.x + b.width * point.offset, b.y),
            Side::Right => Point::new(b.max_x(), b.y + b.height * point.offset),
            Side::Bottom => Point::new(b.x + b.width * point.offset, b.max_y()),
            Side::Left => Point::new(b.x, b.y + b.height * point.offset),
        }
    }
}

/// Partial shape update applied through [`ComponentRegistry::update`].
///
/// [`ComponentRegistry::update`]: crate::registry::ComponentRegistry::update
#[derive(Clone, Debug, Default)]
pub struct ShapeUpdate {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub text: Option<String>,
    pub style: Option<ShapeStyle>,
    pub locked: Option<bool>,
    pub visible: Option<bool>,
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl ShapeUpdate {
    pub fn position(p: Point) -> Self {
        Self {
            position: Some(p),
            ..Default::default()
        }
    }

    pub fn size(s: Size) -> Self {
        Self {
            size: Some(s),
            ..Default::default()
        }
    }
}

/// One end of a connection: a shape and one of its connection points.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub shape_id: ShapeId,
    pub point_id: String,
}

/// Stroke styling for a connection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStyle {
    pub stroke: String,
    pub stroke_width: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

impl Default for ConnectionStyle {
    fn default() -> Self {
        Self {
            stroke: DEFAULT_CONNECTION_STROKE.to_string(),
            stroke_width: DEFAULT_CONNECTION_STROKE_WIDTH,
            dash: None,
        }
    }
}

/// A directed logical link between two shapes' connection points.
///
/// `path` is a cache of the routed SVG path, recomputed whenever either
/// endpoint shape moves or resizes; it is never the source of truth.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub from: Endpoint,
    pub to: Endpoint,
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub style: ConnectionStyle,
}
