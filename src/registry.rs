//! Component registry - single owner of the mutable shape collection.
//!
//! All mutation flows through the registry so z-order, the spatial index
//! and the serialized form can never drift apart. Other components hold
//! shape ids and re-query; they never cache `Shape` values.

use crate::constants::MIN_SHAPE_SIZE;
use crate::error::SceneError;
use crate::geometry::{Point, Rect};
use crate::spatial_index::SpatialIndex;
use crate::types::{Shape, ShapeId, ShapeKind, ShapeUpdate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Wire form of a serialized scene: `{components: [...], nextZIndex}`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneDocument {
    components: Vec<Shape>,
    next_z_index: i64,
}

/// Owns every shape in the scene plus the monotonically increasing
/// z-index counter.
pub struct ComponentRegistry {
    shapes: std::collections::HashMap<ShapeId, Shape>,
    index: SpatialIndex,
    next_z: i64,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            shapes: std::collections::HashMap::new(),
            index: SpatialIndex::new(),
            next_z: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Current value of the z counter. Assigned-and-incremented by `add`
    /// and `bring_to_front`; never decremented.
    pub fn next_z_index(&self) -> i64 {
        self.next_z
    }

    /// Add a shape, assigning it the next z-index. Returns the shape's id.
    pub fn add(&mut self, mut shape: Shape) -> ShapeId {
        shape.z_index = self.next_z;
        self.next_z += 1;
        let id = shape.id.clone();
        self.index.insert(&id, shape.bounds());
        debug!(shape = %id, kind = ?shape.kind, "registry add");
        self.shapes.insert(id.clone(), shape);
        id
    }

    /// Create a shape from the built-in template for `kind` and add it.
    pub fn add_from_template(&mut self, kind: ShapeKind, position: Point) -> ShapeId {
        self.add(Shape::from_template(kind, position))
    }

    /// Insert a shape keeping its persisted z-index (scene ingestion).
    /// The z counter is bumped past it so later adds still land on top.
    pub fn insert_preserving_z(&mut self, shape: Shape) -> ShapeId {
        self.next_z = self.next_z.max(shape.z_index + 1);
        let id = shape.id.clone();
        self.index.insert(&id, shape.bounds());
        self.shapes.insert(id.clone(), shape);
        id
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.shapes.remove(id).is_some();
        if removed {
            self.index.remove(id);
            debug!(shape = %id, "registry remove");
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<&Shape> {
        self.shapes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.shapes.contains_key(id)
    }

    pub fn all(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }

    /// Shapes ordered back-to-front for painting.
    pub fn in_paint_order(&self) -> Vec<&Shape> {
        let mut shapes: Vec<&Shape> = self.shapes.values().collect();
        shapes.sort_by_key(|s| s.z_index);
        shapes
    }

    /// Apply a partial update. Size updates are clamped to the minimum
    /// shape size so the `size > 0` invariant holds. Returns false when
    /// the shape does not exist.
    pub fn update(&mut self, id: &str, update: ShapeUpdate) -> bool {
        let Some(shape) = self.shapes.get_mut(id) else {
            return false;
        };

        let mut bounds_changed = false;
        if let Some(position) = update.position {
            shape.position = position;
            bounds_changed = true;
        }
        if let Some(size) = update.size {
            shape.size.width = size.width.max(MIN_SHAPE_SIZE.0);
            shape.size.height = size.height.max(MIN_SHAPE_SIZE.1);
            bounds_changed = true;
        }
        if let Some(text) = update.text {
            shape.text = text;
        }
        if let Some(style) = update.style {
            shape.style = style;
        }
        if let Some(locked) = update.locked {
            shape.locked = Some(locked);
        }
        if let Some(visible) = update.visible {
            shape.visible = Some(visible);
        }
        if let Some(metadata) = update.metadata {
            shape.metadata = Some(metadata);
        }

        if bounds_changed {
            let bounds = shape.bounds();
            self.index.update(id, bounds);
        }
        true
    }

    /// Duplicate a shape (fresh ids, slight offset, placed on top).
    /// Returns the new shape's id, or `None` if the source is unknown.
    pub fn duplicate(&mut self, id: &str) -> Option<ShapeId> {
        let copy = self.shapes.get(id)?.duplicate();
        Some(self.add(copy))
    }

    pub fn by_kind(&self, kind: ShapeKind) -> Vec<&Shape> {
        self.shapes.values().filter(|s| s.kind == kind).collect()
    }

    /// All shapes whose bounds overlap the rectangle spanned by the two
    /// corners (inclusive).
    pub fn in_area(&self, top_left: Point, bottom_right: Point) -> Vec<&Shape> {
        let area = Rect::from_corners(top_left, bottom_right);
        self.index
            .query_rect(area)
            .into_iter()
            .filter_map(|id| self.shapes.get(&id))
            .collect()
    }

    /// Topmost visible shape containing the point, by z-index.
    pub fn at_point(&self, p: Point) -> Option<&Shape> {
        self.index
            .query_point(p.x, p.y)
            .into_iter()
            .filter_map(|id| self.shapes.get(&id))
            .filter(|s| s.is_visible() && s.contains(p))
            .max_by_key(|s| s.z_index)
    }

    pub fn bring_to_front(&mut self, id: &str) -> bool {
        let Some(shape) = self.shapes.get_mut(id) else {
            return false;
        };
        shape.z_index = self.next_z;
        self.next_z += 1;
        true
    }

    pub fn send_to_back(&mut self, id: &str) -> bool {
        if !self.shapes.contains_key(id) {
            return false;
        }
        let min_z = self.shapes.values().map(|s| s.z_index).min().unwrap_or(0);
        if let Some(shape) = self.shapes.get_mut(id) {
            shape.z_index = min_z - 1;
        }
        true
    }

    /// Serialize the whole collection to the wire format.
    pub fn serialize(&self) -> Vec<u8> {
        let doc = SceneDocument {
            components: self.in_paint_order().into_iter().cloned().collect(),
            next_z_index: self.next_z,
        };
        // The document is plain data; encoding it cannot fail.
        serde_json::to_vec(&doc).unwrap_or_default()
    }

    /// Replace the entire collection from serialized bytes, atomically.
    /// Malformed input leaves the prior state untouched and returns false.
    pub fn deserialize(&mut self, bytes: &[u8]) -> bool {
        match self.parse_document(bytes) {
            Ok(doc) => {
                self.shapes = doc
                    .components
                    .into_iter()
                    .map(|s| (s.id.clone(), s))
                    .collect();
                self.next_z = doc.next_z_index;
                self.index
                    .rebuild(self.shapes.values().map(|s| (s.id.as_str(), s.bounds())));
                debug!(shapes = self.shapes.len(), "scene loaded");
                true
            }
            Err(err) => {
                warn!(%err, "rejected malformed scene payload");
                false
            }
        }
    }

    fn parse_document(&self, bytes: &[u8]) -> Result<SceneDocument, SceneError> {
        let doc: SceneDocument = serde_json::from_slice(bytes)?;
        for shape in &doc.components {
            if shape.id.is_empty() {
                return Err(SceneError::Invalid("shape with empty id".into()));
            }
            if shape.size.width <= 0.0 || shape.size.height <= 0.0 {
                return Err(SceneError::Invalid(format!(
                    "shape {} has non-positive size",
                    shape.id
                )));
            }
            if !shape.position.is_finite() {
                return Err(SceneError::Invalid(format!(
                    "shape {} has a non-finite position",
                    shape.id
                )));
            }
        }
        Ok(doc)
    }
}
