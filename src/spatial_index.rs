//! R-tree based spatial indexing for efficient hit testing.
//!
//! Keeps point queries and marquee-rectangle queries at O(log n) instead
//! of scanning every shape. The registry owns one of these and keeps it
//! in sync on every mutation.

use crate::geometry::Rect;
use crate::types::ShapeId;
use rstar::{AABB, RTree, RTreeObject};
use std::collections::HashMap;

/// A spatial entry representing a shape's bounding box.
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    pub shape_id: ShapeId,
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl SpatialEntry {
    pub fn new(shape_id: ShapeId, bounds: Rect) -> Self {
        Self {
            shape_id,
            min_x: bounds.x,
            min_y: bounds.y,
            max_x: bounds.max_x(),
            max_y: bounds.max_y(),
        }
    }

    #[inline]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }
}

impl PartialEq for SpatialEntry {
    fn eq(&self, other: &Self) -> bool {
        self.shape_id == other.shape_id
    }
}

/// Spatial index over shape bounding boxes.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
    entries: HashMap<ShapeId, SpatialEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, shape_id: &str, bounds: Rect) {
        if let Some(old_entry) = self.entries.remove(shape_id) {
            self.tree.remove(&old_entry);
        }

        let entry = SpatialEntry::new(shape_id.to_string(), bounds);
        self.tree.insert(entry.clone());
        self.entries.insert(shape_id.to_string(), entry);
    }

    pub fn remove(&mut self, shape_id: &str) -> bool {
        if let Some(entry) = self.entries.remove(shape_id) {
            self.tree.remove(&entry);
            true
        } else {
            false
        }
    }

    pub fn update(&mut self, shape_id: &str, bounds: Rect) {
        self.insert(shape_id, bounds);
    }

    /// All shapes whose bounds contain the given canvas point.
    pub fn query_point(&self, x: f32, y: f32) -> Vec<ShapeId> {
        let point_envelope = AABB::from_point([x, y]);

        self.tree
            .locate_in_envelope_intersecting(&point_envelope)
            .filter(|entry| entry.contains_point(x, y))
            .map(|entry| entry.shape_id.clone())
            .collect()
    }

    /// All shapes whose bounds intersect the rectangular region (inclusive).
    pub fn query_rect(&self, area: Rect) -> Vec<ShapeId> {
        let envelope = AABB::from_corners([area.x, area.y], [area.max_x(), area.max_y()]);

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.shape_id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuild the whole index from scratch (bulk load after deserialize).
    pub fn rebuild<'a, I>(&mut self, shapes: I)
    where
        I: Iterator<Item = (&'a str, Rect)>,
    {
        let entries: Vec<SpatialEntry> = shapes
            .map(|(id, bounds)| SpatialEntry::new(id.to_string(), bounds))
            .collect();

        self.entries = entries
            .iter()
            .map(|e| (e.shape_id.clone(), e.clone()))
            .collect();
        self.tree = RTree::bulk_load(entries);
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.entries.clear();
    }
}
