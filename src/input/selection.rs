//! Shape selection - single, multi and marquee (box) selection.

use crate::geometry::{Point, Rect};
use crate::registry::ComponentRegistry;
use crate::types::ShapeId;
use std::collections::HashSet;

/// An in-progress marquee rectangle, in canvas coordinates.
#[derive(Clone, Copy, Debug)]
pub struct Marquee {
    pub start: Point,
    pub current: Point,
}

impl Marquee {
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.start, self.current)
    }
}

/// Owns the set of selected shape ids and the active marquee, if any.
#[derive(Default)]
pub struct SelectionManager {
    selected: HashSet<ShapeId>,
    marquee: Option<Marquee>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle membership under multi-select, otherwise replace the
    /// selection with just this shape.
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

    pub fn select_all(&mut self, registry: &ComponentRegistry) {
        self.selected = registry.all().map(|s| s.id.clone()).collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn ids(&self) -> &HashSet<ShapeId> {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Replace the selection wholesale (drag-start narrowing).
    pub fn set_only(&mut self, id: &str) {
        self.selected.clear();
        self.selected.insert(id.to_string());
    }

    // ------------------------------------------------------------------
    // Marquee
    // ------------------------------------------------------------------

    /// Begin a marquee at `start`. An uncommitted marquee is discarded.
    pub fn start_box(&mut self, start: Point) {
        self.marquee = Some(Marquee {
            start,
            current: start,
        });
    }

    pub fn update_box(&mut self, current: Point) {
        if let Some(marquee) = &mut self.marquee {
            marquee.current = current;
        }
    }

    /// Active marquee rectangle for overlay rendering.
    pub fn box_rect(&self) -> Option<Rect> {
        self.marquee.map(|m| m.rect())
    }

    /// Finish the marquee: select every shape whose rectangle overlaps it
    /// (overlap, not containment). Under multi-select the result is
    /// unioned with the current selection, else it replaces it.
    pub fn end_box(&mut self, registry: &ComponentRegistry, multi: bool) {
        let Some(marquee) = self.marquee.take() else {
            return;
        };
        let rect = marquee.rect();
        let hits: HashSet<ShapeId> = registry
            .in_area(rect.origin(), Point::new(rect.max_x(), rect.max_y()))
            .into_iter()
            .filter(|s| s.is_visible())
            .map(|s| s.id.clone())
            .collect();

        if multi {
            self.selected.extend(hits);
        } else {
            self.selected = hits;
        }
    }

    /// Abort the marquee without changing the selection.
    pub fn cancel_box(&mut self) {
        self.marquee = None;
    }
}
