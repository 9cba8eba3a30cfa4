//! Drag and group-resize sessions.
//!
//! Both are ephemeral value objects: they record the affected shapes'
//! geometry at gesture start, reapply it from scratch on every move event
//! (`origin + cumulative delta`, never incremental accumulation), and can
//! restore it wholesale on cancel.

use crate::constants::{MIN_GROUP_SIZE, MIN_SHAPE_SIZE};
use crate::geometry::{Point, Rect};
use crate::registry::ComponentRegistry;
use crate::types::{ShapeId, ShapeUpdate, Size};
use crate::viewport::ViewportController;
use std::collections::HashMap;

use super::SelectionManager;

/// A move gesture over one shape or the whole multi-selection.
pub struct DragSession {
    shape_ids: Vec<ShapeId>,
    origins: HashMap<ShapeId, Point>,
    pointer_start: Point,
}

impl DragSession {
    /// Begin a drag at `pointer` (canvas coordinates) on `grabbed_id`.
    ///
    /// If the grabbed shape is part of the current multi-selection the
    /// whole selection moves together; otherwise the selection narrows to
    /// the grabbed shape. Locked shapes never join a drag; grabbing a
    /// locked shape yields no session.
    pub fn begin(
        registry: &ComponentRegistry,
        selection: &mut SelectionManager,
        grabbed_id: &str,
        pointer: Point,
    ) -> Option<Self> {
        let grabbed = registry.get(grabbed_id)?;
        if grabbed.is_locked() {
            return None;
        }

        let shape_ids: Vec<ShapeId> =
            if selection.is_selected(grabbed_id) && selection.len() > 1 {
                selection
                    .ids()
                    .iter()
                    .filter(|id| registry.get(id).is_some_and(|s| !s.is_locked()))
                    .cloned()
                    .collect()
            } else {
                selection.set_only(grabbed_id);
                vec![grabbed_id.to_string()]
            };

        let origins = shape_ids
            .iter()
            .filter_map(|id| registry.get(id).map(|s| (id.clone(), s.position)))
            .collect();

        Some(Self {
            shape_ids,
            origins,
            pointer_start: pointer,
        })
    }

    pub fn shape_ids(&self) -> &[ShapeId] {
        &self.shape_ids
    }

    /// Reposition every dragged shape for the current pointer location.
    /// Positions are recomputed from the recorded origins plus the
    /// cumulative delta, then grid-snapped when snapping is enabled.
    pub fn update(
        &self,
        registry: &mut ComponentRegistry,
        viewport: &ViewportController,
        pointer: Point,
    ) {
        let delta = pointer - self.pointer_start;
        for id in &self.shape_ids {
            if let Some(origin) = self.origins.get(id) {
                let target = viewport.snap_if_enabled(*origin + delta);
                registry.update(id, ShapeUpdate::position(target));
            }
        }
    }

    /// Finalize in place; returns the moved ids so the caller can reroute
    /// affected connections.
    pub fn end(self) -> Vec<ShapeId> {
        self.shape_ids
    }

    /// Restore every dragged shape to its position at gesture start.
    pub fn cancel(self, registry: &mut ComponentRegistry) {
        for (id, origin) in &self.origins {
            registry.update(id, ShapeUpdate::position(*origin));
        }
    }
}

/// The eight resize handles around a group bounding box. Edge handles
/// move one axis, corner handles move two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl ResizeHandle {
    fn moves_left(&self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    fn moves_right(&self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    fn moves_top(&self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    fn moves_bottom(&self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }
}

/// Per-shape geometry expressed as fractions of the group bounding box
/// at gesture start.
#[derive(Clone, Copy, Debug)]
struct BoxFraction {
    fx: f32,
    fy: f32,
    fw: f32,
    fh: f32,
}

/// Proportional resize of a multi-selection relative to its shared
/// bounding box.
pub struct GroupResizeSession {
    handle: ResizeHandle,
    start_bounds: Rect,
    fractions: HashMap<ShapeId, BoxFraction>,
    origins: HashMap<ShapeId, (Point, Size)>,
}

impl GroupResizeSession {
    /// Whether group handles should render for the current selection.
    pub fn handles_visible(selection: &SelectionManager) -> bool {
        selection.len() >= 2
    }

    /// Begin a group resize. Requires at least two selected shapes; with
    /// fewer the single-shape resize path applies instead.
    pub fn begin(
        registry: &ComponentRegistry,
        selection: &SelectionManager,
        handle: ResizeHandle,
    ) -> Option<Self> {
        let shapes: Vec<&crate::types::Shape> = selection
            .ids()
            .iter()
            .filter_map(|id| registry.get(id))
            .collect();
        if shapes.len() < 2 {
            return None;
        }

        let mut bounds = shapes[0].bounds();
        for shape in &shapes[1..] {
            bounds = bounds.union(&shape.bounds());
        }

        let mut fractions = HashMap::new();
        let mut origins = HashMap::new();
        for shape in &shapes {
            let b = shape.bounds();
            fractions.insert(
                shape.id.clone(),
                BoxFraction {
                    fx: (b.x - bounds.x) / bounds.width,
                    fy: (b.y - bounds.y) / bounds.height,
                    fw: b.width / bounds.width,
                    fh: b.height / bounds.height,
                },
            );
            origins.insert(shape.id.clone(), (shape.position, shape.size));
        }

        Some(Self {
            handle,
            start_bounds: bounds,
            fractions,
            origins,
        })
    }

    /// New group bounds for a cumulative pointer delta, clamped to the
    /// minimum group size with the opposite edge anchored.
    fn resized_bounds(&self, delta: Point) -> Rect {
        let start = self.start_bounds;
        let mut r = start;

        if self.handle.moves_left() {
            r.x += delta.x;
            r.width -= delta.x;
        } else if self.handle.moves_right() {
            r.width += delta.x;
        }
        if self.handle.moves_top() {
            r.y += delta.y;
            r.height -= delta.y;
        } else if self.handle.moves_bottom() {
            r.height += delta.y;
        }

        if r.width < MIN_GROUP_SIZE.0 {
            r.width = MIN_GROUP_SIZE.0;
            if self.handle.moves_left() {
                r.x = start.max_x() - r.width;
            }
        }
        if r.height < MIN_GROUP_SIZE.1 {
            r.height = MIN_GROUP_SIZE.1;
            if self.handle.moves_top() {
                r.y = start.max_y() - r.height;
            }
        }
        r
    }

    /// Apply the resize for the current pointer delta: every shape is
    /// repositioned and rescaled in lockstep with the group box via its
    /// recorded fractions.
    pub fn update(&self, registry: &mut ComponentRegistry, delta: Point) {
        let bounds = self.resized_bounds(delta);
        for (id, frac) in &self.fractions {
            let position = Point::new(
                bounds.x + frac.fx * bounds.width,
                bounds.y + frac.fy * bounds.height,
            );
            let size = Size::new(
                (frac.fw * bounds.width).max(MIN_SHAPE_SIZE.0),
                (frac.fh * bounds.height).max(MIN_SHAPE_SIZE.1),
            );
            registry.update(
                id,
                ShapeUpdate {
                    position: Some(position),
                    size: Some(size),
                    ..Default::default()
                },
            );
        }
    }

    pub fn end(self) -> Vec<ShapeId> {
        self.fractions.keys().cloned().collect()
    }

    /// Restore every shape's position and size from gesture start.
    pub fn cancel(self, registry: &mut ComponentRegistry) {
        for (id, (position, size)) in &self.origins {
            registry.update(
                id,
                ShapeUpdate {
                    position: Some(*position),
                    size: Some(*size),
                    ..Default::default()
                },
            );
        }
    }
}
