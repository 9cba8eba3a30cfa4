//! Input controllers - selection, marquee, drag and group resize.
//!
//! Gesture state is ephemeral: sessions are value objects constructed at
//! gesture start and discarded on end/cancel, never merged into the
//! persistent shape/connection model.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Dragging         (pointer down on a shape)
//! Idle -> GroupResizing    (pointer down on a group handle, >= 2 selected)
//! Any  -> Idle             (pointer up finalizes, Escape cancels)
//! ```
//!
//! Starting a new gesture implicitly cancels any prior uncommitted one.

mod drag;
mod selection;

pub use drag::{DragSession, GroupResizeSession, ResizeHandle};
pub use selection::SelectionManager;

use crate::registry::ComponentRegistry;

/// Unified gesture state for pointer interactions.
#[derive(Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(DragSession),
    GroupResizing(GroupResizeSession),
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging(_))
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self, Self::GroupResizing(_))
    }

    /// Install a new session, rolling back any uncommitted one first.
    pub fn replace_with_drag(&mut self, registry: &mut ComponentRegistry, session: DragSession) {
        self.cancel(registry);
        *self = Self::Dragging(session);
    }

    pub fn replace_with_resize(
        &mut self,
        registry: &mut ComponentRegistry,
        session: GroupResizeSession,
    ) {
        self.cancel(registry);
        *self = Self::GroupResizing(session);
    }

    /// Finalize the active gesture in place.
    pub fn end(&mut self) {
        *self = Self::Idle;
    }

    /// Abort the active gesture, restoring every touched shape to its
    /// position/size at gesture start.
    pub fn cancel(&mut self, registry: &mut ComponentRegistry) {
        match std::mem::take(self) {
            Self::Idle => {}
            Self::Dragging(session) => session.cancel(registry),
            Self::GroupResizing(session) => session.cancel(registry),
        }
    }
}
