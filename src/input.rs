//! Input model: modifier keys, mouse buttons, and the gesture state machine.
//!
//! `InteractionState` is the single active gesture tracked between
//! pointer-down and pointer-up. It carries only transient session context
//! (the last pointer position, the handle being dragged, the unsnapped drag
//! position) and never a copy of the layer itself.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::hit::ResizeHandle;
use crate::layer::{LayerId, Position};
use crate::viewport::Point;

/// Keyboard modifier keys held during a pointer event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held. Locks the aspect ratio while resizing.
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    Middle,
    Secondary,
}

/// The active gesture, if any.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is moving a layer.
    Dragging {
        /// Layer being dragged.
        id: LayerId,
        /// Screen-space pointer position at the previous event.
        last_screen: Point,
        /// Where the layer would be without snapping. Snapping is applied on
        /// top of this, so a layer can be pulled off a guide by dragging on.
        free: Position,
    },
    /// The user is dragging a corner handle.
    Resizing {
        id: LayerId,
        handle: ResizeHandle,
        /// Screen-space pointer position at the previous event.
        last_screen: Point,
    },
}

impl InteractionState {
    /// Whether a drag or resize session is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// The layer the current session targets.
    #[must_use]
    pub fn layer_id(&self) -> Option<LayerId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } | Self::Resizing { id, .. } => Some(*id),
        }
    }
}
