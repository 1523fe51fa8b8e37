//! Layer intents and the reducer that applies them.
//!
//! Interactive gestures and direct property edits both go through
//! [`apply`], so locking and sanitizing rules live in one place. The reducer
//! returns the patch it committed, which is what the host forwards to
//! listeners.

#[cfg(test)]
#[path = "command_test.rs"]
mod command_test;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hit::ResizeHandle;
use crate::layer::{LayerId, LayerPatch, Position};
use crate::placement::{Placement, SizePatch};
use crate::store::LayerStore;
use crate::viewport::Delta;

/// A single change to one layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Offset the center by a logical delta.
    MoveLayer { id: LayerId, dx: f64, dy: f64 },
    /// Put the center at an absolute logical position.
    SetPosition { id: LayerId, x: f64, y: f64 },
    /// Drag a corner handle by a logical delta.
    ResizeLayer { id: LayerId, handle: ResizeHandle, dx: f64, dy: f64, preserve_aspect_ratio: bool },
    /// Set one or both dimensions.
    SetSize { id: LayerId, size: SizePatch, preserve_aspect_ratio: bool },
    /// Set the rotation in degrees.
    RotateLayer { id: LayerId, degrees: f64 },
    SetOpacity { id: LayerId, opacity: f64 },
    SetVisible { id: LayerId, visible: bool },
    SetLocked { id: LayerId, locked: bool },
}

impl Command {
    #[must_use]
    pub fn layer_id(&self) -> LayerId {
        match self {
            Self::MoveLayer { id, .. }
            | Self::SetPosition { id, .. }
            | Self::ResizeLayer { id, .. }
            | Self::SetSize { id, .. }
            | Self::RotateLayer { id, .. }
            | Self::SetOpacity { id, .. }
            | Self::SetVisible { id, .. }
            | Self::SetLocked { id, .. } => *id,
        }
    }

    /// Whether the command changes geometry (and is therefore refused on locked layers).
    #[must_use]
    pub fn is_geometric(&self) -> bool {
        matches!(
            self,
            Self::MoveLayer { .. }
                | Self::SetPosition { .. }
                | Self::ResizeLayer { .. }
                | Self::SetSize { .. }
                | Self::RotateLayer { .. }
        )
    }
}

/// What a command did, for logs and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Committed(LayerPatch),
    UnknownLayer,
    Locked,
}

/// Apply `command` to the store. Returns the committed patch as the store
/// holds it after clamping, or `None` when the layer is unknown or locked
/// against geometry changes.
pub fn apply(store: &mut LayerStore, placement: &Placement, command: &Command) -> Option<LayerPatch> {
    match reduce(store, placement, command) {
        Outcome::Committed(patch) => Some(patch),
        Outcome::UnknownLayer | Outcome::Locked => None,
    }
}

/// Like [`apply`], but reports why nothing was committed.
pub fn reduce(store: &mut LayerStore, placement: &Placement, command: &Command) -> Outcome {
    let id = command.layer_id();
    let Some(layer) = store.get(&id) else {
        debug!(%id, ?command, "command for unknown layer ignored");
        return Outcome::UnknownLayer;
    };
    if layer.locked && command.is_geometric() {
        debug!(%id, "geometry command on locked layer ignored");
        return Outcome::Locked;
    }

    let patch = match *command {
        Command::MoveLayer { dx, dy, .. } => {
            LayerPatch::position(placement.update_position(layer, Delta::new(dx, dy), false))
        }
        Command::SetPosition { x, y, .. } => LayerPatch::position(Position::new(x, y, layer.position.z)),
        Command::ResizeLayer { handle, dx, dy, preserve_aspect_ratio, .. } => {
            let delta = Delta::new(dx, dy);
            let (position, size) = placement.resize_from_handle(layer, handle, delta, preserve_aspect_ratio);
            LayerPatch { x: Some(position.x), y: Some(position.y), ..LayerPatch::size(size) }
        }
        Command::SetSize { size, preserve_aspect_ratio, .. } => {
            LayerPatch::size(placement.update_size(layer, size, preserve_aspect_ratio))
        }
        Command::RotateLayer { degrees, .. } => LayerPatch { rotation: Some(degrees), ..Default::default() },
        Command::SetOpacity { opacity, .. } => LayerPatch { opacity: Some(opacity), ..Default::default() },
        Command::SetVisible { visible, .. } => LayerPatch { visible: Some(visible), ..Default::default() },
        Command::SetLocked { locked, .. } => LayerPatch { locked: Some(locked), ..Default::default() },
    };

    store.update_layer(&id, &patch);
    match store.get(&id) {
        Some(layer) => Outcome::Committed(patch.read_back(layer)),
        None => Outcome::UnknownLayer,
    }
}
