//! Hit-testing: which layer, or which resize handle, sits under a point.
//!
//! All tests are rotation-aware. Instead of rotating a layer's box, the query
//! point is rotated by the negative of the layer's rotation about the layer's
//! center and then tested against the axis-aligned box `center ± half-extent`.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::layer::{Layer, LayerContent, LayerId};
use crate::viewport::Point;

/// One of the four corner manipulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [Self::TopLeft, Self::TopRight, Self::BottomLeft, Self::BottomRight];

    /// Unit direction of this corner from the center in the layer's local frame.
    #[must_use]
    pub fn signs(self) -> (f64, f64) {
        match self {
            Self::TopLeft => (-1.0, -1.0),
            Self::TopRight => (1.0, -1.0),
            Self::BottomLeft => (-1.0, 1.0),
            Self::BottomRight => (1.0, 1.0),
        }
    }

    /// The corner that stays fixed while this one is dragged.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::TopLeft => Self::BottomRight,
            Self::TopRight => Self::BottomLeft,
            Self::BottomLeft => Self::TopRight,
            Self::BottomRight => Self::TopLeft,
        }
    }
}

/// Which part of a layer was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Handle(ResizeHandle),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub layer_id: LayerId,
    pub part: HitPart,
}

/// Rotation-aware point-in-layer test. Points on the edge count as inside.
#[must_use]
pub fn is_point_inside(point: Point, layer: &Layer) -> bool {
    if !point.is_finite() {
        return false;
    }
    let center = layer.center();
    let local = point.rotated_about(center, -layer.rotation);
    let (hw, hh) = layer.half_extent();
    layer.kind.contains_local(Point::new(local.x - center.x, local.y - center.y), hw, hh)
}

/// The visible layer with the highest `z` containing `point`.
///
/// Equal `z` keys fall back to list order, later entries winning.
#[must_use]
pub fn find_topmost_at(point: Point, layers: &[Layer]) -> Option<&Layer> {
    let mut candidates: Vec<(usize, &Layer)> = layers.iter().enumerate().filter(|(_, l)| l.visible).collect();
    candidates.sort_by(|(ia, a), (ib, b)| b.position.z.cmp(&a.position.z).then_with(|| ib.cmp(ia)));
    candidates
        .into_iter()
        .map(|(_, l)| l)
        .find(|l| is_point_inside(point, l))
}

/// The corner handle of `layer` within `radius` of `point`, if any.
#[must_use]
pub fn handle_at(point: Point, layer: &Layer, radius: f64) -> Option<ResizeHandle> {
    if !point.is_finite() {
        return None;
    }
    ResizeHandle::ALL.into_iter().find(|&handle| {
        let corner = layer.corner(handle);
        (point.x - corner.x).hypot(point.y - corner.y) <= radius
    })
}

/// Full pick: handles of the active layer first, then bodies top-down.
///
/// Handles are only offered for a visible, unlocked active layer.
#[must_use]
pub fn hit_test(point: Point, layers: &[Layer], active: Option<&Layer>, handle_radius: f64) -> Option<Hit> {
    if let Some(active) = active.filter(|l| l.visible && !l.locked) {
        if let Some(handle) = handle_at(point, active, handle_radius) {
            return Some(Hit { layer_id: active.id, part: HitPart::Handle(handle) });
        }
    }
    find_topmost_at(point, layers).map(|l| Hit { layer_id: l.id, part: HitPart::Body })
}
