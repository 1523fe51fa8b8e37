//! Placement engine: pure geometry over layers.
//!
//! Holds only the viewport (for screen↔logical scaling) and the placement
//! settings from [`EditorConfig`]. Every operation takes layers by reference
//! and returns the proposed position or size; committing is the caller's job.
//!
//! Malformed input never leaks into the result: a non-finite outcome falls
//! back to the layer's last-known-good value.

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{EditorConfig, SnapStrategy};
use crate::hit::ResizeHandle;
use crate::layer::{Dimension, Layer, LayerId, LayerSpec, Position, Size};
use crate::viewport::{CanvasRect, Delta, Point, Viewport};

/// Errors surfaced by the placement engine. These indicate integration bugs.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PlacementError {
    /// A screen-space conversion ran before `set_canvas_bounds`.
    #[error("canvas bounds not set; call set_canvas_bounds before pointer input")]
    CanvasBoundsUnset,

    /// The host reported a zero, negative or non-finite canvas size.
    #[error("invalid canvas bounds: {width}x{height}")]
    InvalidBounds { width: f64, height: f64 },
}

/// Options for [`Placement::place_element`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceOptions {
    pub snap_to_grid: bool,
}

/// Requested dimensions for [`Placement::update_size`]. Absent fields are kept
/// (or derived, when preserving the aspect ratio).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SizePatch {
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
}

/// Alignment guides near a layer.
///
/// `horizontal` holds y coordinates of horizontal guide lines; `vertical`
/// holds x coordinates of vertical ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Guides {
    pub horizontal: Vec<f64>,
    pub vertical: Vec<f64>,
}

impl Guides {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.horizontal.is_empty() && self.vertical.is_empty()
    }
}

/// Geometry engine bound to one canvas.
#[derive(Debug, Clone)]
pub struct Placement {
    viewport: Viewport,
    grid_size: f64,
    min_layer_size: f64,
    snap_strategy: SnapStrategy,
}

impl Placement {
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            viewport: Viewport::new(config.canvas_width, config.canvas_height),
            grid_size: config.grid_size,
            min_layer_size: config.min_layer_size,
            snap_strategy: config.snap_strategy,
        }
    }

    /// Bind the rendered canvas rectangle. Required before any pointer input.
    pub fn set_canvas_bounds(&mut self, rect: CanvasRect) -> Result<(), PlacementError> {
        self.viewport.set_bounds(rect)?;
        debug!(width = rect.width, height = rect.height, "canvas bounds set");
        Ok(())
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub fn min_layer_size(&self) -> f64 {
        self.min_layer_size
    }

    // --- Positioning ---

    /// Fill in a default position (canvas center) and optionally grid-snap.
    #[must_use]
    pub fn place_element(&self, mut spec: LayerSpec, options: PlaceOptions) -> LayerSpec {
        let center = self.viewport.center();
        let mut position = spec.position.unwrap_or(Position::new(center.x, center.y, 0));
        if options.snap_to_grid {
            position.x = self.snap_to_grid(position.x);
            position.y = self.snap_to_grid(position.y);
        }
        spec.position = Some(position);
        spec
    }

    /// Offset a layer's center by a logical delta. `z` is never touched.
    #[must_use]
    pub fn update_position(&self, layer: &Layer, delta: Delta, snap_to_grid: bool) -> Position {
        self.offset_position(layer.position, delta, snap_to_grid)
    }

    /// [`Placement::update_position`] on a bare position.
    #[must_use]
    pub fn offset_position(&self, position: Position, delta: Delta, snap_to_grid: bool) -> Position {
        let mut next = position;
        next.x = finite_or_keep(position.x + delta.dx, position.x);
        next.y = finite_or_keep(position.y + delta.dy, position.y);
        if snap_to_grid {
            next.x = self.snap_to_grid(next.x);
            next.y = self.snap_to_grid(next.y);
        }
        next
    }

    /// Round a coordinate to the nearest grid line.
    #[must_use]
    pub fn snap_to_grid(&self, value: f64) -> f64 {
        (value / self.grid_size).round() * self.grid_size
    }

    // --- Sizing ---

    /// Merge requested dimensions into the layer's size.
    ///
    /// With `preserve_aspect_ratio`, a single supplied dimension derives the
    /// other from the cached ratio (`width / ratio` or `height * ratio`).
    #[must_use]
    pub fn update_size(&self, layer: &Layer, patch: SizePatch, preserve_aspect_ratio: bool) -> Size {
        let mut size = layer.size;
        let ratio = layer.aspect_ratio.filter(|_| preserve_aspect_ratio);
        match (patch.width, patch.height) {
            (Some(width), None) => {
                size.width = width;
                if let (Some(r), Some(w)) = (ratio, width.pixels()) {
                    size.height = Dimension::Pixels(w / r);
                }
            }
            (None, Some(height)) => {
                size.height = height;
                if let (Some(r), Some(h)) = (ratio, height.pixels()) {
                    size.width = Dimension::Pixels(h * r);
                }
            }
            (Some(width), Some(height)) => {
                size.width = width;
                size.height = height;
            }
            (None, None) => {}
        }
        Size {
            width: self.clamp_dimension(size.width, layer.size.width),
            height: self.clamp_dimension(size.height, layer.size.height),
        }
    }

    /// Resize by dragging a corner handle, keeping the opposite corner fixed.
    ///
    /// `delta` is in canvas axes; it is taken into the layer's local frame
    /// first so rotated layers resize along their own edges. Both dimensions
    /// clamp to the minimum layer size.
    #[must_use]
    pub fn resize_from_handle(
        &self,
        layer: &Layer,
        handle: ResizeHandle,
        delta: Delta,
        preserve_aspect_ratio: bool,
    ) -> (Position, Size) {
        let unchanged = (layer.position, layer.size);
        if !delta.is_finite() {
            warn!(id = %layer.id, "ignoring non-finite resize delta");
            return unchanged;
        }
        let (w, h) = layer.extent();
        let local = delta.rotated(-layer.rotation);
        let (sx, sy) = handle.signs();
        let min = self.min_layer_size;

        let mut new_w = w + sx * local.dx;
        let mut new_h = h + sy * local.dy;
        match layer.aspect_ratio.filter(|_| preserve_aspect_ratio) {
            Some(r) => {
                new_w = new_w.max(min).max(min * r);
                new_h = new_w / r;
            }
            None => {
                new_w = new_w.max(min);
                new_h = new_h.max(min);
            }
        }
        if !new_w.is_finite() || !new_h.is_finite() {
            warn!(id = %layer.id, ?handle, "resize produced non-finite size; keeping previous");
            return unchanged;
        }

        // The anchored corner sits at -signs * half-extent; moving the center by
        // half the growth along the handle's direction keeps it in place.
        let shift = Delta::new(sx * (new_w - w) / 2.0, sy * (new_h - h) / 2.0).rotated(layer.rotation);
        let position = Position { x: layer.position.x + shift.dx, y: layer.position.y + shift.dy, z: layer.position.z };
        (position, Size::pixels(new_w, new_h))
    }

    // --- Alignment ---

    /// Every guide candidate for `layer`, in scan order: the canvas center,
    /// then each other visible layer's center, leading edge and trailing edge.
    #[must_use]
    pub fn guide_candidates(&self, layer: &Layer, others: &[Layer]) -> Guides {
        self.candidates_for(layer.id, others)
    }

    /// Guide candidates within `threshold` of the layer's center, in scan order.
    #[must_use]
    pub fn compute_alignment_guides(&self, layer: &Layer, others: &[Layer], threshold: f64) -> Guides {
        self.guides_near(layer.id, layer.center(), others, threshold)
    }

    /// Pull the layer's center onto nearby guides, each axis independently.
    #[must_use]
    pub fn snap_to_guides(&self, layer: &Layer, others: &[Layer], threshold: f64) -> Position {
        self.snap_center(layer.id, layer.position, others, threshold).0
    }

    /// Snap `position` as if it belonged to layer `id`; also returns the
    /// guides within threshold, for the drag overlay.
    pub(crate) fn snap_center(
        &self,
        id: LayerId,
        position: Position,
        others: &[Layer],
        threshold: f64,
    ) -> (Position, Guides) {
        let guides = self.guides_near(id, position.point(), others, threshold);
        let mut snapped = position;
        if let Some(y) = pick_guide(&guides.horizontal, position.y, self.snap_strategy) {
            snapped.y = y;
        }
        if let Some(x) = pick_guide(&guides.vertical, position.x, self.snap_strategy) {
            snapped.x = x;
        }
        (snapped, guides)
    }

    fn guides_near(&self, id: LayerId, center: Point, others: &[Layer], threshold: f64) -> Guides {
        let all = self.candidates_for(id, others);
        if !center.is_finite() || !threshold.is_finite() {
            return Guides::default();
        }
        Guides {
            horizontal: all.horizontal.into_iter().filter(|g| (g - center.y).abs() <= threshold).collect(),
            vertical: all.vertical.into_iter().filter(|g| (g - center.x).abs() <= threshold).collect(),
        }
    }

    fn candidates_for(&self, id: LayerId, others: &[Layer]) -> Guides {
        let canvas = self.viewport.center();
        let mut guides = Guides { horizontal: vec![canvas.y], vertical: vec![canvas.x] };
        for other in others.iter().filter(|o| o.id != id && o.visible) {
            let c = other.center();
            let (hw, hh) = other.half_extent();
            guides.horizontal.extend([c.y, c.y - hh, c.y + hh]);
            guides.vertical.extend([c.x, c.x - hw, c.x + hw]);
        }
        guides
    }

    fn clamp_dimension(&self, requested: Dimension, current: Dimension) -> Dimension {
        crate::store::clamp_dimension(requested, current, self.min_layer_size)
    }
}

/// Choose the guide to snap to from candidates already within threshold.
fn pick_guide(candidates: &[f64], value: f64, strategy: SnapStrategy) -> Option<f64> {
    match strategy {
        SnapStrategy::First => candidates.first().copied(),
        SnapStrategy::Nearest => {
            let mut best: Option<f64> = None;
            for &g in candidates {
                if best.is_none_or(|b| (g - value).abs() < (b - value).abs()) {
                    best = Some(g);
                }
            }
            best
        }
    }
}

fn finite_or_keep(value: f64, current: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        warn!(value, "discarding non-finite position");
        current
    }
}
