//! Layer store: the ordered layer list and the active selection.
//!
//! List order is stacking order (index 0 is the bottom). The store keeps `z`
//! non-decreasing along the list so draw order, pick order and list order
//! always agree. Every successful mutation bumps [`LayerStore::revision`],
//! which renderers compare to decide whether to repaint.
//!
//! Unknown ids are a silent no-op everywhere.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::consts::MIN_LAYER_SIZE;
use crate::layer::{Dimension, Layer, LayerContent, LayerId, LayerPatch, LayerSpec, Position, Size};

/// In-memory store of card layers.
#[derive(Debug, Clone)]
pub struct LayerStore {
    layers: Vec<Layer>,
    active: Option<LayerId>,
    revision: u64,
    min_layer_size: f64,
}

impl LayerStore {
    /// Create an empty store using the default minimum layer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_min_layer_size(MIN_LAYER_SIZE)
    }

    #[must_use]
    pub fn with_min_layer_size(min_layer_size: f64) -> Self {
        Self { layers: Vec::new(), active: None, revision: 0, min_layer_size }
    }

    // --- Mutations ---

    /// Create a layer on top of the stack and make it active.
    pub fn add_layer(&mut self, spec: LayerSpec) -> Layer {
        let z = self.layers.last().map_or(0, |top| top.position.z.saturating_add(1));
        let requested = spec.position.unwrap_or_default();
        let position = Position::new(finite_or(requested.x, 0.0), finite_or(requested.y, 0.0), z);
        let size = Size {
            width: self.sanitize_dimension(spec.size.width, Dimension::Auto),
            height: self.sanitize_dimension(spec.size.height, Dimension::Auto),
        };
        let mut layer = Layer {
            id: Uuid::new_v4(),
            kind: spec.kind,
            position,
            size,
            rotation: finite_or(spec.rotation, 0.0),
            opacity: clamp_opacity(spec.opacity, 1.0),
            visible: spec.visible,
            locked: spec.locked,
            aspect_ratio: None,
        };
        layer.refresh_aspect_ratio();
        debug!(id = %layer.id, z, kind = layer.kind.kind_name(), "layer added");
        self.layers.push(layer.clone());
        self.active = Some(layer.id);
        self.bump();
        layer
    }

    /// Merge `patch` into the layer with `id`. Returns `false` for an unknown id.
    ///
    /// Non-finite numbers in the patch are dropped and the previous value kept;
    /// opacity is clamped to `[0, 1]` and explicit sizes to the minimum size.
    pub fn update_layer(&mut self, id: &LayerId, patch: &LayerPatch) -> bool {
        let min = self.min_layer_size;
        let Some(layer) = self.layers.iter_mut().find(|l| l.id == *id) else {
            debug!(%id, "update for unknown layer ignored");
            return false;
        };
        if let Some(x) = patch.x {
            layer.position.x = finite_or_keep(x, layer.position.x, "x");
        }
        if let Some(y) = patch.y {
            layer.position.y = finite_or_keep(y, layer.position.y, "y");
        }
        if let Some(w) = patch.width {
            layer.size.width = clamp_dimension(w, layer.size.width, min);
        }
        if let Some(h) = patch.height {
            layer.size.height = clamp_dimension(h, layer.size.height, min);
        }
        if let Some(r) = patch.rotation {
            layer.rotation = finite_or_keep(r, layer.rotation, "rotation");
        }
        if let Some(o) = patch.opacity {
            layer.opacity = clamp_opacity(o, layer.opacity);
        }
        if let Some(v) = patch.visible {
            layer.visible = v;
        }
        if let Some(l) = patch.locked {
            layer.locked = l;
        }
        if let Some(ref kind) = patch.kind {
            layer.kind = kind.clone();
        }
        if patch.width.is_some() || patch.height.is_some() {
            layer.refresh_aspect_ratio();
        }
        let restack = match patch.z {
            Some(z) if z != layer.position.z => {
                layer.position.z = z;
                true
            }
            _ => false,
        };
        if restack {
            self.layers.sort_by_key(|l| l.position.z);
        }
        self.bump();
        true
    }

    /// Remove a layer. If it was active, the first remaining layer in list
    /// order becomes active (or nothing, once the list is empty).
    pub fn delete_layer(&mut self, id: &LayerId) -> bool {
        let Some(idx) = self.index_of(id) else {
            debug!(%id, "delete for unknown layer ignored");
            return false;
        };
        self.layers.remove(idx);
        if self.active == Some(*id) {
            self.active = self.layers.first().map(|l| l.id);
            debug!(%id, next = ?self.active, "active layer deleted; selection re-resolved");
        }
        self.bump();
        true
    }

    /// Swap with the neighbor above. No-op for the top layer.
    pub fn move_layer_up(&mut self, id: &LayerId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if idx + 1 >= self.layers.len() {
            return false;
        }
        self.swap_adjacent(idx);
        true
    }

    /// Swap with the neighbor below. No-op for the bottom layer.
    pub fn move_layer_down(&mut self, id: &LayerId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if idx == 0 {
            return false;
        }
        self.swap_adjacent(idx - 1);
        true
    }

    /// Change the active selection. An unknown id is ignored.
    pub fn set_active_layer(&mut self, id: Option<LayerId>) -> bool {
        if let Some(ref id) = id {
            if self.index_of(id).is_none() {
                debug!(%id, "selection of unknown layer ignored");
                return false;
            }
        }
        if self.active == id {
            return false;
        }
        self.active = id;
        self.bump();
        true
    }

    /// Replace all layers with a snapshot, ordered by `z`. Duplicate ids keep
    /// the first occurrence. The selection survives if its layer does.
    ///
    /// Loaded values are sanitized like [`LayerStore::add_layer`] input:
    /// non-finite numbers fall back to defaults, explicit sizes clamp to the
    /// minimum and opacity to `[0, 1]`.
    pub fn load_snapshot(&mut self, layers: Vec<Layer>) {
        let mut seen = std::collections::HashSet::new();
        let mut kept: Vec<Layer> = Vec::with_capacity(layers.len());
        for mut layer in layers {
            if !seen.insert(layer.id) {
                warn!(id = %layer.id, "duplicate layer id in snapshot dropped");
                continue;
            }
            self.sanitize_loaded(&mut layer);
            kept.push(layer);
        }
        kept.sort_by_key(|l| l.position.z);
        self.layers = kept;
        if let Some(id) = self.active {
            if self.index_of(&id).is_none() {
                self.active = None;
            }
        }
        self.bump();
    }

    // --- Queries ---

    /// Layers bottom to top.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Owned copy of the ordered list.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Layer> {
        self.layers.clone()
    }

    #[must_use]
    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == *id)
    }

    #[must_use]
    pub fn active_id(&self) -> Option<LayerId> {
        self.active
    }

    #[must_use]
    pub fn active(&self) -> Option<&Layer> {
        self.active.and_then(|id| self.get(&id))
    }

    /// Position of a layer in the list (0 = bottom).
    #[must_use]
    pub fn index_of(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == *id)
    }

    #[must_use]
    pub fn min_layer_size(&self) -> f64 {
        self.min_layer_size
    }

    /// Counter bumped by every successful mutation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    // --- Internals ---

    /// Swap list slots `lower` and `lower + 1` along with their `z` keys.
    fn swap_adjacent(&mut self, lower: usize) {
        let upper = lower + 1;
        let (z_lower, z_upper) = (self.layers[lower].position.z, self.layers[upper].position.z);
        self.layers.swap(lower, upper);
        self.layers[lower].position.z = z_lower;
        self.layers[upper].position.z = z_upper;
        if z_lower == z_upper {
            self.renumber();
        }
        self.bump();
    }

    /// Reassign dense `z` keys in list order.
    fn renumber(&mut self) {
        for (z, layer) in (0_i64..).zip(self.layers.iter_mut()) {
            layer.position.z = z;
        }
    }

    fn sanitize_loaded(&self, layer: &mut Layer) {
        layer.position.x = finite_or_keep(layer.position.x, 0.0, "x");
        layer.position.y = finite_or_keep(layer.position.y, 0.0, "y");
        layer.size.width = self.sanitize_dimension(layer.size.width, Dimension::Auto);
        layer.size.height = self.sanitize_dimension(layer.size.height, Dimension::Auto);
        layer.rotation = finite_or_keep(layer.rotation, 0.0, "rotation");
        layer.opacity = clamp_opacity(layer.opacity, 1.0);
        layer.refresh_aspect_ratio();
    }

    fn sanitize_dimension(&self, requested: Dimension, fallback: Dimension) -> Dimension {
        clamp_dimension(requested, fallback, self.min_layer_size)
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

fn finite_or_keep(value: f64, current: f64, field: &'static str) -> f64 {
    if value.is_finite() {
        value
    } else {
        warn!(field, value, "discarding non-finite layer value");
        current
    }
}

fn clamp_opacity(value: f64, current: f64) -> f64 {
    if value.is_finite() { value.clamp(0.0, 1.0) } else { current }
}

/// Clamp an explicit extent to `min`; non-finite extents keep `current`.
pub(crate) fn clamp_dimension(requested: Dimension, current: Dimension, min: f64) -> Dimension {
    match requested {
        Dimension::Auto => Dimension::Auto,
        Dimension::Pixels(v) if v.is_finite() => Dimension::Pixels(v.max(min)),
        Dimension::Pixels(v) => {
            warn!(value = v, "discarding non-finite layer size");
            current
        }
    }
}
