use tracing::{debug, warn};

use crate::command::{self, Command};
use crate::config::EditorConfig;
use crate::hit::{self, Hit, HitPart, ResizeHandle};
use crate::input::{Button, InteractionState, Modifiers};
use crate::layer::{Layer, LayerId, LayerPatch, LayerSpec, Position};
use crate::placement::{Guides, PlaceOptions, Placement, PlacementError};
use crate::render::{RenderAdapter, Scene};
use crate::store::LayerStore;
use crate::viewport::{CanvasRect, Delta, Point};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from pointer handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A layer's committed state changed.
    LayerUpdated { id: LayerId, fields: LayerPatch },
    /// The active layer changed.
    SelectionChanged(Option<LayerId>),
    /// A session started: attach document-level pointer-move/pointer-up listeners.
    CapturePointer,
    /// The session ended: detach the listeners attached for `CapturePointer`.
    ReleasePointer,
    RenderNeeded,
}

/// One editor instance: the layer store, the placement engine and the
/// pointer state machine for a single canvas.
///
/// Nothing is global, so independent editors can coexist.
pub struct Editor {
    config: EditorConfig,
    store: LayerStore,
    placement: Placement,
    state: InteractionState,
    guides: Guides,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self {
            store: LayerStore::with_min_layer_size(config.min_layer_size),
            placement: Placement::new(&config),
            state: InteractionState::Idle,
            guides: Guides::default(),
            config,
        }
    }

    // --- Viewport ---

    /// Bind the rendered canvas rectangle. Must precede pointer input.
    pub fn set_canvas_bounds(&mut self, rect: CanvasRect) -> Result<(), PlacementError> {
        self.placement.set_canvas_bounds(rect)
    }

    /// Pull the canvas rectangle from the render adapter.
    pub fn sync_bounds(&mut self, adapter: &impl RenderAdapter) -> Result<(), PlacementError> {
        self.set_canvas_bounds(adapter.canvas_rect())
    }

    // --- Layer CRUD ---

    /// Create a layer (centered on the canvas unless positioned) and select it.
    pub fn add_layer(&mut self, spec: LayerSpec) -> Layer {
        let spec = self.placement.place_element(spec, PlaceOptions { snap_to_grid: self.config.snap_to_grid });
        self.store.add_layer(spec)
    }

    pub fn update_layer(&mut self, id: &LayerId, patch: &LayerPatch) -> bool {
        self.store.update_layer(id, patch)
    }

    pub fn delete_layer(&mut self, id: &LayerId) -> bool {
        self.store.delete_layer(id)
    }

    pub fn move_layer_up(&mut self, id: &LayerId) -> bool {
        self.store.move_layer_up(id)
    }

    pub fn move_layer_down(&mut self, id: &LayerId) -> bool {
        self.store.move_layer_down(id)
    }

    pub fn set_active_layer(&mut self, id: Option<LayerId>) -> bool {
        self.store.set_active_layer(id)
    }

    /// Replace every layer, e.g. when opening a saved card.
    pub fn load_snapshot(&mut self, layers: Vec<Layer>) {
        self.store.load_snapshot(layers);
    }

    /// Apply an explicit intent. Returns the committed patch.
    pub fn dispatch(&mut self, command: &Command) -> Option<LayerPatch> {
        command::apply(&mut self.store, &self.placement, command)
    }

    // --- Input events ---

    /// Pointer pressed at `screen` (same pixel space as the canvas rect).
    pub fn on_pointer_down(
        &mut self,
        screen: Point,
        button: Button,
        _modifiers: Modifiers,
    ) -> Result<Vec<Action>, PlacementError> {
        if !screen.is_finite() {
            debug!(?screen, "ignoring non-finite pointer-down");
            return Ok(Vec::new());
        }
        if button != Button::Primary || self.state.is_active() {
            return Ok(Vec::new());
        }

        let world = self.placement.viewport().screen_to_logical(screen)?;
        let radius = self.placement.viewport().screen_dist_to_logical(self.config.handle_radius_px)?;
        let hit = hit::hit_test(world, self.store.layers(), self.store.active(), radius);

        let mut actions = Vec::new();
        match hit {
            Some(Hit { layer_id, part: HitPart::Handle(handle) }) => {
                self.state = InteractionState::Resizing { id: layer_id, handle, last_screen: screen };
                debug!(id = %layer_id, ?handle, "resize started");
                actions.push(Action::CapturePointer);
            }
            Some(Hit { layer_id, part: HitPart::Body }) => {
                if self.store.active_id() != Some(layer_id) && self.store.set_active_layer(Some(layer_id)) {
                    actions.push(Action::SelectionChanged(Some(layer_id)));
                    actions.push(Action::RenderNeeded);
                }
                let Some(layer) = self.store.get(&layer_id) else {
                    return Ok(actions);
                };
                if layer.locked {
                    debug!(id = %layer_id, "locked layer selected; no drag");
                    return Ok(actions);
                }
                self.state = InteractionState::Dragging { id: layer_id, last_screen: screen, free: layer.position };
                debug!(id = %layer_id, "drag started");
                actions.push(Action::CapturePointer);
            }
            None => {
                if self.store.set_active_layer(None) {
                    actions.push(Action::SelectionChanged(None));
                    actions.push(Action::RenderNeeded);
                }
            }
        }
        Ok(actions)
    }

    /// Pointer moved. Only meaningful during a drag or resize session.
    pub fn on_pointer_move(&mut self, screen: Point, modifiers: Modifiers) -> Result<Vec<Action>, PlacementError> {
        if !screen.is_finite() {
            debug!(?screen, "ignoring non-finite pointer-move");
            return Ok(Vec::new());
        }
        match self.state {
            InteractionState::Idle => Ok(Vec::new()),
            InteractionState::Dragging { id, last_screen, free } => self.drag_to(id, last_screen, free, screen),
            InteractionState::Resizing { id, handle, last_screen } => {
                self.resize_to(id, handle, last_screen, screen, modifiers.shift)
            }
        }
    }

    /// Pointer released. Ends any session.
    pub fn on_pointer_up(&mut self, _screen: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        self.end_session()
    }

    /// Abort the session (teardown, lost capture). Safe to call at any time.
    pub fn cancel(&mut self) -> Vec<Action> {
        self.end_session()
    }

    // --- Render ---

    /// Build the current scene.
    #[must_use]
    pub fn scene(&self) -> Scene {
        Scene::build(self.store.layers(), self.store.revision(), self.store.active_id(), &self.guides)
    }

    /// Hand the current scene to the render adapter.
    pub fn commit(&self, adapter: &mut impl RenderAdapter) {
        adapter.paint(&self.scene());
    }

    // --- Queries ---

    /// Layers bottom to top.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        self.store.layers()
    }

    #[must_use]
    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.store.get(id)
    }

    #[must_use]
    pub fn active_id(&self) -> Option<LayerId> {
        self.store.active_id()
    }

    /// Guides within snapping distance of the dragged layer; empty when idle.
    #[must_use]
    pub fn guides(&self) -> &Guides {
        &self.guides
    }

    #[must_use]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    #[must_use]
    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    #[must_use]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // --- Internals ---

    fn drag_to(
        &mut self,
        id: LayerId,
        last: Point,
        free: Position,
        screen: Point,
    ) -> Result<Vec<Action>, PlacementError> {
        let delta = self.placement.viewport().screen_delta_to_logical(Delta::between(last, screen))?;
        let free = self.placement.offset_position(free, delta, false);
        self.state = InteractionState::Dragging { id, last_screen: screen, free };

        let Some(layer) = self.store.get(&id) else {
            debug!(%id, "dragged layer vanished; move ignored");
            if self.guides.is_empty() {
                return Ok(Vec::new());
            }
            self.guides = Guides::default();
            return Ok(vec![Action::RenderNeeded]);
        };
        let current = layer.position;
        let mut target = free;
        if self.config.snap_to_grid {
            target.x = self.placement.snap_to_grid(target.x);
            target.y = self.placement.snap_to_grid(target.y);
        }
        if self.config.snap_to_guides {
            let (snapped, guides) =
                self.placement.snap_center(id, target, self.store.layers(), self.config.snap_threshold);
            self.guides = guides;
            target = snapped;
        }

        let command = Command::MoveLayer { id, dx: target.x - current.x, dy: target.y - current.y };
        Ok(self.committed(id, &command))
    }

    fn resize_to(
        &mut self,
        id: LayerId,
        handle: ResizeHandle,
        last: Point,
        screen: Point,
        preserve_aspect_ratio: bool,
    ) -> Result<Vec<Action>, PlacementError> {
        let delta = self.placement.viewport().screen_delta_to_logical(Delta::between(last, screen))?;
        self.state = InteractionState::Resizing { id, handle, last_screen: screen };
        let command = Command::ResizeLayer { id, handle, dx: delta.dx, dy: delta.dy, preserve_aspect_ratio };
        Ok(self.committed(id, &command))
    }

    fn committed(&mut self, id: LayerId, command: &Command) -> Vec<Action> {
        match self.dispatch(command) {
            Some(fields) => vec![Action::LayerUpdated { id, fields }, Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    fn end_session(&mut self) -> Vec<Action> {
        let previous = std::mem::take(&mut self.state);
        if !previous.is_active() {
            return Vec::new();
        }
        debug!(id = ?previous.layer_id(), "session ended");
        let mut actions = vec![Action::ReleasePointer];
        if !self.guides.is_empty() {
            self.guides = Guides::default();
            actions.push(Action::RenderNeeded);
        }
        if previous.layer_id().is_some_and(|id| self.store.get(&id).is_none()) {
            warn!(id = ?previous.layer_id(), "session ended on a layer that no longer exists");
        }
        actions
    }
}
