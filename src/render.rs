//! Render adapter seam.
//!
//! The core never paints. It resolves committed layer state into a flat,
//! backend-agnostic [`Scene`] and hands that to whatever [`RenderAdapter`] the
//! host supplies (DOM, canvas 2D, WebGL, a test recorder). The adapter in turn
//! is the source of the canvas bounding rectangle.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerContent, LayerId, ShapeKind, TextAlign};
use crate::placement::Guides;
use crate::viewport::{CanvasRect, Point};

/// Content-specific paint instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Paint {
    Image {
        url: String,
    },
    Text {
        text: String,
        font_family: String,
        font_size: f64,
        color: String,
        bold: bool,
        italic: bool,
        align: TextAlign,
    },
    Shape {
        shape: ShapeKind,
        fill: String,
        stroke: Option<String>,
        stroke_width: f64,
    },
}

/// One layer, resolved for drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawItem {
    pub id: LayerId,
    /// Center in logical units.
    pub center: Point,
    pub width: f64,
    pub height: f64,
    /// Clockwise degrees about `center`.
    pub rotation: f64,
    pub opacity: f64,
    pub paint: Paint,
}

impl DrawItem {
    #[must_use]
    pub fn from_layer(layer: &Layer) -> Self {
        let (width, height) = layer.extent();
        Self {
            id: layer.id,
            center: layer.center(),
            width,
            height,
            rotation: layer.rotation,
            opacity: layer.opacity,
            paint: layer.kind.paint(),
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Store revision this scene was built from.
    pub revision: u64,
    /// Visible layers, bottom to top.
    pub items: Vec<DrawItem>,
    /// Layer to outline with resize handles.
    pub active: Option<LayerId>,
    /// Alignment guides to overlay during a drag.
    pub guides: Guides,
}

impl Scene {
    /// Resolve visible layers in stacking order.
    #[must_use]
    pub fn build(layers: &[Layer], revision: u64, active: Option<LayerId>, guides: &Guides) -> Self {
        Self {
            revision,
            items: layers.iter().filter(|l| l.visible).map(DrawItem::from_layer).collect(),
            active,
            guides: guides.clone(),
        }
    }
}

/// Host-side painter.
pub trait RenderAdapter {
    /// Current bounding rectangle of the canvas element, in screen pixels.
    fn canvas_rect(&self) -> CanvasRect;

    /// Paint a committed scene.
    fn paint(&mut self, scene: &Scene);
}
