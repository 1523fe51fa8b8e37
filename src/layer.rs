//! Layer model: the positionable items composited onto a card.
//!
//! A [`Layer`] pairs per-kind content ([`LayerKind`]) with placement state.
//! Placement is center-based: `position.x`/`position.y` is the middle of the
//! layer's box, and rotation pivots around that point. Either dimension may be
//! [`Dimension::Auto`], in which case geometry falls back to the content's
//! intrinsic extent.
//!
//! The [`LayerContent`] trait is the one place per-kind behavior lives
//! (intrinsic size, paint instructions, JSON description, local hit test), so
//! callers never branch on the kind themselves.

#[cfg(test)]
#[path = "layer_test.rs"]
mod layer_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DEFAULT_FONT_SIZE, DEFAULT_LAYER_EXTENT, TEXT_ADVANCE_RATIO, TEXT_LINE_HEIGHT};
use crate::hit::ResizeHandle;
use crate::render::Paint;
use crate::viewport::Point;

/// Unique identifier for a layer.
pub type LayerId = Uuid;

// =============================================================
// Geometry value types
// =============================================================

/// One axis of a layer's size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Explicit extent in logical units.
    Pixels(f64),
    /// Sized by the content.
    Auto,
}

impl Dimension {
    /// The explicit extent, if any.
    #[must_use]
    pub fn pixels(self) -> Option<f64> {
        match self {
            Self::Pixels(v) => Some(v),
            Self::Auto => None,
        }
    }

    #[must_use]
    pub fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Concrete extent, using `intrinsic` for `Auto`.
    #[must_use]
    pub fn resolve(self, intrinsic: f64) -> f64 {
        match self {
            Self::Pixels(v) => v,
            Self::Auto => intrinsic,
        }
    }
}

/// Center position plus stacking key.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    /// Relative stacking order; higher draws above lower. Not dense.
    pub z: i64,
}

impl Position {
    #[must_use]
    pub fn new(x: f64, y: f64, z: i64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: Dimension,
    pub height: Dimension,
}

impl Size {
    #[must_use]
    pub fn pixels(width: f64, height: f64) -> Self {
        Self { width: Dimension::Pixels(width), height: Dimension::Pixels(height) }
    }

    #[must_use]
    pub fn auto() -> Self {
        Self { width: Dimension::Auto, height: Dimension::Auto }
    }

    /// `width / height` when both are explicit, finite and positive.
    #[must_use]
    pub fn aspect_ratio(&self) -> Option<f64> {
        let (Some(w), Some(h)) = (self.width.pixels(), self.height.pixels()) else {
            return None;
        };
        if w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0 { Some(w / h) } else { None }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::auto()
    }
}

// =============================================================
// Content variants
// =============================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    pub url: String,
    /// Decoded pixel size, once known. Drives `Auto` sizing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_height: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    /// CSS color string.
    pub color: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub align: TextAlign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Ellipse,
    Triangle,
    Star,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeContent {
    pub shape: ShapeKind,
    /// CSS fill color.
    pub fill: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default)]
    pub stroke_width: f64,
}

/// Per-kind content of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerKind {
    Image(ImageContent),
    Text(TextContent),
    Shape(ShapeContent),
}

/// Behavior that differs by content kind.
pub trait LayerContent {
    /// Short stable name of the kind (`"image"`, `"text"`, `"shape"`).
    fn kind_name(&self) -> &'static str;

    /// Natural `(width, height)` used to resolve `Auto` dimensions.
    fn intrinsic_size(&self) -> Option<(f64, f64)>;

    /// Paint instructions for the render adapter.
    fn paint(&self) -> Paint;

    /// Self-describing JSON form, tagged with the kind name.
    fn describe(&self) -> serde_json::Value;

    /// Hit test in the layer's local, unrotated frame (origin at the center).
    ///
    /// Every kind picks by its full box; edges count as inside.
    fn contains_local(&self, local: Point, half_width: f64, half_height: f64) -> bool {
        local.x.abs() <= half_width && local.y.abs() <= half_height
    }
}

impl LayerContent for ImageContent {
    fn kind_name(&self) -> &'static str {
        "image"
    }

    fn intrinsic_size(&self) -> Option<(f64, f64)> {
        match (self.natural_width, self.natural_height) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Some((w, h)),
            _ => None,
        }
    }

    fn paint(&self) -> Paint {
        Paint::Image { url: self.url.clone() }
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.kind_name(),
            "url": self.url,
            "natural_width": self.natural_width,
            "natural_height": self.natural_height,
        })
    }
}

impl LayerContent for TextContent {
    fn kind_name(&self) -> &'static str {
        "text"
    }

    /// Estimated from font size: widest line × advance, line count × line height.
    fn intrinsic_size(&self) -> Option<(f64, f64)> {
        let font_size =
            if self.font_size.is_finite() && self.font_size > 0.0 { self.font_size } else { DEFAULT_FONT_SIZE };
        let lines = self.text.lines().count().max(1);
        let widest = self.text.lines().map(|l| l.chars().count()).max().unwrap_or(0).max(1);
        #[allow(clippy::cast_precision_loss)]
        let (widest, lines) = (widest as f64, lines as f64);
        Some((widest * font_size * TEXT_ADVANCE_RATIO, lines * font_size * TEXT_LINE_HEIGHT))
    }

    fn paint(&self) -> Paint {
        Paint::Text {
            text: self.text.clone(),
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            color: self.color.clone(),
            bold: self.bold,
            italic: self.italic,
            align: self.align,
        }
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.kind_name(),
            "text": self.text,
            "font_family": self.font_family,
            "font_size": self.font_size,
            "color": self.color,
            "bold": self.bold,
            "italic": self.italic,
            "align": self.align,
        })
    }
}

impl LayerContent for ShapeContent {
    fn kind_name(&self) -> &'static str {
        "shape"
    }

    fn intrinsic_size(&self) -> Option<(f64, f64)> {
        None
    }

    fn paint(&self) -> Paint {
        Paint::Shape {
            shape: self.shape,
            fill: self.fill.clone(),
            stroke: self.stroke.clone(),
            stroke_width: self.stroke_width,
        }
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.kind_name(),
            "shape": self.shape,
            "fill": self.fill,
            "stroke": self.stroke,
            "stroke_width": self.stroke_width,
        })
    }
}

impl LayerKind {
    fn content(&self) -> &dyn LayerContent {
        match self {
            Self::Image(c) => c,
            Self::Text(c) => c,
            Self::Shape(c) => c,
        }
    }
}

impl LayerContent for LayerKind {
    fn kind_name(&self) -> &'static str {
        self.content().kind_name()
    }

    fn intrinsic_size(&self) -> Option<(f64, f64)> {
        self.content().intrinsic_size()
    }

    fn paint(&self) -> Paint {
        self.content().paint()
    }

    fn describe(&self) -> serde_json::Value {
        self.content().describe()
    }

    fn contains_local(&self, local: Point, half_width: f64, half_height: f64) -> bool {
        self.content().contains_local(local, half_width, half_height)
    }
}

// =============================================================
// Layer
// =============================================================

/// A layer as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub kind: LayerKind,
    pub position: Position,
    pub size: Size,
    /// Clockwise degrees about the center. Not normalized.
    pub rotation: f64,
    /// 0.0 (transparent) to 1.0 (opaque).
    pub opacity: f64,
    pub visible: bool,
    /// Locked layers can be selected but never moved, resized or rotated.
    pub locked: bool,
    /// Cached `width / height`; `None` while either dimension is `Auto`.
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
}

impl Layer {
    #[must_use]
    pub fn center(&self) -> Point {
        self.position.point()
    }

    /// Resolved `(width, height)` in logical units.
    #[must_use]
    pub fn extent(&self) -> (f64, f64) {
        let (iw, ih) = self.kind.intrinsic_size().unwrap_or((DEFAULT_LAYER_EXTENT, DEFAULT_LAYER_EXTENT));
        (self.size.width.resolve(iw), self.size.height.resolve(ih))
    }

    #[must_use]
    pub fn half_extent(&self) -> (f64, f64) {
        let (w, h) = self.extent();
        (w / 2.0, h / 2.0)
    }

    /// Canvas-space location of a corner, rotation applied.
    #[must_use]
    pub fn corner(&self, handle: ResizeHandle) -> Point {
        let (hw, hh) = self.half_extent();
        let (sx, sy) = handle.signs();
        let center = self.center();
        Point::new(center.x + sx * hw, center.y + sy * hh).rotated_about(center, self.rotation)
    }

    /// Recompute the cached aspect ratio from the current size.
    pub fn refresh_aspect_ratio(&mut self) {
        self.aspect_ratio = self.size.aspect_ratio();
    }
}

// =============================================================
// Creation specs and sparse updates
// =============================================================

/// Everything needed to create a layer except its id.
///
/// A missing `position` means "let placement decide" (canvas center).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub kind: LayerKind,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
}

fn default_opacity() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

impl LayerSpec {
    /// A visible, unlocked, unrotated spec with auto size and no position.
    #[must_use]
    pub fn new(kind: LayerKind) -> Self {
        Self { kind, position: None, size: Size::auto(), rotation: 0.0, opacity: 1.0, visible: true, locked: false }
    }

    #[must_use]
    pub fn image(url: impl Into<String>) -> Self {
        Self::new(LayerKind::Image(ImageContent { url: url.into(), natural_width: None, natural_height: None }))
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(LayerKind::Text(TextContent {
            text: text.into(),
            font_family: "sans-serif".to_owned(),
            font_size: DEFAULT_FONT_SIZE,
            color: "#1F1A17".to_owned(),
            bold: false,
            italic: false,
            align: TextAlign::Center,
        }))
    }

    #[must_use]
    pub fn shape(shape: ShapeKind, fill: impl Into<String>) -> Self {
        Self::new(LayerKind::Shape(ShapeContent { shape, fill: fill.into(), stroke: None, stroke_width: 0.0 }))
    }

    /// Place the center at `(x, y)`.
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position::new(x, y, 0));
        self
    }

    #[must_use]
    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.size = Size::pixels(width, height);
        self
    }

    #[must_use]
    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    #[must_use]
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Sparse update for a layer. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// New stacking key. The store re-sorts its list to match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    /// Replacement content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<LayerKind>,
}

impl LayerPatch {
    /// Patch that moves the center to `position` (x/y only).
    #[must_use]
    pub fn position(position: Position) -> Self {
        Self { x: Some(position.x), y: Some(position.y), ..Default::default() }
    }

    /// Patch that sets both dimensions.
    #[must_use]
    pub fn size(size: Size) -> Self {
        Self { width: Some(size.width), height: Some(size.height), ..Default::default() }
    }

    /// The fields this patch names, read back from `layer`. After a commit
    /// this is what the store actually holds, with clamped or discarded
    /// values replaced by the stored ones.
    #[must_use]
    pub fn read_back(&self, layer: &Layer) -> Self {
        Self {
            x: self.x.map(|_| layer.position.x),
            y: self.y.map(|_| layer.position.y),
            z: self.z.map(|_| layer.position.z),
            width: self.width.map(|_| layer.size.width),
            height: self.height.map(|_| layer.size.height),
            rotation: self.rotation.map(|_| layer.rotation),
            opacity: self.opacity.map(|_| layer.opacity),
            visible: self.visible.map(|_| layer.visible),
            locked: self.locked.map(|_| layer.locked),
            kind: self.kind.as_ref().map(|_| layer.kind.clone()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
