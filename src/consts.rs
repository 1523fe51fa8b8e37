//! Shared numeric constants for the placement core.

// ── Canvas ──────────────────────────────────────────────────────

/// Default logical canvas width (authoring units, not screen pixels).
pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;

/// Default logical canvas height.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 600.0;

// ── Placement ───────────────────────────────────────────────────

/// Grid pitch used when snap-to-grid is enabled, in logical units.
pub const DEFAULT_GRID_SIZE: f64 = 10.0;

/// Smallest width or height a layer can be resized to, in logical units.
pub const MIN_LAYER_SIZE: f64 = 20.0;

/// Distance within which a layer center is pulled onto an alignment guide.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 5.0;

/// Extent used for an `Auto` dimension when the content has no intrinsic size.
pub const DEFAULT_LAYER_EXTENT: f64 = 100.0;

// ── Text metrics ────────────────────────────────────────────────

/// Rough glyph advance as a fraction of font size, for auto-sized text.
pub const TEXT_ADVANCE_RATIO: f64 = 0.6;

/// Line height as a multiple of font size, for auto-sized text.
pub const TEXT_LINE_HEIGHT: f64 = 1.2;

/// Default font size for new text layers.
pub const DEFAULT_FONT_SIZE: f64 = 24.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

// ── Drawing ─────────────────────────────────────────────────────

/// Angle between adjacent star points (outer to inner).
pub const FRAC_PI_5: f64 = std::f64::consts::PI / 5.0;

/// Ratio of a star's inner radius to its outer radius.
pub const STAR_INNER_RATIO: f64 = 0.5;

/// Selection outline and guide dash segment length, in screen pixels.
pub const SELECTION_DASH_PX: f64 = 4.0;
