//! Canvas logical space and its mapping onto rendered pixels.
//!
//! Layers live in a fixed authoring coordinate system (`logical_width` ×
//! `logical_height`). The host renders that canvas at whatever pixel size the
//! page allows and reports the element's bounding rectangle; pointer events
//! arrive in the same pixel space as that rectangle.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::placement::PlacementError;

/// A point in either screen or logical space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Rotate this point by `degrees` (clockwise in y-down space) about `pivot`.
    #[must_use]
    pub fn rotated_about(self, pivot: Point, degrees: f64) -> Point {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let dx = self.x - pivot.x;
        let dy = self.y - pivot.y;
        Point { x: pivot.x + dx * cos - dy * sin, y: pivot.y + dx * sin + dy * cos }
    }
}

/// A displacement in either screen or logical space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Delta {
    pub dx: f64,
    pub dy: f64,
}

impl Delta {
    #[must_use]
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Displacement from `from` to `to`.
    #[must_use]
    pub fn between(from: Point, to: Point) -> Self {
        Self { dx: to.x - from.x, dy: to.y - from.y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.dx.is_finite() && self.dy.is_finite()
    }

    /// Rotate this displacement by `degrees` about the origin.
    #[must_use]
    pub fn rotated(self, degrees: f64) -> Self {
        let p = Point::new(self.dx, self.dy).rotated_about(Point::default(), degrees);
        Self { dx: p.x, dy: p.y }
    }
}

/// Bounding rectangle of the rendered canvas element, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    /// A rect anchored at the screen origin.
    #[must_use]
    pub fn sized(width: f64, height: f64) -> Self {
        Self { left: 0.0, top: 0.0, width, height }
    }

    fn is_usable(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Logical canvas size plus the most recently reported rendered bounds.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    logical_width: f64,
    logical_height: f64,
    bounds: Option<CanvasRect>,
}

impl Viewport {
    /// A viewport with no rendered bounds yet. Conversions fail until
    /// [`Viewport::set_bounds`] is called.
    #[must_use]
    pub fn new(logical_width: f64, logical_height: f64) -> Self {
        Self { logical_width, logical_height, bounds: None }
    }

    /// Bind the rendered bounding rectangle used for screen↔logical scaling.
    pub fn set_bounds(&mut self, rect: CanvasRect) -> Result<(), PlacementError> {
        if !rect.is_usable() {
            error!(width = rect.width, height = rect.height, "rejecting unusable canvas bounds");
            return Err(PlacementError::InvalidBounds { width: rect.width, height: rect.height });
        }
        self.bounds = Some(rect);
        Ok(())
    }

    #[must_use]
    pub fn bounds(&self) -> Option<CanvasRect> {
        self.bounds
    }

    #[must_use]
    pub fn logical_width(&self) -> f64 {
        self.logical_width
    }

    #[must_use]
    pub fn logical_height(&self) -> f64 {
        self.logical_height
    }

    /// Center of the logical canvas.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.logical_width / 2.0, self.logical_height / 2.0)
    }

    /// Logical units per rendered pixel on each axis.
    pub fn scale(&self) -> Result<Delta, PlacementError> {
        let Some(rect) = self.bounds else {
            error!("canvas bounds used before set_canvas_bounds");
            return Err(PlacementError::CanvasBoundsUnset);
        };
        Ok(Delta::new(self.logical_width / rect.width, self.logical_height / rect.height))
    }

    /// Convert a screen-space point to logical canvas coordinates.
    pub fn screen_to_logical(&self, screen: Point) -> Result<Point, PlacementError> {
        let scale = self.scale()?;
        let (left, top) = self.bounds.map_or((0.0, 0.0), |r| (r.left, r.top));
        Ok(Point::new((screen.x - left) * scale.dx, (screen.y - top) * scale.dy))
    }

    /// Convert a logical point to screen space, for overlays drawn by the host.
    pub fn logical_to_screen(&self, logical: Point) -> Result<Point, PlacementError> {
        let scale = self.scale()?;
        let (left, top) = self.bounds.map_or((0.0, 0.0), |r| (r.left, r.top));
        Ok(Point::new(logical.x / scale.dx + left, logical.y / scale.dy + top))
    }

    /// Convert a screen-space pointer delta to logical units.
    pub fn screen_delta_to_logical(&self, delta: Delta) -> Result<Delta, PlacementError> {
        let scale = self.scale()?;
        Ok(Delta::new(delta.dx * scale.dx, delta.dy * scale.dy))
    }

    /// Convert a screen-space distance to logical units, using the coarser axis.
    pub fn screen_dist_to_logical(&self, dist: f64) -> Result<f64, PlacementError> {
        let scale = self.scale()?;
        Ok(dist * scale.dx.max(scale.dy))
    }
}
