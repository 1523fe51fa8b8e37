//! Built-in [`RenderAdapter`] for an HTML `<canvas>` element.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It paints a [`Scene`] in logical units, scaled to the element's backing
//! store, and never mutates editor state. Hosts with their own renderer (DOM
//! layers, WebGL) implement [`RenderAdapter`] themselves and skip this.
//!
//! Fallible `Canvas2D` calls propagate `JsValue` errors up to
//! [`RenderAdapter::paint`], which logs them.

use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, PI};

use tracing::{debug, error};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::config::EditorConfig;
use crate::consts::{FRAC_PI_5, SELECTION_DASH_PX, STAR_INNER_RATIO, TEXT_LINE_HEIGHT};
use crate::layer::{ShapeKind, TextAlign};
use crate::render::{DrawItem, Paint, RenderAdapter, Scene};
use crate::viewport::CanvasRect;

const SELECTION_COLOR: &str = "#1E90FF";
const GUIDE_COLOR: &str = "#FF3B7F";

/// Paints scenes onto a 2D canvas context.
pub struct Canvas2dAdapter {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    logical_width: f64,
    logical_height: f64,
    handle_radius_px: f64,
    /// Decoded images by URL. A frame painted before an image finishes
    /// loading skips it; the host repaints on the image's `load` event.
    images: HashMap<String, HtmlImageElement>,
}

impl Canvas2dAdapter {
    /// Wrap a canvas element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the element has no 2D context.
    pub fn new(canvas: HtmlCanvasElement, config: &EditorConfig) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            canvas,
            ctx,
            logical_width: config.canvas_width,
            logical_height: config.canvas_height,
            handle_radius_px: config.handle_radius_px,
            images: HashMap::new(),
        })
    }

    /// Logical units per CSS pixel, from the element's current layout box.
    fn units_per_px(&self) -> f64 {
        let rect = self.canvas_rect();
        if rect.width > 0.0 { self.logical_width / rect.width } else { 1.0 }
    }

    fn draw(&mut self, scene: &Scene) -> Result<(), JsValue> {
        let ctx = self.ctx.clone();
        let sx = f64::from(self.canvas.width()) / self.logical_width;
        let sy = f64::from(self.canvas.height()) / self.logical_height;

        ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        ctx.clear_rect(0.0, 0.0, f64::from(self.canvas.width()), f64::from(self.canvas.height()));
        ctx.set_transform(sx, 0.0, 0.0, sy, 0.0, 0.0)?;

        for item in &scene.items {
            self.draw_item(&ctx, item)?;
        }

        let unit = self.units_per_px();
        if let Some(active) = scene.active.and_then(|id| scene.items.iter().find(|i| i.id == id)) {
            draw_selection(&ctx, active, unit, self.handle_radius_px * unit)?;
        }
        self.draw_guides(&ctx, scene, unit)?;
        debug!(revision = scene.revision, items = scene.items.len(), "scene painted");
        Ok(())
    }

    fn draw_item(&mut self, ctx: &CanvasRenderingContext2d, item: &DrawItem) -> Result<(), JsValue> {
        if item.width <= 0.0 || item.height <= 0.0 {
            return Ok(());
        }
        ctx.save();
        ctx.translate(item.center.x, item.center.y)?;
        ctx.rotate(item.rotation.to_radians())?;
        ctx.set_global_alpha(item.opacity);

        let result = match &item.paint {
            Paint::Image { url } => self.draw_image(ctx, url, item),
            Paint::Text { text, font_family, font_size, color, bold, italic, align } => {
                ctx.set_font(&font_spec(font_family, *font_size, *bold, *italic));
                ctx.set_fill_style_str(color);
                draw_text(ctx, text, *font_size, *align, item)
            }
            Paint::Shape { shape, fill, stroke, stroke_width } => {
                shape_path(ctx, *shape, item.width / 2.0, item.height / 2.0)?;
                ctx.set_fill_style_str(fill);
                ctx.fill();
                if let Some(stroke) = stroke.as_deref().filter(|_| *stroke_width > 0.0) {
                    ctx.set_stroke_style_str(stroke);
                    ctx.set_line_width(*stroke_width);
                    ctx.stroke();
                }
                Ok(())
            }
        };

        ctx.restore();
        result
    }

    fn draw_image(&mut self, ctx: &CanvasRenderingContext2d, url: &str, item: &DrawItem) -> Result<(), JsValue> {
        if !self.images.contains_key(url) {
            let img = HtmlImageElement::new()?;
            img.set_src(url);
            self.images.insert(url.to_owned(), img);
        }
        let Some(img) = self.images.get(url) else {
            return Ok(());
        };
        if !img.complete() || img.natural_width() == 0 {
            return Ok(());
        }
        ctx.draw_image_with_html_image_element_and_dw_and_dh(
            img,
            -item.width / 2.0,
            -item.height / 2.0,
            item.width,
            item.height,
        )
    }

    fn draw_guides(&self, ctx: &CanvasRenderingContext2d, scene: &Scene, unit: f64) -> Result<(), JsValue> {
        if scene.guides.is_empty() {
            return Ok(());
        }
        ctx.save();
        set_dash(ctx, SELECTION_DASH_PX * unit)?;
        ctx.set_stroke_style_str(GUIDE_COLOR);
        ctx.set_line_width(unit);
        ctx.begin_path();
        for &y in &scene.guides.horizontal {
            ctx.move_to(0.0, y);
            ctx.line_to(self.logical_width, y);
        }
        for &x in &scene.guides.vertical {
            ctx.move_to(x, 0.0);
            ctx.line_to(x, self.logical_height);
        }
        ctx.stroke();
        ctx.set_line_dash(&js_sys::Array::new())?;
        ctx.restore();
        Ok(())
    }
}

impl RenderAdapter for Canvas2dAdapter {
    fn canvas_rect(&self) -> CanvasRect {
        let r = self.canvas.get_bounding_client_rect();
        CanvasRect { left: r.left(), top: r.top(), width: r.width(), height: r.height() }
    }

    fn paint(&mut self, scene: &Scene) {
        if let Err(err) = self.draw(scene) {
            error!(?err, revision = scene.revision, "canvas paint failed");
        }
    }
}

// =============================================================
// Content
// =============================================================

fn font_spec(family: &str, size: f64, bold: bool, italic: bool) -> String {
    let style = if italic { "italic " } else { "" };
    let weight = if bold { "bold " } else { "" };
    format!("{style}{weight}{size}px {family}")
}

fn draw_text(
    ctx: &CanvasRenderingContext2d,
    text: &str,
    font_size: f64,
    align: TextAlign,
    item: &DrawItem,
) -> Result<(), JsValue> {
    let hw = item.width / 2.0;
    let (x, css_align) = match align {
        TextAlign::Left => (-hw, "left"),
        TextAlign::Center => (0.0, "center"),
        TextAlign::Right => (hw, "right"),
    };
    ctx.set_text_align(css_align);
    ctx.set_text_baseline("middle");

    let line_height = font_size * TEXT_LINE_HEIGHT;
    let lines: Vec<&str> = text.split('\n').collect();
    #[allow(clippy::cast_precision_loss)]
    let first_y = -line_height * (lines.len() as f64 - 1.0) / 2.0;
    for (i, line) in lines.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let y = first_y + line_height * i as f64;
        ctx.fill_text(line, x, y)?;
    }
    Ok(())
}

/// Build the outline path for a shape centered on the origin.
#[allow(clippy::similar_names)]
fn shape_path(ctx: &CanvasRenderingContext2d, shape: ShapeKind, hw: f64, hh: f64) -> Result<(), JsValue> {
    ctx.begin_path();
    match shape {
        ShapeKind::Rect => ctx.rect(-hw, -hh, hw * 2.0, hh * 2.0),
        ShapeKind::Ellipse => ctx.ellipse(0.0, 0.0, hw, hh, 0.0, 0.0, 2.0 * PI)?,
        ShapeKind::Triangle => {
            ctx.move_to(0.0, -hh);
            ctx.line_to(hw, hh);
            ctx.line_to(-hw, hh);
            ctx.close_path();
        }
        ShapeKind::Star => {
            let (rx_inner, ry_inner) = (hw * STAR_INNER_RATIO, hh * STAR_INNER_RATIO);
            for i in 0..10 {
                let angle = FRAC_PI_5.mul_add(f64::from(i), -FRAC_PI_2);
                let (rx, ry) = if i % 2 == 0 { (hw, hh) } else { (rx_inner, ry_inner) };
                let (px, py) = (rx * angle.cos(), ry * angle.sin());
                if i == 0 {
                    ctx.move_to(px, py);
                } else {
                    ctx.line_to(px, py);
                }
            }
            ctx.close_path();
        }
    }
    Ok(())
}

// =============================================================
// Selection UI
// =============================================================

/// Dashed outline plus four corner handles, rotated with the layer.
fn draw_selection(ctx: &CanvasRenderingContext2d, item: &DrawItem, unit: f64, handle: f64) -> Result<(), JsValue> {
    let (hw, hh) = (item.width / 2.0, item.height / 2.0);
    ctx.save();
    ctx.translate(item.center.x, item.center.y)?;
    ctx.rotate(item.rotation.to_radians())?;

    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(unit);
    set_dash(ctx, SELECTION_DASH_PX * unit)?;
    ctx.stroke_rect(-hw, -hh, item.width, item.height);
    ctx.set_line_dash(&js_sys::Array::new())?;

    ctx.set_fill_style_str("#fff");
    for (x, y) in [(-hw, -hh), (hw, -hh), (-hw, hh), (hw, hh)] {
        ctx.fill_rect(x - handle, y - handle, handle * 2.0, handle * 2.0);
        ctx.stroke_rect(x - handle, y - handle, handle * 2.0, handle * 2.0);
    }

    ctx.restore();
    Ok(())
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: f64) -> Result<(), JsValue> {
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash.into());
    dash_array.push(&dash.into());
    ctx.set_line_dash(&dash_array)
}
