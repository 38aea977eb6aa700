//! Rendering: draws the full canvas scene to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives read-only views of engine state and produces pixels; it does
//! not mutate any application state.
//!
//! A shape being transformed is drawn as it would look once committed, so the
//! preview and the stored result never disagree.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::camera::Point;
use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{ArrowShape, ImageShape, RectShape, Shape, StrokeShape};
use crate::engine::EngineCore;
use crate::hit;
use crate::transform::{NodeTransform, finalize_transform, node_transform};

/// Arrowhead length in logical units.
const ARROW_SIZE: f64 = 10.0;

/// Arrowhead half-angle in radians (~30°).
const ARROW_ANGLE: f64 = PI / 6.0;

/// Selection dash segment length in screen pixels.
const SELECTION_DASH_PX: f64 = 4.0;

const SELECTION_COLOR: &str = "#1E90FF";
const PLACEHOLDER_FILL: &str = "rgba(60, 64, 70, 0.08)";

/// Draw the full scene: shapes bottom to top, then the selection overlay.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    core: &EngineCore,
    images: &HashMap<String, HtmlImageElement>,
) -> Result<(), JsValue> {
    let camera = &core.camera;

    // Layer 1: clear and set up the stage transform.
    ctx.set_transform(core.dpr, 0.0, 0.0, core.dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, core.viewport_width, core.viewport_height);
    ctx.translate(camera.pan_x, camera.pan_y)?;
    ctx.scale(camera.zoom, camera.zoom)?;

    // Layer 2: shapes in z-order.
    for shape in core.doc.shapes() {
        match core.input.preview_for(shape.id()) {
            Some(pending) => draw_shape(ctx, &finalize_transform(shape, pending), images)?,
            None => draw_shape(ctx, shape, images)?,
        }
    }

    // Layer 3: selection overlay.
    if let Some(shape) = core.ui.selected_id.as_deref().and_then(|id| core.doc.get(id)) {
        let shown = core.input.preview_for(shape.id()).map(|t| finalize_transform(shape, t));
        let shown = shown.as_ref().unwrap_or(shape);
        draw_selection(ctx, shown, core, core.shows_handles())?;
    }

    Ok(())
}

// =============================================================
// Shape dispatch
// =============================================================

fn draw_shape(
    ctx: &CanvasRenderingContext2d,
    shape: &Shape,
    images: &HashMap<String, HtmlImageElement>,
) -> Result<(), JsValue> {
    ctx.save();
    apply_node_transform(ctx, node_transform(shape))?;
    let result = match shape {
        Shape::Stroke(s) => {
            draw_stroke(ctx, s);
            Ok(())
        }
        Shape::Rect(r) => {
            draw_rect(ctx, r);
            Ok(())
        }
        Shape::Arrow(a) => {
            draw_arrow(ctx, a);
            Ok(())
        }
        Shape::Image(img) => draw_image(ctx, img, images.get(&img.src)),
    };
    ctx.restore();
    result
}

// =============================================================
// Shape renderers
// =============================================================

fn draw_stroke(ctx: &CanvasRenderingContext2d, s: &StrokeShape) {
    let pts = s.point_pairs();
    let Some(first) = pts.first() else {
        return;
    };
    ctx.set_stroke_style_str(&s.stroke);
    ctx.set_line_width(s.stroke_width);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");

    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    if pts.len() == 1 {
        ctx.line_to(first.x, first.y);
    }
    for p in &pts[1..] {
        ctx.line_to(p.x, p.y);
    }
    ctx.stroke();
}

fn draw_rect(ctx: &CanvasRenderingContext2d, r: &RectShape) {
    ctx.set_stroke_style_str(&r.stroke);
    ctx.set_line_width(r.stroke_width);
    ctx.stroke_rect(0.0, 0.0, r.width, r.height);
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, a: &ArrowShape) {
    let (start, end) = (a.start(), a.end());
    ctx.set_stroke_style_str(&a.stroke);
    ctx.set_fill_style_str(&a.stroke);
    ctx.set_line_width(a.stroke_width);

    ctx.begin_path();
    ctx.move_to(start.x, start.y);
    ctx.line_to(end.x, end.y);
    ctx.stroke();

    let angle = (end.y - start.y).atan2(end.x - start.x);
    draw_arrowhead(ctx, end.x, end.y, angle);
}

fn draw_arrowhead(ctx: &CanvasRenderingContext2d, tip_x: f64, tip_y: f64, angle: f64) {
    let x1 = tip_x - ARROW_SIZE * (angle - ARROW_ANGLE).cos();
    let y1 = tip_y - ARROW_SIZE * (angle - ARROW_ANGLE).sin();
    let x2 = tip_x - ARROW_SIZE * (angle + ARROW_ANGLE).cos();
    let y2 = tip_y - ARROW_SIZE * (angle + ARROW_ANGLE).sin();

    ctx.begin_path();
    ctx.move_to(tip_x, tip_y);
    ctx.line_to(x1, y1);
    ctx.line_to(x2, y2);
    ctx.close_path();
    ctx.fill();
}

/// Draw a decoded image, or a placeholder box while it is still loading.
/// Video assets only ever show their poster image.
fn draw_image(ctx: &CanvasRenderingContext2d, img: &ImageShape, el: Option<&HtmlImageElement>) -> Result<(), JsValue> {
    let (w, h) = img.size();
    match el.filter(|el| el.complete() && el.natural_width() > 0) {
        Some(el) => ctx.draw_image_with_html_image_element_and_dw_and_dh(el, 0.0, 0.0, w, h),
        None => {
            ctx.set_fill_style_str(PLACEHOLDER_FILL);
            ctx.fill_rect(0.0, 0.0, w, h);
            Ok(())
        }
    }
}

// =============================================================
// Selection
// =============================================================

fn draw_selection(
    ctx: &CanvasRenderingContext2d,
    shape: &Shape,
    core: &EngineCore,
    show_handles: bool,
) -> Result<(), JsValue> {
    let zoom = core.camera.zoom;
    let t = node_transform(shape);
    let corners = shape.local_bounds().corners().map(|c| t.apply(c));

    ctx.save();
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0 / zoom);
    let dash_world = SELECTION_DASH_PX / zoom;
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash_world.into());
    dash_array.push(&dash_world.into());
    ctx.set_line_dash(&dash_array)?;
    trace_polygon(ctx, &corners);
    ctx.stroke();
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();

    if !show_handles {
        return Ok(());
    }

    let half = HANDLE_RADIUS_PX / 2.0 / zoom;
    ctx.save();
    ctx.set_fill_style_str("#fff");
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0 / zoom);

    for (_, pos) in hit::handle_positions(shape) {
        ctx.fill_rect(pos.x - half, pos.y - half, half * 2.0, half * 2.0);
        ctx.stroke_rect(pos.x - half, pos.y - half, half * 2.0, half * 2.0);
    }

    // Rotate handle, tethered to the top edge midpoint.
    let rh = hit::rotate_handle_position(shape, &core.camera);
    let bounds = shape.local_bounds();
    let top = t.apply(Point::new(bounds.center().x, bounds.min_y));
    ctx.begin_path();
    ctx.move_to(top.x, top.y);
    ctx.line_to(rh.x, rh.y);
    ctx.stroke();

    ctx.begin_path();
    ctx.arc(rh.x, rh.y, half, 0.0, 2.0 * PI)?;
    ctx.fill();
    ctx.stroke();

    ctx.restore();
    Ok(())
}

// =============================================================
// Helpers
// =============================================================

fn apply_node_transform(ctx: &CanvasRenderingContext2d, t: NodeTransform) -> Result<(), JsValue> {
    ctx.translate(t.x, t.y)?;
    ctx.rotate(t.rotation.to_radians())?;
    ctx.scale(t.scale_x, t.scale_y)?;
    Ok(())
}

fn trace_polygon(ctx: &CanvasRenderingContext2d, pts: &[Point]) {
    let Some(first) = pts.first() else {
        return;
    };
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for p in &pts[1..] {
        ctx.line_to(p.x, p.y);
    }
    ctx.close_path();
}
