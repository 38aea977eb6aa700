//! Canvas engine: the interaction state machine over the scene graph.
//!
//! [`EngineCore`] holds every piece of state that does not depend on the
//! browser (scene graph, camera, UI state, the active gesture) and turns
//! pointer, wheel and keyboard events into scene mutations plus a list of
//! [`Action`]s for the host. [`Engine`] wraps the core together with the
//! `<canvas>` element and the decoded image cache.
//!
//! Read-only mode blocks every mutating transition. Pan, zoom and
//! select-for-viewing stay available.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::HashMap;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::camera::{Camera, Point};
use crate::consts::{ASSET_DEFAULT_W, ASSET_PLACEHOLDER_H, FALLBACK_VIEWPORT_H, FALLBACK_VIEWPORT_W, ZOOM_STEP};
use crate::doc::{
    ArrowShape, AssetKind, ImageShape, RectShape, SceneGraph, SceneSnapshot, Shape, ShapeId, StrokeShape, new_shape_id,
};
use crate::hit::{HitPart, hit_test};
use crate::input::{Button, InputState, Key, Modifiers, Tool, UiState, WheelDelta};
use crate::render;
use crate::transform::{finalize_transform, node_transform, resized, rotated, translated};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ShapeCreated(ShapeId),
    /// A shape's stored geometry changed (draw finished, transform committed, auto-size).
    ShapeUpdated(ShapeId),
    ShapeDeleted(ShapeId),
    SelectionChanged(Option<ShapeId>),
    SetCursor(String),
    RenderNeeded,
}

/// Core engine state. Separated from [`Engine`] so it can be tested without a browser.
pub struct EngineCore {
    pub doc: SceneGraph,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            doc: SceneGraph::new(),
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Replace the scene and viewport with a loaded snapshot. Clears selection
    /// and abandons any gesture in progress.
    pub fn load_snapshot(&mut self, snapshot: SceneSnapshot) {
        self.doc.load(snapshot.shapes);
        let zoom = if snapshot.stage_scale.is_finite() && snapshot.stage_scale > 0.0 { snapshot.stage_scale } else { 1.0 };
        self.camera = Camera { pan_x: snapshot.stage_pos.x, pan_y: snapshot.stage_pos.y, zoom };
        self.ui.selected_id = None;
        self.input = InputState::Idle;
    }

    /// Current scene and viewport as a persistable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            shapes: self.doc.shapes().to_vec(),
            stage_pos: Point::new(self.camera.pan_x, self.camera.pan_y),
            stage_scale: self.camera.zoom,
        }
    }

    // --- Tool / style / mode ---

    /// Set the active tool. Any gesture in progress is abandoned.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.input = InputState::Idle;
        self.ui.tool = tool;
        vec![Action::SetCursor(tool.cursor().to_owned()), Action::RenderNeeded]
    }

    pub fn set_stroke(&mut self, color: &str) {
        color.clone_into(&mut self.ui.stroke);
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.ui.stroke_width = width;
    }

    /// Enter or leave read-only mode. Entering it abandons any gesture.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.ui.read_only = read_only;
        if read_only {
            self.input = InputState::Idle;
        }
    }

    /// Update viewport dimensions (CSS pixels) and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = if dpr > 0.0 { dpr } else { 1.0 };
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(screen_pt);

        match self.ui.tool {
            Tool::Hand => {
                self.input = InputState::Panning { last_screen: screen_pt };
                vec![Action::SetCursor("grabbing".into())]
            }
            Tool::Pen | Tool::Rect | Tool::Arrow => self.begin_drawing(world),
            Tool::Select => self.select_at(world),
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        if matches!(self.input, InputState::Idle) {
            return self.hover_cursor(world);
        }

        match &mut self.input {
            InputState::Idle => Vec::new(),
            InputState::Panning { last_screen } => {
                let (dx, dy) = (screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                *last_screen = screen_pt;
                self.camera.pan_by(dx, dy);
                vec![Action::RenderNeeded]
            }
            InputState::Drawing { id, anchor } => {
                let anchor = *anchor;
                let Some(last) = self.doc.last_mut() else {
                    return Vec::new();
                };
                if last.id() != id.as_str() {
                    return Vec::new();
                }
                match last {
                    Shape::Stroke(s) => s.push_point(world),
                    Shape::Rect(r) => {
                        r.width = world.x - anchor.x;
                        r.height = world.y - anchor.y;
                    }
                    Shape::Arrow(a) => a.set_end(world),
                    Shape::Image(_) => {}
                }
                vec![Action::RenderNeeded]
            }
            InputState::Transforming { base, bounds, part, start_world, pending, .. } => {
                *pending = match *part {
                    HitPart::Body => translated(*base, world.x - start_world.x, world.y - start_world.y),
                    HitPart::ResizeHandle(anchor) => resized(*base, *bounds, anchor, world),
                    HitPart::RotateHandle => rotated(*base, *bounds, *start_world, world),
                };
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Panning { .. } => vec![Action::SetCursor(self.ui.tool.cursor().to_owned())],
            InputState::Drawing { id, .. } => vec![Action::ShapeUpdated(id), Action::RenderNeeded],
            InputState::Transforming { id, original, base, pending, .. } => {
                if pending == base {
                    return Vec::new();
                }
                let committed = finalize_transform(&original, pending);
                if !self.doc.replace(&id, committed) {
                    log::warn!("transformed shape {id} vanished before commit");
                    return vec![Action::RenderNeeded];
                }
                vec![Action::ShapeUpdated(id), Action::RenderNeeded]
            }
        }
    }

    /// Wheel zoom around the pointer: one `ZOOM_STEP` per event, scrolling
    /// away from the user zooms in.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if delta.dy == 0.0 {
            return Vec::new();
        }
        let zoom = if delta.dy < 0.0 { self.camera.zoom * ZOOM_STEP } else { self.camera.zoom / ZOOM_STEP };
        self.camera.zoom_at(screen_pt, zoom);
        vec![Action::RenderNeeded]
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        match key.0.as_str() {
            "Delete" | "Backspace" => self.delete_selected(),
            "Escape" => self.clear_selection(),
            other if !modifiers.ctrl && !modifiers.meta && !modifiers.alt => {
                Tool::from_shortcut(other).map(|tool| self.set_tool(tool)).unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }

    // --- Scene commands ---

    /// Remove the selected shape and clear selection. No-op when nothing is
    /// selected or in read-only mode.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        if self.ui.read_only {
            return Vec::new();
        }
        let Some(id) = self.ui.selected_id.take() else {
            return Vec::new();
        };
        self.input = InputState::Idle;
        if self.doc.remove(&id).is_none() {
            return vec![Action::SelectionChanged(None), Action::RenderNeeded];
        }
        vec![Action::ShapeDeleted(id), Action::SelectionChanged(None), Action::RenderNeeded]
    }

    pub fn clear_selection(&mut self) -> Vec<Action> {
        if self.ui.selected_id.take().is_none() {
            return Vec::new();
        }
        self.input = InputState::Idle;
        vec![Action::SelectionChanged(None), Action::RenderNeeded]
    }

    /// Insert an asset centered in the current viewport with the default
    /// 300×200 footprint.
    pub fn add_asset(&mut self, url: &str, kind: AssetKind, name: &str) -> Vec<Action> {
        if self.ui.read_only {
            return Vec::new();
        }
        let (w, h) = self.viewport_size();
        let center = self.camera.viewport_center_world(w, h);
        let id = new_shape_id("img");
        let shape = Shape::Image(ImageShape {
            id: id.clone(),
            x: center.x - ASSET_DEFAULT_W / 2.0,
            y: center.y - ASSET_PLACEHOLDER_H / 2.0,
            width: Some(ASSET_DEFAULT_W),
            height: Some(ASSET_PLACEHOLDER_H),
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            src: url.to_owned(),
            name: name.to_owned(),
            asset_type: kind,
        });
        if !self.doc.insert(shape) {
            return Vec::new();
        }
        vec![Action::ShapeCreated(id), Action::RenderNeeded]
    }

    /// Auto-size an image whose width is still undefined once its asset
    /// reports a natural size: width 300, height preserving aspect ratio.
    pub fn resolve_image_size(&mut self, id: &str, natural_w: f64, natural_h: f64) -> Vec<Action> {
        if self.ui.read_only || natural_w <= 0.0 || natural_h <= 0.0 {
            return Vec::new();
        }
        let Some(Shape::Image(img)) = self.doc.get_mut(id) else {
            return Vec::new();
        };
        if img.width.is_some() {
            return Vec::new();
        }
        img.width = Some(ASSET_DEFAULT_W);
        img.height = Some(ASSET_DEFAULT_W * natural_h / natural_w);
        vec![Action::ShapeUpdated(id.to_owned()), Action::RenderNeeded]
    }

    // --- Zoom buttons ---

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.zoom_at_center(self.camera.zoom * ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.zoom_at_center(self.camera.zoom / ZOOM_STEP)
    }

    // --- Queries ---

    /// The currently selected shape, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.ui.selected_id.as_deref()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn shape(&self, id: &str) -> Option<&Shape> {
        self.doc.get(id)
    }

    /// Zoom label value, `round(scale * 100)`.
    #[must_use]
    pub fn zoom_percent(&self) -> i64 {
        self.camera.zoom_percent()
    }

    /// Whether the transform overlay should be shown and hit-tested.
    #[must_use]
    pub fn shows_handles(&self) -> bool {
        !self.ui.read_only && self.ui.tool == Tool::Select && self.ui.selected_id.is_some()
    }

    // --- Internals ---

    fn viewport_size(&self) -> (f64, f64) {
        let w = if self.viewport_width > 0.0 { self.viewport_width } else { FALLBACK_VIEWPORT_W };
        let h = if self.viewport_height > 0.0 { self.viewport_height } else { FALLBACK_VIEWPORT_H };
        (w, h)
    }

    fn zoom_at_center(&mut self, zoom: f64) -> Vec<Action> {
        let (w, h) = self.viewport_size();
        self.camera.zoom_at(Point::new(w / 2.0, h / 2.0), zoom);
        vec![Action::RenderNeeded]
    }

    fn begin_drawing(&mut self, world: Point) -> Vec<Action> {
        if self.ui.read_only {
            return Vec::new();
        }
        let id = new_shape_id("s");
        let stroke = self.ui.stroke.clone();
        let stroke_width = self.ui.stroke_width;
        let shape = match self.ui.tool {
            Tool::Pen => Shape::Stroke(StrokeShape { id: id.clone(), points: vec![world.x, world.y], stroke, stroke_width }),
            Tool::Rect => Shape::Rect(RectShape {
                id: id.clone(),
                x: world.x,
                y: world.y,
                width: 0.0,
                height: 0.0,
                rotation: 0.0,
                stroke,
                stroke_width,
            }),
            Tool::Arrow => Shape::Arrow(ArrowShape {
                id: id.clone(),
                points: [world.x, world.y, world.x, world.y],
                stroke,
                stroke_width,
            }),
            Tool::Select | Tool::Hand => return Vec::new(),
        };
        if !self.doc.insert(shape) {
            return Vec::new();
        }
        self.ui.selected_id = Some(id.clone());
        self.input = InputState::Drawing { id: id.clone(), anchor: world };
        vec![Action::ShapeCreated(id.clone()), Action::SelectionChanged(Some(id)), Action::RenderNeeded]
    }

    fn select_at(&mut self, world: Point) -> Vec<Action> {
        let handles_for = if self.shows_handles() { self.ui.selected_id.as_deref() } else { None };
        let Some(hit) = hit_test(world, &self.doc, &self.camera, handles_for) else {
            return self.clear_selection();
        };

        let mut actions = Vec::new();
        if self.ui.selected_id.as_deref() != Some(hit.shape_id.as_str()) {
            self.ui.selected_id = Some(hit.shape_id.clone());
            actions.push(Action::SelectionChanged(Some(hit.shape_id.clone())));
        }

        if !self.ui.read_only {
            if let Some(shape) = self.doc.get(&hit.shape_id) {
                let base = node_transform(shape);
                self.input = InputState::Transforming {
                    id: hit.shape_id,
                    original: shape.clone(),
                    base,
                    bounds: shape.local_bounds(),
                    part: hit.part,
                    start_world: world,
                    pending: base,
                };
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn hover_cursor(&self, world: Point) -> Vec<Action> {
        if self.ui.tool != Tool::Select {
            return Vec::new();
        }
        let handles_for = if self.shows_handles() { self.ui.selected_id.as_deref() } else { None };
        let cursor = match hit_test(world, &self.doc, &self.camera, handles_for).map(|h| h.part) {
            Some(HitPart::Body) if !self.ui.read_only => "move",
            Some(HitPart::Body) => "pointer",
            Some(HitPart::ResizeHandle(anchor)) => anchor.cursor(),
            Some(HitPart::RotateHandle) => "grab",
            None => "default",
        };
        vec![Action::SetCursor(cursor.to_owned())]
    }
}

/// The full canvas engine. Wraps [`EngineCore`] and owns the browser canvas
/// element plus decoded images keyed by source URL.
pub struct Engine {
    canvas: HtmlCanvasElement,
    images: HashMap<String, HtmlImageElement>,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas, images: HashMap::new(), core: EngineCore::new() }
    }

    // --- Delegated data inputs ---

    pub fn load_snapshot(&mut self, snapshot: SceneSnapshot) {
        self.core.load_snapshot(snapshot);
    }

    #[must_use]
    pub fn snapshot(&self) -> SceneSnapshot {
        self.core.snapshot()
    }

    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.core.set_tool(tool)
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.core.set_read_only(read_only);
    }

    pub fn add_asset(&mut self, url: &str, kind: AssetKind, name: &str) -> Vec<Action> {
        self.core.add_asset(url, kind, name)
    }

    // --- Viewport ---

    /// Update viewport dimensions and resize the backing store to match.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
        self.canvas.set_width((width_css * self.core.dpr).round().max(0.0) as u32);
        self.canvas.set_height((height_css * self.core.dpr).round().max(0.0) as u32);
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    // --- Assets ---

    /// Start decoding any image sources not seen yet and auto-size shapes
    /// whose images have finished loading. Call once per animation frame.
    ///
    /// # Errors
    ///
    /// Returns `Err` if an image element cannot be created.
    pub fn poll_assets(&mut self) -> Result<Vec<Action>, JsValue> {
        let mut pending = Vec::new();
        for shape in self.core.doc.shapes() {
            let Shape::Image(img) = shape else { continue };
            if !self.images.contains_key(&img.src) {
                let el = HtmlImageElement::new()?;
                el.set_cross_origin(Some("anonymous"));
                el.set_src(&img.src);
                self.images.insert(img.src.clone(), el);
            }
            if img.width.is_none() {
                pending.push((img.id.clone(), img.src.clone()));
            }
        }

        let mut actions = Vec::new();
        for (id, src) in pending {
            if let Some(el) = self.images.get(&src).filter(|el| el.complete() && el.natural_width() > 0) {
                let (w, h) = (f64::from(el.natural_width()), f64::from(el.natural_height()));
                actions.extend(self.core.resolve_image_size(&id, w, h));
            }
        }
        Ok(actions)
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a draw call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        render::draw(&ctx, &self.core, &self.images)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.core.selection()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }

    #[must_use]
    pub fn shape(&self, id: &str) -> Option<&Shape> {
        self.core.shape(id)
    }
}
