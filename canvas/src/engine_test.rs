#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{ImageShape, RectShape, StrokeShape};

// =============================================================
// Helpers
// =============================================================

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn no_modifiers() -> Modifiers {
    Modifiers::default()
}

fn rect_shape(id: &str, x: f64, y: f64, w: f64, h: f64) -> Shape {
    Shape::Rect(RectShape {
        id: id.into(),
        x,
        y,
        width: w,
        height: h,
        rotation: 0.0,
        stroke: "#000000".into(),
        stroke_width: 2.0,
    })
}

fn image_shape(id: &str, width: Option<f64>) -> Shape {
    Shape::Image(ImageShape {
        id: id.into(),
        x: 0.0,
        y: 0.0,
        width,
        height: width.map(|_| 100.0),
        rotation: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        src: "https://cdn/a.png".into(),
        name: "a.png".into(),
        asset_type: AssetKind::Image,
    })
}

fn core_with(shapes: Vec<Shape>) -> EngineCore {
    let mut core = EngineCore::new();
    core.load_snapshot(SceneSnapshot { shapes, ..SceneSnapshot::default() });
    core
}

fn drag(core: &mut EngineCore, from: Point, to: Point) -> Vec<Action> {
    let mut actions = core.on_pointer_down(from, Button::Primary, no_modifiers());
    actions.extend(core.on_pointer_move(to, no_modifiers()));
    actions.extend(core.on_pointer_up(to, Button::Primary, no_modifiers()));
    actions
}

fn rect_of(core: &EngineCore, id: &str) -> RectShape {
    match core.shape(id) {
        Some(Shape::Rect(r)) => r.clone(),
        other => panic!("expected rect {id}, got {other:?}"),
    }
}

fn only_shape(core: &EngineCore) -> &Shape {
    assert_eq!(core.doc.len(), 1);
    &core.doc.shapes()[0]
}

// =============================================================
// Construction and defaults
// =============================================================

#[test]
fn core_defaults() {
    let core = EngineCore::new();
    assert!(core.selection().is_none());
    assert_eq!(core.camera(), Camera::default());
    assert_eq!(core.ui.tool, Tool::Select);
    assert!(core.doc.is_empty());
    assert_eq!(core.dpr, 1.0);
    assert!(matches!(core.input, InputState::Idle));
}

// =============================================================
// Snapshots
// =============================================================

#[test]
fn load_snapshot_restores_viewport_and_clears_selection() {
    let mut core = core_with(vec![rect_shape("a", 0.0, 0.0, 10.0, 10.0)]);
    core.ui.selected_id = Some("a".into());
    core.load_snapshot(SceneSnapshot {
        shapes: vec![rect_shape("b", 0.0, 0.0, 1.0, 1.0)],
        stage_pos: pt(40.0, -20.0),
        stage_scale: 2.5,
    });
    assert_eq!(core.camera(), Camera { pan_x: 40.0, pan_y: -20.0, zoom: 2.5 });
    assert!(core.selection().is_none());
    assert!(core.shape("a").is_none());
    assert!(core.shape("b").is_some());
}

#[test]
fn non_positive_stage_scale_loads_as_one() {
    let mut core = EngineCore::new();
    core.load_snapshot(SceneSnapshot { stage_scale: 0.0, ..SceneSnapshot::default() });
    assert_eq!(core.camera().zoom, 1.0);
}

#[test]
fn snapshot_round_trips_through_json() {
    let mut core = EngineCore::new();
    core.set_tool(Tool::Pen);
    drag(&mut core, pt(0.0, 0.0), pt(10.0, 10.0));
    core.set_tool(Tool::Rect);
    drag(&mut core, pt(5.0, 5.0), pt(-20.0, 30.0));
    core.camera = Camera { pan_x: 12.0, pan_y: 7.0, zoom: 1.21 };

    let snapshot = core.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: SceneSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);

    let mut reloaded = EngineCore::new();
    reloaded.load_snapshot(back);
    assert_eq!(reloaded.snapshot(), snapshot);
}

// =============================================================
// Drawing
// =============================================================

#[test]
fn rect_size_is_signed_pointer_delta() {
    let mut core = EngineCore::new();
    core.set_tool(Tool::Rect);
    drag(&mut core, pt(100.0, 100.0), pt(50.0, 30.0));
    let Shape::Rect(r) = only_shape(&core) else {
        panic!("expected rect");
    };
    assert_eq!((r.x, r.y), (100.0, 100.0));
    assert_eq!((r.width, r.height), (-50.0, -70.0));
}

#[test]
fn rect_uses_logical_coordinates_under_pan_and_zoom() {
    let mut core = EngineCore::new();
    core.camera = Camera { pan_x: 100.0, pan_y: 50.0, zoom: 2.0 };
    core.set_tool(Tool::Rect);
    drag(&mut core, pt(100.0, 50.0), pt(300.0, 250.0));
    let Shape::Rect(r) = only_shape(&core) else {
        panic!("expected rect");
    };
    assert_eq!((r.x, r.y), (0.0, 0.0));
    assert_eq!((r.width, r.height), (100.0, 100.0));
}

#[test]
fn pen_appends_points_without_new_shapes() {
    let mut core = EngineCore::new();
    core.set_tool(Tool::Pen);
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(1.0, 2.0), no_modifiers());
    core.on_pointer_move(pt(3.0, 4.0), no_modifiers());
    core.on_pointer_up(pt(3.0, 4.0), Button::Primary, no_modifiers());

    let Shape::Stroke(s) = only_shape(&core) else {
        panic!("expected stroke");
    };
    assert_eq!(s.points, vec![0.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn arrow_updates_second_endpoint() {
    let mut core = EngineCore::new();
    core.set_tool(Tool::Arrow);
    core.on_pointer_down(pt(10.0, 10.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(20.0, 20.0), no_modifiers());
    core.on_pointer_move(pt(40.0, 15.0), no_modifiers());
    core.on_pointer_up(pt(40.0, 15.0), Button::Primary, no_modifiers());

    let Shape::Arrow(a) = only_shape(&core) else {
        panic!("expected arrow");
    };
    assert_eq!(a.points, [10.0, 10.0, 40.0, 15.0]);
}

#[test]
fn drawing_uses_current_style() {
    let mut core = EngineCore::new();
    core.set_tool(Tool::Pen);
    core.set_stroke("#3b82f6");
    core.set_stroke_width(8.0);
    drag(&mut core, pt(0.0, 0.0), pt(1.0, 1.0));
    let Shape::Stroke(s) = only_shape(&core) else {
        panic!("expected stroke");
    };
    assert_eq!(s.stroke, "#3b82f6");
    assert_eq!(s.stroke_width, 8.0);
}

#[test]
fn drawing_selects_new_shape_and_reports_it() {
    let mut core = EngineCore::new();
    core.set_tool(Tool::Rect);
    let actions = core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    let id = core.doc.shapes()[0].id().to_owned();
    assert!(id.starts_with("s_"));
    assert_eq!(core.selection(), Some(id.as_str()));
    assert!(actions.contains(&Action::ShapeCreated(id.clone())));
    assert!(matches!(core.input, InputState::Drawing { .. }));

    let actions = core.on_pointer_up(pt(0.0, 0.0), Button::Primary, no_modifiers());
    assert!(actions.contains(&Action::ShapeUpdated(id)));
    assert!(matches!(core.input, InputState::Idle));
}

#[test]
fn each_drag_creates_exactly_one_shape() {
    let mut core = EngineCore::new();
    core.set_tool(Tool::Rect);
    for i in 0..3 {
        let offset = f64::from(i) * 50.0;
        drag(&mut core, pt(offset, offset), pt(offset + 10.0, offset + 10.0));
    }
    assert_eq!(core.doc.len(), 3);
}

#[test]
fn move_without_gesture_does_not_mutate() {
    let mut core = EngineCore::new();
    core.set_tool(Tool::Pen);
    core.on_pointer_move(pt(5.0, 5.0), no_modifiers());
    assert!(core.doc.is_empty());
}

#[test]
fn secondary_button_is_ignored() {
    let mut core = EngineCore::new();
    core.set_tool(Tool::Rect);
    assert!(core.on_pointer_down(pt(0.0, 0.0), Button::Secondary, no_modifiers()).is_empty());
    assert!(core.doc.is_empty());
}

#[test]
fn switching_tool_abandons_drawing() {
    let mut core = EngineCore::new();
    core.set_tool(Tool::Pen);
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    core.set_tool(Tool::Select);
    core.on_pointer_move(pt(50.0, 50.0), no_modifiers());
    let Shape::Stroke(s) = only_shape(&core) else {
        panic!("expected stroke");
    };
    assert_eq!(s.points.len(), 2);
}

// =============================================================
// Hand tool
// =============================================================

#[test]
fn hand_tool_pans_by_device_delta() {
    let mut core = EngineCore::new();
    core.set_tool(Tool::Hand);
    let actions = drag(&mut core, pt(10.0, 10.0), pt(40.0, -5.0));
    assert_eq!(core.camera().pan_x, 30.0);
    assert_eq!(core.camera().pan_y, -15.0);
    assert!(core.doc.is_empty());
    assert!(actions.contains(&Action::SetCursor("grab".into())));
}

#[test]
fn hand_tool_pans_in_read_only_mode() {
    let mut core = EngineCore::new();
    core.set_read_only(true);
    core.set_tool(Tool::Hand);
    drag(&mut core, pt(0.0, 0.0), pt(5.0, 5.0));
    assert_eq!(core.camera().pan_x, 5.0);
}

// =============================================================
// Selection
// =============================================================

#[test]
fn clicking_shape_selects_it() {
    let mut core = core_with(vec![rect_shape("a", 0.0, 0.0, 100.0, 100.0)]);
    let actions = core.on_pointer_down(pt(0.0, 50.0), Button::Primary, no_modifiers());
    assert_eq!(core.selection(), Some("a"));
    assert!(actions.contains(&Action::SelectionChanged(Some("a".into()))));
}

#[test]
fn clicking_empty_canvas_clears_selection() {
    let mut core = core_with(vec![rect_shape("a", 0.0, 0.0, 100.0, 100.0)]);
    core.on_pointer_down(pt(0.0, 50.0), Button::Primary, no_modifiers());
    core.on_pointer_up(pt(0.0, 50.0), Button::Primary, no_modifiers());

    let actions = core.on_pointer_down(pt(500.0, 500.0), Button::Primary, no_modifiers());
    assert!(core.selection().is_none());
    assert!(actions.contains(&Action::SelectionChanged(None)));
}

#[test]
fn click_without_drag_commits_nothing() {
    let mut core = core_with(vec![rect_shape("a", 0.0, 0.0, 100.0, 100.0)]);
    core.on_pointer_down(pt(0.0, 50.0), Button::Primary, no_modifiers());
    let actions = core.on_pointer_up(pt(0.0, 50.0), Button::Primary, no_modifiers());
    assert!(actions.is_empty());
    assert_eq!(rect_of(&core, "a").x, 0.0);
}

#[test]
fn read_only_allows_selecting_for_viewing() {
    let mut core = core_with(vec![rect_shape("a", 0.0, 0.0, 100.0, 100.0)]);
    core.set_read_only(true);
    drag(&mut core, pt(0.0, 50.0), pt(30.0, 80.0));
    assert_eq!(core.selection(), Some("a"));
    assert_eq!(rect_of(&core, "a").x, 0.0);
    assert!(!core.shows_handles());
}

// =============================================================
// Transform overlay
// =============================================================

#[test]
fn dragging_body_moves_shape_on_release() {
    let mut core = core_with(vec![rect_shape("a", 0.0, 0.0, 100.0, 100.0)]);
    core.on_pointer_down(pt(0.0, 50.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(20.0, 80.0), no_modifiers());
    // Stored geometry is untouched until release.
    assert_eq!(rect_of(&core, "a").x, 0.0);

    let actions = core.on_pointer_up(pt(20.0, 80.0), Button::Primary, no_modifiers());
    let r = rect_of(&core, "a");
    assert_eq!((r.x, r.y), (20.0, 30.0));
    assert!(actions.contains(&Action::ShapeUpdated("a".into())));
}

#[test]
fn dragging_stroke_bakes_offset_into_points() {
    let stroke = Shape::Stroke(StrokeShape {
        id: "s".into(),
        points: vec![0.0, 0.0, 100.0, 0.0],
        stroke: "#000".into(),
        stroke_width: 4.0,
    });
    let mut core = core_with(vec![stroke]);
    drag(&mut core, pt(50.0, 0.0), pt(60.0, 20.0));
    let Some(Shape::Stroke(s)) = core.shape("s") else {
        panic!("expected stroke");
    };
    assert_eq!(s.points, vec![10.0, 20.0, 110.0, 20.0]);
}

#[test]
fn resize_handle_commits_scale_free_geometry() {
    let mut core = core_with(vec![rect_shape("a", 0.0, 0.0, 100.0, 50.0)]);
    drag(&mut core, pt(0.0, 25.0), pt(0.0, 25.0));
    assert!(core.shows_handles());

    drag(&mut core, pt(100.0, 50.0), pt(200.0, 100.0));
    let r = rect_of(&core, "a");
    assert!(approx_eq(r.width, 200.0));
    assert!(approx_eq(r.height, 100.0));
    assert!(approx_eq(r.x, 0.0));
}

#[test]
fn rotate_handle_commits_rotation() {
    let mut core = core_with(vec![rect_shape("a", 0.0, 0.0, 100.0, 100.0)]);
    drag(&mut core, pt(0.0, 50.0), pt(0.0, 50.0));

    let handle = crate::hit::rotate_handle_position(core.shape("a").unwrap(), &core.camera);
    drag(&mut core, handle, pt(150.0, 50.0));
    let r = rect_of(&core, "a");
    assert!(approx_eq(r.rotation, 90.0));
    assert!(approx_eq(r.x, 100.0));
    assert!(approx_eq(r.y, 0.0));
    assert_eq!((r.width, r.height), (100.0, 100.0));
}

#[test]
fn image_transform_clamps_to_minimum_size() {
    let mut core = core_with(vec![image_shape("img", Some(100.0))]);
    drag(&mut core, pt(50.0, 50.0), pt(50.0, 50.0));
    // Drag the SE corner almost onto the NW corner.
    drag(&mut core, pt(100.0, 100.0), pt(0.1, 0.1));
    let Some(Shape::Image(img)) = core.shape("img") else {
        panic!("expected image");
    };
    assert_eq!(img.width, Some(5.0));
    assert_eq!(img.height, Some(5.0));
    assert_eq!((img.scale_x, img.scale_y), (1.0, 1.0));
}

// =============================================================
// Deletion and keyboard
// =============================================================

#[test]
fn delete_removes_selected_and_clears_selection() {
    let mut core = core_with(vec![rect_shape("a", 0.0, 0.0, 10.0, 10.0), rect_shape("b", 50.0, 50.0, 10.0, 10.0)]);
    core.ui.selected_id = Some("a".into());
    let actions = core.delete_selected();
    assert!(core.shape("a").is_none());
    assert!(core.shape("b").is_some());
    assert!(core.selection().is_none());
    assert!(actions.contains(&Action::ShapeDeleted("a".into())));
}

#[test]
fn delete_without_selection_is_noop() {
    let mut core = core_with(vec![rect_shape("a", 0.0, 0.0, 10.0, 10.0)]);
    assert!(core.delete_selected().is_empty());
    assert_eq!(core.doc.len(), 1);
}

#[test]
fn delete_blocked_in_read_only() {
    let mut core = core_with(vec![rect_shape("a", 0.0, 0.0, 10.0, 10.0)]);
    core.ui.selected_id = Some("a".into());
    core.set_read_only(true);
    assert!(core.delete_selected().is_empty());
    assert!(core.shape("a").is_some());
    assert_eq!(core.selection(), Some("a"));
}

#[test]
fn delete_and_backspace_keys_delete() {
    for key in ["Delete", "Backspace"] {
        let mut core = core_with(vec![rect_shape("a", 0.0, 0.0, 10.0, 10.0)]);
        core.ui.selected_id = Some("a".into());
        core.on_key_down(&Key(key.into()), no_modifiers());
        assert!(core.doc.is_empty(), "{key} should delete");
    }
}

#[test]
fn escape_clears_selection() {
    let mut core = core_with(vec![rect_shape("a", 0.0, 0.0, 10.0, 10.0)]);
    core.ui.selected_id = Some("a".into());
    let actions = core.on_key_down(&Key("Escape".into()), no_modifiers());
    assert!(core.selection().is_none());
    assert_eq!(core.doc.len(), 1);
    assert!(actions.contains(&Action::SelectionChanged(None)));
}

#[test]
fn letter_shortcuts_switch_tools() {
    let mut core = EngineCore::new();
    core.on_key_down(&Key("p".into()), no_modifiers());
    assert_eq!(core.ui.tool, Tool::Pen);
    core.on_key_down(&Key("h".into()), no_modifiers());
    assert_eq!(core.ui.tool, Tool::Hand);
    let ctrl = Modifiers { ctrl: true, ..Modifiers::default() };
    assert!(core.on_key_down(&Key("r".into()), ctrl).is_empty());
    assert_eq!(core.ui.tool, Tool::Hand);
}

// =============================================================
// Read-only
// =============================================================

#[test]
fn read_only_blocks_drawing() {
    let mut core = EngineCore::new();
    core.set_read_only(true);
    for tool in [Tool::Pen, Tool::Rect, Tool::Arrow] {
        core.set_tool(tool);
        assert!(drag(&mut core, pt(0.0, 0.0), pt(10.0, 10.0)).is_empty());
    }
    assert!(core.doc.is_empty());
}

#[test]
fn entering_read_only_abandons_gesture() {
    let mut core = EngineCore::new();
    core.set_tool(Tool::Rect);
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, no_modifiers());
    core.set_read_only(true);
    core.on_pointer_move(pt(30.0, 30.0), no_modifiers());
    let Shape::Rect(r) = only_shape(&core) else {
        panic!("expected rect");
    };
    assert_eq!(r.width, 0.0);
}

// =============================================================
// Zoom
// =============================================================

#[test]
fn wheel_away_zooms_in_around_pointer() {
    let mut core = EngineCore::new();
    let p = pt(200.0, 100.0);
    let before = core.camera().screen_to_world(p);
    core.on_wheel(p, WheelDelta { dx: 0.0, dy: -3.0 }, no_modifiers());
    assert!(approx_eq(core.camera().zoom, 1.1));
    let cam = core.camera();
    let after = cam.world_to_screen(before);
    assert!(approx_eq(after.x, p.x) && approx_eq(after.y, p.y));
}

#[test]
fn wheel_towards_zooms_out() {
    let mut core = EngineCore::new();
    core.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 0.0, dy: 3.0 }, no_modifiers());
    assert!(approx_eq(core.camera().zoom, 1.0 / 1.1));
}

#[test]
fn horizontal_only_wheel_is_noop() {
    let mut core = EngineCore::new();
    assert!(core.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 5.0, dy: 0.0 }, no_modifiers()).is_empty());
    assert_eq!(core.camera(), Camera::default());
}

#[test]
fn zoom_buttons_anchor_at_viewport_center() {
    let mut core = EngineCore::new();
    core.set_viewport(800.0, 600.0, 2.0);
    core.zoom_in();
    let center = core.camera().screen_to_world(pt(400.0, 300.0));
    assert!(approx_eq(center.x, 400.0) && approx_eq(center.y, 300.0));
    assert_eq!(core.zoom_percent(), 110);
    core.zoom_out();
    assert!(approx_eq(core.camera().zoom, 1.0));
}

// =============================================================
// Assets
// =============================================================

#[test]
fn add_asset_centers_in_fallback_viewport() {
    let mut core = EngineCore::new();
    let actions = core.add_asset("https://cdn/clip.mp4", AssetKind::Video, "clip.mp4");
    let Shape::Image(img) = only_shape(&core) else {
        panic!("expected image");
    };
    assert!(img.id.starts_with("img_"));
    assert_eq!((img.x, img.y), (250.0, 200.0));
    assert_eq!((img.width, img.height), (Some(300.0), Some(200.0)));
    assert_eq!(img.asset_type, AssetKind::Video);
    assert_eq!(img.name, "clip.mp4");
    assert!(actions.contains(&Action::ShapeCreated(img.id.clone())));
}

#[test]
fn add_asset_uses_logical_center_under_pan_and_zoom() {
    let mut core = EngineCore::new();
    core.set_viewport(1000.0, 400.0, 1.0);
    core.camera = Camera { pan_x: -200.0, pan_y: 100.0, zoom: 2.0 };
    core.add_asset("https://cdn/a.png", AssetKind::Image, "a.png");
    let Shape::Image(img) = only_shape(&core) else {
        panic!("expected image");
    };
    // Center (500, 200) maps to logical (350, 50).
    assert_eq!((img.x, img.y), (200.0, -50.0));
}

#[test]
fn add_asset_blocked_in_read_only() {
    let mut core = EngineCore::new();
    core.set_read_only(true);
    assert!(core.add_asset("https://cdn/a.png", AssetKind::Image, "a.png").is_empty());
    assert!(core.doc.is_empty());
}

#[test]
fn unsized_image_auto_sizes_to_default_width() {
    let mut core = core_with(vec![image_shape("img", None)]);
    let actions = core.resolve_image_size("img", 1920.0, 1080.0);
    let Some(Shape::Image(img)) = core.shape("img") else {
        panic!("expected image");
    };
    assert_eq!(img.width, Some(300.0));
    assert!(approx_eq(img.height.unwrap(), 168.75));
    assert!(actions.contains(&Action::ShapeUpdated("img".into())));
}

#[test]
fn sized_image_is_not_resized() {
    let mut core = core_with(vec![image_shape("img", Some(120.0))]);
    assert!(core.resolve_image_size("img", 1920.0, 1080.0).is_empty());
    let Some(Shape::Image(img)) = core.shape("img") else {
        panic!("expected image");
    };
    assert_eq!(img.width, Some(120.0));
}
