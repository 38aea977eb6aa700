#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{ArrowShape, ImageShape, RectShape, StrokeShape};

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn rect(x: f64, y: f64, w: f64, h: f64) -> Shape {
    Shape::Rect(RectShape {
        id: "r".into(),
        x,
        y,
        width: w,
        height: h,
        rotation: 0.0,
        stroke: "#000000".into(),
        stroke_width: 2.0,
    })
}

fn image(w: f64, h: f64, scale_x: f64, scale_y: f64) -> Shape {
    Shape::Image(ImageShape {
        id: "img".into(),
        x: 0.0,
        y: 0.0,
        width: Some(w),
        height: Some(h),
        rotation: 0.0,
        scale_x,
        scale_y,
        src: "https://cdn/a.png".into(),
        name: "a.png".into(),
        asset_type: crate::doc::AssetKind::Image,
    })
}

// =============================================================
// NodeTransform
// =============================================================

#[test]
fn identity_maps_point_to_itself() {
    let p = Point::new(12.5, -3.0);
    assert!(point_approx_eq(NodeTransform::default().apply(p), p));
}

#[test]
fn apply_scales_then_rotates_then_translates() {
    let t = NodeTransform { x: 10.0, y: 0.0, rotation: 90.0, scale_x: 2.0, scale_y: 1.0 };
    // (5, 0) → scaled (10, 0) → rotated cw 90° (0, 10) → translated (10, 10)
    assert!(point_approx_eq(t.apply(Point::new(5.0, 0.0)), Point::new(10.0, 10.0)));
}

#[test]
fn invert_undoes_apply() {
    let t = NodeTransform { x: -4.0, y: 7.0, rotation: 33.0, scale_x: 1.5, scale_y: -0.5 };
    let local = Point::new(3.0, 9.0);
    assert!(point_approx_eq(t.invert(t.apply(local)), local));
}

#[test]
fn node_transform_of_stroke_is_identity() {
    let s = Shape::Stroke(StrokeShape { id: "s".into(), points: vec![1.0, 2.0], stroke: "#000".into(), stroke_width: 2.0 });
    assert_eq!(node_transform(&s), NodeTransform::default());
}

#[test]
fn node_transform_of_image_carries_scale() {
    let t = node_transform(&image(100.0, 50.0, 2.0, 3.0));
    assert_eq!(t.scale_x, 2.0);
    assert_eq!(t.scale_y, 3.0);
}

// =============================================================
// finalize_transform
// =============================================================

#[test]
fn finalize_rect_absorbs_scale_into_size() {
    let t = NodeTransform { x: 10.0, y: 20.0, rotation: 30.0, scale_x: 2.0, scale_y: 0.5 };
    let Shape::Rect(r) = finalize_transform(&rect(0.0, 0.0, 100.0, 40.0), t) else {
        panic!("expected rect");
    };
    assert_eq!((r.x, r.y, r.rotation), (10.0, 20.0, 30.0));
    assert_eq!((r.width, r.height), (200.0, 20.0));
}

#[test]
fn finalize_image_resets_scale_to_one() {
    let shape = image(100.0, 80.0, 2.0, 2.0);
    let Shape::Image(img) = finalize_transform(&shape, node_transform(&shape)) else {
        panic!("expected image");
    };
    assert_eq!(img.width, Some(200.0));
    assert_eq!(img.height, Some(160.0));
    assert_eq!((img.scale_x, img.scale_y), (1.0, 1.0));
}

#[test]
fn finalize_image_clamps_to_minimum_size() {
    let t = NodeTransform { scale_x: 0.01, scale_y: 0.02, ..NodeTransform::default() };
    let Shape::Image(img) = finalize_transform(&image(100.0, 100.0, 1.0, 1.0), t) else {
        panic!("expected image");
    };
    assert_eq!(img.width, Some(MIN_IMAGE_SIZE));
    assert_eq!(img.height, Some(MIN_IMAGE_SIZE));
}

#[test]
fn finalize_stroke_bakes_translation_into_points() {
    let s = Shape::Stroke(StrokeShape { id: "s".into(), points: vec![0.0, 0.0, 10.0, 5.0], stroke: "#000".into(), stroke_width: 2.0 });
    let Shape::Stroke(out) = finalize_transform(&s, translated(NodeTransform::default(), 5.0, -5.0)) else {
        panic!("expected stroke");
    };
    assert_eq!(out.points, vec![5.0, -5.0, 15.0, 0.0]);
}

#[test]
fn finalize_arrow_bakes_rotation_into_endpoints() {
    let a = Shape::Arrow(ArrowShape { id: "a".into(), points: [10.0, 0.0, 20.0, 0.0], stroke: "#000".into(), stroke_width: 2.0 });
    let t = NodeTransform { rotation: 90.0, ..NodeTransform::default() };
    let Shape::Arrow(out) = finalize_transform(&a, t) else {
        panic!("expected arrow");
    };
    assert!(point_approx_eq(out.start(), Point::new(0.0, 10.0)));
    assert!(point_approx_eq(out.end(), Point::new(0.0, 20.0)));
}

#[test]
fn finalize_keeps_id() {
    let shape = rect(0.0, 0.0, 10.0, 10.0);
    assert_eq!(finalize_transform(&shape, NodeTransform::default()).id(), "r");
}

// =============================================================
// Gestures
// =============================================================

#[test]
fn resize_from_se_corner_doubles_size() {
    let shape = rect(0.0, 0.0, 100.0, 50.0);
    let t = resized(node_transform(&shape), shape.local_bounds(), ResizeAnchor::Se, Point::new(200.0, 100.0));
    assert!(approx_eq(t.scale_x, 2.0));
    assert!(approx_eq(t.scale_y, 2.0));
    assert!(point_approx_eq(Point::new(t.x, t.y), Point::new(0.0, 0.0)));
}

#[test]
fn resize_from_nw_corner_keeps_se_fixed() {
    let shape = rect(0.0, 0.0, 100.0, 50.0);
    let t = resized(node_transform(&shape), shape.local_bounds(), ResizeAnchor::Nw, Point::new(-100.0, -50.0));
    let Shape::Rect(r) = finalize_transform(&shape, t) else {
        panic!("expected rect");
    };
    assert!(approx_eq(r.x, -100.0));
    assert!(approx_eq(r.y, -50.0));
    assert!(approx_eq(r.width, 200.0));
    assert!(approx_eq(r.height, 100.0));
}

#[test]
fn resize_degenerate_box_keeps_scale() {
    let shape = rect(0.0, 0.0, 0.0, 0.0);
    let t = resized(node_transform(&shape), shape.local_bounds(), ResizeAnchor::Se, Point::new(50.0, 50.0));
    assert_eq!((t.scale_x, t.scale_y), (1.0, 1.0));
}

#[test]
fn rotate_quarter_turn_pivots_on_center() {
    let shape = rect(0.0, 0.0, 100.0, 100.0);
    let base = node_transform(&shape);
    let t = rotated(base, shape.local_bounds(), Point::new(50.0, 0.0), Point::new(100.0, 50.0));
    assert!(approx_eq(t.rotation, 90.0));
    assert!(point_approx_eq(Point::new(t.x, t.y), Point::new(100.0, 0.0)));
    assert!(point_approx_eq(t.apply(Point::new(50.0, 50.0)), Point::new(50.0, 50.0)));
}

#[test]
fn translated_shifts_origin_only() {
    let base = NodeTransform { x: 1.0, y: 2.0, rotation: 45.0, scale_x: 2.0, scale_y: 2.0 };
    let t = translated(base, 10.0, 20.0);
    assert_eq!((t.x, t.y), (11.0, 22.0));
    assert_eq!((t.rotation, t.scale_x, t.scale_y), (45.0, 2.0, 2.0));
}
