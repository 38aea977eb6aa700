#![allow(clippy::float_cmp)]

use super::*;
use crate::consts::ZOOM_STEP;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// --- Defaults ---

#[test]
fn camera_default_is_identity() {
    let cam = Camera::default();
    assert_eq!(cam.pan_x, 0.0);
    assert_eq!(cam.pan_y, 0.0);
    assert_eq!(cam.zoom, 1.0);
}

// --- screen_to_world ---

#[test]
fn screen_to_world_subtracts_pan_then_divides() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 2.0 };
    let world = cam.screen_to_world(Point::new(60.0, 30.0));
    assert!(point_approx_eq(world, Point::new(20.0, 10.0)));
}

#[test]
fn screen_to_world_origin_with_pan_and_zoom() {
    let cam = Camera { pan_x: 50.0, pan_y: 30.0, zoom: 2.0 };
    let world = cam.screen_to_world(Point::new(0.0, 0.0));
    assert!(point_approx_eq(world, Point::new(-25.0, -15.0)));
}

// --- world_to_screen ---

#[test]
fn world_to_screen_scales_then_adds_pan() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 3.0 };
    let screen = cam.world_to_screen(Point::new(5.0, 5.0));
    assert!(point_approx_eq(screen, Point::new(35.0, 25.0)));
}

#[test]
fn round_trip_fractional_zoom() {
    let cam = Camera { pan_x: 13.7, pan_y: -42.3, zoom: 0.75 };
    let world = Point::new(333.3, -999.9);
    let back = cam.screen_to_world(cam.world_to_screen(world));
    assert!(point_approx_eq(world, back));
}

#[test]
fn screen_dist_to_world_ignores_pan() {
    let cam = Camera { pan_x: 999.0, pan_y: -999.0, zoom: 4.0 };
    assert!(approx_eq(cam.screen_dist_to_world(8.0), 2.0));
}

// --- zoom_at ---

#[test]
fn zoom_at_keeps_point_under_cursor() {
    let mut cam = Camera { pan_x: 40.0, pan_y: -12.0, zoom: 1.3 };
    let cursor = Point::new(310.0, 145.0);
    let before = cam.screen_to_world(cursor);
    cam.zoom_by_at(cursor, ZOOM_STEP);
    assert!(point_approx_eq(cam.world_to_screen(before), cursor));
    assert!(point_approx_eq(cam.screen_to_world(cursor), before));
}

#[test]
fn zoom_out_keeps_point_under_cursor() {
    let mut cam = Camera::default();
    let cursor = Point::new(-80.0, 500.0);
    let before = cam.screen_to_world(cursor);
    cam.zoom_by_at(cursor, 1.0 / ZOOM_STEP);
    assert!(approx_eq(cam.zoom, 1.0 / ZOOM_STEP));
    assert!(point_approx_eq(cam.world_to_screen(before), cursor));
}

#[test]
fn repeated_zoom_steps_stay_anchored() {
    let mut cam = Camera { pan_x: 5.0, pan_y: 5.0, zoom: 0.5 };
    let cursor = Point::new(200.0, 100.0);
    let before = cam.screen_to_world(cursor);
    for _ in 0..12 {
        cam.zoom_by_at(cursor, ZOOM_STEP);
    }
    for _ in 0..5 {
        cam.zoom_by_at(cursor, 1.0 / ZOOM_STEP);
    }
    let back = cam.world_to_screen(before);
    assert!((back.x - cursor.x).abs() < 1e-6);
    assert!((back.y - cursor.y).abs() < 1e-6);
}

#[test]
fn zoom_is_not_clamped() {
    let mut cam = Camera::default();
    for _ in 0..100 {
        cam.zoom_by_at(Point::new(0.0, 0.0), ZOOM_STEP);
    }
    assert!(cam.zoom > 10_000.0);
}

// --- pan / viewport helpers ---

#[test]
fn pan_by_adds_device_delta() {
    let mut cam = Camera { pan_x: 10.0, pan_y: 10.0, zoom: 4.0 };
    cam.pan_by(-3.0, 7.5);
    assert_eq!(cam.pan_x, 7.0);
    assert_eq!(cam.pan_y, 17.5);
    assert_eq!(cam.zoom, 4.0);
}

#[test]
fn viewport_center_world_accounts_for_pan_and_zoom() {
    let cam = Camera { pan_x: -100.0, pan_y: 50.0, zoom: 2.0 };
    let center = cam.viewport_center_world(800.0, 600.0);
    assert!(point_approx_eq(center, Point::new(250.0, 125.0)));
}

#[test]
fn zoom_percent_rounds() {
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 1.2155 };
    assert_eq!(cam.zoom_percent(), 122);
}
