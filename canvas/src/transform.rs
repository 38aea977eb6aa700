//! Node transforms and the commit step of the transform-handle overlay.
//!
//! A [`NodeTransform`] places a shape's local geometry in the logical frame:
//! `logical = (x, y) + R(rotation) · (scale_x · lx, scale_y · ly)`. Gestures
//! (move, resize, rotate) only ever produce a provisional transform; on release
//! [`finalize_transform`] bakes it back into the shape so stored geometry is
//! always scale-free.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use crate::camera::Point;
use crate::consts::MIN_IMAGE_SIZE;
use crate::doc::{Bounds, Shape};
use crate::hit::ResizeAnchor;

/// Placement of a shape node: translation, clockwise rotation in degrees, and
/// non-uniform scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, rotation: 0.0, scale_x: 1.0, scale_y: 1.0 }
    }
}

fn rotate(p: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Point::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

impl NodeTransform {
    /// Map a local point into the logical frame.
    #[must_use]
    pub fn apply(&self, local: Point) -> Point {
        let r = rotate(Point::new(local.x * self.scale_x, local.y * self.scale_y), self.rotation);
        Point::new(self.x + r.x, self.y + r.y)
    }

    /// Map a logical point into the node's local frame. A zero scale axis maps to 0.
    #[must_use]
    pub fn invert(&self, logical: Point) -> Point {
        let r = rotate(Point::new(logical.x - self.x, logical.y - self.y), -self.rotation);
        let sx = if self.scale_x == 0.0 { 0.0 } else { r.x / self.scale_x };
        let sy = if self.scale_y == 0.0 { 0.0 } else { r.y / self.scale_y };
        Point::new(sx, sy)
    }
}

/// The transform a committed shape is currently drawn with.
#[must_use]
pub fn node_transform(shape: &Shape) -> NodeTransform {
    match shape {
        Shape::Rect(r) => NodeTransform { x: r.x, y: r.y, rotation: r.rotation, ..NodeTransform::default() },
        Shape::Image(img) => NodeTransform {
            x: img.x,
            y: img.y,
            rotation: img.rotation,
            scale_x: img.scale_x,
            scale_y: img.scale_y,
        },
        Shape::Stroke(_) | Shape::Arrow(_) => NodeTransform::default(),
    }
}

/// Bake a node transform into the shape's stored geometry.
///
/// Rectangles and images take the transform's position and rotation while the
/// scale factors are absorbed into width/height (images never shrink below
/// [`MIN_IMAGE_SIZE`]). Strokes and arrows have every point mapped through the
/// transform. The result always has unit scale.
#[must_use]
pub fn finalize_transform(shape: &Shape, t: NodeTransform) -> Shape {
    let mut out = shape.clone();
    match &mut out {
        Shape::Rect(r) => {
            r.x = t.x;
            r.y = t.y;
            r.rotation = t.rotation;
            r.width *= t.scale_x;
            r.height *= t.scale_y;
        }
        Shape::Image(img) => {
            let (w, h) = img.size();
            img.x = t.x;
            img.y = t.y;
            img.rotation = t.rotation;
            img.width = Some((w * t.scale_x).max(MIN_IMAGE_SIZE));
            img.height = Some((h * t.scale_y).max(MIN_IMAGE_SIZE));
            img.scale_x = 1.0;
            img.scale_y = 1.0;
        }
        Shape::Stroke(s) => {
            for pair in s.points.chunks_exact_mut(2) {
                let p = t.apply(Point::new(pair[0], pair[1]));
                pair[0] = p.x;
                pair[1] = p.y;
            }
        }
        Shape::Arrow(a) => {
            let start = t.apply(a.start());
            let end = t.apply(a.end());
            a.points = [start.x, start.y, end.x, end.y];
        }
    }
    out
}

/// Base transform shifted by a logical delta.
#[must_use]
pub fn translated(base: NodeTransform, dx: f64, dy: f64) -> NodeTransform {
    NodeTransform { x: base.x + dx, y: base.y + dy, ..base }
}

/// Transform produced by dragging the `anchor` handle of a node with local
/// bounds `local` to `pointer` (logical). The opposite handle stays fixed.
#[must_use]
pub fn resized(base: NodeTransform, local: Bounds, anchor: ResizeAnchor, pointer: Point) -> NodeTransform {
    let q = base.invert(pointer);
    let dragged = anchor.local_point(&local);
    let fixed = anchor.opposite().local_point(&local);
    let (ux, uy) = anchor.factors();

    let ratio = |q: f64, dragged: f64, fixed: f64, active: bool| {
        let span = dragged - fixed;
        if !active || span.abs() < f64::EPSILON { 1.0 } else { (q - fixed) / span }
    };
    let sx = ratio(q.x, dragged.x, fixed.x, ux != 0);
    let sy = ratio(q.y, dragged.y, fixed.y, uy != 0);

    let origin = base.apply(Point::new(fixed.x * (1.0 - sx), fixed.y * (1.0 - sy)));
    NodeTransform {
        x: origin.x,
        y: origin.y,
        rotation: base.rotation,
        scale_x: base.scale_x * sx,
        scale_y: base.scale_y * sy,
    }
}

/// Transform produced by dragging the rotate handle from `start` to `pointer`
/// (both logical). Rotation pivots on the center of the local bounds.
#[must_use]
pub fn rotated(base: NodeTransform, local: Bounds, start: Point, pointer: Point) -> NodeTransform {
    let center = base.apply(local.center());
    let a0 = (start.y - center.y).atan2(start.x - center.x);
    let a1 = (pointer.y - center.y).atan2(pointer.x - center.x);
    let delta = (a1 - a0).to_degrees();

    let offset = rotate(Point::new(base.x - center.x, base.y - center.y), delta);
    NodeTransform { x: center.x + offset.x, y: center.y + offset.y, rotation: base.rotation + delta, ..base }
}
