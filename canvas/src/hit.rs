//! Hit-testing against scene shapes and the transform-handle overlay.
//!
//! Handles of the selected shape win over shape bodies. Bodies are tested
//! topmost first: rectangles and images in their rotated local frame, strokes
//! and arrows by distance to their polyline. All slop values are screen pixels
//! converted through the camera so picking feels the same at every zoom.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point};
use crate::consts::{HANDLE_RADIUS_PX, ROTATE_HANDLE_OFFSET_PX};
use crate::doc::{Bounds, SceneGraph, Shape, ShapeId};
use crate::transform::node_transform;

/// Which part of a shape was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
    RotateHandle,
}

/// Corner resize handles of the transform overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    Ne,
    Se,
    Sw,
    Nw,
}

impl ResizeAnchor {
    pub const ALL: [Self; 4] = [Self::Nw, Self::Ne, Self::Se, Self::Sw];

    /// Unit direction of the handle from the box center: `-1` is min, `1` is max.
    #[must_use]
    pub fn factors(self) -> (i8, i8) {
        match self {
            Self::Ne => (1, -1),
            Self::Se => (1, 1),
            Self::Sw => (-1, 1),
            Self::Nw => (-1, -1),
        }
    }

    /// The handle diagonally across the box.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Ne => Self::Sw,
            Self::Se => Self::Nw,
            Self::Sw => Self::Ne,
            Self::Nw => Self::Se,
        }
    }

    /// Handle position on a local-frame box.
    #[must_use]
    pub fn local_point(self, bounds: &Bounds) -> Point {
        let (fx, fy) = self.factors();
        let x = if fx < 0 { bounds.min_x } else { bounds.max_x };
        let y = if fy < 0 { bounds.min_y } else { bounds.max_y };
        Point::new(x, y)
    }

    /// CSS cursor shown while hovering the handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Ne | Self::Sw => "nesw-resize",
            Self::Se | Self::Nw => "nwse-resize",
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub shape_id: ShapeId,
    pub part: HitPart,
}

/// Logical positions of the resize handles of `shape`.
#[must_use]
pub fn handle_positions(shape: &Shape) -> [(ResizeAnchor, Point); 4] {
    let t = node_transform(shape);
    let bounds = shape.local_bounds();
    ResizeAnchor::ALL.map(|a| (a, t.apply(a.local_point(&bounds))))
}

/// Logical position of the rotate handle: above the top-center of the box,
/// a fixed screen distance away along the shape's rotated "up" direction.
#[must_use]
pub fn rotate_handle_position(shape: &Shape, camera: &Camera) -> Point {
    let t = node_transform(shape);
    let bounds = shape.local_bounds();
    let top = t.apply(Point::new(bounds.center().x, bounds.min_y));
    let offset = camera.screen_dist_to_world(ROTATE_HANDLE_OFFSET_PX);
    let (sin, cos) = t.rotation.to_radians().sin_cos();
    let flip = if t.scale_y < 0.0 { -1.0 } else { 1.0 };
    Point::new(top.x + offset * sin * flip, top.y - offset * cos * flip)
}

/// Test which shape (if any) is under `world_pt`.
///
/// When `selected_id` names a shape, its handles are tested first.
#[must_use]
pub fn hit_test(world_pt: Point, graph: &SceneGraph, camera: &Camera, selected_id: Option<&str>) -> Option<Hit> {
    let slop = camera.screen_dist_to_world(HANDLE_RADIUS_PX);

    if let Some(shape) = selected_id.and_then(|id| graph.get(id)) {
        if let Some(part) = handle_hit(world_pt, shape, camera, slop) {
            return Some(Hit { shape_id: shape.id().to_owned(), part });
        }
    }

    graph
        .shapes()
        .iter()
        .rev()
        .find(|shape| body_hit(world_pt, shape, slop))
        .map(|shape| Hit { shape_id: shape.id().to_owned(), part: HitPart::Body })
}

fn handle_hit(pt: Point, shape: &Shape, camera: &Camera, slop: f64) -> Option<HitPart> {
    if distance(pt, rotate_handle_position(shape, camera)) <= slop {
        return Some(HitPart::RotateHandle);
    }
    handle_positions(shape)
        .into_iter()
        .find(|(_, p)| distance(pt, *p) <= slop)
        .map(|(anchor, _)| HitPart::ResizeHandle(anchor))
}

fn body_hit(pt: Point, shape: &Shape, slop: f64) -> bool {
    let reach = shape.stroke_width() / 2.0 + slop;
    match shape {
        // Outline only: the interior is transparent to clicks.
        Shape::Rect(_) => {
            let local = node_transform(shape).invert(pt);
            let [a, b, c, d] = shape.local_bounds().corners();
            [(a, b), (b, c), (c, d), (d, a)].iter().any(|&(p, q)| segment_distance(local, p, q) <= reach)
        }
        Shape::Image(_) => {
            let local = node_transform(shape).invert(pt);
            shape.local_bounds().contains(local, reach)
        }
        Shape::Stroke(s) => {
            let pts = s.point_pairs();
            match pts.as_slice() {
                [] => false,
                [only] => distance(pt, *only) <= reach,
                _ => pts.windows(2).any(|w| segment_distance(pt, w[0], w[1]) <= reach),
            }
        }
        Shape::Arrow(a) => segment_distance(pt, a.start(), a.end()) <= reach,
    }
}

fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Shortest distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return distance(p, a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    distance(p, Point::new(a.x + t * dx, a.y + t * dy))
}
