//! Scene model: typed shapes, the ordered scene graph, and the snapshot that
//! is persisted per canvas version.
//!
//! Shapes are a closed union with one struct per kind. The scene graph keeps
//! them in a vector whose order is the draw order (index 0 is the bottom) and
//! resolves ids through a side index so selection and deletion stay O(1)
//! lookups.
//!
//! The serde layout matches the snapshot documents written by earlier clients:
//! shapes are tagged by `"type"` and attributes are camelCase.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;
use crate::consts::{ASSET_DEFAULT_W, ASSET_PLACEHOLDER_H, DEFAULT_STROKE, DEFAULT_STROKE_WIDTH};

/// Unique identifier for a shape within one scene graph.
pub type ShapeId = String;

/// Generate a fresh shape id with the given prefix (`s` for drawn shapes,
/// `img` for inserted assets).
#[must_use]
pub fn new_shape_id(prefix: &str) -> ShapeId {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

fn default_stroke() -> String {
    DEFAULT_STROKE.to_owned()
}

fn default_stroke_width() -> f64 {
    DEFAULT_STROKE_WIDTH
}

fn default_scale() -> f64 {
    1.0
}

/// What an image shape was inserted from. Video assets render as a poster frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    #[default]
    Image,
    Video,
}

/// Freehand pen stroke. `points` is a flat `[x0, y0, x1, y1, ...]` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeShape {
    pub id: ShapeId,
    #[serde(default)]
    pub points: Vec<f64>,
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

impl StrokeShape {
    /// Append a point while the stroke is being drawn.
    pub fn push_point(&mut self, p: Point) {
        self.points.push(p.x);
        self.points.push(p.y);
    }

    /// Points as pairs. A trailing odd coordinate is ignored.
    #[must_use]
    pub fn point_pairs(&self) -> Vec<Point> {
        self.points
            .chunks_exact(2)
            .map(|c| Point::new(c[0], c[1]))
            .collect()
    }
}

/// Outline rectangle. Width and height are signed while dragging and are
/// stored exactly as drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectShape {
    pub id: ShapeId,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// Clockwise rotation in degrees around `(x, y)`.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

/// Straight arrow from `(points[0], points[1])` to `(points[2], points[3])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowShape {
    pub id: ShapeId,
    pub points: [f64; 4],
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

impl ArrowShape {
    #[must_use]
    pub fn start(&self) -> Point {
        Point::new(self.points[0], self.points[1])
    }

    #[must_use]
    pub fn end(&self) -> Point {
        Point::new(self.points[2], self.points[3])
    }

    pub fn set_end(&mut self, p: Point) {
        self.points[2] = p.x;
        self.points[3] = p.y;
    }
}

/// Embedded image (or video poster) placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageShape {
    pub id: ShapeId,
    pub x: f64,
    pub y: f64,
    /// `None` until the asset has loaded and the shape was auto-sized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_scale")]
    pub scale_x: f64,
    #[serde(default = "default_scale")]
    pub scale_y: f64,
    pub src: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub asset_type: AssetKind,
}

impl ImageShape {
    /// Unscaled footprint used for drawing and hit-testing. Falls back to a
    /// placeholder box while the asset size is unknown.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        (self.width.unwrap_or(ASSET_DEFAULT_W), self.height.unwrap_or(ASSET_PLACEHOLDER_H))
    }
}

/// A scene-graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    #[serde(rename = "line")]
    Stroke(StrokeShape),
    Rect(RectShape),
    Arrow(ArrowShape),
    Image(ImageShape),
}

impl Shape {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Stroke(s) => &s.id,
            Self::Rect(s) => &s.id,
            Self::Arrow(s) => &s.id,
            Self::Image(s) => &s.id,
        }
    }

    /// Stroke width in logical units. Images have no outline.
    #[must_use]
    pub fn stroke_width(&self) -> f64 {
        match self {
            Self::Stroke(s) => s.stroke_width,
            Self::Rect(s) => s.stroke_width,
            Self::Arrow(s) => s.stroke_width,
            Self::Image(_) => 0.0,
        }
    }

    /// Move the shape by a logical delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Self::Stroke(s) => {
                for pair in s.points.chunks_exact_mut(2) {
                    pair[0] += dx;
                    pair[1] += dy;
                }
            }
            Self::Rect(s) => {
                s.x += dx;
                s.y += dy;
            }
            Self::Arrow(s) => {
                s.points[0] += dx;
                s.points[1] += dy;
                s.points[2] += dx;
                s.points[3] += dy;
            }
            Self::Image(s) => {
                s.x += dx;
                s.y += dy;
            }
        }
    }

    /// Bounds in the shape's own node frame.
    ///
    /// Rectangles and images are positioned by `(x, y)` plus a rotation, so
    /// their local bounds start at the origin. Strokes and arrows carry
    /// absolute points, so their local frame is the logical frame.
    #[must_use]
    pub fn local_bounds(&self) -> Bounds {
        match self {
            Self::Stroke(s) => Bounds::from_points(&s.point_pairs()),
            Self::Rect(s) => Bounds::from_points(&[Point::new(0.0, 0.0), Point::new(s.width, s.height)]),
            Self::Arrow(s) => Bounds::from_points(&[s.start(), s.end()]),
            Self::Image(s) => {
                let (w, h) = s.size();
                Bounds::from_points(&[Point::new(0.0, 0.0), Point::new(w, h)])
            }
        }
    }
}

/// Axis-aligned box with normalized (min ≤ max) corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Smallest box containing every point. Empty input yields a zero box at the origin.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self { min_x: 0.0, min_y: 0.0, max_x: 0.0, max_y: 0.0 };
        };
        points.iter().skip(1).fold(
            Self { min_x: first.x, min_y: first.y, max_x: first.x, max_y: first.y },
            |b, p| Self {
                min_x: b.min_x.min(p.x),
                min_y: b.min_y.min(p.y),
                max_x: b.max_x.max(p.x),
                max_y: b.max_y.max(p.y),
            },
        )
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// Whether `p` lies inside the box grown by `slop` on every side.
    #[must_use]
    pub fn contains(&self, p: Point, slop: f64) -> bool {
        p.x >= self.min_x - slop && p.x <= self.max_x + slop && p.y >= self.min_y - slop && p.y <= self.max_y + slop
    }

    /// The four corners, clockwise from the top-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }
}

/// Ordered scene graph. Insertion order is z-order.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    shapes: Vec<Shape>,
    index: HashMap<ShapeId, usize>,
}

impl SceneGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a shape on top. Returns `false` (and leaves the graph unchanged)
    /// when a shape with the same id already exists.
    pub fn insert(&mut self, shape: Shape) -> bool {
        if self.index.contains_key(shape.id()) {
            return false;
        }
        self.index.insert(shape.id().to_owned(), self.shapes.len());
        self.shapes.push(shape);
        true
    }

    /// Remove a shape by id, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<Shape> {
        let pos = self.index.remove(id)?;
        let removed = self.shapes.remove(pos);
        for shape in &self.shapes[pos..] {
            if let Some(slot) = self.index.get_mut(shape.id()) {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Shape> {
        self.index.get(id).map(|&i| &self.shapes[i])
    }

    /// Mutable access by id. Callers must not change the shape's id.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Shape> {
        let i = *self.index.get(id)?;
        self.shapes.get_mut(i)
    }

    /// Replace the shape stored under `id`, keeping its z-position.
    pub fn replace(&mut self, id: &str, shape: Shape) -> bool {
        if shape.id() != id {
            return false;
        }
        match self.get_mut(id) {
            Some(slot) => {
                *slot = shape;
                true
            }
            None => false,
        }
    }

    /// The topmost (most recently appended) shape.
    pub fn last_mut(&mut self) -> Option<&mut Shape> {
        self.shapes.last_mut()
    }

    /// Z-position of a shape (0 = bottom).
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Shapes bottom to top.
    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Replace all shapes. Later duplicates of an id are dropped.
    pub fn load(&mut self, shapes: Vec<Shape>) {
        self.shapes.clear();
        self.index.clear();
        for shape in shapes {
            let id = shape.id().to_owned();
            if !self.insert(shape) {
                log::warn!("dropping duplicate shape id {id} from snapshot");
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn default_stage_scale() -> f64 {
    1.0
}

/// Persisted payload of one canvas version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    #[serde(default)]
    pub shapes: Vec<Shape>,
    /// Viewport pan offset in device pixels.
    #[serde(default)]
    pub stage_pos: Point,
    /// Viewport zoom scale.
    #[serde(default = "default_stage_scale")]
    pub stage_scale: f64,
}

impl Default for SceneSnapshot {
    fn default() -> Self {
        Self { shapes: Vec::new(), stage_pos: Point::default(), stage_scale: 1.0 }
    }
}
