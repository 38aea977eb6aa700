//! Viewport transform: pan/zoom and screen ↔ logical coordinate mapping.
//!
//! Zoom is deliberately unbounded; repeated wheel steps can drive the scale
//! towards zero or infinity.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

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
}

/// Camera state for pan/zoom on the drawing surface.
///
/// `pan_x` / `pan_y` are in CSS pixels.
/// `zoom` is a scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point (CSS pixels) to logical coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a logical point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.zoom + self.pan_x,
            y: world.y * self.zoom + self.pan_y,
        }
    }

    /// Convert a screen-space distance (pixels) to logical distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Rescale to `new_zoom` keeping the logical point under `screen` fixed.
    pub fn zoom_at(&mut self, screen: Point, new_zoom: f64) {
        let anchor = self.screen_to_world(screen);
        self.zoom = new_zoom;
        self.pan_x = screen.x - anchor.x * new_zoom;
        self.pan_y = screen.y - anchor.y * new_zoom;
    }

    /// Multiply the zoom by `factor` around `screen`.
    pub fn zoom_by_at(&mut self, screen: Point, factor: f64) {
        self.zoom_at(screen, self.zoom * factor);
    }

    /// Shift the pan offset by a device-pixel delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Logical point at the center of a `width` × `height` viewport.
    #[must_use]
    pub fn viewport_center_world(&self, width: f64, height: f64) -> Point {
        self.screen_to_world(Point::new(width / 2.0, height / 2.0))
    }

    /// Zoom expressed as a rounded percentage for the zoom label.
    #[must_use]
    pub fn zoom_percent(&self) -> i64 {
        #[allow(clippy::cast_possible_truncation)]
        let pct = (self.zoom * 100.0).round() as i64;
        pct
    }
}
