//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InputState` is the active gesture tracked between pointer-down and
//! pointer-up, carrying the context needed to compute incremental updates and
//! commit the final geometry on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::consts::{DEFAULT_STROKE, DEFAULT_STROKE_WIDTH};
use crate::doc::{Bounds, Shape, ShapeId};
use crate::hit::HitPart;
use crate::transform::NodeTransform;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Drag to pan the viewport.
    Hand,
    /// Freehand stroke.
    Pen,
    /// Outline rectangle.
    Rect,
    /// Straight arrow.
    Arrow,
}

impl Tool {
    /// Whether this tool authors a new shape on pointer-down.
    #[must_use]
    pub fn is_drawing(self) -> bool {
        matches!(self, Self::Pen | Self::Rect | Self::Arrow)
    }

    /// Tool bound to a single-key shortcut (case-insensitive).
    #[must_use]
    pub fn from_shortcut(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "v" => Some(Self::Select),
            "h" => Some(Self::Hand),
            "p" => Some(Self::Pen),
            "r" => Some(Self::Rect),
            "a" => Some(Self::Arrow),
            _ => None,
        }
    }

    /// Cursor shown over the canvas while the tool is idle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Select => "default",
            Self::Hand => "grab",
            Self::Pen | Self::Rect | Self::Arrow => "crosshair",
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = towards the user).
    pub dy: f64,
}

/// Persistent UI state visible to the renderer and the toolbar.
#[derive(Debug, Clone)]
pub struct UiState {
    pub tool: Tool,
    pub selected_id: Option<ShapeId>,
    /// Stroke color applied to newly drawn shapes.
    pub stroke: String,
    /// Stroke width applied to newly drawn shapes.
    pub stroke_width: f64,
    /// Set for non-latest versions and non-admin viewers.
    pub read_only: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            selected_id: None,
            stroke: DEFAULT_STROKE.to_owned(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            read_only: false,
        }
    }
}

/// Gesture in progress between pointer-down and pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Dragging the viewport.
    Panning {
        /// Screen position at the previous event.
        last_screen: Point,
    },
    /// Authoring a new shape. Only the last-appended shape is mutated.
    Drawing {
        id: ShapeId,
        /// Logical position of the pointer-down.
        anchor: Point,
    },
    /// Moving, resizing or rotating the selected shape through the overlay.
    ///
    /// The scene graph keeps `original` until release; `pending` is the
    /// provisional node transform the renderer previews.
    Transforming {
        id: ShapeId,
        original: Shape,
        base: NodeTransform,
        bounds: Bounds,
        part: HitPart,
        start_world: Point,
        pending: NodeTransform,
    },
}

impl InputState {
    /// Provisional transform for `id`, if it is being transformed.
    #[must_use]
    pub fn preview_for(&self, id: &str) -> Option<NodeTransform> {
        match self {
            Self::Transforming { id: active, pending, .. } if active == id => Some(*pending),
            _ => None,
        }
    }
}
