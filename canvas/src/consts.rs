//! Shared numeric constants for the canvas crate.

// ── Viewport ────────────────────────────────────────────────────

/// Multiplicative zoom step per wheel notch or zoom button press.
pub const ZOOM_STEP: f64 = 1.1;

/// Viewport size assumed before the host reports real dimensions.
pub const FALLBACK_VIEWPORT_W: f64 = 800.0;
pub const FALLBACK_VIEWPORT_H: f64 = 600.0;

// ── Style ───────────────────────────────────────────────────────

/// Stroke colors offered by the toolbar.
pub const PALETTE: [&str; 4] = ["#000000", "#df4b26", "#10b981", "#3b82f6"];

/// Stroke widths offered by the toolbar.
pub const STROKE_WIDTHS: [f64; 3] = [2.0, 4.0, 8.0];

pub const DEFAULT_STROKE: &str = "#000000";
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

// ── Assets ──────────────────────────────────────────────────────

/// Width an inserted asset is auto-sized to once its natural size is known.
pub const ASSET_DEFAULT_W: f64 = 300.0;

/// Placeholder height used before the asset has loaded.
pub const ASSET_PLACEHOLDER_H: f64 = 200.0;

/// Smallest width/height a transformed image may be committed with.
pub const MIN_IMAGE_SIZE: f64 = 5.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for handles and thin strokes.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Distance from the bounding box top edge to the rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;
