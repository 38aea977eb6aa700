//! Shared constants for the playback crate.

// ── Sequence player ─────────────────────────────────────────────

/// Frame rate used when a sequence file does not specify one.
pub const DEFAULT_FPS: u32 = 24;

/// Zero-padded width of the frame counters beside the timeline slider.
pub const FRAME_COUNTER_WIDTH: usize = 3;

/// Zero-padded width of the index badge on carousel thumbnails.
pub const THUMBNAIL_LABEL_WIDTH: usize = 2;

// ── Dual playback ───────────────────────────────────────────────

/// Positions closer than this (seconds) are treated as already aligned, so
/// no seek is issued and no echo is expected.
pub const SEEK_TOLERANCE_S: f64 = 1e-3;
