//! Frame-sequence player: still images presented as pseudo-video or as a
//! manually browsed filmstrip.
//!
//! Frame timing is a pure function, [`advance`], of the player state and a
//! timestamp. [`SequencePlayer`] pairs that state with an injected [`Clock`]
//! and exposes the transport, keyboard and view-mode operations a host UI
//! binds to. Operations that move the current frame return the new index so
//! the host can report it upward.
//!
//! TIMING
//! ======
//! `baseline` is the timestamp of the last committed advance. A tick with no
//! baseline only records one. A tick at least `frame_duration_ms` after the
//! baseline advances exactly one frame and moves the baseline to the tick
//! time, so the advance rate is independent of how often ticks arrive. Every
//! manual seek clears the baseline.

#[cfg(test)]
#[path = "sequence_test.rs"]
mod sequence_test;

use records::SequenceViewMode;

use crate::clock::Clock;
use crate::consts::{DEFAULT_FPS, FRAME_COUNTER_WIDTH, THUMBNAIL_LABEL_WIDTH};
use crate::preload::{PreloadError, PreloadOutcome};

/// Snapshot of everything frame timing depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub frame_count: usize,
    pub current: usize,
    pub playing: bool,
    pub looping: bool,
    pub mode: SequenceViewMode,
    pub loading: bool,
    pub frame_duration_ms: f64,
    pub baseline: Option<f64>,
}

impl PlayerState {
    #[must_use]
    pub fn new(frame_count: usize, fps: u32) -> Self {
        let fps = if fps == 0 { DEFAULT_FPS } else { fps };
        Self {
            frame_count,
            current: 0,
            playing: false,
            looping: true,
            mode: SequenceViewMode::Video,
            loading: true,
            frame_duration_ms: 1000.0 / f64::from(fps),
            baseline: None,
        }
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.frame_count.saturating_sub(1)
    }

    /// Whether the auto-advance loop runs at all.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.playing && !self.loading && self.mode == SequenceViewMode::Video && self.frame_count > 0
    }
}

/// Compute the state after an animation tick at `now` (milliseconds).
#[must_use]
pub fn advance(state: &PlayerState, now: f64) -> PlayerState {
    let mut next = state.clone();
    if !state.is_animating() {
        return next;
    }
    let Some(baseline) = state.baseline else {
        next.baseline = Some(now);
        return next;
    };
    if now - baseline < state.frame_duration_ms {
        return next;
    }
    if state.current + 1 >= state.frame_count {
        if state.looping {
            next.current = 0;
        } else {
            next.playing = false;
        }
    } else {
        next.current = state.current + 1;
    }
    next.baseline = Some(now);
    next
}

/// Interactive sequence player driven by a [`Clock`].
pub struct SequencePlayer<C> {
    clock: C,
    state: PlayerState,
    loaded: usize,
}

impl<C: Clock> SequencePlayer<C> {
    /// Player for `frame_count` frames at `fps` (0 selects the default
    /// rate). Starts stopped, looping, loading, on frame 0.
    #[must_use]
    pub fn new(frame_count: usize, fps: u32, mode: SequenceViewMode, clock: C) -> Self {
        let mut state = PlayerState::new(frame_count, fps);
        state.mode = mode;
        Self { clock, state, loaded: 0 }
    }

    // --- Animation ---

    /// Run one animation tick. Returns the new frame when it changed.
    pub fn tick(&mut self) -> Option<usize> {
        let next = advance(&self.state, self.clock.now_ms());
        let changed = next.current != self.state.current;
        self.state = next;
        changed.then_some(self.state.current)
    }

    pub fn play(&mut self) {
        if self.state.playing {
            return;
        }
        self.state.playing = true;
        self.state.baseline = Some(self.clock.now_ms());
    }

    pub fn pause(&mut self) {
        self.state.playing = false;
    }

    /// Play/pause button. Starting from the last frame rewinds to frame 0.
    pub fn toggle_play(&mut self) {
        if self.state.playing {
            self.pause();
            return;
        }
        if self.state.current >= self.state.last_index() {
            self.state.current = 0;
        }
        self.play();
    }

    pub fn toggle_loop(&mut self) {
        self.state.looping = !self.state.looping;
    }

    // --- Transport ---

    pub fn first(&mut self) -> usize {
        self.seek(0)
    }

    pub fn prev(&mut self) -> usize {
        self.seek(self.state.current.saturating_sub(1))
    }

    pub fn next(&mut self) -> usize {
        self.seek(self.state.current + 1)
    }

    pub fn last(&mut self) -> usize {
        self.seek(self.state.last_index())
    }

    /// Jump to `frame`, clamped to the valid range.
    pub fn seek(&mut self, frame: usize) -> usize {
        self.state.current = frame.min(self.state.last_index());
        self.state.baseline = None;
        self.state.current
    }

    /// Thumbnail grid selection; carousel mode only.
    pub fn select_thumbnail(&mut self, index: usize) -> Option<usize> {
        (self.state.mode == SequenceViewMode::Carousel).then(|| self.seek(index))
    }

    #[must_use]
    pub fn can_step_back(&self) -> bool {
        self.state.current > 0
    }

    #[must_use]
    pub fn can_step_forward(&self) -> bool {
        self.state.current < self.state.last_index()
    }

    // --- Input ---

    /// Keyboard binding. Returns whether the key was consumed. Nothing is
    /// handled while a text input has focus.
    pub fn handle_key(&mut self, key: &str, text_input_focused: bool) -> bool {
        if text_input_focused {
            return false;
        }
        match key {
            "ArrowLeft" => {
                self.prev();
            }
            "ArrowRight" => {
                self.next();
            }
            " " if self.state.mode == SequenceViewMode::Video => self.toggle_play(),
            "Home" => {
                self.first();
            }
            "End" => {
                self.last();
            }
            _ => return false,
        }
        true
    }

    /// Switch between video and carousel presentation. Only admins may
    /// switch; the accepted mode is returned for persisting upward.
    pub fn set_view_mode(&mut self, mode: SequenceViewMode, is_admin: bool) -> Option<SequenceViewMode> {
        if !is_admin {
            return None;
        }
        self.state.mode = mode;
        self.state.baseline = None;
        Some(mode)
    }

    // --- Preload ---

    /// A new frame list replaces the current one; loading starts over.
    pub fn reset_frames(&mut self, frame_count: usize) {
        self.state.frame_count = frame_count;
        self.state.current = self.state.current.min(self.state.last_index());
        self.state.loading = true;
        self.state.baseline = None;
        self.loaded = 0;
    }

    /// Progress callback target for the preloader.
    pub fn record_progress(&mut self, loaded: usize) {
        self.loaded = loaded.max(self.loaded).min(self.state.frame_count);
    }

    /// Fold the preloader's result into the player. Only a complete preload
    /// ends the loading state.
    pub fn apply_preload(&mut self, result: &Result<PreloadOutcome, PreloadError>) {
        match result {
            Ok(PreloadOutcome::Complete(n)) => {
                self.record_progress(*n);
                self.state.loading = false;
            }
            Ok(PreloadOutcome::Cancelled(n)) => {
                log::debug!("frame preload cancelled after {n} frames");
            }
            Err(e) => {
                log::error!("frame preload failed: {e}");
            }
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    #[must_use]
    pub fn current_frame(&self) -> usize {
        self.state.current
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.state.looping
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    #[must_use]
    pub fn view_mode(&self) -> SequenceViewMode {
        self.state.mode
    }

    #[must_use]
    pub fn loaded(&self) -> usize {
        self.loaded
    }

    /// One-based position of the current frame, 0 for an empty sequence.
    fn position(&self) -> usize {
        if self.state.frame_count == 0 { 0 } else { self.state.current + 1 }
    }

    /// "Frame n / N" caption over the image.
    #[must_use]
    pub fn frame_label(&self) -> String {
        format!("Frame {} / {}", self.position(), self.state.frame_count)
    }

    /// Zero-padded (current, total) counters beside the slider.
    #[must_use]
    pub fn counters(&self) -> (String, String) {
        (
            pad(self.position(), FRAME_COUNTER_WIDTH),
            pad(self.state.frame_count, FRAME_COUNTER_WIDTH),
        )
    }

    /// "loaded/total" shown while frames preload.
    #[must_use]
    pub fn progress_label(&self) -> String {
        format!("{}/{}", self.loaded, self.state.frame_count)
    }
}

/// Index badge for the carousel thumbnail at `index`.
#[must_use]
pub fn thumbnail_label(index: usize) -> String {
    pad(index + 1, THUMBNAIL_LABEL_WIDTH)
}

fn pad(n: usize, width: usize) -> String {
    format!("{n:0width$}")
}
