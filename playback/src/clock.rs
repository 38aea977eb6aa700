//! Time sources for frame-rate driven playback.
//!
//! The sequence player never reads wall time directly; it asks a [`Clock`].
//! Hosts pass the browser's `performance.now()`, native builds use
//! [`InstantClock`], tests use [`ManualClock`].

#[cfg(test)]
#[path = "clock_test.rs"]
mod clock_test;

use std::cell::Cell;
use std::time::Instant;

/// Monotonic millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    #[must_use]
    pub fn starting_at(ms: f64) -> Self {
        Self { now: Cell::new(ms) }
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

/// Milliseconds elapsed since construction, from [`Instant`].
#[derive(Debug)]
pub struct InstantClock {
    origin: Instant,
}

impl InstantClock {
    #[must_use]
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for InstantClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// `performance.now()` of the current window; 0 when unavailable.
#[cfg(feature = "web")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PerformanceClock;

#[cfg(feature = "web")]
impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map_or(0.0, |p| p.now())
    }
}
