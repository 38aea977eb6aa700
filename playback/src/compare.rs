//! Dual-playback synchronizer for side-by-side version comparison.
//!
//! Two media elements (primary, secondary) are kept in lock-step: play, pause
//! and seek on either side propagate to the other. The primary is
//! authoritative for end-of-media gating: a primary `play` does not restart a
//! secondary that already reached its end, and a primary `timeupdate` past
//! the secondary's duration parks the secondary at its last frame. The
//! secondary side propagates play/pause/seek unconditionally and ignores its
//! own `timeupdate`.
//!
//! FEEDBACK SUPPRESSION
//! ====================
//! Every event is tagged with its origin [`Side`]. When a propagated command
//! actually changes the target element's state, the synchronizer records the
//! event that element is about to echo back. The echo is consumed (settled)
//! when it arrives instead of being propagated again. Commands that would
//! not change state are skipped entirely, so they expect no echo.
//!
//! At most one echo per side and kind is outstanding. A newer seek replaces
//! the older expectation, since an element interrupted mid-seek fires a
//! single `seeked`. A `seeked` only counts as the echo when it lands on the
//! commanded position; any other position is a genuine seek and propagates.
//! Elements report rejected `play()` requests through
//! [`MediaElement::take_play_rejection`], which drops the pending `Play`
//! echo. The host may also call [`DualPlayback::settle`] when an element will
//! never fire its echo.
//!
//! Audio is exclusive: exactly one side is unmuted while comparing.

#[cfg(test)]
#[path = "compare_test.rs"]
mod compare_test;

use records::FileVersion;

use crate::consts::SEEK_TOLERANCE_S;

/// Media element surface the synchronizer drives.
pub trait MediaElement {
    /// Playback position in seconds.
    fn current_time(&self) -> f64;
    /// Total length in seconds, `None` while unknown.
    fn duration(&self) -> Option<f64>;
    fn set_current_time(&mut self, seconds: f64);
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    fn set_muted(&mut self, muted: bool);
    fn is_muted(&self) -> bool;
    /// Whether a `play()` request was refused since the last call. Elements
    /// whose play cannot fail keep the default.
    fn take_play_rejection(&mut self) -> bool {
        false
    }
}

/// Which of the two compared elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Primary,
    Secondary,
}

impl Side {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }
}

/// A media event reported by one side. Times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    Play,
    Pause,
    Seeked(f64),
    TimeUpdate(f64),
}

/// An event a driven element is expected to fire back. `Seeked` carries the
/// commanded position.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Echo {
    Play,
    Pause,
    Seeked(f64),
}

impl Echo {
    fn same_kind(self, other: Self) -> bool {
        std::mem::discriminant(&self) == std::mem::discriminant(&other)
    }

    /// Whether `event` is this echo arriving.
    fn matches(self, event: MediaEvent) -> bool {
        match (self, event) {
            (Self::Play, MediaEvent::Play) | (Self::Pause, MediaEvent::Pause) => true,
            (Self::Seeked(target), MediaEvent::Seeked(t)) => aligned(target, t),
            _ => false,
        }
    }
}

impl MediaEvent {
    fn echo(self) -> Option<Echo> {
        match self {
            Self::Play => Some(Echo::Play),
            Self::Pause => Some(Echo::Pause),
            Self::Seeked(t) => Some(Echo::Seeked(t)),
            Self::TimeUpdate(_) => None,
        }
    }
}

/// Outstanding echo expectations, at most one per side and kind.
#[derive(Debug, Default)]
struct Pending(Vec<(Side, Echo)>);

impl Pending {
    fn expect(&mut self, side: Side, echo: Echo) {
        self.forget(side, echo);
        self.0.push((side, echo));
    }

    /// Consume the expectation `event` settles. An expectation of the same
    /// kind that does not match is stale and is dropped as well.
    fn consume(&mut self, side: Side, event: MediaEvent) -> bool {
        let Some(kind) = event.echo() else {
            return false;
        };
        let Some(i) = self.0.iter().position(|&(s, e)| s == side && e.same_kind(kind)) else {
            return false;
        };
        let (_, expected) = self.0.remove(i);
        expected.matches(event)
    }

    fn forget(&mut self, side: Side, kind: Echo) {
        self.0.retain(|&(s, e)| !(s == side && e.same_kind(kind)));
    }

    fn clear_side(&mut self, side: Side) {
        self.0.retain(|&(s, _)| s != side);
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What [`DualPlayback::handle`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncOutcome {
    /// Comparison is off or the counterpart element is not mounted.
    Inactive,
    /// The event was the echo of a propagated command and has been settled.
    Echo,
    /// The event was mirrored onto the other side. `seek` carries the
    /// position to report upward for `Seeked` events.
    Synced { seek: Option<f64> },
}

/// Default comparison partner for `primary`: the closest lower version,
/// else the closest higher one, else `primary` itself.
#[must_use]
pub fn default_secondary(primary: u32, versions: &[FileVersion]) -> u32 {
    let numbers = || versions.iter().map(|v| v.version);
    numbers()
        .filter(|&v| v < primary)
        .max()
        .or_else(|| numbers().filter(|&v| v > primary).min())
        .unwrap_or(primary)
}

fn clamp_to(duration: Option<f64>, t: f64) -> f64 {
    duration.map_or(t, |d| t.min(d))
}

fn aligned(a: f64, b: f64) -> bool {
    (a - b).abs() < SEEK_TOLERANCE_S
}

/// Commands the synchronizer issues to a target element.
enum Drive {
    Play,
    Pause,
    Seek(f64),
}

/// Apply `drive` to `target` when it changes the element's state, and
/// remember the echo the element will emit.
fn drive<M: MediaElement>(target: &mut M, side: Side, drive: Drive, pending: &mut Pending) {
    match drive {
        Drive::Play if target.is_paused() => {
            target.play();
            pending.expect(side, Echo::Play);
        }
        Drive::Pause if !target.is_paused() => {
            target.pause();
            pending.expect(side, Echo::Pause);
        }
        Drive::Seek(t) if !aligned(target.current_time(), t) => {
            target.set_current_time(t);
            pending.expect(side, Echo::Seeked(t));
        }
        Drive::Play | Drive::Pause | Drive::Seek(_) => {}
    }
}

/// Comparison state for one primary element and an optional secondary one.
pub struct DualPlayback<M> {
    primary: M,
    secondary: Option<M>,
    primary_version: u32,
    secondary_version: Option<u32>,
    comparing: bool,
    active_audio: Side,
    pending: Pending,
}

impl<M: MediaElement> DualPlayback<M> {
    #[must_use]
    pub fn new(primary: M, primary_version: u32) -> Self {
        Self {
            primary,
            secondary: None,
            primary_version,
            secondary_version: None,
            comparing: false,
            active_audio: Side::Primary,
            pending: Pending::default(),
        }
    }

    // --- Mode ---

    /// Enter or leave comparison mode.
    ///
    /// Entering picks [`default_secondary`], hands audio to the primary and
    /// mutes the secondary. Leaving clears the secondary version and
    /// unmounts the secondary element; re-entering waits for a fresh
    /// [`attach_secondary`](Self::attach_secondary).
    pub fn toggle_compare(&mut self, versions: &[FileVersion]) {
        if self.comparing {
            self.comparing = false;
            self.secondary_version = None;
            self.secondary = None;
            self.pending.clear();
            return;
        }
        self.comparing = true;
        self.secondary_version = Some(default_secondary(self.primary_version, versions));
        self.active_audio = Side::Primary;
        self.apply_audio();
        self.resync();
    }

    /// Select the version shown on the secondary side. While comparing, the
    /// secondary is immediately re-aligned with the primary.
    pub fn set_secondary_version(&mut self, version: Option<u32>) {
        self.secondary_version = version;
        if version.is_some() {
            self.resync();
        }
    }

    /// The primary element switched to another version.
    pub fn set_primary_version(&mut self, version: u32) {
        self.primary_version = version;
    }

    /// Mount the secondary element (e.g. after its source loaded).
    pub fn attach_secondary(&mut self, mut element: M) {
        element.set_muted(self.active_audio != Side::Secondary);
        self.secondary = Some(element);
        self.pending.clear_side(Side::Secondary);
        self.resync();
    }

    pub fn detach_secondary(&mut self) -> Option<M> {
        self.pending.clear_side(Side::Secondary);
        self.secondary.take()
    }

    /// Hand audio to the other side.
    pub fn toggle_audio(&mut self) {
        self.active_audio = self.active_audio.other();
        self.apply_audio();
    }

    // --- Events ---

    /// Process an event fired by `origin`.
    pub fn handle(&mut self, origin: Side, event: MediaEvent) -> SyncOutcome {
        self.collect_play_rejections();
        if self.pending.consume(origin, event) {
            return SyncOutcome::Echo;
        }
        if !self.comparing {
            return SyncOutcome::Inactive;
        }
        let Some(secondary) = self.secondary.as_mut() else {
            return SyncOutcome::Inactive;
        };
        let pending = &mut self.pending;

        match origin {
            Side::Primary => match event {
                MediaEvent::Play => {
                    let before_end = secondary.duration().is_some_and(|d| secondary.current_time() < d);
                    if before_end {
                        drive(secondary, Side::Secondary, Drive::Play, pending);
                    }
                    SyncOutcome::Synced { seek: None }
                }
                MediaEvent::Pause => {
                    drive(secondary, Side::Secondary, Drive::Pause, pending);
                    SyncOutcome::Synced { seek: None }
                }
                MediaEvent::Seeked(t) => {
                    let target = clamp_to(secondary.duration(), t);
                    drive(secondary, Side::Secondary, Drive::Seek(target), pending);
                    SyncOutcome::Synced { seek: Some(t) }
                }
                MediaEvent::TimeUpdate(t) => {
                    if let Some(end) = secondary.duration().filter(|&d| d > 0.0 && t >= d) {
                        drive(secondary, Side::Secondary, Drive::Pause, pending);
                        drive(secondary, Side::Secondary, Drive::Seek(end), pending);
                    }
                    SyncOutcome::Synced { seek: None }
                }
            },
            Side::Secondary => {
                let primary = &mut self.primary;
                match event {
                    MediaEvent::Play => drive(primary, Side::Primary, Drive::Play, pending),
                    MediaEvent::Pause => drive(primary, Side::Primary, Drive::Pause, pending),
                    MediaEvent::Seeked(t) => {
                        let target = clamp_to(primary.duration(), t);
                        drive(primary, Side::Primary, Drive::Seek(target), pending);
                        return SyncOutcome::Synced { seek: Some(t) };
                    }
                    MediaEvent::TimeUpdate(_) => {}
                }
                SyncOutcome::Synced { seek: None }
            }
        }
    }

    /// Drop every echo still expected from `side`.
    pub fn settle(&mut self, side: Side) {
        self.pending.clear_side(side);
    }

    // --- Queries ---

    #[must_use]
    pub fn is_comparing(&self) -> bool {
        self.comparing
    }

    #[must_use]
    pub fn secondary_version(&self) -> Option<u32> {
        self.secondary_version
    }

    #[must_use]
    pub fn active_audio(&self) -> Side {
        self.active_audio
    }

    /// Content URL of the selected secondary version.
    #[must_use]
    pub fn secondary_url<'a>(&self, versions: &'a [FileVersion]) -> Option<&'a str> {
        let wanted = self.secondary_version?;
        versions.iter().find(|v| v.version == wanted).map(|v| v.url.as_str())
    }

    #[must_use]
    pub fn primary(&self) -> &M {
        &self.primary
    }

    #[must_use]
    pub fn secondary(&self) -> Option<&M> {
        self.secondary.as_ref()
    }

    /// Whether any propagated command is still waiting for its echo.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }

    // --- Internals ---

    /// A refused `play()` never fires `play`; stop waiting for it.
    fn collect_play_rejections(&mut self) {
        if self.primary.take_play_rejection() {
            self.pending.forget(Side::Primary, Echo::Play);
        }
        if let Some(secondary) = self.secondary.as_mut() {
            if secondary.take_play_rejection() {
                self.pending.forget(Side::Secondary, Echo::Play);
            }
        }
    }

    fn apply_audio(&mut self) {
        self.primary.set_muted(self.active_audio != Side::Primary);
        if let Some(secondary) = self.secondary.as_mut() {
            secondary.set_muted(self.active_audio != Side::Secondary);
        }
    }

    /// Align the secondary with the primary's position (clamped to the
    /// secondary's length). Skipped at position 0.
    fn resync(&mut self) {
        if !self.comparing {
            return;
        }
        let Some(secondary) = self.secondary.as_mut() else {
            return;
        };
        let t = self.primary.current_time();
        if t > 0.0 {
            let target = clamp_to(secondary.duration(), t);
            drive(secondary, Side::Secondary, Drive::Seek(target), &mut self.pending);
        }
    }
}
