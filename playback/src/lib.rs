//! Playback core for video comparison and image sequences.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`compare`] | Lock-step synchronization of two media elements with echo suppression and exclusive audio |
//! | [`sequence`] | Frame-sequence player: pure frame timing, transport, keyboard, view mode |
//! | [`preload`] | Sequential, cancellable frame preloading |
//! | [`clock`] | Injectable millisecond time sources |
//! | [`consts`] | Tunables |
//!
//! With the `web` feature, `web` implements the media and loader traits for
//! browser elements.

pub mod clock;
pub mod compare;
pub mod consts;
pub mod preload;
pub mod sequence;

#[cfg(feature = "web")]
pub mod web;

pub use compare::{DualPlayback, MediaElement, MediaEvent, Side, SyncOutcome};
pub use sequence::{PlayerState, SequencePlayer, advance};
