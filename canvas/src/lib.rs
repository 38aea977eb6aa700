//! Annotation canvas engine for the review app.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! full lifecycle of a canvas file: translating raw DOM input events into
//! scene mutations, maintaining the pan/zoom viewport, hit-testing shapes and
//! the transform handles, rendering the scene, and loading/committing scene
//! snapshots as immutable file versions. The host JavaScript layer only wires
//! DOM events to the engine and reacts to the returned [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Shape types, the scene graph and the persisted snapshot |
//! | [`camera`] | Pan/zoom viewport and coordinate conversions |
//! | [`input`] | Tools, input event types and the gesture state machine |
//! | [`hit`] | Hit-testing against shapes and handles |
//! | [`transform`] | Node transforms and `finalize_transform` |
//! | [`render`] | Scene rendering to a 2D context |
//! | [`persist`] | Snapshot load/save adapter and editor mode |
//! | [`consts`] | Shared numeric constants (zoom step, asset sizes, slop) |
//!
//! The `fetch` feature adds `gloo-net` implementations of the persistence
//! collaborators in `net`. The `console` feature exports `init_logging`,
//! which routes the `log` facade to the browser console.

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
#[cfg(feature = "fetch")]
pub mod net;
pub mod persist;
pub mod render;
pub mod transform;

/// Route `log` records to the browser console and install the panic hook.
/// Safe to call more than once.
#[cfg(feature = "console")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        log::debug!("console logger already installed");
    }
}
