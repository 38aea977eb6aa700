//! Browser bindings: `<video>` elements as [`MediaElement`]s ([`WebMedia`]) and an
//! `<img>`-based [`FrameLoader`].

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{HtmlImageElement, HtmlMediaElement};

use crate::compare::MediaElement;
use crate::preload::{FrameLoader, LoadFailure};

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// A `<video>` element driven by the synchronizer.
///
/// `play()` returns a promise; its rejection (autoplay policy, broken
/// source) is caught and reported through
/// [`MediaElement::take_play_rejection`].
#[derive(Debug, Clone)]
pub struct WebMedia {
    element: HtmlMediaElement,
    play_rejected: Rc<Cell<bool>>,
}

impl WebMedia {
    #[must_use]
    pub fn new(element: HtmlMediaElement) -> Self {
        Self { element, play_rejected: Rc::new(Cell::new(false)) }
    }

    #[must_use]
    pub fn element(&self) -> &HtmlMediaElement {
        &self.element
    }
}

impl MediaElement for WebMedia {
    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn duration(&self) -> Option<f64> {
        let d = self.element.duration();
        d.is_finite().then_some(d)
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn play(&mut self) {
        let promise = match self.element.play() {
            Ok(promise) => promise,
            Err(e) => {
                log::debug!("media play rejected: {}", describe(&e));
                self.play_rejected.set(true);
                return;
            }
        };
        let rejected = Rc::clone(&self.play_rejected);
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::debug!("media play rejected: {}", describe(&e));
                rejected.set(true);
            }
        });
    }

    fn pause(&mut self) {
        if let Err(e) = self.element.pause() {
            log::debug!("media pause failed: {}", describe(&e));
        }
    }

    fn is_paused(&self) -> bool {
        self.element.paused()
    }

    fn set_muted(&mut self, muted: bool) {
        self.element.set_muted(muted);
    }

    fn is_muted(&self) -> bool {
        self.element.muted()
    }

    fn take_play_rejection(&mut self) -> bool {
        self.play_rejected.replace(false)
    }
}

/// Loads a frame by pointing a detached `<img>` at it and waiting for
/// `load` or `error`. The browser cache then serves playback.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageFrameLoader;

#[async_trait(?Send)]
impl FrameLoader for ImageFrameLoader {
    async fn load(&self, url: &str) -> Result<(), LoadFailure> {
        let img = HtmlImageElement::new().map_err(|e| LoadFailure(describe(&e)))?;
        let promise = js_sys::Promise::new(&mut |resolve, reject| {
            img.set_onload(Some(&resolve));
            img.set_onerror(Some(&reject));
        });
        img.set_src(url);
        let result = JsFuture::from(promise).await;
        img.set_onload(None);
        img.set_onerror(None);
        result.map(|_| ()).map_err(|_| LoadFailure(format!("could not load {url}")))
    }
}
