//! Sequential frame preloading.
//!
//! Frames load strictly in index order, one at a time, so the "loaded so
//! far" count is monotonic. The first failure aborts the run. A
//! [`CancelToken`] is checked before each frame; a frame already in flight
//! is not aborted.

#[cfg(test)]
#[path = "preload_test.rs"]
mod preload_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

/// Why a single frame failed to load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct LoadFailure(pub String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreloadError {
    #[error("frame {index} ({url}) failed to load: {source}")]
    Frame { index: usize, url: String, source: LoadFailure },
}

/// How a preload run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadOutcome {
    /// Every frame loaded.
    Complete(usize),
    /// Stopped early by the cancel token after this many frames.
    Cancelled(usize),
}

/// Fetches one frame image.
#[async_trait(?Send)]
pub trait FrameLoader {
    async fn load(&self, url: &str) -> Result<(), LoadFailure>;
}

/// Shared flag that stops a preload run at the next frame boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Load `urls` in order. `on_progress` receives the running count after
/// each successful frame.
///
/// # Errors
///
/// Returns [`PreloadError::Frame`] for the first frame that fails; later
/// frames are never attempted.
pub async fn preload<L, F>(
    urls: &[String],
    loader: &L,
    cancel: &CancelToken,
    mut on_progress: F,
) -> Result<PreloadOutcome, PreloadError>
where
    L: FrameLoader + ?Sized,
    F: FnMut(usize),
{
    for (index, url) in urls.iter().enumerate() {
        if cancel.is_cancelled() {
            return Ok(PreloadOutcome::Cancelled(index));
        }
        loader
            .load(url)
            .await
            .map_err(|source| PreloadError::Frame { index, url: url.clone(), source })?;
        if cancel.is_cancelled() {
            return Ok(PreloadOutcome::Cancelled(index));
        }
        on_progress(index + 1);
    }
    Ok(PreloadOutcome::Complete(urls.len()))
}
