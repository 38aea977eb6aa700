//! Canvas persistence adapter: loads scene snapshots by content URL and
//! commits new snapshots as new immutable file versions.
//!
//! DESIGN
//! ======
//! The adapter never overwrites what it already holds on failure. A failed
//! fetch records a user-facing error (taken once by the UI) and keeps the
//! previously loaded snapshot. A fetched document that is missing or does
//! not decode is treated as an empty canvas.
//!
//! Saving does not touch the loaded snapshot: the caller observes the new
//! version in the file's version list and switches to its URL, which
//! triggers a fresh load through [`CanvasPersistence::sync_url`]. Saves are
//! not queued; callers serialize them.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use async_trait::async_trait;
use records::{FileVersion, ReviewFile};

use crate::doc::SceneSnapshot;

/// Message shown when a snapshot cannot be fetched.
pub const LOAD_FAILED_MESSAGE: &str = "Could not load canvas data";

/// Message shown when a new version cannot be committed.
pub const SAVE_FAILED_MESSAGE: &str = "Could not save canvas";

/// Transport-level failure talking to the blob store or version facade.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("unexpected status {0}")]
    Status(u16),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to load canvas: {0}")]
    Load(#[source] FetchError),
    #[error("failed to save canvas: {0}")]
    Save(#[source] FetchError),
}

/// `GET url → bytes`.
#[async_trait(?Send)]
pub trait BlobFetch {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// File/version facade: commits a snapshot as a brand-new version.
#[async_trait(?Send)]
pub trait VersionStore {
    async fn create_version(
        &self,
        project_id: &str,
        file_id: &str,
        snapshot: &SceneSnapshot,
    ) -> Result<FileVersion, FetchError>;
}

/// Decode a fetched snapshot document, falling back to an empty canvas.
#[must_use]
pub fn decode_snapshot(bytes: &[u8]) -> SceneSnapshot {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return SceneSnapshot::default();
    }
    match serde_json::from_slice::<Option<SceneSnapshot>>(bytes) {
        Ok(snapshot) => snapshot.unwrap_or_default(),
        Err(e) => {
            log::warn!("malformed canvas snapshot, using an empty canvas: {e}");
            SceneSnapshot::default()
        }
    }
}

/// Loads and commits scene snapshots for one canvas file.
pub struct CanvasPersistence<F, S> {
    fetch: F,
    store: S,
    project_id: String,
    file_id: Option<String>,
    current_url: Option<String>,
    snapshot: Option<SceneSnapshot>,
    loading: bool,
    error: Option<String>,
}

impl<F: BlobFetch, S: VersionStore> CanvasPersistence<F, S> {
    #[must_use]
    pub fn new(fetch: F, store: S, project_id: impl Into<String>, file_id: Option<String>) -> Self {
        Self {
            fetch,
            store,
            project_id: project_id.into(),
            file_id,
            current_url: None,
            snapshot: None,
            loading: false,
            error: None,
        }
    }

    /// React to the active version's content URL. Loads when the URL differs
    /// from the last one requested; returns the freshly loaded snapshot.
    pub async fn sync_url(&mut self, url: Option<&str>) -> Option<&SceneSnapshot> {
        let url = url?;
        if self.current_url.as_deref() == Some(url) {
            return None;
        }
        match self.load(url).await {
            Ok(snapshot) => Some(snapshot),
            Err(_) => None,
        }
    }

    /// Fetch and decode the snapshot at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Load`] on a transport failure or non-success
    /// status. The previously loaded snapshot is kept and a user-facing error
    /// is recorded.
    pub async fn load(&mut self, url: &str) -> Result<&SceneSnapshot, PersistError> {
        self.current_url = Some(url.to_owned());
        self.loading = true;
        let fetched = self.fetch.fetch(url).await;
        self.loading = false;

        match fetched {
            Ok(bytes) => Ok(self.snapshot.insert(decode_snapshot(&bytes))),
            Err(e) => {
                log::error!("error loading canvas data from {url}: {e}");
                self.error = Some(LOAD_FAILED_MESSAGE.to_owned());
                Err(PersistError::Load(e))
            }
        }
    }

    /// Reload the last requested URL.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub async fn refresh(&mut self) -> Result<Option<&SceneSnapshot>, PersistError> {
        let Some(url) = self.current_url.clone() else {
            return Ok(None);
        };
        self.load(&url).await.map(Some)
    }

    /// Commit `snapshot` as a new version of the file. Without a file id this
    /// is a no-op returning `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Save`] when the version store rejects the
    /// commit; a user-facing error is recorded.
    pub async fn save(&mut self, snapshot: &SceneSnapshot) -> Result<Option<FileVersion>, PersistError> {
        let Some(file_id) = self.file_id.as_deref() else {
            log::debug!("save skipped: no active file");
            return Ok(None);
        };
        match self.store.create_version(&self.project_id, file_id, snapshot).await {
            Ok(version) => {
                log::debug!("committed canvas version {} for file {file_id}", version.version);
                Ok(Some(version))
            }
            Err(e) => {
                log::error!("save failed for file {file_id}: {e}");
                self.error = Some(SAVE_FAILED_MESSAGE.to_owned());
                Err(PersistError::Save(e))
            }
        }
    }

    /// Last loaded snapshot, if any load has succeeded.
    #[must_use]
    pub fn snapshot(&self) -> Option<&SceneSnapshot> {
        self.snapshot.as_ref()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Whether the UI should show the blocking loading indicator.
    #[must_use]
    pub fn shows_spinner(&self) -> bool {
        self.loading && self.snapshot.is_none()
    }

    #[must_use]
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// Pending user-facing error. Each error is returned once.
    pub fn take_error(&mut self) -> Option<String> {
        self.error.take()
    }
}

/// How the canvas for a given file version may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    /// An older version: read-only for everyone.
    Review,
    /// Latest version opened by an admin.
    Editing,
    /// Latest version opened by a non-admin.
    Viewing,
}

impl EditorMode {
    #[must_use]
    pub fn derive(is_latest: bool, is_admin: bool) -> Self {
        match (is_latest, is_admin) {
            (false, _) => Self::Review,
            (true, true) => Self::Editing,
            (true, false) => Self::Viewing,
        }
    }

    #[must_use]
    pub fn read_only(self) -> bool {
        self != Self::Editing
    }

    /// Status line shown under the version badge.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Review => "review (read-only)",
            Self::Editing => "editing",
            Self::Viewing => "viewing",
        }
    }
}

/// Everything the canvas container derives from a file and the requested version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSession<'a> {
    /// The version actually displayed: the requested one, else the first stored.
    pub active: Option<&'a FileVersion>,
    pub mode: EditorMode,
    /// Sidebar listing, newest first.
    pub history: Vec<&'a FileVersion>,
}

impl<'a> EditorSession<'a> {
    #[must_use]
    pub fn new(file: &'a ReviewFile, requested_version: u32, is_admin: bool) -> Self {
        Self {
            active: file.resolve_version(requested_version),
            mode: EditorMode::derive(file.is_latest(requested_version), is_admin),
            history: file.versions_desc(),
        }
    }

    /// Content URL the persistence adapter should be synced to.
    #[must_use]
    pub fn content_url(&self) -> Option<&'a str> {
        self.active.map(|v| v.url.as_str())
    }

    /// Asset insertion is only offered while editing.
    #[must_use]
    pub fn can_add_assets(&self) -> bool {
        self.mode == EditorMode::Editing
    }
}
