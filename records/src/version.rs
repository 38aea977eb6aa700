//! Projects, files and their immutable versions.
//!
//! A [`ReviewFile`] owns an ordered collection of [`FileVersion`]s. Versions
//! are never edited in place: committing new content always appends a version
//! with the next number and moves `current_version` to it.

#[cfg(test)]
#[path = "version_test.rs"]
mod version_test;

use serde::{Deserialize, Serialize};

/// Media family of a review file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Video,
    /// 3D model rendered by the model viewer.
    Model,
    /// Ordered list of still frames played back as pseudo-video.
    Sequence,
    /// Freeform annotation canvas; version content is a scene snapshot.
    Canvas,
}

/// How a sequence file is presented to viewers. Chosen by a project admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceViewMode {
    /// Auto-advancing playback at the file's frame rate.
    #[default]
    Video,
    /// Manual filmstrip browsing with a thumbnail grid.
    Carousel,
}

/// Optional descriptive metadata attached at upload/commit time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One immutable, numbered revision of a file's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileVersion {
    /// Positive, unique within the owning file, increasing with each commit.
    pub version: u32,
    /// Immutable pointer to the content (scene snapshot JSON or media bytes).
    pub url: String,
    /// Commit time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub uploaded_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VersionMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

impl FileVersion {
    #[must_use]
    pub fn new(version: u32, url: impl Into<String>, uploaded_at: i64) -> Self {
        Self { version, url: url.into(), uploaded_at, metadata: None, thumbnail: None, poster: None }
    }

    /// Best image to represent this version in link previews.
    #[must_use]
    pub fn preview_image(&self) -> &str {
        self.thumbnail
            .as_deref()
            .or(self.poster.as_deref())
            .unwrap_or(&self.url)
    }
}

/// A project groups review files and notification subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A reviewable file and its version history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(default = "default_current_version")]
    pub current_version: u32,
    #[serde(default)]
    pub versions: Vec<FileVersion>,
    /// Frame URLs for [`FileKind::Sequence`] files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_view_mode: Option<SequenceViewMode>,
}

fn default_current_version() -> u32 {
    1
}

impl ReviewFile {
    /// Create an empty file with no versions yet.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: FileKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            current_version: 0,
            versions: Vec::new(),
            sequence_urls: None,
            fps: None,
            sequence_view_mode: None,
        }
    }

    /// Look up a version by number.
    #[must_use]
    pub fn version(&self, number: u32) -> Option<&FileVersion> {
        self.versions.iter().find(|v| v.version == number)
    }

    /// The requested version, or the first stored one when it does not exist.
    #[must_use]
    pub fn resolve_version(&self, number: u32) -> Option<&FileVersion> {
        self.version(number).or_else(|| self.versions.first())
    }

    /// The version `current_version` points at.
    #[must_use]
    pub fn current(&self) -> Option<&FileVersion> {
        self.version(self.current_version)
    }

    /// Whether `number` is the most recently committed version.
    #[must_use]
    pub fn is_latest(&self, number: u32) -> bool {
        number == self.current_version
    }

    /// Versions sorted newest first, as listed in the history sidebar.
    #[must_use]
    pub fn versions_desc(&self) -> Vec<&FileVersion> {
        let mut sorted = self.versions.iter().collect::<Vec<_>>();
        sorted.sort_by(|a, b| b.version.cmp(&a.version));
        sorted
    }

    /// Number the next committed version will receive.
    #[must_use]
    pub fn next_version_number(&self) -> u32 {
        self.versions.iter().map(|v| v.version).max().unwrap_or(0) + 1
    }

    /// Append a committed version and make it current.
    pub fn push_version(&mut self, version: FileVersion) {
        self.current_version = version.version;
        self.versions.push(version);
    }

    /// Closest version number strictly below `number`.
    #[must_use]
    pub fn preceding(&self, number: u32) -> Option<u32> {
        self.versions
            .iter()
            .map(|v| v.version)
            .filter(|&v| v < number)
            .max()
    }

    /// Closest version number strictly above `number`.
    #[must_use]
    pub fn following(&self, number: u32) -> Option<u32> {
        self.versions
            .iter()
            .map(|v| v.version)
            .filter(|&v| v > number)
            .min()
    }
}
