//! Shared review records for the client crates and the server.
//!
//! This crate owns the persisted/wire representation of projects, files and
//! their immutable versions, plus the small request/response types of the
//! notification subscription endpoints. Field names follow the document
//! store's camelCase layout so records written by older clients still load.

pub mod subscription;
pub mod version;

pub use subscription::{SubscriptionRequest, SubscriptionStatus, normalize_email};
pub use version::{FileKind, FileVersion, Project, ReviewFile, SequenceViewMode, VersionMetadata};
