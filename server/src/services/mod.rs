//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and document layout so route handlers
//! can stay focused on protocol translation.
//!
//! | Collection | Document id | Contents |
//! |------------|-------------|----------|
//! | `projects` | project id | `Project` |
//! | `projects/<pid>/files` | file id | `ReviewFile` |
//! | `projects/<pid>/files/<fid>/content` | version number | scene snapshot |
//! | `projects/<pid>/subscribers` | SHA-256 of email | subscriber record |

pub mod share;
pub mod subscription;
pub mod version;

pub const PROJECTS: &str = "projects";

#[must_use]
pub fn files_collection(project_id: &str) -> String {
    format!("{PROJECTS}/{project_id}/files")
}

#[must_use]
pub fn content_collection(project_id: &str, file_id: &str) -> String {
    format!("{PROJECTS}/{project_id}/files/{file_id}/content")
}

#[must_use]
pub fn subscribers_collection(project_id: &str) -> String {
    format!("{PROJECTS}/{project_id}/subscribers")
}
