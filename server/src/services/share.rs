//! Share-link metadata: Open Graph previews for link-unfurling bots and a
//! redirect to the viewer for everyone else.
//!
//! SYSTEM CONTEXT
//! ==============
//! Share links look like `/share/p/<projectId>[/file/<fileId>]`. The `p` and
//! `file` markers may appear anywhere in the path.

use tracing::warn;

use super::version::decode_file;
use super::{PROJECTS, files_collection};
use crate::state::AppState;
use crate::store::StoreError;

const DEFAULT_TITLE: &str = "Review";
const DEFAULT_FILE_TITLE: &str = "File";
const DEFAULT_PROJECT_TITLE: &str = "Project";
const DESCRIPTION: &str = "Shared for review";

/// User-agent fragments of link-preview crawlers, lowercase.
const BOT_AGENTS: [&str; 7] =
    ["facebookexternalhit", "twitterbot", "linkedinbot", "whatsapp", "telegram", "skype", "slack"];

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("share path has no project id")]
    MissingProject,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareTarget {
    pub project_id: String,
    pub file_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareMeta {
    pub title: String,
    pub image: Option<String>,
    /// Canonical viewer URL.
    pub url: String,
}

/// Extract the project and optional file id from a share path.
#[must_use]
pub fn parse_share_path(path: &str) -> Option<ShareTarget> {
    let segments = path.split('/').filter(|s| !s.is_empty()).collect::<Vec<_>>();
    let after = |marker: &str| {
        segments
            .iter()
            .position(|s| *s == marker)
            .and_then(|i| segments.get(i + 1))
            .map(|s| (*s).to_owned())
    };
    Some(ShareTarget { project_id: after("p")?, file_id: after("file") })
}

/// Whether `user_agent` belongs to a link-preview crawler.
#[must_use]
pub fn is_bot(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    BOT_AGENTS.iter().any(|bot| ua.contains(bot))
}

/// Viewer URL for a share target.
#[must_use]
pub fn canonical_url(app_url: &str, target: &ShareTarget) -> String {
    match &target.file_id {
        Some(file_id) => format!("{app_url}/review/{}/file/{file_id}", target.project_id),
        None => format!("{app_url}/review/{}", target.project_id),
    }
}

/// Resolve title, preview image and canonical URL for a share path.
///
/// # Errors
///
/// `MissingProject` when the path names no project, `Store` on read failure.
pub async fn resolve(state: &AppState, path: &str) -> Result<ShareMeta, ShareError> {
    let target = parse_share_path(path).ok_or(ShareError::MissingProject)?;
    let mut meta = ShareMeta {
        title: DEFAULT_TITLE.to_owned(),
        image: None,
        url: canonical_url(&state.config.app_url, &target),
    };

    if let Some(file_id) = &target.file_id {
        if let Some(doc) = state.store.get(&files_collection(&target.project_id), file_id).await? {
            match decode_file(file_id, doc) {
                Ok(file) => {
                    meta.title = non_empty(&file.name).unwrap_or(DEFAULT_FILE_TITLE).to_owned();
                    meta.image = file.current().map(|v| v.preview_image().to_owned());
                }
                Err(e) => {
                    warn!(error = %e, %file_id, "share target file is malformed");
                    meta.title = DEFAULT_FILE_TITLE.to_owned();
                }
            }
        }
    } else if let Some(doc) = state.store.get(PROJECTS, &target.project_id).await? {
        let name = doc.get("name").and_then(|n| n.as_str()).and_then(non_empty);
        meta.title = name.unwrap_or(DEFAULT_PROJECT_TITLE).to_owned();
    }

    Ok(meta)
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

/// Escape text for interpolation into HTML content and quoted attributes.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Preview page served to crawlers: Open Graph and Twitter tags plus a
/// script redirect to the viewer.
#[must_use]
pub fn render_html(meta: &ShareMeta) -> String {
    let title = escape_html(&meta.title);
    let url = escape_html(&meta.url);
    let script_url = serde_json::Value::String(meta.url.clone()).to_string().replace("</", "<\\/");
    let (og_image, twitter_image) = match &meta.image {
        Some(image) => {
            let image = escape_html(image);
            (
                format!("<meta property=\"og:image\" content=\"{image}\">"),
                format!("<meta property=\"twitter:image\" content=\"{image}\">"),
            )
        }
        None => (String::new(), String::new()),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <meta property="og:type" content="website">
    <meta property="og:url" content="{url}">
    <meta property="og:title" content="{title}">
    <meta property="og:description" content="{DESCRIPTION}">
    {og_image}
    <meta property="twitter:card" content="summary_large_image">
    <meta property="twitter:url" content="{url}">
    <meta property="twitter:title" content="{title}">
    <meta property="twitter:description" content="{DESCRIPTION}">
    {twitter_image}
    <script>window.location.href = {script_url};</script>
</head>
<body>
    <h1>Redirecting...</h1>
    <p>If nothing happens, <a href="{url}">continue here</a>.</p>
</body>
</html>
"#
    )
}

#[cfg(test)]
#[path = "share_test.rs"]
mod tests;
