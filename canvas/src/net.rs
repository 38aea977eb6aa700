//! Browser HTTP implementations of the persistence collaborators via `gloo-net`.
//!
//! Snapshots are fetched straight from their content URL. New versions are
//! committed through the review server's version endpoint.

use async_trait::async_trait;
use records::FileVersion;

use crate::doc::SceneSnapshot;
use crate::persist::{BlobFetch, FetchError, VersionStore};

fn network(e: gloo_net::Error) -> FetchError {
    FetchError::Network(e.to_string())
}

fn success(status: u16) -> Result<(), FetchError> {
    if (200..300).contains(&status) { Ok(()) } else { Err(FetchError::Status(status)) }
}

/// `GET` over `fetch()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpBlobFetch;

#[async_trait(?Send)]
impl BlobFetch for HttpBlobFetch {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let resp = gloo_net::http::Request::get(url).send().await.map_err(network)?;
        success(resp.status())?;
        resp.binary().await.map_err(network)
    }
}

/// Commits versions through `POST {base}/api/projects/{pid}/files/{fid}/versions`.
#[derive(Debug, Clone, Default)]
pub struct HttpVersionStore {
    base_url: String,
}

impl HttpVersionStore {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }

    fn versions_endpoint(&self, project_id: &str, file_id: &str) -> String {
        format!("{}/api/projects/{project_id}/files/{file_id}/versions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait(?Send)]
impl VersionStore for HttpVersionStore {
    async fn create_version(
        &self,
        project_id: &str,
        file_id: &str,
        snapshot: &SceneSnapshot,
    ) -> Result<FileVersion, FetchError> {
        let resp = gloo_net::http::Request::post(&self.versions_endpoint(project_id, file_id))
            .json(snapshot)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        success(resp.status())?;
        resp.json::<FileVersion>().await.map_err(network)
    }
}
