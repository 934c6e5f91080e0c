//! Remote file service
//!
//! The reconciler only needs two calls from the backend: read the canonical
//! copy of a file and write a new one. `HttpFileService` speaks the JSON API
//! (`GET`/`PUT {base}/api/files/{path}`, payloads wrapped in `{"file": ...}`).

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;
use workbench_core::{Error, FilePatch, FileRecord, Result};

#[async_trait]
pub trait RemoteFileService: Send + Sync {
    /// Canonical copy of the file at `path`
    async fn fetch_detail(&self, path: &str) -> Result<FileRecord>;

    /// Persist `file` at `path`, returning the server's view of the result
    async fn update(&self, path: &str, file: FilePatch) -> Result<FileRecord>;
}

#[derive(Deserialize)]
struct FileEnvelope {
    file: FileRecord,
}

#[derive(Serialize)]
struct UpdateRequest<'a> {
    file: &'a FilePatch,
}

pub struct HttpFileService {
    client: Client,
    base_url: Url,
}

impl HttpFileService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::configuration(format!("invalid API URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::configuration(format!(
                "API URL '{base_url}' cannot carry a path"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::remote_with_source(base_url.as_str(), "connect", e))?;

        Ok(Self { client, base_url })
    }

    /// `{base}/api/files/{path}` with `path` encoded as a single segment
    pub fn file_url(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::configuration(format!("API URL '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "files", path]);
        Ok(url)
    }

    async fn send(&self, method: Method, path: &str, body: Option<&FilePatch>) -> Result<FileRecord> {
        let url = self.file_url(path)?;
        let operation = if method == Method::GET { "fetch" } else { "update" };
        debug!(%url, operation, "file service request");

        let mut request = self.client.request(method, url.clone());
        if let Some(file) = body {
            request = request.json(&UpdateRequest { file });
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::remote_with_source(url.as_str(), operation, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::not_found("file", path));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::remote(
                url.as_str(),
                operation,
                format!("HTTP {status}: {body}"),
            ));
        }

        let envelope: FileEnvelope = response
            .json()
            .await
            .map_err(|e| Error::remote_with_source(url.as_str(), operation, e))?;
        Ok(envelope.file)
    }
}

#[async_trait]
impl RemoteFileService for HttpFileService {
    async fn fetch_detail(&self, path: &str) -> Result<FileRecord> {
        self.send(Method::GET, path, None).await
    }

    async fn update(&self, path: &str, file: FilePatch) -> Result<FileRecord> {
        self.send(Method::PUT, path, Some(&file)).await
    }
}
