//! Remote execution-output service

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;
use workbench_core::{Error, ExecutionOutputGroup, Result};

/// Where a run's complete output lives on the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLocator {
    pub namespace: String,
    pub path: String,
}

#[async_trait]
pub trait OutputService: Send + Sync {
    /// Complete output of the run started by `request_id`
    async fn fetch_detail(
        &self,
        request_id: &str,
        locator: &OutputLocator,
    ) -> Result<ExecutionOutputGroup>;
}

#[derive(Deserialize)]
struct OutputEnvelope {
    execution_output: ExecutionOutputGroup,
}

/// `GET {base}/api/execution_outputs/{request_id}?namespace=..&path=..`
pub struct HttpOutputService {
    client: Client,
    base_url: Url,
}

impl HttpOutputService {
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

    pub fn output_url(&self, request_id: &str, locator: &OutputLocator) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::configuration(format!("API URL '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "execution_outputs", request_id]);
        url.query_pairs_mut()
            .append_pair("namespace", &locator.namespace)
            .append_pair("path", &locator.path);
        Ok(url)
    }
}

#[async_trait]
impl OutputService for HttpOutputService {
    async fn fetch_detail(
        &self,
        request_id: &str,
        locator: &OutputLocator,
    ) -> Result<ExecutionOutputGroup> {
        let url = self.output_url(request_id, locator)?;
        debug!(%url, "fetching execution output");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::remote_with_source(url.as_str(), "fetch output", e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::not_found("execution output", request_id));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::remote(
                url.as_str(),
                "fetch output",
                format!("HTTP {status}: {body}"),
            ));
        }

        let envelope: OutputEnvelope = response
            .json()
            .await
            .map_err(|e| Error::remote_with_source(url.as_str(), "fetch output", e))?;
        Ok(envelope.execution_output)
    }
}
