//! Transport to the remote analysis service.
//!
//! [`AnalysisClient`] is the seam between the component and the network:
//! the scanner only ever sees "a JSON object" or "an [`AnalysisError`]".
//! [`HttpAnalysisClient`] is the real implementation: one multipart POST per
//! call, no retries, and no timeout unless the config sets one.

use crate::config::ScannerConfig;
use crate::error::{AnalysisError, ScanError};
use crate::file::SelectedFile;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Multipart field name the service reads the document from.
pub const FILE_FIELD: &str = "file";

/// Sends a document for analysis and returns the service's JSON object.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Issue exactly one analysis request for `file`.
    async fn analyze(&self, file: &SelectedFile) -> Result<Map<String, Value>, AnalysisError>;
}

/// Body of the service's `GET /health` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    /// Everything else the service reported (key presence, temp dir, ...).
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// [`AnalysisClient`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    http: reqwest::Client,
    endpoint: String,
    health_url: String,
}

impl HttpAnalysisClient {
    pub fn new(config: &ScannerConfig) -> Result<Self, ScanError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ScanError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            health_url: config.health_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Probe the service's health endpoint.
    pub async fn health(&self) -> Result<HealthStatus, AnalysisError> {
        debug!("GET {}", self.health_url);
        let response = self
            .http
            .get(&self.health_url)
            .send()
            .await
            .map_err(|e| transport(&self.health_url, e))?;

        let body = read_body(&self.health_url, response).await?;
        serde_json::from_slice(&body).map_err(|e| AnalysisError::MalformedBody {
            detail: e.to_string(),
        })
    }

    fn form(file: &SelectedFile) -> Result<Form, reqwest::Error> {
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime_type())?;
        Ok(Form::new().part(FILE_FIELD, part))
    }
}

#[async_trait]
impl AnalysisClient for HttpAnalysisClient {
    async fn analyze(&self, file: &SelectedFile) -> Result<Map<String, Value>, AnalysisError> {
        let form = Self::form(file).map_err(|e| transport(&self.endpoint, e))?;

        info!(
            "POST {} ({}, {} bytes)",
            self.endpoint,
            file.name(),
            file.len()
        );
        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport(&self.endpoint, e))?;

        let body = read_body(&self.endpoint, response).await?;
        parse_object(&body)
    }
}

/// Check the status and collect the body.
async fn read_body(url: &str, response: reqwest::Response) -> Result<Vec<u8>, AnalysisError> {
    let status = response.status();
    debug!("{} answered {}", url, status);
    if !status.is_success() {
        return Err(AnalysisError::Status {
            status: status.as_u16(),
        });
    }
    let bytes = response.bytes().await.map_err(|e| transport(url, e))?;
    Ok(bytes.to_vec())
}

/// Parse a response body that must be a JSON object.
pub(crate) fn parse_object(body: &[u8]) -> Result<Map<String, Value>, AnalysisError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| AnalysisError::MalformedBody {
        detail: e.to_string(),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AnalysisError::not_an_object(&other)),
    }
}

fn transport(url: &str, e: reqwest::Error) -> AnalysisError {
    AnalysisError::Transport {
        url: url.to_string(),
        detail: e.to_string(),
    }
}
