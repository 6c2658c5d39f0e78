//! Configuration types for the document scanner.
//!
//! Everything the component needs to know about its surroundings lives in
//! [`ScannerConfig`], built via [`ScannerConfigBuilder`]. The defaults match
//! the locally-run analysis service, so `ScannerConfig::default()` is all
//! most callers need.

use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Compiled-in analysis endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5006/analyze";

/// Extensions the file picker accepts (lowercase, without the dot).
pub const DEFAULT_ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf"];

/// Configuration for a [`crate::scanner::DocumentScanner`].
///
/// # Example
/// ```rust
/// use patient_doc_scanner::ScannerConfig;
///
/// let config = ScannerConfig::builder()
///     .endpoint("http://127.0.0.1:5006/analyze")
///     .build()
///     .unwrap();
/// assert_eq!(config.health_url(), "http://127.0.0.1:5006/health");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Absolute URL the multipart form is POSTed to. Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,

    /// Optional whole-request timeout. Default: `None`.
    ///
    /// With `None` the transport's own defaults apply and a request runs
    /// until it completes or fails.
    pub request_timeout: Option<Duration>,

    /// Extensions the picker accepts, lowercase without the dot.
    pub accepted_extensions: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: None,
            accepted_extensions: DEFAULT_ACCEPTED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

impl ScannerConfig {
    /// Create a new builder for `ScannerConfig`.
    pub fn builder() -> ScannerConfigBuilder {
        ScannerConfigBuilder {
            config: Self::default(),
        }
    }

    /// URL of the service's health probe: the `/health` sibling of the endpoint.
    pub fn health_url(&self) -> String {
        match reqwest::Url::parse(&self.endpoint).and_then(|u| u.join("health")) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}/health", self.endpoint.trim_end_matches('/')),
        }
    }

    /// Whether `ext` (with or without a leading dot) passes the picker filter.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        self.accepted_extensions.iter().any(|a| *a == ext)
    }

    /// The picker filter in `accept=` form: `.jpg, .jpeg, .png, .pdf`.
    pub fn accept_list(&self) -> String {
        self.accepted_extensions
            .iter()
            .map(|e| format!(".{e}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Builder for [`ScannerConfig`].
#[derive(Debug)]
pub struct ScannerConfigBuilder {
    config: ScannerConfig,
}

impl ScannerConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout = Some(Duration::from_secs(secs));
        self
    }

    pub fn accepted_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.accepted_extensions = exts
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ScannerConfig, ScanError> {
        let c = &self.config;
        if !(c.endpoint.starts_with("http://") || c.endpoint.starts_with("https://")) {
            return Err(ScanError::InvalidConfig(format!(
                "endpoint must be an HTTP/HTTPS URL, got '{}'",
                c.endpoint
            )));
        }
        if reqwest::Url::parse(&c.endpoint).is_err() {
            return Err(ScanError::InvalidConfig(format!(
                "endpoint is not a valid URL: '{}'",
                c.endpoint
            )));
        }
        if c.accepted_extensions.is_empty() {
            return Err(ScanError::InvalidConfig(
                "at least one accepted extension is required".into(),
            ));
        }
        if c.request_timeout == Some(Duration::ZERO) {
            return Err(ScanError::InvalidConfig(
                "request timeout must be greater than zero".into(),
            ));
        }
        Ok(self.config)
    }
}
