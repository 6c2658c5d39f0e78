//! Error types for the patient-doc-scanner library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ScanError`] — **Fatal**: the component cannot even be set up or a
//!   file cannot be picked (missing file, unsupported extension, bad
//!   configuration). Returned as `Err(ScanError)` to the caller.
//!
//! * [`AnalysisError`] — **Absorbed**: the analysis request did not succeed.
//!   It never escapes [`crate::scanner::DocumentScanner::analyze`]; it is
//!   logged and folded into the static error result shown to the user.
//!   The variants exist so logs and observers can tell causes apart, while
//!   the rendered view stays cause-agnostic.

use std::path::PathBuf;
use thiserror::Error;

/// The one message the user sees whenever an analysis request fails.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze document. Please try again.";

/// All fatal errors returned by the patient-doc-scanner library.
#[derive(Debug, Error)]
pub enum ScanError {
    // ── Picker errors ─────────────────────────────────────────────────────
    /// The picked path does not exist.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The extension is outside the picker filter.
    #[error("Unsupported document type: '{path}'\nAccepted extensions: {accepted}")]
    UnsupportedFileType { path: PathBuf, accepted: String },

    /// The path exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why an analysis (or health) request did not succeed.
///
/// Only ever logged or handed to a [`crate::observer::ScanObserver`]; the
/// rendered view shows [`ANALYSIS_FAILED_MESSAGE`] for all of them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// The service answered with a non-2xx status.
    #[error("analysis service returned HTTP {status}")]
    Status { status: u16 },

    /// The request never produced a response (connection refused, DNS, reset).
    #[error("request to '{url}' failed: {detail}")]
    Transport { url: String, detail: String },

    /// The body was not valid JSON.
    #[error("response body is not valid JSON: {detail}")]
    MalformedBody { detail: String },

    /// The body was valid JSON but not an object.
    #[error("response body is JSON {found}, expected an object")]
    NotAnObject { found: &'static str },
}

impl AnalysisError {
    /// Describe the JSON kind of a non-object body.
    pub(crate) fn not_an_object(value: &serde_json::Value) -> Self {
        let found = match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        };
        AnalysisError::NotAnObject { found }
    }
}
