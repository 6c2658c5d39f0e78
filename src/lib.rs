//! # patient-doc-scanner
//!
//! Upload an image or PDF of a patient document to an analysis service and
//! render the fields it sends back.
//!
//! The crate is one component, [`DocumentScanner`], plus the pieces it is
//! made of. The service itself (OCR, vision models, response schema) lives
//! elsewhere; this side picks a file, POSTs it as `multipart/form-data`
//! under the field `file`, and shows whatever JSON object comes back.
//!
//! ## Lifecycle
//!
//! ```text
//!  Empty ──select_file──▶ Ready ──analyze──▶ Loading ──▶ Success | Error
//!                           ▲                                 │
//!                           └────────── select_file ──────────┘
//! ```
//!
//! Every failed request (non-2xx, network error, unparseable body) ends in
//! the same error result: *"Failed to analyze document. Please try again."*
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use patient_doc_scanner::{DocumentScanner, ScannerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut scanner = DocumentScanner::new(ScannerConfig::default())?;
//!     scanner.select_path("discharge_summary.pdf").await?;
//!     scanner.analyze().await;
//!     print!("{}", scanner.render());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docscan` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod file;
pub mod observer;
pub mod preview;
pub mod render;
pub mod result;
pub mod scanner;
pub mod state;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{AnalysisClient, HealthStatus, HttpAnalysisClient};
pub use config::{ScannerConfig, ScannerConfigBuilder, DEFAULT_ENDPOINT};
pub use error::{AnalysisError, ScanError, ANALYSIS_FAILED_MESSAGE};
pub use file::{pick_file, SelectedFile};
pub use observer::{NoopObserver, ScanObserver, SharedObserver};
pub use preview::PreviewHandle;
pub use render::{ResultsView, ScannerView};
pub use result::{AnalysisResult, Field, FieldValue};
pub use scanner::{AnalyzeOutcome, DocumentScanner, FinishedAnalysis, PendingAnalysis};
pub use state::{Phase, ScannerState};
