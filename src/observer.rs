//! Lifecycle callbacks for the scanner.
//!
//! Inject an [`Arc<dyn ScanObserver>`] via
//! [`crate::scanner::DocumentScanner::with_observer`] to hear about
//! selections and requests as they happen, e.g. to drive a spinner.
//!
//! # Example
//!
//! ```rust
//! use patient_doc_scanner::ScanObserver;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Default)]
//! struct CountingObserver {
//!     requests: AtomicUsize,
//! }
//!
//! impl ScanObserver for CountingObserver {
//!     fn on_analysis_start(&self, file_name: &str) {
//!         self.requests.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("analyzing {file_name}");
//!     }
//! }
//! ```

use crate::error::AnalysisError;
use std::sync::Arc;

/// Called by the scanner at each lifecycle step.
///
/// All methods default to no-ops so implementors only override what they
/// care about.
pub trait ScanObserver: Send + Sync {
    /// A file was selected and the previous result cleared.
    fn on_file_selected(&self, file_name: &str, byte_len: usize) {
        let _ = (file_name, byte_len);
    }

    /// The request for `file_name` is about to be sent.
    fn on_analysis_start(&self, file_name: &str) {
        let _ = file_name;
    }

    /// The service returned an object with `field_count` top-level fields.
    fn on_analysis_complete(&self, file_name: &str, field_count: usize) {
        let _ = (file_name, field_count);
    }

    /// The request failed; the user will only see the static message.
    fn on_analysis_failed(&self, file_name: &str, error: &AnalysisError) {
        let _ = (file_name, error);
    }

    /// A response arrived for a request that is no longer current.
    fn on_stale_response(&self, file_name: &str) {
        let _ = file_name;
    }
}

/// The default observer.
pub struct NoopObserver;

impl ScanObserver for NoopObserver {}

/// Convenience alias for the stored observer type.
pub type SharedObserver = Arc<dyn ScanObserver>;
