//! The document upload and result renderer component.
//!
//! [`DocumentScanner`] owns the state, the preview handle and the transport.
//! The common path is three calls:
//!
//! ```rust,no_run
//! use patient_doc_scanner::{DocumentScanner, ScannerConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut scanner = DocumentScanner::new(ScannerConfig::default())?;
//! scanner.select_path("intake_form.png").await?;
//! scanner.analyze().await;
//! println!("{}", scanner.render());
//! # Ok(())
//! # }
//! ```
//!
//! `analyze` holds `&mut self` for the whole round trip. Callers that need
//! to keep interacting while a request is out (re-selecting a file, drawing
//! the loading state) use the split form instead: [`DocumentScanner::start_analysis`]
//! hands back a [`PendingAnalysis`] that runs without borrowing the scanner,
//! and [`DocumentScanner::complete_analysis`] applies its outcome, dropping
//! the result if the request has been superseded.
//!
//! A request that is dropped before it is completed (an `analyze` future
//! cancelled by a timeout, a `PendingAnalysis` never run) ends the loading
//! state on drop, so the submit control becomes usable again.

use crate::client::{AnalysisClient, HttpAnalysisClient};
use crate::config::ScannerConfig;
use crate::error::{AnalysisError, ScanError};
use crate::file::{pick_file, SelectedFile};
use crate::observer::{NoopObserver, SharedObserver};
use crate::preview::PreviewHandle;
use crate::render::{project, ScannerView};
use crate::result::AnalysisResult;
use crate::state::{transition, Event, Phase, RequestTicket, ScannerState};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

type SharedState = Arc<Mutex<ScannerState>>;

fn apply(state: &SharedState, event: Event) -> ScannerState {
    let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
    *guard = transition(std::mem::take(&mut *guard), event);
    guard.clone()
}

/// What a call to [`DocumentScanner::analyze`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeOutcome {
    /// No file held, or a request already in flight. Nothing was sent.
    Skipped,
    /// The request resolved and the state moved to this phase.
    Completed(Phase),
    /// The request resolved after a newer selection; its result was dropped.
    Stale,
}

/// Ends the loading state for one request if it is dropped unsettled.
struct InFlight {
    generation: u64,
    state: SharedState,
    settled: bool,
}

impl InFlight {
    fn settle(mut self, event: Event) -> ScannerState {
        self.settled = true;
        apply(&self.state, event)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        debug!("Request #{} abandoned before completion", self.generation);
        apply(
            &self.state,
            Event::AnalysisAbandoned {
                generation: self.generation,
            },
        );
    }
}

/// A request that has been started but not yet sent.
pub struct PendingAnalysis {
    ticket: RequestTicket,
    client: Arc<dyn AnalysisClient>,
    in_flight: InFlight,
}

impl PendingAnalysis {
    pub fn generation(&self) -> u64 {
        self.ticket.generation
    }

    pub fn file(&self) -> &SelectedFile {
        &self.ticket.file
    }

    /// Send the request and wait for it to resolve.
    pub async fn run(self) -> FinishedAnalysis {
        let start = Instant::now();
        let outcome = self.client.analyze(&self.ticket.file).await;
        debug!(
            "Request #{} for '{}' resolved in {:?}",
            self.ticket.generation,
            self.ticket.file.name(),
            start.elapsed()
        );
        FinishedAnalysis {
            ticket: self.ticket,
            outcome,
            in_flight: self.in_flight,
        }
    }
}

/// A resolved request waiting to be applied to the scanner.
pub struct FinishedAnalysis {
    ticket: RequestTicket,
    outcome: Result<Map<String, Value>, AnalysisError>,
    in_flight: InFlight,
}

/// One document upload and result renderer.
pub struct DocumentScanner {
    config: ScannerConfig,
    client: Arc<dyn AnalysisClient>,
    observer: SharedObserver,
    state: SharedState,
    preview: Option<PreviewHandle>,
}

impl DocumentScanner {
    /// Create a scanner that talks HTTP to `config.endpoint`.
    pub fn new(config: ScannerConfig) -> Result<Self, ScanError> {
        let client = HttpAnalysisClient::new(&config)?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Create a scanner over any transport.
    pub fn with_client(config: ScannerConfig, client: Arc<dyn AnalysisClient>) -> Self {
        Self {
            config,
            client,
            observer: Arc::new(NoopObserver),
            state: Arc::new(Mutex::new(ScannerState::new())),
            preview: None,
        }
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ScannerState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn phase(&self) -> Phase {
        self.state().phase()
    }

    pub fn result(&self) -> Option<AnalysisResult> {
        self.state().result().cloned()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    /// Hold `file`, clear any previous result, and swap the preview.
    ///
    /// Allowed while a request is in flight; the component stays loading
    /// until that request resolves, and its answer is then discarded.
    pub fn select_file(&mut self, file: SelectedFile) {
        if let Some(old) = self.preview.take() {
            old.release();
        }
        self.preview = PreviewHandle::acquire(&file);

        let (name, len) = (file.name().to_string(), file.len());
        apply(&self.state, Event::FileSelected(Arc::new(file)));
        info!("Selected '{}' ({} bytes)", name, len);
        self.observer.on_file_selected(&name, len);
    }

    /// Pick `path` through the extension filter and select it.
    pub async fn select_path(&mut self, path: impl AsRef<Path>) -> Result<(), ScanError> {
        let file = pick_file(path, &self.config).await?;
        self.select_file(file);
        Ok(())
    }

    /// Run one full analysis round trip for the held file.
    ///
    /// Never fails: request problems become the error result. Returns
    /// [`AnalyzeOutcome::Skipped`] without sending anything when no file is
    /// held or a request is already in flight.
    pub async fn analyze(&mut self) -> AnalyzeOutcome {
        match self.start_analysis() {
            Some(pending) => {
                let finished = pending.run().await;
                self.complete_analysis(finished)
            }
            None => AnalyzeOutcome::Skipped,
        }
    }

    /// Enter the loading state and return the request to run, or `None`
    /// when the precondition does not hold.
    pub fn start_analysis(&mut self) -> Option<PendingAnalysis> {
        let ticket = {
            let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let (next, ticket) = std::mem::take(&mut *guard).begin_analysis();
            *guard = next;
            if ticket.is_none() {
                debug!("Analyze ignored in phase {:?}", guard.phase());
            }
            ticket
        }?;

        self.observer.on_analysis_start(ticket.file.name());
        Some(PendingAnalysis {
            in_flight: InFlight {
                generation: ticket.generation,
                state: Arc::clone(&self.state),
                settled: false,
            },
            ticket,
            client: Arc::clone(&self.client),
        })
    }

    /// Apply a resolved request. Loading always ends for the outstanding
    /// request; the result is only set if no newer selection was made.
    pub fn complete_analysis(&mut self, finished: FinishedAnalysis) -> AnalyzeOutcome {
        let FinishedAnalysis {
            ticket,
            outcome,
            in_flight,
        } = finished;
        let name = ticket.file.name();

        let current = self.state();
        if !current.is_current(ticket.generation) {
            debug!(
                "Dropping stale response #{} for '{}' (current #{})",
                ticket.generation,
                name,
                current.generation()
            );
            self.observer.on_stale_response(name);
            in_flight.settle(Event::AnalysisAbandoned {
                generation: ticket.generation,
            });
            return AnalyzeOutcome::Stale;
        }

        let result = match outcome {
            Ok(object) => {
                let result = AnalysisResult::from_object(object);
                info!("Analysis of '{}' returned {} fields", name, result.fields().len());
                self.observer.on_analysis_complete(name, result.fields().len());
                result
            }
            Err(e) => {
                warn!("Analysis of '{}' failed: {}", name, e);
                self.observer.on_analysis_failed(name, &e);
                AnalysisResult::failed()
            }
        };

        let next = in_flight.settle(Event::AnalysisFinished {
            generation: ticket.generation,
            result,
        });
        AnalyzeOutcome::Completed(next.phase())
    }

    /// Project the current state into a view.
    pub fn render(&self) -> ScannerView {
        project(&self.state(), self.preview.as_ref(), &self.config)
    }
}
