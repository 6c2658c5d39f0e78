//! Component state and its transitions.
//!
//! [`ScannerState`] is a plain value; every change goes through
//! [`transition`], a pure function from `(state, event)` to the next state.
//! The async request itself lives in [`crate::scanner`]; this module only
//! decides what the state looks like before and after it.
//!
//! ```text
//!  Empty ──select──▶ Ready ──start──▶ Loading ──finish──▶ Success | Error
//!                      ▲                                       │
//!                      └──────────────── select ───────────────┘
//! ```
//!
//! Every `FileSelected` and every accepted `AnalysisStarted` bumps a
//! generation counter. The outstanding request is tracked separately, so a
//! selection made while it is in flight keeps the component loading until
//! that request resolves. Its answer is then stale: loading ends, but the
//! result is left alone.

use crate::file::SelectedFile;
use crate::result::AnalysisResult;
use std::sync::Arc;

/// Which of the five lifecycle states the component is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No file held.
    Empty,
    /// File held, nothing analysed yet for it.
    Ready,
    /// Request in flight.
    Loading,
    /// Last request produced fields.
    Success,
    /// Last request failed.
    Error,
}

/// Something that happened to the component.
#[derive(Debug, Clone)]
pub enum Event {
    /// The user picked a file.
    FileSelected(Arc<SelectedFile>),
    /// The user pressed the submit control.
    AnalysisStarted,
    /// A request resolved.
    AnalysisFinished {
        generation: u64,
        result: AnalysisResult,
    },
    /// A request ended with nothing to apply: it was cancelled, or it
    /// resolved after a newer selection.
    AnalysisAbandoned { generation: u64 },
}

/// Identifies one request: the file it carries and the generation it belongs to.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    pub generation: u64,
    pub file: Arc<SelectedFile>,
}

/// Local state of one [`crate::scanner::DocumentScanner`].
#[derive(Debug, Clone, Default)]
pub struct ScannerState {
    file: Option<Arc<SelectedFile>>,
    result: Option<AnalysisResult>,
    in_flight: Option<u64>,
    generation: u64,
}

impl ScannerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_deref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// A request is outstanding, whether or not its answer is still wanted.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// A file is held and nothing is in flight.
    pub fn can_analyze(&self) -> bool {
        self.file.is_some() && self.in_flight.is_none()
    }

    pub fn phase(&self) -> Phase {
        match (&self.file, self.is_loading(), &self.result) {
            (None, _, _) => Phase::Empty,
            (Some(_), true, _) => Phase::Loading,
            (Some(_), false, None) => Phase::Ready,
            (Some(_), false, Some(r)) if r.is_error() => Phase::Error,
            (Some(_), false, Some(_)) => Phase::Success,
        }
    }

    /// Apply `AnalysisStarted` and hand back the ticket for the request it
    /// permits, or `None` (with the state unchanged) when it is a no-op.
    pub fn begin_analysis(self) -> (Self, Option<RequestTicket>) {
        if !self.can_analyze() {
            return (self, None);
        }
        let next = transition(self, Event::AnalysisStarted);
        let ticket = next.file.clone().map(|file| RequestTicket {
            generation: next.generation,
            file,
        });
        (next, ticket)
    }

    /// Whether `generation` is the request currently in flight.
    pub fn is_outstanding(&self, generation: u64) -> bool {
        self.in_flight == Some(generation)
    }

    /// Whether a resolution for `generation` would still set the result.
    pub fn is_current(&self, generation: u64) -> bool {
        self.is_outstanding(generation) && self.generation == generation
    }
}

/// Compute the state that follows `event`.
pub fn transition(state: ScannerState, event: Event) -> ScannerState {
    match event {
        Event::FileSelected(file) => ScannerState {
            file: Some(file),
            result: None,
            generation: state.generation.wrapping_add(1),
            ..state
        },
        Event::AnalysisStarted if state.can_analyze() => {
            let generation = state.generation.wrapping_add(1);
            ScannerState {
                in_flight: Some(generation),
                generation,
                ..state
            }
        }
        Event::AnalysisStarted => state,
        Event::AnalysisFinished { generation, result } if state.is_current(generation) => {
            ScannerState {
                result: Some(result),
                in_flight: None,
                ..state
            }
        }
        Event::AnalysisFinished { generation, .. }
        | Event::AnalysisAbandoned { generation }
            if state.is_outstanding(generation) =>
        {
            ScannerState {
                in_flight: None,
                ..state
            }
        }
        Event::AnalysisFinished { .. } | Event::AnalysisAbandoned { .. } => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Field;
    use crate::result::FieldValue;

    fn file(name: &str) -> Arc<SelectedFile> {
        Arc::new(SelectedFile::from_bytes(name, vec![0xFF, 0xD8]))
    }

    fn fields() -> AnalysisResult {
        AnalysisResult::Fields(vec![Field {
            name: "date".into(),
            value: FieldValue::Text("2024-01-01".into()),
        }])
    }

    #[test]
    fn starts_empty() {
        let s = ScannerState::new();
        assert_eq!(s.phase(), Phase::Empty);
        assert!(!s.can_analyze());
    }

    #[test]
    fn start_without_file_is_noop() {
        let s = ScannerState::new();
        let (s, ticket) = s.begin_analysis();
        assert!(ticket.is_none());
        assert!(!s.is_loading());
        assert_eq!(s.generation(), 0);
    }

    #[test]
    fn full_success_cycle() {
        let s = transition(ScannerState::new(), Event::FileSelected(file("a.jpg")));
        assert_eq!(s.phase(), Phase::Ready);

        let (s, ticket) = s.begin_analysis();
        let ticket = ticket.expect("file held, nothing in flight");
        assert_eq!(s.phase(), Phase::Loading);
        assert_eq!(ticket.file.name(), "a.jpg");

        let s = transition(
            s,
            Event::AnalysisFinished {
                generation: ticket.generation,
                result: fields(),
            },
        );
        assert_eq!(s.phase(), Phase::Success);
        assert!(!s.is_loading());
    }

    #[test]
    fn failure_lands_in_error_phase() {
        let s = transition(ScannerState::new(), Event::FileSelected(file("a.pdf")));
        let (s, ticket) = s.begin_analysis();
        let s = transition(
            s,
            Event::AnalysisFinished {
                generation: ticket.unwrap().generation,
                result: AnalysisResult::failed(),
            },
        );
        assert_eq!(s.phase(), Phase::Error);
    }

    #[test]
    fn second_start_while_loading_is_noop() {
        let s = transition(ScannerState::new(), Event::FileSelected(file("a.png")));
        let (s, first) = s.begin_analysis();
        assert!(first.is_some());
        let generation = s.generation();

        let (s, second) = s.begin_analysis();
        assert!(second.is_none());
        assert_eq!(s.generation(), generation);
    }

    #[test]
    fn selection_clears_result_immediately() {
        let s = transition(ScannerState::new(), Event::FileSelected(file("a.png")));
        let (s, t) = s.begin_analysis();
        let s = transition(
            s,
            Event::AnalysisFinished {
                generation: t.unwrap().generation,
                result: fields(),
            },
        );
        assert!(s.result().is_some());

        let s = transition(s, Event::FileSelected(file("b.png")));
        assert!(s.result().is_none());
        assert_eq!(s.phase(), Phase::Ready);
        assert_eq!(s.file().unwrap().name(), "b.png");
    }

    #[test]
    fn stale_resolution_is_discarded() {
        let s = transition(ScannerState::new(), Event::FileSelected(file("old.png")));
        let (s, stale) = s.begin_analysis();
        let stale = stale.unwrap();

        // User picks another file while the first request is still out.
        let s = transition(s, Event::FileSelected(file("new.png")));
        assert!(s.is_loading());
        assert!(!s.is_current(stale.generation));

        let s = transition(
            s,
            Event::AnalysisFinished {
                generation: stale.generation,
                result: fields(),
            },
        );
        assert!(s.result().is_none());
        assert!(!s.is_loading());
        assert_eq!(s.phase(), Phase::Ready);
        assert_eq!(s.file().unwrap().name(), "new.png");
    }

    #[test]
    fn reselection_while_loading_blocks_a_second_request() {
        let s = transition(ScannerState::new(), Event::FileSelected(file("old.png")));
        let (s, first) = s.begin_analysis();
        assert!(first.is_some());

        let s = transition(s, Event::FileSelected(file("new.png")));
        assert_eq!(s.phase(), Phase::Loading);
        assert!(!s.can_analyze());

        let (s, second) = s.begin_analysis();
        assert!(second.is_none());
        assert!(s.is_loading());
    }

    #[test]
    fn stale_resolution_keeps_result_of_later_request() {
        let s = transition(ScannerState::new(), Event::FileSelected(file("a.png")));
        let (s, first) = s.begin_analysis();
        let first = first.unwrap();
        let s = transition(s, Event::FileSelected(file("b.png")));
        let s = transition(
            s,
            Event::AnalysisFinished {
                generation: first.generation,
                result: AnalysisResult::failed(),
            },
        );

        let (s, second) = s.begin_analysis();
        let second = second.expect("stale resolution frees the submit control");
        assert_eq!(second.file.name(), "b.png");
        let s = transition(
            s,
            Event::AnalysisFinished {
                generation: second.generation,
                result: fields(),
            },
        );
        assert_eq!(s.phase(), Phase::Success);
    }

    #[test]
    fn abandoned_request_ends_loading_and_keeps_result() {
        let s = transition(ScannerState::new(), Event::FileSelected(file("a.png")));
        let (s, t) = s.begin_analysis();
        let s = transition(
            s,
            Event::AnalysisFinished {
                generation: t.unwrap().generation,
                result: fields(),
            },
        );
        let (s, t) = s.begin_analysis();
        let generation = t.unwrap().generation;

        let s = transition(s, Event::AnalysisAbandoned { generation });
        assert!(!s.is_loading());
        assert_eq!(s.phase(), Phase::Success);
        assert!(s.can_analyze());

        // A late resolution for the abandoned request changes nothing.
        let s = transition(
            s,
            Event::AnalysisFinished {
                generation,
                result: AnalysisResult::failed(),
            },
        );
        assert_eq!(s.phase(), Phase::Success);
    }

    #[test]
    fn resolution_without_request_is_ignored() {
        let s = transition(ScannerState::new(), Event::FileSelected(file("a.png")));
        let g = s.generation();
        let s = transition(
            s,
            Event::AnalysisFinished {
                generation: g,
                result: fields(),
            },
        );
        assert!(s.result().is_none());
    }

    #[test]
    fn reanalysis_keeps_previous_result_until_resolved() {
        let s = transition(ScannerState::new(), Event::FileSelected(file("a.png")));
        let (s, t) = s.begin_analysis();
        let s = transition(
            s,
            Event::AnalysisFinished {
                generation: t.unwrap().generation,
                result: AnalysisResult::failed(),
            },
        );
        let (s, t) = s.begin_analysis();
        assert!(t.is_some());
        assert_eq!(s.phase(), Phase::Loading);
        assert!(s.result().is_some_and(|r| r.is_error()));
    }
}
