//! Projection of scanner state into a view.
//!
//! [`project`] is pure: the same state and preview always give the same
//! [`ScannerView`]. The view is plain data so callers can draw it however
//! they like; its `Display` impl is the terminal rendering used by the CLI.

use crate::config::ScannerConfig;
use crate::preview::PreviewHandle;
use crate::result::AnalysisResult;
use crate::state::ScannerState;
use serde::Serialize;
use std::fmt;

pub const TITLE: &str = "Patient Document Scanner";
pub const SUBMIT_LABEL: &str = "Analyze Document";
pub const SUBMIT_LABEL_LOADING: &str = "Analyzing...";

/// Everything on screen for one state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScannerView {
    pub picker: PickerView,
    pub submit: SubmitView,
    pub preview: Option<PreviewView>,
    pub results: Option<ResultsView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickerView {
    /// Extension filter, e.g. `.jpg, .jpeg, .png, .pdf`.
    pub accept: String,
    pub selected: Option<String>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitView {
    pub label: &'static str,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewView {
    pub url: String,
    pub dimensions: Option<(u32, u32)>,
}

/// The results panel: an error line or one entry per top-level field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum ResultsView {
    Error(String),
    Fields(Vec<FieldEntry>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEntry {
    pub label: String,
    pub text: String,
    /// Nested array/object shown as a JSON block.
    pub structured: bool,
}

impl FieldEntry {
    /// Single-string form: `label: text`.
    pub fn entry(&self) -> String {
        format!("{}: {}", self.label, self.text)
    }
}

impl ResultsView {
    /// Each entry in `label: text` form, or the error message alone.
    pub fn entries(&self) -> Vec<String> {
        match self {
            ResultsView::Error(m) => vec![m.clone()],
            ResultsView::Fields(f) => f.iter().map(FieldEntry::entry).collect(),
        }
    }
}

/// Project the current state into a view.
pub fn project(
    state: &ScannerState,
    preview: Option<&PreviewHandle>,
    config: &ScannerConfig,
) -> ScannerView {
    let loading = state.is_loading();

    let picker = PickerView {
        accept: config.accept_list(),
        selected: state.file().map(|f| f.name().to_string()),
        disabled: loading,
    };

    let submit = SubmitView {
        label: if loading {
            SUBMIT_LABEL_LOADING
        } else {
            SUBMIT_LABEL
        },
        disabled: state.file().is_none() || loading,
    };

    let preview = state.file().and(preview).map(|p| PreviewView {
        url: p.url().to_string(),
        dimensions: p.dimensions(),
    });

    let results = state.result().map(project_result);

    ScannerView {
        picker,
        submit,
        preview,
        results,
    }
}

fn project_result(result: &AnalysisResult) -> ResultsView {
    match result {
        AnalysisResult::Error(message) | AnalysisResult::Rejected { message, .. } => {
            ResultsView::Error(message.clone())
        }
        AnalysisResult::Fields(fields) => ResultsView::Fields(
            fields
                .iter()
                .map(|f| FieldEntry {
                    label: f.label(),
                    text: f.value.display_text(),
                    structured: f.value.is_structured(),
                })
                .collect(),
        ),
    }
}

impl fmt::Display for ScannerView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{TITLE}")?;
        writeln!(
            f,
            "  File:   {}  (accepts {}){}",
            self.picker.selected.as_deref().unwrap_or("<none>"),
            self.picker.accept,
            if self.picker.disabled { " [disabled]" } else { "" }
        )?;
        writeln!(
            f,
            "  [ {} ]{}",
            self.submit.label,
            if self.submit.disabled { " [disabled]" } else { "" }
        )?;

        if let Some(ref p) = self.preview {
            match p.dimensions {
                Some((w, h)) => writeln!(f, "\nImage Preview  {w}x{h}  {}", p.url)?,
                None => writeln!(f, "\nImage Preview  {}", p.url)?,
            }
        }

        if let Some(ref results) = self.results {
            writeln!(f, "\nAnalysis Results")?;
            match results {
                ResultsView::Error(m) => writeln!(f, "  {m}")?,
                ResultsView::Fields(entries) => {
                    for e in entries {
                        if e.structured {
                            writeln!(f, "  {}:", e.label)?;
                            for line in e.text.lines() {
                                writeln!(f, "    {line}")?;
                            }
                        } else {
                            writeln!(f, "  {}", e.entry())?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
