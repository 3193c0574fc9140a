#![warn(missing_docs)]
//! # phishguard-ui
//!
//! ## Purpose
//! Defines the renderer-facing runtime state model for `phishguard`.
//!
//! ## Responsibilities
//! - Represent analysis status, inline errors, theme, and the batch table.
//! - Project an [`AnalysisResult`] into display-ready values ([`ResultView`]).
//! - Own chart instances so a redraw never leaves a stale chart alive.
//! - Expose guard checks for whether a new submission may start.
//!
//! ## Data flow
//! App orchestration events mutate [`DashboardState`]; a renderer reads
//! [`DashboardState::result_view`] and the batch rows to update its widgets.
//!
//! ## Ownership and lifetimes
//! `DashboardState` owns all values so reducers need no borrows across
//! provider calls.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. Invalid
//! transitions are refused by guard methods.

mod chart;
mod view;

pub use chart::ChartSlot;
pub use view::{
    ExplanationBar, FEATURE_CHART_LIMIT, FEATURE_PLACEHOLDER, FeatureBar, ModelMini, ResultView,
    TechnicalDetails, ThreatTag, clean_feature_name, feature_chart,
};

use phishguard_core::{AnalysisResult, BatchRow, Theme};

/// Single-analysis lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisStatus {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// A provider call is in flight.
    Analyzing,
    /// The last analysis produced a result.
    Completed,
    /// The last analysis failed; see [`DashboardState::error_message`].
    Error,
}

/// Aggregate dashboard runtime state.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    /// Single-analysis status.
    pub status: AnalysisStatus,
    /// Inline error text, shown until the next submission.
    pub error_message: Option<String>,
    /// Most recent successful result.
    pub current: Option<AnalysisResult>,
    /// Active theme.
    pub theme: Theme,
    /// Rows of the current (or last) batch run.
    pub batch_rows: Vec<BatchRow>,
    /// Whether a batch run is in progress.
    pub batch_running: bool,
}

impl DashboardState {
    /// Creates idle state.
    pub fn new(version: impl Into<String>, theme: Theme) -> Self {
        Self {
            version: version.into(),
            status: AnalysisStatus::Idle,
            error_message: None,
            current: None,
            theme,
            batch_rows: Vec::new(),
            batch_running: false,
        }
    }

    /// Returns `true` when the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        self.status != AnalysisStatus::Analyzing && !self.batch_running
    }

    /// Enters the analyzing state, clearing the previous result and error.
    ///
    /// Returns `false` (and changes nothing) while another run is active.
    pub fn begin_analysis(&mut self) -> bool {
        if !self.can_submit() {
            return false;
        }
        self.status = AnalysisStatus::Analyzing;
        self.error_message = None;
        self.current = None;
        true
    }

    /// Stores a successful result.
    pub fn complete_analysis(&mut self, result: AnalysisResult) {
        self.status = AnalysisStatus::Completed;
        self.error_message = None;
        self.current = Some(result);
    }

    /// Records a failed analysis with its inline message.
    pub fn fail_analysis(&mut self, message: impl Into<String>) {
        self.status = AnalysisStatus::Error;
        self.error_message = Some(message.into());
        self.current = None;
    }

    /// Shows an inline message for input rejected before any provider call.
    pub fn reject_input(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    /// Starts a batch, discarding rows from any previous batch.
    ///
    /// Returns `false` (and changes nothing) while another run is active.
    pub fn begin_batch(&mut self) -> bool {
        if !self.can_submit() {
            return false;
        }
        self.batch_rows.clear();
        self.batch_running = true;
        self.error_message = None;
        true
    }

    /// Appends one batch row as soon as it is produced.
    pub fn push_batch_row(&mut self, row: BatchRow) {
        self.batch_rows.push(row);
    }

    /// Marks the batch run as finished.
    pub fn finish_batch(&mut self) {
        self.batch_running = false;
    }

    /// Sets the active theme.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Display projection of the current result, if any.
    pub fn result_view(&self) -> Option<ResultView> {
        self.current.as_ref().map(ResultView::from_result)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for dashboard state gates.

    use super::*;
    use phishguard_core::Verdict;

    fn sample() -> AnalysisResult {
        AnalysisResult::new("https://a.example", 0.4, Verdict::Suspicious, "r")
            .expect("valid sample")
    }

    #[test]
    fn submit_is_disabled_while_analyzing() {
        let mut state = DashboardState::new("v0.1.0", Theme::Dark);
        assert!(state.can_submit());

        assert!(state.begin_analysis());
        assert!(!state.can_submit());
        assert!(!state.begin_analysis());
        assert!(!state.begin_batch());

        state.complete_analysis(sample());
        assert!(state.can_submit());
        assert_eq!(state.status, AnalysisStatus::Completed);
    }

    #[test]
    fn new_submission_clears_previous_error() {
        let mut state = DashboardState::new("v0.1.0", Theme::Dark);
        assert!(state.begin_analysis());
        state.fail_analysis("Analysis failed. Please try again.");
        assert_eq!(state.status, AnalysisStatus::Error);

        assert!(state.begin_analysis());
        assert_eq!(state.error_message, None);
        assert!(state.result_view().is_none());
    }

    #[test]
    fn new_batch_discards_old_rows() {
        let mut state = DashboardState::new("v0.1.0", Theme::Light);
        assert!(state.begin_batch());
        state.push_batch_row(BatchRow::error("a.example"));
        state.finish_batch();

        assert!(state.begin_batch());
        assert!(state.batch_rows.is_empty());
        assert!(!state.can_submit());
    }
}
