//! Dashboard orchestration over provider, history, batch runner, and state.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use phishguard_analysis_contract::normalize;
use phishguard_batch::{BatchRunner, check_batch_size, parse_batch_input, write_batch_csv};
use phishguard_core::{AnalysisResult, BatchRow, HistoryEntry, Theme};
use phishguard_history::{FileStore, HistoryStore, KeyValueStore, ThemePreference};
use phishguard_provider::{
    AnalysisProvider, HttpAnalysisProvider, ReqwestTransport, check_url_input,
};
use phishguard_ui::DashboardState;
use tracing::{info, warn};

use crate::{APP_VERSION, AppConfig, AppError};

/// Milliseconds since the Unix epoch; `0` if the clock is before it.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Checks, analyzes, and normalizes one URL.
///
/// # Errors
/// Returns [`AppError::InvalidUrl`] without contacting `provider` when the
/// input fails the precondition, otherwise provider or validation errors.
pub fn analyze_url(provider: &dyn AnalysisProvider, input: &str) -> Result<AnalysisResult, AppError> {
    let url = check_url_input(input)?;
    let raw = provider.analyze(url)?;
    Ok(normalize(url, &raw)?)
}

/// Interactive dashboard session.
pub struct Dashboard {
    provider: Arc<dyn AnalysisProvider>,
    history: HistoryStore,
    theme: ThemePreference,
    runner: BatchRunner,
    clock: fn() -> u64,
    state: DashboardState,
}

impl Dashboard {
    /// Creates a session over `provider` and persistent `store`.
    pub fn new(provider: Arc<dyn AnalysisProvider>, store: Arc<dyn KeyValueStore>) -> Self {
        let theme = ThemePreference::new(Arc::clone(&store));
        let state = DashboardState::new(APP_VERSION, theme.load());
        Self {
            provider,
            history: HistoryStore::new(store),
            theme,
            runner: BatchRunner::new(),
            clock: epoch_millis,
            state,
        }
    }

    /// Builds the production session: HTTP provider and file-backed store.
    ///
    /// # Errors
    /// Returns [`AppError`] when the endpoint, HTTP client, or data directory
    /// cannot be set up.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let transport = Arc::new(ReqwestTransport::new(config.timeout)?);
        let provider = HttpAnalysisProvider::new(&config.api_base, transport)?;
        info!(endpoint = provider.endpoint(), "provider configured");
        let store = FileStore::open(&config.data_dir)?;
        Ok(Self::new(Arc::new(provider), Arc::new(store)))
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    /// Current UI state.
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Analyzes one URL and records it in history.
    ///
    /// Invalid input never reaches the provider. A history write failure is
    /// logged and does not fail the analysis.
    ///
    /// # Errors
    /// Returns [`AppError`]; its [`AppError::user_message`] is also stored as
    /// the inline error in [`Dashboard::state`].
    pub fn analyze(&mut self, input: &str) -> Result<AnalysisResult, AppError> {
        if let Err(error) = check_url_input(input) {
            let error = AppError::from(error);
            self.state.reject_input(error.user_message());
            return Err(error);
        }
        if !self.state.begin_analysis() {
            return Err(AppError::Busy);
        }

        match analyze_url(self.provider.as_ref(), input) {
            Ok(result) => {
                let derived = result.metrics();
                info!(
                    provider = self.provider.name(),
                    percent = derived.percent,
                    verdict = %result.verdict,
                    "analysis completed"
                );
                let entry = HistoryEntry::from_result(result.clone(), (self.clock)());
                if let Err(error) = self.history.append(entry) {
                    warn!(%error, "history append failed");
                }
                self.state.complete_analysis(result.clone());
                Ok(result)
            }
            Err(error) => {
                warn!(provider = self.provider.name(), kind = error.kind(), %error, "analysis failed");
                self.state.fail_analysis(error.user_message());
                Err(error)
            }
        }
    }

    /// Runs a batch over whitespace-separated URLs in `input`.
    ///
    /// Rows are pushed into the batch table as they are produced. History is
    /// not touched.
    ///
    /// # Errors
    /// Returns [`AppError::Batch`] for an empty or oversized batch, before any
    /// provider call, and [`AppError::Busy`] while another run is active.
    pub fn run_batch(&mut self, input: &str) -> Result<Vec<BatchRow>, AppError> {
        let urls = parse_batch_input(input);
        if let Err(error) = check_batch_size(urls.len()) {
            let error = AppError::from(error);
            self.state.reject_input(error.user_message());
            return Err(error);
        }
        if !self.state.begin_batch() {
            return Err(AppError::Busy);
        }

        let provider = Arc::clone(&self.provider);
        let state = &mut self.state;
        let outcome = self.runner.run_with_progress(
            &urls,
            |url| analyze_url(provider.as_ref(), url),
            |_, row| state.push_batch_row(row.clone()),
        );
        self.state.finish_batch();
        Ok(outcome?)
    }

    /// Writes the current batch table as CSV under `dir`.
    ///
    /// # Errors
    /// Returns [`AppError::NothingToExport`] without batch rows and
    /// [`AppError::Export`] when writing fails.
    pub fn export_batch(&self, dir: &Path) -> Result<PathBuf, AppError> {
        if self.state.batch_rows.is_empty() {
            return Err(AppError::NothingToExport);
        }
        Ok(write_batch_csv(dir, &self.state.batch_rows, (self.clock)())?)
    }

    /// History entries, most recent first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.list()
    }

    /// Shows a stored result again; `index` follows [`Dashboard::history`].
    ///
    /// Returns `false` when no entry exists at `index`.
    pub fn recall(&mut self, index: usize) -> bool {
        match self.history.list().into_iter().nth(index) {
            Some(entry) => {
                self.state.complete_analysis(entry.full_result);
                true
            }
            None => false,
        }
    }

    /// Deletes all history entries.
    ///
    /// # Errors
    /// Returns [`AppError::History`] when the store cannot be cleared.
    pub fn clear_history(&mut self) -> Result<(), AppError> {
        self.history.clear()?;
        info!("history cleared");
        Ok(())
    }

    /// Flips and persists the theme.
    ///
    /// # Errors
    /// Returns [`AppError::Store`] when the preference cannot be saved.
    pub fn toggle_theme(&mut self) -> Result<Theme, AppError> {
        let next = self.state.theme.toggled();
        self.theme.save(next)?;
        self.state.set_theme(next);
        Ok(next)
    }
}
