#![warn(missing_docs)]
//! # phishguard-app
//!
//! ## Purpose
//! Orchestrates provider calls, normalization, history, batch runs, and UI
//! state for `phishguard`.
//!
//! ## Responsibilities
//! - Enforce the URL precondition before any provider call.
//! - Normalize provider output and record successful single-URL scans.
//! - Run batches without touching history and export their rows.
//! - Load runtime configuration and initialize structured logging.
//!
//! ## Data flow
//! URL input -> precondition -> provider -> normalize -> history append ->
//! [`phishguard_ui::DashboardState`]. Batch input -> runner -> batch table.
//!
//! ## Ownership and lifetimes
//! [`Dashboard`] owns the UI state and shares the provider and store behind
//! `Arc` so batch closures can borrow them independently of the state.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`] and categorized by
//! [`AppError::kind`] for logs; [`AppError::user_message`] is the inline text.

mod config;
mod dashboard;

pub use config::{AppConfig, ConfigError, DEFAULT_API_BASE, DEFAULT_LOG_FILTER};
pub use dashboard::{Dashboard, analyze_url, epoch_millis};

use phishguard_analysis_contract::{GENERIC_PROVIDER_ERROR, ValidationError};
use phishguard_batch::{BatchError, ExportError};
use phishguard_history::{HistoryError, StoreError};
use phishguard_provider::{InvalidUrlError, ProviderError};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("PHISHGUARD_VERSION");

/// Inline message for input rejected by the URL precondition.
pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL.";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Installs the global `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` overrides [`DEFAULT_LOG_FILTER`]. Calling this twice is a no-op.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed the local URL precondition.
    #[error("invalid url input: {0}")]
    InvalidUrl(#[from] InvalidUrlError),
    /// Provider call failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    /// Provider output could not be normalized.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    /// Batch input violated size bounds.
    #[error("batch error: {0}")]
    Batch(#[from] BatchError),
    /// CSV export failed.
    #[error("export error: {0}")]
    Export(#[from] ExportError),
    /// History could not be persisted.
    #[error("history error: {0}")]
    History(#[from] HistoryError),
    /// Preference store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// Runtime configuration is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Another analysis or batch is still running.
    #[error("an analysis is already running")]
    Busy,
    /// Export requested without batch rows.
    #[error("no batch results to export")]
    NothingToExport,
}

impl AppError {
    /// Stable category name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "invalid_url",
            Self::Provider(_) => "provider",
            Self::Validation(_) => "validation",
            Self::Batch(_) => "batch",
            Self::Export(_) => "export",
            Self::History(_) => "history",
            Self::Store(_) => "store",
            Self::Config(_) => "config",
            Self::Busy => "busy",
            Self::NothingToExport => "nothing_to_export",
        }
    }

    /// Inline message shown to the user.
    ///
    /// Provider messages are shown verbatim when the provider sent one;
    /// bare HTTP statuses and validation failures read as the generic text.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidUrl(_) => INVALID_URL_MESSAGE.to_string(),
            Self::Provider(ProviderError::Reported(message)) => message.clone(),
            Self::Provider(_) | Self::Validation(_) => GENERIC_PROVIDER_ERROR.to_string(),
            Self::Batch(error) => error.to_string(),
            Self::Busy => "Please wait for the current analysis to finish.".to_string(),
            Self::NothingToExport => "Run a batch before exporting.".to_string(),
            other => other.to_string(),
        }
    }
}
