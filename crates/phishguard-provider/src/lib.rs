#![warn(missing_docs)]
//! # phishguard-provider
//!
//! ## Purpose
//! Defines the analysis-provider seam and its two interchangeable backends.
//!
//! ## Responsibilities
//! - Reject obviously invalid URL input before any provider contact.
//! - Expose the [`AnalysisProvider`] trait consumed by single-URL and batch
//!   flows.
//! - Implement the HTTP `/api/analyze` backend ([`HttpAnalysisProvider`]).
//! - Implement the prompt-based generative backend
//!   ([`GenerativeAnalysisProvider`]).
//!
//! ## Data flow
//! URL input -> [`check_url_input`] -> [`AnalysisProvider::analyze`] ->
//! transport round-trip -> [`ProviderResponse`] handed to normalization.
//!
//! ## Ownership and lifetimes
//! Transports are shared behind `Arc<dyn ...>` so providers can be cloned into
//! the dashboard and batch runner without borrowing a live client.
//!
//! ## Error model
//! Local precondition failures return [`InvalidUrlError`]. Every upstream
//! failure (network, status, provider-reported, malformed body) is a
//! [`ProviderError`]. No retries are performed.

mod generative;
mod http;

pub use generative::{
    DEFAULT_GENERATIVE_MODEL, GENERATION_TEMPERATURE, GenerationRequest,
    GenerativeAnalysisProvider, GenerativeTransport, analysis_prompt, analysis_response_schema,
};
pub use http::{
    ANALYZE_PATH, AnalyzeRequest, HttpAnalysisProvider, HttpReply, HttpTransport,
    ReqwestTransport, analyze_endpoint,
};
pub use phishguard_analysis_contract::ProviderResponse;

use thiserror::Error;

/// Minimum accepted URL input length.
pub const MIN_URL_LENGTH: usize = 4;

/// Analysis backend returning raw provider output for one URL.
pub trait AnalysisProvider: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Analyzes one URL.
    ///
    /// # Errors
    /// Returns [`ProviderError`] for any upstream failure.
    fn analyze(&self, url: &str) -> Result<ProviderResponse, ProviderError>;
}

/// Checks the local URL precondition and returns the trimmed input.
///
/// # Errors
/// Returns [`InvalidUrlError`] for blank input, input shorter than
/// [`MIN_URL_LENGTH`], or input without a `.`.
pub fn check_url_input(input: &str) -> Result<&str, InvalidUrlError> {
    let url = input.trim();
    if url.is_empty() {
        return Err(InvalidUrlError::Empty);
    }
    if url.chars().count() < MIN_URL_LENGTH {
        return Err(InvalidUrlError::TooShort);
    }
    if !url.contains('.') {
        return Err(InvalidUrlError::MissingDot);
    }
    Ok(url)
}

/// Local URL precondition failure.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum InvalidUrlError {
    /// Input is blank.
    #[error("url is empty")]
    Empty,
    /// Input is shorter than the minimum length.
    #[error("url must be at least 4 characters")]
    TooShort,
    /// Input contains no `.`.
    #[error("url must contain a '.'")]
    MissingDot,
}

/// Upstream analysis failure.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Configured endpoint is unusable.
    #[error("invalid provider endpoint: {0}")]
    InvalidEndpoint(String),
    /// Network or client failure.
    #[error("provider transport failure: {0}")]
    Transport(String),
    /// Upstream answered with a non-success HTTP status.
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    /// Upstream reported `status: "error"`; message is shown verbatim.
    #[error("{0}")]
    Reported(String),
    /// Upstream body could not be decoded.
    #[error("malformed provider response: {0}")]
    Malformed(String),
    /// Upstream returned no content.
    #[error("no response received from provider")]
    EmptyResponse,
}
