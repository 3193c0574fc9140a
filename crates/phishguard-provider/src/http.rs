//! HTTP backend posting to `/api/analyze`.

use std::sync::Arc;
use std::time::Duration;

use phishguard_analysis_contract::{ContractError, ProviderResponse, parse_provider_response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::{AnalysisProvider, ProviderError};

/// Analysis route, resolved against the configured base URL.
pub const ANALYZE_PATH: &str = "/api/analyze";

/// Request body sent to the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// URL to analyze.
    pub url: String,
}

/// Raw HTTP reply returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

impl HttpReply {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract JSON POST transport used by [`HttpAnalysisProvider`].
pub trait HttpTransport: Send + Sync {
    /// Posts `body` as JSON to `endpoint` and returns the raw reply.
    ///
    /// # Errors
    /// Returns [`ProviderError::Transport`] when no reply was received.
    fn post_json(&self, endpoint: &str, body: &AnalyzeRequest) -> Result<HttpReply, ProviderError>;
}

/// Production transport backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Builds a transport with a per-request timeout.
    ///
    /// # Errors
    /// Returns [`ProviderError::Transport`] when the client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ProviderError::Transport(format!("client build failed: {error}")))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_json(&self, endpoint: &str, body: &AnalyzeRequest) -> Result<HttpReply, ProviderError> {
        let response = self
            .client
            .post(endpoint)
            .json(body)
            .send()
            .map_err(|error| ProviderError::Transport(error.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|error| ProviderError::Transport(format!("body read failed: {error}")))?;
        Ok(HttpReply { status, body })
    }
}

/// Provider that delegates analysis to a remote `/api/analyze` endpoint.
#[derive(Clone)]
pub struct HttpAnalysisProvider {
    endpoint: String,
    transport: Arc<dyn HttpTransport>,
}

impl HttpAnalysisProvider {
    /// Creates a provider for `base_url`.
    ///
    /// # Errors
    /// Returns [`ProviderError::InvalidEndpoint`] when `base_url` is not an
    /// `http`/`https` URL.
    pub fn new(
        base_url: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            endpoint: analyze_endpoint(base_url)?,
            transport,
        })
    }

    /// Returns the resolved analysis endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AnalysisProvider for HttpAnalysisProvider {
    fn name(&self) -> &'static str {
        "http"
    }

    fn analyze(&self, url: &str) -> Result<ProviderResponse, ProviderError> {
        debug!(endpoint = %self.endpoint, "posting analysis request");
        let reply = self.transport.post_json(
            &self.endpoint,
            &AnalyzeRequest {
                url: url.to_string(),
            },
        )?;

        match parse_provider_response(&reply.body) {
            Ok(parsed) if reply.is_success() => Ok(parsed),
            Ok(_) => Err(ProviderError::Status(reply.status)),
            Err(ContractError::ProviderReported(message)) => Err(ProviderError::Reported(message)),
            Err(error) if !reply.is_success() => {
                warn!(status = reply.status, %error, "undecodable error reply");
                Err(ProviderError::Status(reply.status))
            }
            Err(error) => Err(ProviderError::Malformed(error.to_string())),
        }
    }
}

/// Resolves the analysis endpoint for a base URL.
///
/// The route is root-relative, so any path on `base_url` is replaced.
///
/// # Errors
/// Returns [`ProviderError::InvalidEndpoint`] for unparsable or non-HTTP URLs.
pub fn analyze_endpoint(base_url: &str) -> Result<String, ProviderError> {
    let parsed = Url::parse(base_url)
        .map_err(|error| ProviderError::InvalidEndpoint(format!("invalid base url: {error}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ProviderError::InvalidEndpoint(
            "provider endpoint must use http or https".to_string(),
        ));
    }

    parsed
        .join(ANALYZE_PATH)
        .map(String::from)
        .map_err(|error| ProviderError::InvalidEndpoint(error.to_string()))
}
