//! Prompt-based backend asking a generative model to act as a classifier.
//!
//! The vendor client is not part of this crate; callers inject a
//! [`GenerativeTransport`] that performs the actual content-generation call.

use std::sync::Arc;

use phishguard_analysis_contract::{ContractError, ProviderResponse, parse_provider_response};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::{AnalysisProvider, ProviderError};

/// Default model name.
pub const DEFAULT_GENERATIVE_MODEL: &str = "gemini-2.5-flash";

/// Sampling temperature; kept low for reproducible classifications.
pub const GENERATION_TEMPERATURE: f32 = 0.3;

/// One structured-output generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Model name.
    pub model: String,
    /// Prompt text.
    pub prompt: String,
    /// Requested output mime type.
    pub response_mime_type: String,
    /// Output schema the model must honor.
    pub response_schema: Value,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Transport performing one content-generation call.
pub trait GenerativeTransport: Send + Sync {
    /// Returns the generated text for `request`.
    ///
    /// # Errors
    /// Returns [`ProviderError`] when the vendor call fails.
    fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}

/// Provider that asks a generative model for a structured classification.
#[derive(Clone)]
pub struct GenerativeAnalysisProvider {
    model: String,
    transport: Arc<dyn GenerativeTransport>,
}

impl GenerativeAnalysisProvider {
    /// Creates a provider using [`DEFAULT_GENERATIVE_MODEL`].
    pub fn new(transport: Arc<dyn GenerativeTransport>) -> Self {
        Self {
            model: DEFAULT_GENERATIVE_MODEL.to_string(),
            transport,
        }
    }

    /// Overrides the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builds the generation request for `url`.
    pub fn build_request(&self, url: &str) -> GenerationRequest {
        GenerationRequest {
            model: self.model.clone(),
            prompt: analysis_prompt(url),
            response_mime_type: "application/json".to_string(),
            response_schema: analysis_response_schema(),
            temperature: GENERATION_TEMPERATURE,
        }
    }
}

impl AnalysisProvider for GenerativeAnalysisProvider {
    fn name(&self) -> &'static str {
        "generative"
    }

    fn analyze(&self, url: &str) -> Result<ProviderResponse, ProviderError> {
        let request = self.build_request(url);
        debug!(model = %request.model, "requesting generative classification");

        let text = self.transport.generate(&request)?;
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        parse_provider_response(&text).map_err(|error| match error {
            ContractError::ProviderReported(message) => ProviderError::Reported(message),
            other => ProviderError::Malformed(other.to_string()),
        })
    }
}

/// Prompt asking the model to simulate a logistic-regression classifier.
pub fn analysis_prompt(url: &str) -> String {
    format!(
        r#"Act as a cybersecurity expert and a logistic regression classifier.
Analyze the following URL for potential phishing threats: "{url}".

Simulate the feature extraction and weighting process of a logistic regression model trained on phishing datasets.
Consider features such as:
- URL Length
- Presence of IP address
- Suspicious characters (@, -, etc.)
- Number of subdomains
- HTTPS/SSL validity (inferred)
- Keyword analysis (e.g., 'secure', 'login', 'update' in non-standard places)
- TLD reputation

Assign weights to these features to calculate a final probability score.
Return the result in JSON format."#
    )
}

/// Structured-output schema for the generative classification.
pub fn analysis_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "threatLevel": {
                "type": "string",
                "enum": ["SAFE", "SUSPICIOUS", "PHISHING"],
                "description": "The classification of the URL based on the analysis."
            },
            "probability": {
                "type": "number",
                "description": "Probability between 0 and 1 that the URL is phishing."
            },
            "features": {
                "type": "array",
                "description": "Features extracted for the logistic regression model.",
                "items": {
                    "type": "object",
                    "properties": {
                        "featureName": { "type": "string" },
                        "weight": { "type": "number" },
                        "description": { "type": "string" }
                    },
                    "required": ["featureName", "weight", "description"]
                }
            },
            "reasoning": {
                "type": "string",
                "description": "A summary explanation of the verdict."
            }
        },
        "required": ["threatLevel", "probability", "features", "reasoning"]
    })
}
