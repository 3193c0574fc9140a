#![warn(missing_docs)]
//! # phishguard-analysis-contract
//!
//! ## Purpose
//! Defines the raw analysis-provider response schema and normalizes it into
//! the canonical [`AnalysisResult`].
//!
//! ## Responsibilities
//! - Parse provider JSON, surfacing provider-reported `status: "error"`.
//! - Select the headline probability: ensemble, then the primary single model
//!   (logistic regression), then `overall`, then a flat `probability`.
//! - Map verdict labels leniently and synthesize missing reasoning.
//! - Accept both the array and the map shape for `features`.
//! - Pass SHAP, LIME, and technical sections through without computing them.
//!   Optional sections that are `null` or malformed decode as empty.
//!
//! ## Data flow
//! Raw JSON -> [`parse_provider_response`] -> [`ProviderResponse`] ->
//! [`normalize`] -> [`AnalysisResult`].
//!
//! ## Ownership and lifetimes
//! [`ProviderResponse`] owns its sections so providers can hand it across the
//! transport boundary; [`normalize`] borrows it and produces an owned result.
//!
//! ## Error model
//! Undecodable JSON and provider-reported failures return [`ContractError`].
//! Responses that decode but cannot be normalized return [`ValidationError`].

use std::collections::BTreeMap;

use phishguard_core::{
    AdvancedAnalysis, AnalysisResult, EnsembleOutput, FeatureWeight, LimeDirection, LimeFeature,
    ModelOutput, ShapDirection, ShapReason, Verdict, metrics,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

mod lenient;

/// Model key used as the headline fallback when no ensemble is supplied.
pub const PRIMARY_MODEL: &str = "logistic_regression";

/// Message used when the provider reports an error without details.
pub const GENERIC_PROVIDER_ERROR: &str = "Analysis failed. Please try again.";

/// Keys in a map-shaped `features` section that are not features.
const RESERVED_FEATURE_KEYS: [&str; 4] = ["status", "url", "prediction", "probability"];

/// Raw provider response.
///
/// Superset of the HTTP shape (`overall`, `models`, ...) and the generative
/// shape (`threatLevel`, `probability`, `features`, `reasoning`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// `success` or `error` for the HTTP variant.
    #[serde(default)]
    pub status: Option<String>,
    /// Provider error message when `status` is `error`.
    #[serde(default)]
    pub error: Option<String>,
    /// URL as echoed (and possibly rewritten) by the provider.
    #[serde(default)]
    pub url: Option<String>,
    /// Flat overall output.
    #[serde(default, deserialize_with = "lenient::optional")]
    pub overall: Option<RawHeadline>,
    /// Ensemble output.
    #[serde(default, deserialize_with = "lenient::optional")]
    pub ensemble: Option<RawHeadline>,
    /// Per-model outputs keyed by model name; non-object entries are dropped.
    #[serde(default, deserialize_with = "lenient::map")]
    pub models: BTreeMap<String, RawHeadline>,
    /// Feature weights as an array of objects or a name-to-weight map.
    #[serde(default)]
    pub features: Option<Value>,
    /// Generative-shape verdict.
    #[serde(default, rename = "threatLevel")]
    pub threat_level: Option<Value>,
    /// Generative-shape probability.
    #[serde(default)]
    pub probability: Option<Value>,
    /// Generative-shape reasoning.
    #[serde(default, deserialize_with = "lenient::optional")]
    pub reasoning: Option<String>,
    /// Technical checks (redirects, certificate, whois).
    #[serde(default)]
    pub advanced_analysis: Option<Value>,
    /// SHAP explanation.
    #[serde(default, deserialize_with = "lenient::optional")]
    pub shap_analysis: Option<RawShapAnalysis>,
    /// LIME explanation.
    #[serde(default, deserialize_with = "lenient::optional")]
    pub lime_analysis: Option<RawLimeAnalysis>,
    /// Threat-intelligence lookup.
    #[serde(default)]
    pub threat_intelligence: Option<Value>,
    /// Link-threat detector output.
    #[serde(default)]
    pub link_threats: Option<Value>,
    /// Warning signs; non-string entries are dropped.
    #[serde(default, deserialize_with = "lenient::list")]
    pub warning_signs: Vec<String>,
}

/// One probability/prediction block (`overall`, `ensemble`, or a model).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHeadline {
    /// Phishing probability; validated during normalization.
    #[serde(default)]
    pub probability: Option<Value>,
    /// Verdict label; validated during normalization.
    #[serde(default)]
    pub prediction: Option<Value>,
    /// Confidence as a label (`"82.0%"`) or a fraction.
    #[serde(default)]
    pub confidence: Option<Value>,
    /// Provider-written summary.
    #[serde(default, deserialize_with = "lenient::optional")]
    pub logic_summary: Option<String>,
}

/// Raw SHAP section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawShapAnalysis {
    /// Top attribution reasons in provider order; malformed reasons are dropped.
    #[serde(default, alias = "top_features", deserialize_with = "lenient::list")]
    pub top_reasons: Vec<RawShapReason>,
}

/// Raw SHAP reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawShapReason {
    /// Feature name.
    pub feature: String,
    /// Signed impact.
    pub impact: f64,
    /// `phishing` or `safe`.
    #[serde(default)]
    pub direction: Option<String>,
}

/// Raw LIME section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLimeAnalysis {
    /// Top contributing features in provider order; malformed entries are dropped.
    #[serde(default, deserialize_with = "lenient::list")]
    pub top_contributing_features: Vec<RawLimeFeature>,
    /// Local surrogate prediction.
    #[serde(default)]
    pub local_prediction: Option<Value>,
}

/// Raw LIME feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLimeFeature {
    /// Feature description.
    pub feature: String,
    /// Signed weight.
    pub weight: f64,
    /// `risk` or `safe`.
    #[serde(default)]
    pub direction: Option<String>,
}

/// Where the headline probability came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlineSource {
    /// `ensemble` block.
    Ensemble,
    /// Primary single model.
    PrimaryModel,
    /// `overall` block.
    Overall,
    /// Flat top-level `probability`.
    Flat,
}

impl HeadlineSource {
    fn field(&self) -> &'static str {
        match self {
            Self::Ensemble => "ensemble",
            Self::PrimaryModel => "models.logistic_regression",
            Self::Overall => "overall",
            Self::Flat => "probability",
        }
    }
}

/// Parses raw provider JSON.
///
/// # Errors
/// Returns [`ContractError::Decode`] for invalid JSON or a non-object body and
/// [`ContractError::ProviderReported`] when the provider sets `status: "error"`.
pub fn parse_provider_response(raw: &str) -> Result<ProviderResponse, ContractError> {
    let parsed: ProviderResponse = serde_json::from_str(raw).map_err(ContractError::Decode)?;

    if parsed.status.as_deref() == Some("error") {
        let message = parsed
            .error
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .unwrap_or(GENERIC_PROVIDER_ERROR);
        return Err(ContractError::ProviderReported(message.to_string()));
    }

    Ok(parsed)
}

/// Normalizes a provider response into the canonical result for `url`.
///
/// # Errors
/// Returns [`ValidationError`] when no usable headline probability exists, a
/// probability is not a number in `[0, 1]`, or a verdict is not a string.
pub fn normalize(url: &str, raw: &ProviderResponse) -> Result<AnalysisResult, ValidationError> {
    if url.trim().is_empty() {
        return Err(ValidationError::EmptyUrl);
    }

    let (source, probability, verdict_field, summary) = select_headline(raw)?;
    let verdict = match verdict_field {
        None | Some(Value::Null) => metrics(probability).verdict,
        Some(Value::String(label)) => {
            let verdict = Verdict::from_provider_label(label);
            if Verdict::parse_exact(label).is_none() {
                debug!(label = %label, "unrecognized verdict label, defaulting to SAFE");
            }
            verdict
        }
        Some(_) => {
            return Err(ValidationError::VerdictNotString {
                field: source.field(),
            });
        }
    };

    let ensemble = normalize_ensemble(raw.ensemble.as_ref());
    let reasoning = summary
        .or_else(|| {
            raw.overall
                .as_ref()
                .and_then(|overall| overall.logic_summary.clone())
        })
        .or_else(|| raw.reasoning.clone())
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| {
            let derived = metrics(probability);
            default_reasoning(derived.percent, derived.label.as_str(), ensemble.is_some())
        });

    debug!(source = source.field(), probability, verdict = %verdict, "normalized headline");

    Ok(AnalysisResult {
        url: url.to_string(),
        probability,
        verdict,
        reasoning,
        features: normalize_features(raw.features.as_ref()),
        model_breakdown: normalize_models(&raw.models),
        ensemble,
        shap_top_reasons: normalize_shap(raw.shap_analysis.as_ref()),
        lime_top_features: normalize_lime(raw.lime_analysis.as_ref()),
        advanced: normalize_advanced(raw),
    })
}

/// Builds the fallback reasoning sentence.
pub fn default_reasoning(percent: u8, label: &str, has_ensemble: bool) -> String {
    let basis = if has_ensemble {
        "ensemble model consensus"
    } else {
        "heuristic URL structure and external reputation"
    };
    format!(
        "System analysis confirms a {percent}% probability of {} intent based on {basis}.",
        label.to_lowercase()
    )
}

type Headline<'a> = (HeadlineSource, f64, Option<&'a Value>, Option<String>);

fn select_headline(raw: &ProviderResponse) -> Result<Headline<'_>, ValidationError> {
    let blocks = [
        (HeadlineSource::Ensemble, raw.ensemble.as_ref()),
        (HeadlineSource::PrimaryModel, raw.models.get(PRIMARY_MODEL)),
        (HeadlineSource::Overall, raw.overall.as_ref()),
    ];

    for (source, block) in blocks {
        let Some(block) = block else { continue };
        let Some(value) = present(block.probability.as_ref()) else {
            continue;
        };
        let probability = probability_from(value, source)?;
        return Ok((
            source,
            probability,
            block.prediction.as_ref(),
            block.logic_summary.clone(),
        ));
    }

    if let Some(value) = present(raw.probability.as_ref()) {
        let probability = probability_from(value, HeadlineSource::Flat)?;
        return Ok((
            HeadlineSource::Flat,
            probability,
            raw.threat_level.as_ref(),
            None,
        ));
    }

    Err(ValidationError::MissingProbability)
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}

fn probability_from(value: &Value, source: HeadlineSource) -> Result<f64, ValidationError> {
    value
        .as_f64()
        .filter(|probability| (0.0..=1.0).contains(probability))
        .ok_or_else(|| ValidationError::InvalidProbability {
            field: source.field(),
            value: value.to_string(),
        })
}

fn confidence_label(value: Option<&Value>) -> Option<String> {
    match present(value)? {
        Value::String(label) => Some(label.clone()),
        Value::Number(number) => {
            let fraction = number.as_f64()?;
            let percent = if fraction <= 1.0 { fraction * 100.0 } else { fraction };
            Some(format!("{percent:.1}%"))
        }
        _ => None,
    }
}

fn prediction_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(label)) => label.clone(),
        _ => String::new(),
    }
}

fn normalize_ensemble(block: Option<&RawHeadline>) -> Option<EnsembleOutput> {
    let block = block?;
    let probability = present(block.probability.as_ref())?
        .as_f64()
        .filter(|probability| (0.0..=1.0).contains(probability))?;

    Some(EnsembleOutput {
        probability,
        prediction: prediction_text(block.prediction.as_ref()),
        confidence: confidence_label(block.confidence.as_ref()),
    })
}

fn normalize_models(models: &BTreeMap<String, RawHeadline>) -> BTreeMap<String, ModelOutput> {
    models
        .iter()
        .filter_map(|(name, block)| {
            let probability = present(block.probability.as_ref())
                .and_then(Value::as_f64)
                .filter(|probability| (0.0..=1.0).contains(probability));
            match probability {
                Some(probability) => Some((
                    name.clone(),
                    ModelOutput {
                        probability,
                        prediction: prediction_text(block.prediction.as_ref()),
                    },
                )),
                None => {
                    debug!(model = %name, "omitting model without usable probability");
                    None
                }
            }
        })
        .collect()
}

fn normalize_features(raw: Option<&Value>) -> Vec<FeatureWeight> {
    match raw {
        Some(Value::Array(items)) => items.iter().filter_map(feature_from_object).collect(),
        Some(Value::Object(map)) => map
            .iter()
            .filter(|(name, _)| !RESERVED_FEATURE_KEYS.contains(&name.as_str()))
            .filter_map(|(name, weight)| {
                Some(FeatureWeight {
                    feature_name: name.clone(),
                    weight: weight.as_f64()?,
                    description: String::new(),
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn feature_from_object(item: &Value) -> Option<FeatureWeight> {
    let object = item.as_object()?;
    let name = ["featureName", "feature_name", "name"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))?;

    Some(FeatureWeight {
        feature_name: name.to_string(),
        weight: object.get("weight").and_then(Value::as_f64)?,
        description: object
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

fn normalize_shap(raw: Option<&RawShapAnalysis>) -> Vec<ShapReason> {
    raw.map(|section| {
        section
            .top_reasons
            .iter()
            .map(|reason| ShapReason {
                feature: reason.feature.clone(),
                impact: reason.impact,
                direction: match reason.direction.as_deref() {
                    Some("phishing") => ShapDirection::Phishing,
                    Some("safe") => ShapDirection::Safe,
                    _ => ShapDirection::from_impact(reason.impact),
                },
            })
            .collect()
    })
    .unwrap_or_default()
}

fn normalize_lime(raw: Option<&RawLimeAnalysis>) -> Vec<LimeFeature> {
    raw.map(|section| {
        section
            .top_contributing_features
            .iter()
            .map(|feature| LimeFeature {
                feature: feature.feature.clone(),
                weight: feature.weight,
                direction: match feature.direction.as_deref() {
                    Some("risk") => LimeDirection::Risk,
                    Some("safe") => LimeDirection::Safe,
                    _ => LimeDirection::from_weight(feature.weight),
                },
            })
            .collect()
    })
    .unwrap_or_default()
}

fn normalize_advanced(raw: &ProviderResponse) -> Option<AdvancedAnalysis> {
    if raw.advanced_analysis.is_none()
        && raw.threat_intelligence.is_none()
        && raw.link_threats.is_none()
        && raw.warning_signs.is_empty()
    {
        return None;
    }

    let checks = raw.advanced_analysis.as_ref();
    let intel = raw.threat_intelligence.as_ref();
    let links = raw.link_threats.as_ref();

    let mut sections = Map::new();
    for (key, section) in [
        ("advanced_analysis", checks),
        ("threat_intelligence", intel),
        ("link_threats", links),
    ] {
        if let Some(section) = section {
            sections.insert(key.to_string(), section.clone());
        }
    }

    Some(AdvancedAnalysis {
        redirect_hops: checks
            .and_then(|value| value.pointer("/redirects/redirects"))
            .and_then(Value::as_array)
            .map(Vec::len),
        certificate_valid: checks
            .and_then(|value| value.pointer("/ssl_certificate/certificate_valid"))
            .and_then(Value::as_bool),
        domain_age_days: checks
            .and_then(|value| value.pointer("/whois/days_old"))
            .and_then(Value::as_u64),
        threat_found: intel
            .and_then(|value| value.get("threat_found"))
            .and_then(Value::as_bool),
        threat_severity: intel
            .and_then(|value| value.get("threat_severity"))
            .and_then(Value::as_u64)
            .and_then(|severity| u32::try_from(severity).ok()),
        link_threat_score: links
            .and_then(|value| value.get("threat_score"))
            .and_then(Value::as_f64),
        link_threats: links
            .and_then(|value| value.get("threats_found"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        warning_signs: raw.warning_signs.clone(),
        raw: Value::Object(sections),
    })
}

/// Response could not be normalized into an [`AnalysisResult`].
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Submitted URL was blank.
    #[error("url is empty")]
    EmptyUrl,
    /// No headline block carried a probability.
    #[error("response carries no probability")]
    MissingProbability,
    /// A headline probability was not a number in `[0, 1]`.
    #[error("{field} probability is not a number in [0, 1]: {value}")]
    InvalidProbability {
        /// Wire field that carried the value.
        field: &'static str,
        /// Offending value rendered as JSON.
        value: String,
    },
    /// A verdict field was present but not a string.
    #[error("{field} verdict is not a string")]
    VerdictNotString {
        /// Wire field that carried the verdict.
        field: &'static str,
    },
}

/// Analysis contract errors.
#[derive(Debug, Error)]
pub enum ContractError {
    /// JSON decode failure.
    #[error("analysis decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Provider answered with `status: "error"`.
    #[error("{0}")]
    ProviderReported(String),
    /// Response decoded but could not be normalized.
    #[error("analysis contract violation: {0}")]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    //! Unit tests for headline selection and defaults.

    use super::*;

    fn headline(probability: f64, prediction: &str) -> RawHeadline {
        RawHeadline {
            probability: Some(Value::from(probability)),
            prediction: Some(Value::from(prediction)),
            ..RawHeadline::default()
        }
    }

    #[test]
    fn primary_model_wins_over_overall_without_ensemble() {
        let mut raw = ProviderResponse {
            overall: Some(headline(0.40, "LEGITIMATE")),
            ..ProviderResponse::default()
        };
        raw.models
            .insert(PRIMARY_MODEL.to_string(), headline(0.90, "PHISHING"));

        let result = normalize("http://a.example", &raw).expect("should normalize");
        assert_eq!(result.probability, 0.90);
        assert_eq!(result.verdict, Verdict::Phishing);
    }

    #[test]
    fn reasoning_template_names_heuristic_basis() {
        assert_eq!(
            default_reasoning(42, "CAUTION", false),
            "System analysis confirms a 42% probability of caution intent based on heuristic URL structure and external reputation."
        );
    }

    #[test]
    fn null_probability_falls_through_to_next_block() {
        let raw = ProviderResponse {
            ensemble: Some(RawHeadline::default()),
            overall: Some(headline(0.2, "SAFE")),
            ..ProviderResponse::default()
        };
        let result = normalize("a.example", &raw).expect("should normalize");
        assert_eq!(result.probability, 0.2);
        assert!(result.ensemble.is_none());
    }
}
