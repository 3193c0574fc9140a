#![warn(missing_docs)]
//! # phishguard-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `phishguard` workspace and the
//! derived display metrics computed from a phishing probability.
//!
//! ## Responsibilities
//! - Represent the canonical [`AnalysisResult`] accepted from any provider.
//! - Derive percent, verdict, display label, tier, color, and gauge sweep from
//!   a probability in `[0, 1]`.
//! - Represent persisted [`HistoryEntry`] records and in-memory [`BatchRow`]s.
//!
//! ## Data flow
//! Provider output is normalized into [`AnalysisResult`] by the analysis
//! contract crate. Consumers call [`metrics`] (or [`AnalysisResult::metrics`])
//! and [`gauge`] for display values, and wrap results into [`HistoryEntry`] or
//! [`BatchRow`] for bookkeeping.
//!
//! ## Ownership and lifetimes
//! All records own their strings so they can outlive the provider response
//! buffer and be persisted or exported independently.
//!
//! ## Error model
//! Invariant violations on construction (empty URL, probability outside
//! `[0, 1]`) return [`CoreError`].
//!
//! ## Example
//! ```rust
//! use phishguard_core::{metrics, DisplayLabel, RiskTier, Verdict};
//!
//! let derived = metrics(0.82);
//! assert_eq!(derived.percent, 82);
//! assert_eq!(derived.verdict, Verdict::Phishing);
//! assert_eq!(derived.label, DisplayLabel::Phishing);
//! assert_eq!(derived.tier, RiskTier::High);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of entries kept in scan history.
pub const HISTORY_CAPACITY: usize = 20;

/// Maximum number of URLs accepted in one batch run.
pub const MAX_BATCH_SIZE: usize = 20;

/// Verdict text recorded for batch rows whose analysis failed.
pub const BATCH_ERROR_VERDICT: &str = "ERROR";

/// Placeholder used for batch cells that have no value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Canonical three-way classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// No phishing intent detected.
    Safe,
    /// Partial risk signal.
    Suspicious,
    /// Phishing intent detected.
    Phishing,
}

impl Verdict {
    /// Parses an exact, case-sensitive verdict string.
    ///
    /// Returns `None` for anything other than `SAFE`, `SUSPICIOUS`, `PHISHING`.
    pub fn parse_exact(raw: &str) -> Option<Self> {
        match raw {
            "SAFE" => Some(Self::Safe),
            "SUSPICIOUS" => Some(Self::Suspicious),
            "PHISHING" => Some(Self::Phishing),
            _ => None,
        }
    }

    /// Maps a provider label leniently: unrecognized labels become [`Verdict::Safe`].
    pub fn from_provider_label(raw: &str) -> Self {
        Self::parse_exact(raw).unwrap_or(Self::Safe)
    }

    /// Returns the wire/display spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Suspicious => "SUSPICIOUS",
            Self::Phishing => "PHISHING",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Four-band presentation label.
///
/// Distinct from [`Verdict`]: `Caution` exists only for display and belongs to
/// the suspicious verdict family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DisplayLabel {
    /// Probability below 0.25.
    Legitimate,
    /// Probability in `[0.25, 0.50)`.
    Caution,
    /// Probability in `[0.50, 0.75)`.
    Suspicious,
    /// Probability at or above 0.75.
    Phishing,
}

impl DisplayLabel {
    /// Returns the uppercase badge text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legitimate => "LEGITIMATE",
            Self::Caution => "CAUTION",
            Self::Suspicious => "SUSPICIOUS",
            Self::Phishing => "PHISHING",
        }
    }

    /// Returns the verdict family this label belongs to.
    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Legitimate => Verdict::Safe,
            Self::Caution | Self::Suspicious => Verdict::Suspicious,
            Self::Phishing => Verdict::Phishing,
        }
    }

    /// Returns the display severity tier.
    pub fn tier(&self) -> RiskTier {
        match self {
            Self::Legitimate => RiskTier::Low,
            Self::Caution | Self::Suspicious => RiskTier::Medium,
            Self::Phishing => RiskTier::High,
        }
    }

    /// Returns the color token used for gauge fill and prediction text.
    pub fn color(&self) -> ColorToken {
        match self {
            Self::Legitimate => ColorToken::NeonGreen,
            Self::Caution => ColorToken::Primary,
            Self::Suspicious => ColorToken::NeonYellow,
            Self::Phishing => ColorToken::NeonRed,
        }
    }
}

impl fmt::Display for DisplayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    /// Low severity.
    Low,
    /// Medium severity.
    Medium,
    /// High severity.
    High,
}

impl RiskTier {
    /// Returns the lowercase class name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Named color token independent of any styling system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorToken {
    /// Safe/legitimate green.
    NeonGreen,
    /// Neutral accent used for the caution band.
    Primary,
    /// Suspicious yellow.
    NeonYellow,
    /// Phishing red.
    NeonRed,
}

impl ColorToken {
    /// Returns the stylesheet variable name.
    pub fn css_var(&self) -> &'static str {
        match self {
            Self::NeonGreen => "--neon-green",
            Self::Primary => "--primary",
            Self::NeonYellow => "--neon-yellow",
            Self::NeonRed => "--neon-red",
        }
    }

    /// Returns a fallback hex color for renderers without stylesheet variables.
    pub fn hex(&self) -> &'static str {
        match self {
            Self::NeonGreen => "#388e3c",
            Self::Primary => "#fbc02d",
            Self::NeonYellow => "#f57c00",
            Self::NeonRed => "#d32f2f",
        }
    }
}

/// Dashboard color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    /// Light theme.
    Light,
    /// Dark theme.
    #[default]
    Dark,
}

impl Theme {
    /// Persisted spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parses a persisted value; anything unknown is [`Theme::Dark`].
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "light" => Self::Light,
            _ => Self::Dark,
        }
    }

    /// The opposite theme.
    pub fn toggled(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Display values derived from one probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskMetrics {
    /// `round(probability * 100)` in `0..=100`.
    pub percent: u8,
    /// Three-way verdict family.
    pub verdict: Verdict,
    /// Four-band display label.
    pub label: DisplayLabel,
    /// Display severity tier.
    pub tier: RiskTier,
}

impl RiskMetrics {
    /// Returns the color token for this band.
    pub fn color(&self) -> ColorToken {
        self.label.color()
    }

    /// Returns the semicircular gauge geometry for this percent.
    pub fn gauge(&self) -> Gauge {
        gauge(self.percent)
    }
}

/// Semicircular gauge geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gauge {
    /// Sweep angle in degrees, `0.0` at 0% and `180.0` at 100%.
    pub rotation_deg: f64,
    /// Transform applied to the filled arc (`rotation_deg - 180`).
    pub sweep_transform_deg: f64,
}

/// Computes display metrics from a probability.
///
/// Thresholds are inclusive lower bounds evaluated top-down: `0.75` phishing,
/// `0.50` suspicious, `0.25` caution, otherwise legitimate. Out-of-range input
/// is clamped into `[0, 1]`.
pub fn metrics(probability: f64) -> RiskMetrics {
    let probability = clamp_probability(probability);
    let label = if probability >= 0.75 {
        DisplayLabel::Phishing
    } else if probability >= 0.50 {
        DisplayLabel::Suspicious
    } else if probability >= 0.25 {
        DisplayLabel::Caution
    } else {
        DisplayLabel::Legitimate
    };

    RiskMetrics {
        percent: percent_of(probability),
        verdict: label.verdict(),
        label,
        tier: label.tier(),
    }
}

/// Returns `round(probability * 100)` clamped into `0..=100`.
pub fn percent_of(probability: f64) -> u8 {
    (clamp_probability(probability) * 100.0).round() as u8
}

/// Maps a percent onto semicircular gauge geometry.
pub fn gauge(percent: u8) -> Gauge {
    let rotation_deg = (f64::from(percent.min(100)) / 100.0) * 180.0;
    Gauge {
        rotation_deg,
        sweep_transform_deg: rotation_deg - 180.0,
    }
}

fn clamp_probability(probability: f64) -> f64 {
    if probability.is_nan() {
        return 0.0;
    }
    probability.clamp(0.0, 1.0)
}

/// Validates that a probability is finite and within `[0, 1]`.
///
/// # Errors
/// Returns [`CoreError::ProbabilityOutOfRange`] otherwise.
pub fn validate_probability(probability: f64) -> Result<f64, CoreError> {
    if probability.is_finite() && (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(CoreError::ProbabilityOutOfRange(probability))
    }
}

/// One weighted feature in the provider's explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureWeight {
    /// Feature name, e.g. `URL Length`.
    pub feature_name: String,
    /// Signed weight; positive values indicate phishing.
    pub weight: f64,
    /// Short explanation; empty when the provider supplied none.
    #[serde(default)]
    pub description: String,
}

/// One single-model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    /// Phishing probability in `[0, 1]`.
    pub probability: f64,
    /// Provider prediction label, kept verbatim for display.
    pub prediction: String,
}

/// Combined output aggregating several models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleOutput {
    /// Combined phishing probability in `[0, 1]`.
    pub probability: f64,
    /// Provider prediction label, kept verbatim for display.
    pub prediction: String,
    /// Confidence label such as `82.0%`.
    #[serde(default)]
    pub confidence: Option<String>,
}

/// Direction of a SHAP attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapDirection {
    /// Pushes towards phishing.
    Phishing,
    /// Pushes towards safe.
    Safe,
}

impl ShapDirection {
    /// Infers direction from the sign of `impact`.
    pub fn from_impact(impact: f64) -> Self {
        if impact > 0.0 { Self::Phishing } else { Self::Safe }
    }
}

/// One SHAP attribution reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapReason {
    /// Feature name.
    pub feature: String,
    /// Signed impact on the prediction.
    pub impact: f64,
    /// Attribution direction.
    pub direction: ShapDirection,
}

/// Direction of a LIME feature weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimeDirection {
    /// Positive weight, increases risk.
    Risk,
    /// Non-positive weight.
    Safe,
}

impl LimeDirection {
    /// Infers direction from the sign of `weight`.
    pub fn from_weight(weight: f64) -> Self {
        if weight > 0.0 { Self::Risk } else { Self::Safe }
    }
}

/// One LIME contributing feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimeFeature {
    /// Feature description as reported by the explainer.
    pub feature: String,
    /// Signed local weight.
    pub weight: f64,
    /// Direction, inferred from `weight` when the provider omitted it.
    pub direction: LimeDirection,
}

/// Opaque technical details passed through from the provider.
///
/// The typed fields are convenience projections of `raw`; nothing here is
/// computed by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedAnalysis {
    /// Number of redirect hops observed.
    pub redirect_hops: Option<usize>,
    /// Whether the TLS certificate was valid.
    pub certificate_valid: Option<bool>,
    /// Registered domain age.
    pub domain_age_days: Option<u64>,
    /// Threat-intelligence database hit.
    pub threat_found: Option<bool>,
    /// Threat-intelligence severity.
    pub threat_severity: Option<u32>,
    /// Link-threat score in `0..=100`.
    pub link_threat_score: Option<f64>,
    /// Link-threat findings in provider order.
    #[serde(default)]
    pub link_threats: Vec<String>,
    /// Human-readable warning signs.
    #[serde(default)]
    pub warning_signs: Vec<String>,
    /// Raw provider sections, keyed by their wire names.
    #[serde(default)]
    pub raw: serde_json::Value,
}

/// Canonical, normalized analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// The exact URL string submitted.
    pub url: String,
    /// Headline phishing probability in `[0, 1]`.
    pub probability: f64,
    /// Canonical verdict.
    pub verdict: Verdict,
    /// Human-readable summary.
    pub reasoning: String,
    /// Weighted features in display order.
    #[serde(default)]
    pub features: Vec<FeatureWeight>,
    /// Per-model outputs keyed by model name.
    #[serde(default)]
    pub model_breakdown: BTreeMap<String, ModelOutput>,
    /// Ensemble output when the provider supplied one.
    #[serde(default)]
    pub ensemble: Option<EnsembleOutput>,
    /// SHAP reasons in provider order.
    #[serde(default)]
    pub shap_top_reasons: Vec<ShapReason>,
    /// LIME features in provider order.
    #[serde(default)]
    pub lime_top_features: Vec<LimeFeature>,
    /// Technical passthrough details.
    #[serde(default)]
    pub advanced: Option<AdvancedAnalysis>,
}

impl AnalysisResult {
    /// Creates a minimal result with validated URL and probability.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyUrl`] for a blank URL and
    /// [`CoreError::ProbabilityOutOfRange`] for an invalid probability.
    pub fn new(
        url: impl Into<String>,
        probability: f64,
        verdict: Verdict,
        reasoning: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(CoreError::EmptyUrl);
        }

        Ok(Self {
            url,
            probability: validate_probability(probability)?,
            verdict,
            reasoning: reasoning.into(),
            features: Vec::new(),
            model_breakdown: BTreeMap::new(),
            ensemble: None,
            shap_top_reasons: Vec::new(),
            lime_top_features: Vec::new(),
            advanced: None,
        })
    }

    /// Derived display metrics for the headline probability.
    pub fn metrics(&self) -> RiskMetrics {
        metrics(self.probability)
    }

    /// Confidence label for tables: ensemble confidence, else headline percent.
    pub fn confidence_label(&self) -> String {
        self.ensemble
            .as_ref()
            .and_then(|ensemble| ensemble.confidence.clone())
            .unwrap_or_else(|| format!("{:.1}%", self.probability * 100.0))
    }
}

/// One persisted scan-history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Scan time in Unix epoch milliseconds.
    pub timestamp: u64,
    /// Scanned URL.
    pub url: String,
    /// Headline probability at scan time.
    pub probability: f64,
    /// Full normalized result.
    pub full_result: AnalysisResult,
}

impl HistoryEntry {
    /// Wraps a successful analysis.
    pub fn from_result(result: AnalysisResult, timestamp: u64) -> Self {
        Self {
            timestamp,
            url: result.url.clone(),
            probability: result.probability,
            full_result: result,
        }
    }
}

/// One row of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRow {
    /// Submitted URL.
    pub url: String,
    /// Verdict text, or `ERROR`.
    pub verdict: String,
    /// Risk percent text such as `82%`, or `N/A`.
    pub risk_percent: String,
    /// Confidence label, or `N/A`.
    pub confidence_label: String,
    /// Display tier.
    pub risk_tier: RiskTier,
}

impl BatchRow {
    /// Builds a row from a successful analysis.
    pub fn from_result(result: &AnalysisResult) -> Self {
        let derived = result.metrics();
        Self {
            url: result.url.clone(),
            verdict: result.verdict.as_str().to_string(),
            risk_percent: format!("{}%", derived.percent),
            confidence_label: result.confidence_label(),
            risk_tier: derived.tier,
        }
    }

    /// Builds the placeholder row for a failed URL.
    pub fn error(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            verdict: BATCH_ERROR_VERDICT.to_string(),
            risk_percent: NOT_AVAILABLE.to_string(),
            confidence_label: NOT_AVAILABLE.to_string(),
            risk_tier: RiskTier::Low,
        }
    }

    /// Returns `true` for failed-URL rows.
    pub fn is_error(&self) -> bool {
        self.verdict == BATCH_ERROR_VERDICT
    }
}

/// Error type for core model invariants.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// URL must be non-empty.
    #[error("url is empty")]
    EmptyUrl,
    /// Probability must be finite and within `[0, 1]`.
    #[error("probability {0} is outside [0, 1]")]
    ProbabilityOutOfRange(f64),
}
