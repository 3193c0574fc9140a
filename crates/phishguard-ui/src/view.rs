//! Display projection of one analysis result.

use phishguard_core::{
    AdvancedAnalysis, AnalysisResult, ColorToken, DisplayLabel, FeatureWeight, Gauge,
    LimeDirection, RiskTier, ShapDirection,
};

/// Maximum number of bars in the feature chart.
pub const FEATURE_CHART_LIMIT: usize = 10;

/// Text rendered in place of an empty feature chart.
pub const FEATURE_PLACEHOLDER: &str = "Feature data unavailable";

const BAR_SCALE: f64 = 50.0;

/// Threat summary tag shown next to the gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatTag {
    /// Risk at or above 50% or a threat-intel hit.
    Dangerous,
    /// No threat signal.
    Clear,
}

impl ThreatTag {
    /// Tag text.
    pub fn text(&self) -> &'static str {
        match self {
            Self::Dangerous => "Dangerous Pattern Detected",
            Self::Clear => "No Threats Detected",
        }
    }

    /// Tag color.
    pub fn color(&self) -> ColorToken {
        match self {
            Self::Dangerous => ColorToken::NeonRed,
            Self::Clear => ColorToken::NeonGreen,
        }
    }
}

/// Compact per-model readout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMini {
    /// Cleaned model name, e.g. `Random Forest`.
    pub name: String,
    /// Provider prediction label.
    pub prediction: String,
    /// Model probability as a percent.
    pub percent: u8,
}

/// One bar of the feature contribution chart.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBar {
    /// Raw feature name (tooltip).
    pub name: String,
    /// Cleaned display label.
    pub label: String,
    /// Signed weight.
    pub weight: f64,
    /// Weight formatted with two decimals.
    pub value_text: String,
    /// Bar fill width in percent, `0.0..=100.0`.
    pub width_percent: f64,
    /// Bar color.
    pub color: ColorToken,
    /// Provider description.
    pub description: String,
}

/// One SHAP or LIME explanation bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationBar {
    /// Feature label as reported by the explainer.
    pub label: String,
    /// Signed impact or weight.
    pub value: f64,
    /// `true` when the entry pushes towards phishing.
    pub increases_risk: bool,
    /// Bar color.
    pub color: ColorToken,
}

impl ExplanationBar {
    fn new(label: &str, value: f64, increases_risk: bool) -> Self {
        Self {
            label: label.to_string(),
            value,
            increases_risk,
            color: if increases_risk {
                ColorToken::NeonRed
            } else {
                ColorToken::NeonGreen
            },
        }
    }
}

/// Technical detail strings for the advanced panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnicalDetails {
    /// `{n} hops` or `Direct Link`.
    pub redirects: String,
    /// `Encrypted` or `Unencrypted`.
    pub ssl: String,
    /// Whether [`TechnicalDetails::ssl`] reports a valid certificate.
    pub ssl_valid: bool,
    /// `{n} days old` or `Unknown Age`.
    pub domain_age: String,
    /// `Score: {s}/100 ({first finding})`, when a score was reported.
    pub link_threats: Option<String>,
    /// Warning signs in provider order.
    pub warning_signs: Vec<String>,
}

impl TechnicalDetails {
    /// Formats the advanced passthrough bag.
    pub fn from_advanced(advanced: &AdvancedAnalysis) -> Self {
        let redirects = match advanced.redirect_hops {
            Some(hops) if hops > 0 => format!("{hops} hops"),
            _ => "Direct Link".to_string(),
        };
        let ssl_valid = advanced.certificate_valid == Some(true);
        let domain_age = match advanced.domain_age_days {
            Some(days) if days > 0 => format!("{days} days old"),
            _ => "Unknown Age".to_string(),
        };
        let link_threats = advanced.link_threat_score.map(|score| {
            match advanced.link_threats.first() {
                Some(first) => format!("Score: {score}/100 ({first})"),
                None => format!("Score: {score}/100"),
            }
        });

        Self {
            redirects,
            ssl: if ssl_valid { "Encrypted" } else { "Unencrypted" }.to_string(),
            ssl_valid,
            domain_age,
            link_threats,
            warning_signs: advanced.warning_signs.clone(),
        }
    }
}

/// Everything a renderer needs to draw one result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    /// Analyzed URL.
    pub url: String,
    /// Headline percent.
    pub percent: u8,
    /// Percent text such as `82%`.
    pub percent_text: String,
    /// Four-band display label.
    pub label: DisplayLabel,
    /// Badge text such as `VERDICT: PHISHING`.
    pub badge_text: String,
    /// Display tier.
    pub tier: RiskTier,
    /// Gauge fill and prediction text color.
    pub color: ColorToken,
    /// Gauge geometry.
    pub gauge: Gauge,
    /// Ensemble prediction, else the canonical verdict.
    pub prediction_text: String,
    /// Summary reasoning.
    pub reasoning: String,
    /// Threat summary tag.
    pub threat_tag: ThreatTag,
    /// Per-model readouts in model-name order.
    pub models: Vec<ModelMini>,
    /// Feature chart bars; empty means [`FEATURE_PLACEHOLDER`].
    pub feature_bars: Vec<FeatureBar>,
    /// SHAP bars in provider order.
    pub shap: Vec<ExplanationBar>,
    /// LIME bars in provider order.
    pub lime: Vec<ExplanationBar>,
    /// Technical details, when the provider sent any.
    pub technical: Option<TechnicalDetails>,
}

impl ResultView {
    /// Projects `result` into display values.
    pub fn from_result(result: &AnalysisResult) -> Self {
        let derived = result.metrics();
        let threat_found = result
            .advanced
            .as_ref()
            .and_then(|advanced| advanced.threat_found)
            .unwrap_or(false);
        let threat_tag = if derived.percent >= 50 || threat_found {
            ThreatTag::Dangerous
        } else {
            ThreatTag::Clear
        };

        let models = result
            .model_breakdown
            .iter()
            .map(|(name, output)| ModelMini {
                name: clean_feature_name(name),
                prediction: output.prediction.clone(),
                percent: phishguard_core::percent_of(output.probability),
            })
            .collect();

        Self {
            url: result.url.clone(),
            percent: derived.percent,
            percent_text: format!("{}%", derived.percent),
            label: derived.label,
            badge_text: format!("VERDICT: {}", derived.label),
            tier: derived.tier,
            color: derived.color(),
            gauge: derived.gauge(),
            prediction_text: result
                .ensemble
                .as_ref()
                .map(|ensemble| ensemble.prediction.clone())
                .unwrap_or_else(|| result.verdict.to_string()),
            reasoning: result.reasoning.clone(),
            threat_tag,
            models,
            feature_bars: feature_chart(&result.features),
            shap: result
                .shap_top_reasons
                .iter()
                .map(|reason| {
                    ExplanationBar::new(
                        &reason.feature,
                        reason.impact,
                        reason.direction == ShapDirection::Phishing,
                    )
                })
                .collect(),
            lime: result
                .lime_top_features
                .iter()
                .map(|feature| {
                    ExplanationBar::new(
                        &feature.feature,
                        feature.weight,
                        feature.direction == LimeDirection::Risk,
                    )
                })
                .collect(),
            technical: result.advanced.as_ref().map(TechnicalDetails::from_advanced),
        }
    }

    /// Text for the feature chart area when it has no bars.
    pub fn feature_placeholder(&self) -> Option<&'static str> {
        self.feature_bars.is_empty().then_some(FEATURE_PLACEHOLDER)
    }
}

/// Builds the feature chart: largest `|weight|` first, at most
/// [`FEATURE_CHART_LIMIT`] bars. Ties keep provider order.
pub fn feature_chart(features: &[FeatureWeight]) -> Vec<FeatureBar> {
    let mut ranked: Vec<&FeatureWeight> = features.iter().collect();
    ranked.sort_by(|a, b| b.weight.abs().total_cmp(&a.weight.abs()));

    ranked
        .into_iter()
        .take(FEATURE_CHART_LIMIT)
        .map(|feature| FeatureBar {
            name: feature.feature_name.clone(),
            label: clean_feature_name(&feature.feature_name),
            weight: feature.weight,
            value_text: format!("{:.2}", feature.weight),
            width_percent: (feature.weight.abs() * BAR_SCALE).min(100.0),
            color: if feature.weight > 0.0 {
                ColorToken::NeonRed
            } else {
                ColorToken::NeonGreen
            },
            description: feature.description.clone(),
        })
        .collect()
}

/// Replaces underscores with spaces and title-cases each word.
pub fn clean_feature_name(name: &str) -> String {
    name.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
