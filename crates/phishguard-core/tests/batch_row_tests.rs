//! Tests batch row projection from analysis results.

use phishguard_core::{AnalysisResult, BatchRow, EnsembleOutput, RiskTier, Verdict};

#[test]
fn batch_row_tests_prefer_ensemble_confidence_label() {
    let mut result =
        AnalysisResult::new("http://paypa1.com/login", 0.82, Verdict::Phishing, "")
            .expect("result should build");
    result.ensemble = Some(EnsembleOutput {
        probability: 0.82,
        prediction: "PHISHING".to_string(),
        confidence: Some("91.0%".to_string()),
    });

    let row = BatchRow::from_result(&result);
    assert_eq!(row.verdict, "PHISHING");
    assert_eq!(row.risk_percent, "82%");
    assert_eq!(row.confidence_label, "91.0%");
    assert_eq!(row.risk_tier, RiskTier::High);
    assert!(!row.is_error());
}

#[test]
fn batch_row_tests_fall_back_to_headline_percent() {
    let result = AnalysisResult::new("example.com", 0.125, Verdict::Safe, "")
        .expect("result should build");
    let row = BatchRow::from_result(&result);
    assert_eq!(row.confidence_label, "12.5%");
    assert_eq!(row.risk_tier, RiskTier::Low);
}

#[test]
fn batch_row_tests_error_row_uses_placeholders() {
    let row = BatchRow::error("broken.example");
    assert!(row.is_error());
    assert_eq!(row.verdict, "ERROR");
    assert_eq!(row.risk_percent, "N/A");
    assert_eq!(row.confidence_label, "N/A");
    assert_eq!(row.risk_tier, RiskTier::Low);
}
