//! Integration tests for the single-URL analysis flow.

mod common;

use common::{FIXED_NOW_MS, ScriptedProvider, dashboard_with, overall_response};
use phishguard_app::{AppError, INVALID_URL_MESSAGE};
use phishguard_analysis_contract::GENERIC_PROVIDER_ERROR;
use phishguard_core::Verdict;
use phishguard_provider::{InvalidUrlError, ProviderError};
use phishguard_ui::AnalysisStatus;
use serde_json::json;

#[test]
fn analyze_flow_tests_records_history_and_completes_state() {
    let provider = ScriptedProvider::fixed(0.82, "PHISHING");
    let (mut dashboard, _store) = dashboard_with(provider.clone());

    let result = dashboard
        .analyze("  https://login.example.test  ")
        .expect("analysis should succeed");

    assert_eq!(result.url, "https://login.example.test");
    assert_eq!(result.verdict, Verdict::Phishing);
    assert_eq!(provider.calls(), vec!["https://login.example.test"]);
    assert_eq!(dashboard.state().status, AnalysisStatus::Completed);

    let history = dashboard.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].timestamp, FIXED_NOW_MS);
    assert_eq!(history[0].full_result, result);

    let view = dashboard.state().result_view().expect("result view");
    assert_eq!(view.badge_text, "VERDICT: PHISHING");
}

#[test]
fn analyze_flow_tests_invalid_input_never_reaches_provider() {
    let provider = ScriptedProvider::fixed(0.1, "SAFE");
    let (mut dashboard, _store) = dashboard_with(provider.clone());

    for input in ["", "a.b", "localhost"] {
        let error = dashboard.analyze(input).expect_err("input should be rejected");
        assert!(matches!(error, AppError::InvalidUrl(_)));
        assert_eq!(error.user_message(), INVALID_URL_MESSAGE);
    }

    assert!(provider.calls().is_empty());
    assert!(dashboard.history().is_empty());
    assert_eq!(
        dashboard.state().error_message.as_deref(),
        Some(INVALID_URL_MESSAGE)
    );
    assert!(matches!(
        dashboard.analyze("localhost"),
        Err(AppError::InvalidUrl(InvalidUrlError::MissingDot))
    ));
}

#[test]
fn analyze_flow_tests_surfaces_provider_message_verbatim() {
    let provider = ScriptedProvider::new(|_| {
        Err(ProviderError::Reported("Model not loaded".to_string()))
    });
    let (mut dashboard, _store) = dashboard_with(provider);

    let error = dashboard
        .analyze("https://a.example")
        .expect_err("provider failure");

    assert_eq!(error.kind(), "provider");
    assert_eq!(dashboard.state().status, AnalysisStatus::Error);
    assert_eq!(
        dashboard.state().error_message.as_deref(),
        Some("Model not loaded")
    );
    assert!(dashboard.history().is_empty());
    assert!(dashboard.state().can_submit());
}

#[test]
fn analyze_flow_tests_validation_failure_reads_like_provider_failure() {
    let provider = ScriptedProvider::new(|_| {
        Ok(serde_json::from_value(json!({ "status": "success", "overall": {} }))
            .expect("fixture should decode"))
    });
    let (mut dashboard, _store) = dashboard_with(provider);

    let error = dashboard
        .analyze("https://a.example")
        .expect_err("missing probability");

    assert_eq!(error.kind(), "validation");
    assert_eq!(
        dashboard.state().error_message.as_deref(),
        Some(GENERIC_PROVIDER_ERROR)
    );
    assert!(dashboard.history().is_empty());
}

#[test]
fn analyze_flow_tests_next_submission_clears_previous_error() {
    let provider = ScriptedProvider::new(|url| {
        if url.contains("down") {
            Err(ProviderError::Status(503))
        } else {
            Ok(overall_response(url, 0.1, "SAFE"))
        }
    });
    let (mut dashboard, _store) = dashboard_with(provider);

    let error = dashboard.analyze("https://down.example").expect_err("503");
    assert!(matches!(error, AppError::Provider(ProviderError::Status(503))));
    assert_eq!(error.user_message(), GENERIC_PROVIDER_ERROR);
    assert_eq!(
        dashboard.state().error_message.as_deref(),
        Some(GENERIC_PROVIDER_ERROR)
    );

    dashboard
        .analyze("https://up.example")
        .expect("second analysis should succeed");
    assert_eq!(dashboard.state().error_message, None);
    assert_eq!(dashboard.state().status, AnalysisStatus::Completed);
}

#[test]
fn analyze_flow_tests_recall_redisplays_history_entry() {
    let provider = ScriptedProvider::new(|url| {
        let probability = if url.contains("bad") { 0.9 } else { 0.05 };
        Ok(overall_response(url, probability, "SAFE"))
    });
    let (mut dashboard, _store) = dashboard_with(provider);

    dashboard.analyze("https://bad.example").expect("first");
    dashboard.analyze("https://good.example").expect("second");

    assert!(dashboard.recall(1));
    let view = dashboard.state().result_view().expect("recalled view");
    assert_eq!(view.url, "https://bad.example");
    assert_eq!(view.percent, 90);
    assert!(!dashboard.recall(5));
}
