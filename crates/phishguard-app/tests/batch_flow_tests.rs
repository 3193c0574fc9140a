//! Integration tests for batch runs and CSV export through the dashboard.

mod common;

use common::{FIXED_NOW_MS, ScriptedProvider, dashboard_with, overall_response};
use phishguard_app::AppError;
use phishguard_batch::BatchError;
use phishguard_provider::ProviderError;

#[test]
fn batch_flow_tests_does_not_write_history() {
    let provider = ScriptedProvider::fixed(0.6, "SUSPICIOUS");
    let (mut dashboard, _store) = dashboard_with(provider.clone());

    let rows = dashboard
        .run_batch("https://a.example\nhttps://b.example")
        .expect("batch should run");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].verdict, "SUSPICIOUS");
    assert_eq!(rows[0].risk_percent, "60%");
    assert_eq!(dashboard.state().batch_rows, rows);
    assert!(!dashboard.state().batch_running);
    assert!(dashboard.history().is_empty());
    assert_eq!(provider.calls().len(), 2);
}

#[test]
fn batch_flow_tests_isolates_failing_url() {
    let provider = ScriptedProvider::new(|url| {
        if url.contains("broken") {
            Err(ProviderError::Transport("connection reset".to_string()))
        } else {
            Ok(overall_response(url, 0.2, "SAFE"))
        }
    });
    let (mut dashboard, _store) = dashboard_with(provider);

    let rows = dashboard
        .run_batch("https://a.example https://broken.example nodot")
        .expect("batch should run");

    let verdicts: Vec<&str> = rows.iter().map(|row| row.verdict.as_str()).collect();
    assert_eq!(verdicts, ["SAFE", "ERROR", "ERROR"]);
    assert_eq!(rows[1].url, "https://broken.example");
    assert_eq!(rows[1].confidence_label, "N/A");
}

#[test]
fn batch_flow_tests_rejects_oversized_batch_before_any_call() {
    let provider = ScriptedProvider::fixed(0.1, "SAFE");
    let (mut dashboard, _store) = dashboard_with(provider.clone());

    let input: Vec<String> = (0..21).map(|i| format!("https://u{i}.example")).collect();
    let error = dashboard
        .run_batch(&input.join("\n"))
        .expect_err("21 urls should be rejected");

    assert!(matches!(
        error,
        AppError::Batch(BatchError::TooLarge { count: 21, max: 20 })
    ));
    assert!(matches!(
        dashboard.run_batch("  \n "),
        Err(AppError::Batch(BatchError::Empty))
    ));
    assert!(provider.calls().is_empty());
    assert!(dashboard.state().can_submit());
}

#[test]
fn batch_flow_tests_new_batch_replaces_rows() {
    let provider = ScriptedProvider::fixed(0.1, "SAFE");
    let (mut dashboard, _store) = dashboard_with(provider);

    dashboard
        .run_batch("https://a.example https://b.example")
        .expect("first batch");
    dashboard.run_batch("https://c.example").expect("second batch");

    assert_eq!(dashboard.state().batch_rows.len(), 1);
    assert_eq!(dashboard.state().batch_rows[0].url, "https://c.example");
}

#[test]
fn batch_flow_tests_exports_rows_as_csv_file() {
    let provider = ScriptedProvider::fixed(0.82, "PHISHING");
    let (mut dashboard, _store) = dashboard_with(provider);
    let dir = tempfile::tempdir().expect("tempdir should be created");

    assert!(matches!(
        dashboard.export_batch(dir.path()),
        Err(AppError::NothingToExport)
    ));

    dashboard.run_batch("https://a.example").expect("batch");
    let path = dashboard.export_batch(dir.path()).expect("export");

    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some(format!("phishguard_batch_{FIXED_NOW_MS}.csv").as_str())
    );
    let text = std::fs::read_to_string(&path).expect("export readable");
    assert_eq!(
        text,
        "URL,Verdict,Risk Probability,Ensemble Confidence\n\
         \"https://a.example\",\"PHISHING\",\"82%\",\"82.0%\"\n"
    );
}
