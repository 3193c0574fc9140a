//! Validates contract fixtures against frozen JSON schemas and checks that
//! the Rust types agree with them.

use jsonschema::JSONSchema;
use phishguard_analysis_contract::{ContractError, normalize, parse_provider_response};
use phishguard_core::{AnalysisResult, HistoryEntry, LimeDirection, ShapDirection, Verdict};
use phishguard_provider::{AnalyzeRequest, analysis_response_schema};
use serde_json::{Value, json};

const CONTRACTS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../contracts");

fn read_contract(relative: &str) -> String {
    std::fs::read_to_string(format!("{CONTRACTS}/{relative}"))
        .expect("contract file should be readable")
}

fn load_json(relative: &str) -> Value {
    serde_json::from_str(&read_contract(relative)).expect("contract file should be valid json")
}

fn compile_validator(schema_file: &str) -> JSONSchema {
    let schema = load_json(schema_file);
    JSONSchema::compile(&schema).expect("schema should compile")
}

#[test]
fn analyze_request_fixture_matches_schema() {
    let validator = compile_validator("analyze-request.schema.json");
    assert!(validator.is_valid(&load_json("fixtures/analyze-request.valid.json")));

    let encoded = serde_json::to_value(AnalyzeRequest {
        url: "https://a.example".to_string(),
    })
    .expect("request should encode");
    assert!(validator.is_valid(&encoded));
    assert!(!validator.is_valid(&json!({ "url": "abc" })));
}

#[test]
fn analyze_response_fixtures_match_schema() {
    let validator = compile_validator("analyze-response.schema.json");
    assert!(validator.is_valid(&load_json("fixtures/analyze-response.valid.json")));
    assert!(validator.is_valid(&load_json("fixtures/analyze-response.error.json")));

    let mut out_of_range = load_json("fixtures/analyze-response.valid.json");
    out_of_range["overall"]["probability"] = json!(1.5);
    assert!(!validator.is_valid(&out_of_range));
}

#[test]
fn analyze_response_fixture_normalizes_with_ensemble_headline() {
    let raw = parse_provider_response(&read_contract("fixtures/analyze-response.valid.json"))
        .expect("fixture should parse");
    let result = normalize("https://secure-login.example-bank.test/verify", &raw)
        .expect("fixture should normalize");

    assert_eq!(result.probability, 0.79);
    assert_eq!(result.verdict, Verdict::Phishing);
    assert_eq!(result.confidence_label(), "79.0%");

    let names: Vec<&str> = result
        .features
        .iter()
        .map(|feature| feature.feature_name.as_str())
        .collect();
    assert_eq!(
        names,
        ["url_length", "has_ip_address", "num_subdomains", "https_valid"]
    );
    assert_eq!(result.model_breakdown.len(), 2);
    assert_eq!(result.shap_top_reasons[1].direction, ShapDirection::Safe);
    assert_eq!(result.lime_top_features[0].direction, LimeDirection::Risk);

    let advanced = result.advanced.expect("advanced bag");
    assert_eq!(advanced.redirect_hops, Some(2));
    assert_eq!(advanced.certificate_valid, Some(false));
    assert_eq!(advanced.domain_age_days, Some(12));
    assert_eq!(advanced.link_threat_score, Some(45.0));
}

#[test]
fn analyze_response_error_fixture_is_provider_reported() {
    let error = parse_provider_response(&read_contract("fixtures/analyze-response.error.json"))
        .expect_err("error fixture should not parse as success");
    assert!(matches!(
        error,
        ContractError::ProviderReported(message) if message == "Model not loaded"
    ));
}

#[test]
fn generative_fixture_matches_frozen_and_request_schemas() {
    let fixture = load_json("fixtures/generative-output.valid.json");
    assert!(compile_validator("generative-output.schema.json").is_valid(&fixture));

    let request_schema = analysis_response_schema();
    let request_validator =
        JSONSchema::compile(&request_schema).expect("request schema should compile");
    assert!(request_validator.is_valid(&fixture));
    assert!(!request_validator.is_valid(&json!({ "probability": 0.5 })));
}

#[test]
fn generative_fixture_normalizes_flat_shape() {
    let raw = parse_provider_response(&read_contract("fixtures/generative-output.valid.json"))
        .expect("fixture should parse");
    let result = normalize("https://user@evil.example", &raw).expect("fixture should normalize");

    assert_eq!(result.probability, 0.58);
    assert_eq!(result.verdict, Verdict::Suspicious);
    assert_eq!(result.features.len(), 3);
    assert_eq!(result.features[2].feature_name, "Suspicious characters");
    assert!(result.reasoning.starts_with("The URL hides its real host"));
}

#[test]
fn scan_history_matches_schema_both_ways() {
    let validator = compile_validator("scan-history.schema.json");
    let fixture = load_json("fixtures/scan-history.valid.json");
    assert!(validator.is_valid(&fixture));

    let decoded: Vec<HistoryEntry> =
        serde_json::from_value(fixture).expect("fixture should decode into history entries");
    assert_eq!(decoded[0].full_result.verdict, Verdict::Safe);

    let result = AnalysisResult::new("https://b.example", 0.9, Verdict::Phishing, "r")
        .expect("valid result");
    let encoded = serde_json::to_value(vec![HistoryEntry::from_result(result, 42)])
        .expect("history should encode");
    assert!(validator.is_valid(&encoded));

    let oversized = Value::Array(vec![decoded_entry_json(); 21]);
    assert!(!validator.is_valid(&oversized));
}

fn decoded_entry_json() -> Value {
    load_json("fixtures/scan-history.valid.json")[0].clone()
}
