//! Shared fixtures for app integration tests.

use std::sync::{Arc, Mutex};

use phishguard_app::Dashboard;
use phishguard_history::{KeyValueStore, MemoryStore};
use phishguard_provider::{AnalysisProvider, ProviderError, ProviderResponse};
use serde_json::json;

/// Fixed scan time used by fixtures.
#[allow(dead_code)]
pub const FIXED_NOW_MS: u64 = 1_700_000_000_000;

#[allow(dead_code)]
pub fn fixed_clock() -> u64 {
    FIXED_NOW_MS
}

type Reply = dyn Fn(&str) -> Result<ProviderResponse, ProviderError> + Send + Sync;

/// Provider answering from a closure and recording every URL it receives.
pub struct ScriptedProvider {
    reply: Box<Reply>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    #[allow(dead_code)]
    pub fn new<F>(reply: F) -> Arc<Self>
    where
        F: Fn(&str) -> Result<ProviderResponse, ProviderError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            reply: Box::new(reply),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Provider returning an `overall` block with `probability` for every URL.
    #[allow(dead_code)]
    pub fn fixed(probability: f64, prediction: &'static str) -> Arc<Self> {
        Self::new(move |url| Ok(overall_response(url, probability, prediction)))
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl AnalysisProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn analyze(&self, url: &str) -> Result<ProviderResponse, ProviderError> {
        self.calls.lock().expect("calls lock").push(url.to_string());
        (self.reply)(url)
    }
}

/// HTTP-shaped success response.
#[allow(dead_code)]
pub fn overall_response(url: &str, probability: f64, prediction: &str) -> ProviderResponse {
    serde_json::from_value(json!({
        "status": "success",
        "url": url,
        "overall": { "probability": probability, "prediction": prediction },
        "features": { "url_length": 0.4, "has_ip": -0.1 }
    }))
    .expect("fixture response should decode")
}

/// Dashboard over `provider` with a fresh in-memory store and fixed clock.
#[allow(dead_code)]
pub fn dashboard_with(provider: Arc<ScriptedProvider>) -> (Dashboard, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let dashboard = Dashboard::new(provider, Arc::clone(&store) as Arc<dyn KeyValueStore>)
        .with_clock(fixed_clock);
    (dashboard, store)
}
