//! Integration tests for durable history and theme state.

use std::sync::Arc;

use phishguard_core::{AnalysisResult, HistoryEntry, Verdict};
use phishguard_history::{
    FileStore, HISTORY_KEY, HistoryStore, KeyValueStore, MemoryStore, THEME_KEY, Theme,
    ThemePreference,
};

fn entry(url: &str, timestamp: u64) -> HistoryEntry {
    let result = AnalysisResult::new(url, 0.9, Verdict::Phishing, "fixture")
        .expect("fixture result should build");
    HistoryEntry::from_result(result, timestamp)
}

#[test]
fn history_persistence_tests_survive_store_reopen() {
    let dir = tempfile::tempdir().expect("tempdir should be created");

    {
        let store = FileStore::open(dir.path()).expect("store should open");
        let history = HistoryStore::new(Arc::new(store));
        history
            .append(entry("http://paypa1.com/login", 10))
            .expect("append should work");
    }

    let reopened = FileStore::open(dir.path()).expect("store should reopen");
    let history = HistoryStore::new(Arc::new(reopened));
    let listed = history.list();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].url, "http://paypa1.com/login");
    assert_eq!(listed[0].full_result.verdict, Verdict::Phishing);
}

#[test]
fn history_persistence_tests_corrupt_state_reads_as_empty() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(HISTORY_KEY, "{not an array")
        .expect("set should work");

    let history = HistoryStore::new(store.clone());
    assert!(history.list().is_empty());

    history.append(entry("a.example", 1)).expect("append should recover");
    assert_eq!(history.len(), 1);
}

#[test]
fn history_persistence_tests_missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = FileStore::open(dir.path().join("nested")).expect("store should open");
    assert!(HistoryStore::new(Arc::new(store)).is_empty());
}

#[test]
fn history_persistence_tests_theme_defaults_dark_and_toggles() {
    let store = Arc::new(MemoryStore::new());
    let preference = ThemePreference::new(store.clone());
    assert_eq!(preference.load(), Theme::Dark);

    assert_eq!(preference.toggle().expect("toggle should work"), Theme::Light);
    assert_eq!(
        store.get(THEME_KEY).expect("get should work").as_deref(),
        Some("light")
    );
    assert_eq!(preference.toggle().expect("toggle should work"), Theme::Dark);
}
