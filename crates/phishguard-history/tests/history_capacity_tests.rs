//! Integration tests for history capacity and ordering.

use std::sync::Arc;

use phishguard_core::{AnalysisResult, HISTORY_CAPACITY, HistoryEntry, Verdict};
use phishguard_history::{HistoryStore, MemoryStore};

fn entry(index: u64) -> HistoryEntry {
    let result = AnalysisResult::new(
        format!("https://site-{index}.example"),
        0.05,
        Verdict::Safe,
        "fixture",
    )
    .expect("fixture result should build");
    HistoryEntry::from_result(result, 1_000 + index)
}

#[test]
fn history_capacity_tests_evicts_only_the_oldest_entry() {
    let history = HistoryStore::new(Arc::new(MemoryStore::new()));
    for index in 0..HISTORY_CAPACITY as u64 {
        history.append(entry(index)).expect("append should work");
    }
    assert_eq!(history.len(), HISTORY_CAPACITY);

    history.append(entry(20)).expect("append should work");

    let listed = history.list();
    assert_eq!(listed.len(), HISTORY_CAPACITY);
    assert!(listed.iter().all(|item| item.timestamp != 1_000));
    assert!(listed.iter().any(|item| item.timestamp == 1_001));
    assert_eq!(listed[0].timestamp, 1_020);
}

#[test]
fn history_capacity_tests_lists_most_recent_first() {
    let history = HistoryStore::new(Arc::new(MemoryStore::new()));
    for index in 0..3 {
        history.append(entry(index)).expect("append should work");
    }

    let urls: Vec<String> = history.list().into_iter().map(|item| item.url).collect();
    assert_eq!(
        urls,
        vec![
            "https://site-2.example".to_string(),
            "https://site-1.example".to_string(),
            "https://site-0.example".to_string(),
        ]
    );
}

#[test]
fn history_capacity_tests_clear_empties_history() {
    let history = HistoryStore::new(Arc::new(MemoryStore::new()));
    history.append(entry(1)).expect("append should work");
    history.clear().expect("clear should work");
    assert!(history.is_empty());
    assert!(history.list().is_empty());
}
