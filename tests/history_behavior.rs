//! Behavior tests for the durable score history: ordering, retention,
//! lookback deduplication, and concurrent writers.

use tempfile::tempdir;
use time::{Duration, OffsetDateTime};

use marketmood_history::{HistoricalScoreEntry, HistoryStore, Lookback};

fn entry(timestamp: OffsetDateTime, score: f64) -> HistoricalScoreEntry {
    HistoricalScoreEntry::new(timestamp, score, "Neutral", "No clear directional bias")
}

#[test]
fn when_entries_arrive_out_of_order_history_stays_sorted() {
    // Given: appends arriving in non-chronological order
    let dir = tempdir().expect("tempdir");
    let store = HistoryStore::open(dir.path().join("score_history.json"));
    let now = OffsetDateTime::now_utc();

    for hours_ago in [5, 1, 9, 3] {
        store
            .append(entry(now - Duration::hours(hours_ago), 50.0))
            .expect("append");
    }

    // Then: the persisted sequence is chronological
    let entries = store.load().expect("load");
    assert_eq!(entries.len(), 4);
    assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn when_daily_scores_accumulate_lookbacks_resolve_distinct_entries() {
    // Given: a month of well-spaced history plus a fresh entry
    let dir = tempdir().expect("tempdir");
    let store = HistoryStore::open(dir.path().join("score_history.json"));
    let now = OffsetDateTime::now_utc();

    for (days_ago, score) in [(30, 33.0), (7, 40.0), (1, 48.0)] {
        store
            .append(entry(now - Duration::days(days_ago), score))
            .expect("append");
    }
    store.append(entry(now, 55.0)).expect("append");

    // When: the lookback batch resolves
    let lookups = store.lookups(now).expect("lookups");

    // Then: each point of comparison is a different entry
    assert_eq!(lookups.now.as_ref().map(|e| e.score), Some(55.0));
    assert_eq!(lookups.get(Lookback::Yesterday).map(|e| e.score), Some(48.0));
    assert_eq!(lookups.get(Lookback::LastWeek).map(|e| e.score), Some(40.0));
    assert_eq!(lookups.get(Lookback::LastMonth).map(|e| e.score), Some(33.0));
}

#[test]
fn when_history_is_sparse_one_entry_never_answers_twice() {
    // Given: a single fresh entry and nothing else
    let dir = tempdir().expect("tempdir");
    let store = HistoryStore::open(dir.path().join("score_history.json"));
    let now = OffsetDateTime::now_utc();

    store.append(entry(now, 52.0)).expect("append");

    // When: the lookback batch resolves
    let lookups = store.lookups(now).expect("lookups");

    // Then: the entry answers "now" and every lookback reports collecting
    assert!(lookups.now.is_some());
    for lookback in Lookback::ALL {
        assert!(lookups.get(lookback).is_none(), "{lookback} must be empty");
    }
}

#[test]
fn when_retention_window_is_exceeded_old_entries_are_pruned() {
    // Given: a store with a tight retention window
    let dir = tempdir().expect("tempdir");
    let store = HistoryStore::open(dir.path().join("score_history.json"))
        .with_retention(Duration::days(2));
    let now = OffsetDateTime::now_utc();

    store.append(entry(now - Duration::days(3), 30.0)).expect("append");
    store.append(entry(now, 50.0)).expect("append");

    // Then: only the in-window entry remains
    let entries = store.load().expect("load");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].score, 50.0);
}

#[test]
fn when_tolerance_is_narrowed_near_misses_stop_matching() {
    // Given: an entry 6 hours off the yesterday target
    let dir = tempdir().expect("tempdir");
    let now = OffsetDateTime::now_utc();
    let path = dir.path().join("score_history.json");

    let writer = HistoryStore::open(&path);
    writer
        .append(entry(now - Duration::days(1) - Duration::hours(6), 44.0))
        .expect("append");
    writer.append(entry(now, 51.0)).expect("append");

    // When: queried with the default window and then a 1h window
    let default_window = HistoryStore::open(&path).lookups(now).expect("lookups");
    let narrow_window = HistoryStore::open(&path)
        .with_tolerance(Duration::hours(1))
        .lookups(now)
        .expect("lookups");

    // Then: only the default window accepts the near miss
    assert_eq!(
        default_window.get(Lookback::Yesterday).map(|e| e.score),
        Some(44.0)
    );
    assert!(narrow_window.get(Lookback::Yesterday).is_none());
}

#[test]
fn when_appends_finish_only_the_data_file_remains() {
    // Given: a store that has been appended to repeatedly
    let dir = tempdir().expect("tempdir");
    let store = HistoryStore::open(dir.path().join("score_history.json"));
    let now = OffsetDateTime::now_utc();

    for hours_ago in [2, 1, 0] {
        store
            .append(entry(now - Duration::hours(hours_ago), 50.0))
            .expect("append");
    }

    // Then: no temp or lock files are left next to the data file
    let names: Vec<String> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["score_history.json"]);

    // And: the surviving file parses back to the appended entries
    assert_eq!(store.load().expect("load").len(), 3);
}

#[test]
fn when_writers_race_on_one_file_no_entry_is_lost() {
    // Given: four threads appending through separate store handles
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("score_history.json");
    let now = OffsetDateTime::now_utc();

    let handles: Vec<_> = (0..4i64)
        .map(|writer_index| {
            let store = HistoryStore::open(&path);
            std::thread::spawn(move || {
                for append_index in 0..5i64 {
                    let offset = Duration::minutes(writer_index * 100 + append_index);
                    store
                        .append(entry(now - offset, 50.0))
                        .expect("locked append succeeds");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread");
    }

    // Then: every append survived the merge
    let entries = HistoryStore::open(&path).load().expect("load");
    assert_eq!(entries.len(), 20);
}
