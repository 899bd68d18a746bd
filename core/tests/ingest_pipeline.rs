//! End-to-end pipeline coverage over a known-good fixture: locate, parse,
//! normalize, snapshot, derive.

use std::fs;
use std::path::Path;

use snaptrack_core::config::TrackerConfig;
use snaptrack_core::error::TrackerError;
use snaptrack_core::tracker::Tracker;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Three owned cards: Medusa at 10 games / 5 wins, Sentinel at 4 games /
/// 4 wins, Hawkeye never played. Wallet covers Medusa's and Sentinel's next
/// upgrade but not Hawkeye's.
const FIXTURE: &str = r#"{
  "ServerState": {
    "Account": { "Id": "7f3a", "Name": "Kim" },
    "CardDefStats": {
      "Stats": {
        "Medusa":   { "GamesPlayed": 10, "GamesWon": 5, "Boosters": 25, "InfinitySplitCount": 1 },
        "Sentinel": { "GamesPlayed": 4,  "GamesWon": 4 },
        "Hawkeye":  { "GamesPlayed": 0,  "GamesWon": 0 }
      }
    },
    "Cards": [
      { "CardDefId": "Medusa",   "RarityDefId": "Common" },
      { "CardDefId": "Sentinel", "RarityDefId": "Uncommon" },
      { "CardDefId": "Hawkeye",  "RarityDefId": "Rare" }
    ],
    "Wallet": {
      "_currencies": {
        "Credits":  { "TotalAmount": 130 },
        "Boosters": { "TotalAmount": 12 },
        "Gold":     { "TotalAmount": 800 }
      }
    }
  }
}"#;

fn write_fixture(profile_dir: &Path) {
    fs::create_dir_all(profile_dir).expect("create profile dir");
    let mut bytes = UTF8_BOM.to_vec();
    bytes.extend_from_slice(FIXTURE.as_bytes());
    fs::write(profile_dir.join("CollectionState.json"), bytes).expect("write fixture");
}

fn tracker_over(root: &Path) -> Tracker {
    let config = TrackerConfig {
        profile_root: root.to_path_buf(),
        profile: None,
        database_path: root.join("snapshots.db"),
    };
    Tracker::new(config).expect("tracker opens")
}

#[test]
fn fixture_round_trips_into_the_expected_reports() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(&dir.path().join("nvprod"));
    let tracker = tracker_over(dir.path());

    let report = tracker.ingest().expect("ingestion succeeds");
    assert_eq!(report.account_name, "Kim");
    // 3 stats + 3 entries + 1 wallet document.
    assert_eq!(report.written, 7);
    assert_eq!(report.deduplicated, 0);

    let ranking = tracker.performance_ranking().expect("ranking available");
    let order: Vec<(&str, Option<f64>)> = ranking
        .iter()
        .map(|r| (r.card.as_str(), r.win_rate))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Sentinel", Some(1.0)),
            ("Medusa", Some(0.5)),
            ("Hawkeye", None),
        ]
    );
    assert_eq!(ranking[1].splits, 1);

    // Medusa (level 0: 25/5) and Sentinel (level 1: 100/10) are affordable
    // with 130 credits / 12 boosters; Hawkeye (level 2: 200/20) is not.
    let upgrades = tracker.upgrade_candidates().expect("candidates available");
    let cards: Vec<&str> = upgrades.iter().map(|r| r.card.as_str()).collect();
    assert_eq!(cards, vec!["Medusa", "Sentinel"]);
    for row in &upgrades {
        assert!(row.credits_cost <= 130);
        assert!(row.boosters_cost <= 12);
    }
}

#[test]
fn reingesting_the_same_file_adds_no_snapshots_and_keeps_reports_identical() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(&dir.path().join("nvprod"));
    let tracker = tracker_over(dir.path());

    tracker.ingest().expect("first cycle succeeds");
    let ranking_before = tracker.performance_ranking().expect("ranking");
    let upgrades_before = tracker.upgrade_candidates().expect("upgrades");

    let second = tracker.ingest().expect("second cycle succeeds");
    assert_eq!(second.written, 0);
    assert_eq!(second.deduplicated, 7);

    assert_eq!(tracker.performance_ranking().expect("ranking"), ranking_before);
    assert_eq!(tracker.upgrade_candidates().expect("upgrades"), upgrades_before);
}

#[test]
fn repeated_queries_return_the_same_ordering() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(&dir.path().join("nvprod"));
    let tracker = tracker_over(dir.path());
    tracker.ingest().expect("ingestion succeeds");

    let first = tracker.performance_ranking().expect("ranking");
    let second = tracker.performance_ranking().expect("ranking");
    assert_eq!(first, second);
}

#[test]
fn no_data_yet_is_distinguishable_from_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("nvprod")).expect("create profile dir");
    let tracker = tracker_over(dir.path());

    assert!(!tracker.has_data().expect("store reachable"));
    assert!(tracker.performance_ranking().expect("empty ranking").is_empty());
}

#[test]
fn failed_cycles_leave_the_previous_snapshot_in_place() {
    let dir = tempfile::tempdir().expect("tempdir");
    let profile = dir.path().join("nvprod");
    write_fixture(&profile);
    let tracker = tracker_over(dir.path());
    tracker.ingest().expect("first cycle succeeds");
    let ranking_before = tracker.performance_ranking().expect("ranking");

    // The game rewrites the file and truncates it mid-write.
    fs::write(profile.join("CollectionState.json"), b"\xEF\xBB\xBF{\"Server").expect("truncate");
    let err = tracker.ingest().unwrap_err();
    assert!(matches!(err, TrackerError::MalformedState { .. }));

    // The previous latest snapshot is still the answer.
    assert_eq!(tracker.performance_ranking().expect("ranking"), ranking_before);
    assert!(tracker.has_data().expect("store reachable"));
}

#[test]
fn updated_state_produces_new_snapshots_for_changed_keys_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let profile = dir.path().join("nvprod");
    write_fixture(&profile);
    let tracker = tracker_over(dir.path());
    tracker.ingest().expect("first cycle succeeds");

    // One more Medusa win; everything else untouched.
    let updated = FIXTURE.replace(
        r#""Medusa":   { "GamesPlayed": 10, "GamesWon": 5, "Boosters": 25, "InfinitySplitCount": 1 }"#,
        r#""Medusa":   { "GamesPlayed": 11, "GamesWon": 6, "Boosters": 25, "InfinitySplitCount": 1 }"#,
    );
    assert_ne!(updated, FIXTURE, "fixture replacement must apply");
    let mut bytes = UTF8_BOM.to_vec();
    bytes.extend_from_slice(updated.as_bytes());
    fs::write(profile.join("CollectionState.json"), bytes).expect("rewrite fixture");

    let report = tracker.ingest().expect("second cycle succeeds");
    assert_eq!(report.written, 1);
    assert_eq!(report.deduplicated, 6);

    let ranking = tracker.performance_ranking().expect("ranking");
    let medusa = ranking.iter().find(|r| r.card == "Medusa").expect("medusa ranked");
    assert_eq!((medusa.games_played, medusa.wins), (11, 6));
}
