use std::fs;

use tempfile::tempdir;

use scorecast::coupon::CouponThresholds;
use scorecast::engine::run_seeded;
use scorecast::persist::{HistoryEntry, HistoryStore, RECENT_TEAMS_LIMIT, TeamBook, outcome_label};
use scorecast::simulate::ProgressReporter;
use scorecast::validate::{InputDefaults, parse_input_json};

static REQUEST_JSON: &str = include_str!("fixtures/request.json");

fn entry(id: usize) -> HistoryEntry {
    HistoryEntry {
        id: id.to_string(),
        date: "2026-01-01T00:00:00.000Z".to_string(),
        team_a_name: format!("Team {id}"),
        team_b_name: "Rival".to_string(),
        match_type: "friendly".to_string(),
        score: "1-0".to_string(),
        probability: "12.50".to_string(),
        outcome: "Draw".to_string(),
        coupon_count: 2,
        coupon_count_high: 1,
    }
}

#[test]
fn history_is_newest_first_and_capped() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::new(dir.path(), 50);
    for id in 0..55 {
        store.add(entry(id)).unwrap();
    }

    let history = store.load();
    assert_eq!(history.len(), 50);
    assert_eq!(history[0].id, "54");
    assert_eq!(history[49].id, "5");
}

#[test]
fn clearing_history_empties_it() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::new(dir.path(), 10);
    store.add(entry(1)).unwrap();
    store.clear().unwrap();
    assert!(store.load().is_empty());
    assert!(store.path().exists());
}

#[test]
fn corrupt_history_reads_as_empty() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::new(dir.path(), 10);
    fs::write(store.path(), "{ broken").unwrap();
    assert!(store.load().is_empty());

    let history = store.add(entry(7)).unwrap();
    assert_eq!(history.len(), 1);
}

#[test]
fn missing_directory_is_created_on_write() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let store = HistoryStore::new(&nested, 10);
    assert!(store.load().is_empty());
    store.add(entry(1)).unwrap();
    assert_eq!(store.load().len(), 1);
}

#[test]
fn entry_summarizes_a_report() {
    let request = parse_input_json(REQUEST_JSON, InputDefaults::default()).unwrap();
    let report = run_seeded(
        &request,
        CouponThresholds::default(),
        4,
        &mut ProgressReporter::silent(),
    )
    .unwrap();
    let e = HistoryEntry::from_report(&report);

    let stamp = chrono::DateTime::parse_from_rfc3339(&report.date).unwrap();
    assert_eq!(e.id, stamp.timestamp_millis().to_string());
    assert_eq!(e.team_a_name, "Lyon");
    assert_eq!(e.match_type, "friendly");
    assert_eq!(e.score, report.full_time.score_exact.to_string());
    assert_eq!(e.coupon_count, report.coupon.len());
    assert_eq!(e.coupon_count_high, report.coupon_high_confidence.len());
    assert_eq!(e.outcome, outcome_label(&report));
    assert_eq!(e.outcome, "Win Lyon");
}

#[test]
fn team_book_keeps_recent_unique_names() {
    let dir = tempdir().unwrap();
    let book = TeamBook::new(dir.path());
    for i in 0..12 {
        book.remember(&format!("Team {i}"), &[1, 2, 3]).unwrap();
    }
    let data = book.remember("Team 5", &[0, 0, 4]).unwrap();

    assert_eq!(data.recent_teams.len(), RECENT_TEAMS_LIMIT);
    assert_eq!(data.recent_teams[0], "Team 11");
    assert_eq!(
        data.recent_teams.iter().filter(|t| *t == "Team 5").count(),
        1
    );
    assert_eq!(data.scores["Team 5"], vec![0, 0, 4]);
    assert_eq!(book.load(), data);
}

#[test]
fn team_book_ignores_blank_input() {
    let dir = tempdir().unwrap();
    let book = TeamBook::new(dir.path());
    book.remember("  ", &[1, 2, 3]).unwrap();
    book.remember("Lyon", &[]).unwrap();
    assert!(book.load().recent_teams.is_empty());
}
