use std::time::{Duration, SystemTime};

use blip::results::{FileResultsSink, HistoryLog};
use blip::runtime::DeferredTimers;
use blip::session::Session;
use blip::shape::{Shape, ShapeColor, ShapeId, ShapeKind};
use rand::rngs::StdRng;
use rand::SeedableRng;

const T0: SystemTime = SystemTime::UNIX_EPOCH;

fn session_with_planted_click() -> Session {
    let mut session = Session::with_rng(Duration::from_secs(30), StdRng::seed_from_u64(5));
    let mut timers = DeferredTimers::new();
    session.start_at(&mut timers, T0);
    session.live.clear();
    session.live.insert(
        ShapeId(1),
        Shape {
            id: ShapeId(1),
            kind: ShapeKind::Square,
            color: ShapeColor::Blue,
            x: 120.0,
            y: 140.0,
            size: 25.0,
            spawned_at: T0,
        },
    );
    session
        .on_click_at(120.0, 140.0, T0 + Duration::from_millis(500))
        .expect("planted shape should be caught");
    session
}

#[test]
fn results_document_matches_wire_schema() {
    let dir = tempfile::tempdir().unwrap();
    let sink = FileResultsSink::with_dir(dir.path());
    let mut session = session_with_planted_click();

    let ended_at = T0 + Duration::from_secs(1_700_000_100);
    let path = session.end_at(&sink, ended_at).unwrap();

    let doc: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();

    let mut top_keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
    top_keys.sort();
    assert_eq!(top_keys, ["clicks", "date", "score"]);

    let click = doc["clicks"][0].as_object().unwrap();
    let mut click_keys: Vec<_> = click.keys().cloned().collect();
    click_keys.sort();
    assert_eq!(
        click_keys,
        ["color", "correct", "reaction_time", "shape_type", "timestamp"]
    );

    assert_eq!(doc["score"], 1);
    assert_eq!(click["shape_type"], "square");
    assert_eq!(click["color"], "blue");
    assert_eq!(click["correct"], true);
    assert!((click["reaction_time"].as_f64().unwrap() - 0.5).abs() < 1e-9);
    // "YYYY-MM-DD HH:MM:SS"
    assert_eq!(doc["date"].as_str().unwrap().len(), 19);
}

#[test]
fn filename_is_derived_from_the_end_time() {
    let dir = tempfile::tempdir().unwrap();
    let sink = FileResultsSink::with_dir(dir.path());
    let mut session = session_with_planted_click();

    let ended_at = T0 + Duration::from_secs(1_700_000_100);
    let path = session.end_at(&sink, ended_at).unwrap();

    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "results_1700000100.json"
    );
}

#[test]
fn consecutive_rounds_write_distinct_files() {
    let dir = tempfile::tempdir().unwrap();
    let sink = FileResultsSink::with_dir(dir.path());
    let mut timers = DeferredTimers::new();
    let mut session = Session::with_rng(Duration::from_secs(30), StdRng::seed_from_u64(5));

    session.start_at(&mut timers, T0);
    let p1 = session.end_at(&sink, T0 + Duration::from_secs(30)).unwrap();

    session.start_at(&mut timers, T0 + Duration::from_secs(60));
    let p2 = session.end_at(&sink, T0 + Duration::from_secs(90)).unwrap();

    assert_ne!(p1, p2);
    assert!(p1.exists() && p2.exists());
}

#[test]
fn history_log_gains_one_row_per_round() {
    let dir = tempfile::tempdir().unwrap();
    let history = HistoryLog::with_path(dir.path().join("history.csv"));
    let sink = FileResultsSink::with_dir(dir.path());

    let mut session = session_with_planted_click();
    session.end_at(&sink, T0 + Duration::from_secs(30)).unwrap();
    history.append(&session.summary(), session.duration).unwrap();

    let mut timers = DeferredTimers::new();
    session.start_at(&mut timers, T0 + Duration::from_secs(60));
    session.end_at(&sink, T0 + Duration::from_secs(90)).unwrap();
    history.append(&session.summary(), session.duration).unwrap();

    let contents = std::fs::read_to_string(dir.path().join("history.csv")).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3, "header plus one row per completed round");
    assert!(lines[0].starts_with("date,"));
}
