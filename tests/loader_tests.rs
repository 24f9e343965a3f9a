use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use basingraph::bulk::{
    TransitionStateCreate, bulk_insert_transition_states, bulk_insert_transition_states_checked,
};
use basingraph::{BasinGraphError, GraphStore, PathSampleLoader};

fn fixture_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("basingraph_loader_{name}"));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("fixture dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

#[test]
fn test_load_minima_assigns_line_order_ids() {
    let dir = fixture_dir("line_order");
    let min_data = write_file(
        &dir,
        "min.data",
        "-12.0 2.0 1\n-11.5 2.1 2\n-11.0 1.8 1\n-10.2 1.9 4\n",
    );
    let ts_data = write_file(&dir, "ts.data", "");
    let store = GraphStore::open_in_memory().expect("store");
    let loader = PathSampleLoader::with_paths(&store, &min_data, &ts_data);

    let loaded = loader.load_minima().expect("load");
    assert_eq!(loaded, 4);
    assert_eq!(store.number_of_minima().expect("count"), 4);
    let ids: Vec<i64> = store
        .minima(false)
        .expect("minima")
        .iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn test_roundtrip_two_minima_energy_ordering() {
    let dir = fixture_dir("roundtrip");
    let min_data = write_file(&dir, "min.data", "-10.5 2.1 1\n-8.0 1.9 2\n");
    let ts_data = write_file(&dir, "ts.data", "");
    let store = GraphStore::open_in_memory().expect("store");
    PathSampleLoader::with_paths(&store, &min_data, &ts_data)
        .load_minima()
        .expect("load");

    let minima = store.minima(true).expect("minima");
    assert_eq!(minima.len(), 2);
    assert_eq!(minima[0].id, 1);
    assert_eq!(minima[0].energy, -10.5);
    assert_eq!(minima[1].id, 2);
    assert_eq!(minima[1].energy, -8.0);
}

#[test]
fn test_load_fixture_counts_10_minima_105_ts() {
    let dir = fixture_dir("fixture_counts");
    let mut min_text = String::new();
    for i in 0..10 {
        let _ = writeln!(min_text, "{} 2.0 1", -20.0 + i as f64);
    }
    // ts between every ordered pair (i, j) with i < j, repeated to reach 105
    let mut ts_text = String::new();
    let mut written = 0;
    'outer: loop {
        for a in 1..=10 {
            for b in (a + 1)..=10 {
                if written == 105 {
                    break 'outer;
                }
                let _ = writeln!(ts_text, "{} 1.5 2 {} {}", -10.0 + written as f64 * 0.1, a, b);
                written += 1;
            }
        }
    }
    let min_data = write_file(&dir, "min.data", &min_text);
    let ts_data = write_file(&dir, "ts.data", &ts_text);

    let store = GraphStore::open_in_memory().expect("store");
    let (minima, transition_states) = PathSampleLoader::with_paths(&store, &min_data, &ts_data)
        .load()
        .expect("load");
    assert_eq!(minima, 10);
    assert_eq!(transition_states, 105);
    assert_eq!(store.number_of_minima().expect("count"), 10);
    assert_eq!(store.number_of_transition_states().expect("count"), 105);
}

#[test]
fn test_extra_columns_are_ignored() {
    let dir = fixture_dir("extra_columns");
    let min_data = write_file(&dir, "min.data", "-5.0 1.1 1 0.0 0.0 0.0\n");
    let ts_data = write_file(&dir, "ts.data", "-4.0 1.2 1 1 1 7 8 9\n");
    let store = GraphStore::open_in_memory().expect("store");
    let (minima, transition_states) = PathSampleLoader::with_paths(&store, &min_data, &ts_data)
        .load()
        .expect("load");
    assert_eq!((minima, transition_states), (1, 1));
}

#[test]
fn test_malformed_ts_line_aborts_phase_uncommitted() {
    let dir = fixture_dir("malformed_ts");
    let min_data = write_file(&dir, "min.data", "-5.0 1.1 1\n-4.0 1.0 1\n");
    let ts_data = write_file(
        &dir,
        "ts.data",
        "-3.0 1.2 1 1 2\nnot_a_number 1.2 1 1 2\n-2.0 1.2 1 2 1\n",
    );
    let store = GraphStore::open_in_memory().expect("store");
    let err = PathSampleLoader::with_paths(&store, &min_data, &ts_data)
        .load()
        .expect_err("parse failure");
    match err {
        BasinGraphError::ParseError { line, .. } => assert_eq!(line, 2),
        other => panic!("expected ParseError, got {other:?}"),
    }
    // minima phase already committed; ts phase left nothing behind
    assert_eq!(store.number_of_minima().expect("count"), 2);
    assert_eq!(store.number_of_transition_states().expect("count"), 0);
}

#[test]
fn test_short_line_is_parse_error_with_location() {
    let dir = fixture_dir("short_line");
    let min_data = write_file(&dir, "min.data", "-5.0 1.1 1\n-4.0 1.0\n");
    let ts_data = write_file(&dir, "ts.data", "");
    let store = GraphStore::open_in_memory().expect("store");
    let err = PathSampleLoader::with_paths(&store, &min_data, &ts_data)
        .load_minima()
        .expect_err("short line");
    match err {
        BasinGraphError::ParseError { file, line, .. } => {
            assert!(file.ends_with("min.data"));
            assert_eq!(line, 2);
        }
        other => panic!("expected ParseError, got {other:?}"),
    }
    assert_eq!(store.number_of_minima().expect("count"), 0);
}

#[test]
fn test_missing_min_data_reports_missing_input() {
    let dir = fixture_dir("missing_min");
    let ts_data = write_file(&dir, "ts.data", "");
    let store = GraphStore::open_in_memory().expect("store");
    let err = PathSampleLoader::with_paths(&store, dir.join("min.data"), &ts_data)
        .load()
        .expect_err("missing file");
    assert!(matches!(err, BasinGraphError::MissingInput(_)));
}

#[test]
fn test_fast_bulk_path_stores_endpoints_literally() {
    let dir = fixture_dir("fast_literal");
    let min_data = write_file(&dir, "min.data", "-5.0 1.1 1\n-4.0 1.0 1\n");
    // endpoints given larger-first; the fast path must not reorder them
    let ts_data = write_file(&dir, "ts.data", "-3.0 1.2 1 2 1\n");
    let store = GraphStore::open_in_memory().expect("store");
    PathSampleLoader::with_paths(&store, &min_data, &ts_data)
        .load()
        .expect("load");
    let ts = store.transition_state_by_id(1).expect("ts");
    assert_eq!(ts.minimum1_id, 2);
    assert_eq!(ts.minimum2_id, 1);
}

#[test]
fn test_validating_loader_canonicalizes_endpoints() {
    let dir = fixture_dir("validating_canonical");
    let min_data = write_file(&dir, "min.data", "-5.0 1.1 1\n-4.0 1.0 1\n");
    let ts_data = write_file(&dir, "ts.data", "-3.0 1.2 1 2 1\n");
    let store = GraphStore::open_in_memory().expect("store");
    PathSampleLoader::with_paths(&store, &min_data, &ts_data)
        .validating(true)
        .load()
        .expect("load");
    let ts = store.transition_state_by_id(1).expect("ts");
    assert_eq!(ts.minimum1_id, 1);
    assert_eq!(ts.minimum2_id, 2);
}

#[test]
fn test_validating_loader_rejects_unknown_endpoint() {
    let dir = fixture_dir("validating_unknown");
    let min_data = write_file(&dir, "min.data", "-5.0 1.1 1\n-4.0 1.0 1\n");
    let ts_data = write_file(&dir, "ts.data", "-3.0 1.2 1 1 9\n");
    let store = GraphStore::open_in_memory().expect("store");
    let err = PathSampleLoader::with_paths(&store, &min_data, &ts_data)
        .validating(true)
        .load()
        .expect_err("unknown endpoint");
    assert!(matches!(err, BasinGraphError::InvalidInput(_)));
    assert_eq!(store.number_of_transition_states().expect("count"), 0);
}

#[test]
fn test_checked_bulk_rolls_back_whole_batch() {
    let store = GraphStore::open_in_memory().expect("store");
    let dir = fixture_dir("checked_rollback");
    let min_data = write_file(&dir, "min.data", "-5.0 1.1 1\n-4.0 1.0 1\n");
    let ts_data = write_file(&dir, "ts.data", "");
    PathSampleLoader::with_paths(&store, &min_data, &ts_data)
        .load_minima()
        .expect("minima");

    let good = TransitionStateCreate {
        energy: -1.0,
        fvib: 1.0,
        pgorder: 1,
        minimum1_id: 1,
        minimum2_id: 2,
    };
    let bad = TransitionStateCreate {
        minimum2_id: 42,
        ..good.clone()
    };
    let err =
        bulk_insert_transition_states_checked(&store, &[good.clone(), bad]).expect_err("rollback");
    assert!(matches!(err, BasinGraphError::InvalidInput(_)));
    assert_eq!(store.number_of_transition_states().expect("count"), 0);

    // the fast path accepts the same rows without looking at endpoints
    let bad_again = TransitionStateCreate {
        minimum2_id: 42,
        ..good.clone()
    };
    let ids = bulk_insert_transition_states(&store, &[good, bad_again]).expect("fast insert");
    assert_eq!(ids, vec![1, 2]);
}
