use tcx_table::extractor::{FieldExtractor, Scope};
use tcx_table::parser::parse_tcx;
use tcx_table::table::COLUMNS;
use tcx_table::{TcxError, TcxReader};

fn fixture_path(name: &str) -> String {
    format!("tests/fixtures/{name}")
}

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).unwrap()
}

// ---- two_laps.tcx: 2 laps, lap 0 has 3 trackpoints without heart
// rate, lap 1 has 2 trackpoints with every field and an extension
// block per trackpoint ----

#[test]
fn test_lap_count() {
    let reader = TcxReader::new(fixture_path("two_laps.tcx")).unwrap();
    assert_eq!(reader.lap_count(), 2);
}

#[test]
fn test_whole_activity_table_in_lap_order() {
    let reader = TcxReader::new(fixture_path("two_laps.tcx")).unwrap();
    let table = reader.table();
    assert_eq!(table.len(), 5);

    let rows = table.rows();
    // rows 0-2 come from lap 0, rows 3-4 from lap 1
    assert_eq!(rows[0].latitude, Some(45.4640));
    assert_eq!(rows[2].latitude, Some(45.4642));
    assert_eq!(rows[3].latitude, Some(45.4643));
    assert_eq!(rows[4].latitude, Some(45.4644));

    // lap 0 carries no heart rate or extensions, lap 1 carries both
    for row in &rows[..3] {
        assert!(row.heart_rate.is_none());
        assert!(row.speed.is_none());
        assert!(row.cadence.is_none());
    }
    assert_eq!(rows[3].heart_rate, Some(128.0));
    assert_eq!(rows[3].speed, Some(2.71));
    assert_eq!(rows[3].cadence, Some(82.0));
    assert_eq!(rows[4].heart_rate, Some(131.0));
    assert_eq!(rows[4].speed, Some(2.83));
    assert_eq!(rows[4].cadence, Some(84.0));
}

#[test]
fn test_lap_tables() {
    let reader = TcxReader::new(fixture_path("two_laps.tcx")).unwrap();

    let lap0 = reader.lap_table(0).unwrap();
    assert_eq!(lap0.len(), 3);
    assert!(lap0.rows().iter().all(|r| r.heart_rate.is_none()));
    assert!(lap0.rows().iter().all(|r| r.time.is_some()));

    let lap1 = reader.lap_table(1).unwrap();
    assert_eq!(lap1.len(), 2);
    assert_eq!(lap1.rows()[0].speed, Some(2.71));
    assert_eq!(lap1.rows()[1].cadence, Some(84.0));
}

#[test]
fn test_lap_table_row_count_bounded_by_trackpoints() {
    let reader = TcxReader::new(fixture_path("two_laps.tcx")).unwrap();
    let trackpoints = [3, 2];
    for (lap, expected) in trackpoints.iter().enumerate() {
        let table = reader.lap_table(lap).unwrap();
        assert!(table.len() <= *expected);
        assert_eq!(table.len(), *expected);
    }
}

#[test]
fn test_lap_table_idempotent() {
    let reader = TcxReader::new(fixture_path("two_laps.tcx")).unwrap();
    assert_eq!(reader.lap_table(0).unwrap(), reader.lap_table(0).unwrap());
    assert_eq!(reader.lap_table(1).unwrap(), reader.lap_table(1).unwrap());
}

#[test]
fn test_lap_index_boundary() {
    let reader = TcxReader::new(fixture_path("two_laps.tcx")).unwrap();
    // lap_count() and lap_count() + 1 both fail the same way
    for lap in [reader.lap_count(), reader.lap_count() + 1] {
        match reader.lap_table(lap) {
            Err(TcxError::LapOutOfRange { lap: got, laps: 2 }) => assert_eq!(got, lap),
            other => panic!("expected LapOutOfRange for lap {lap}, got {other:?}"),
        }
    }
}

#[test]
fn test_positions_roundtrip_across_lap_boundaries() {
    let activity = parse_tcx(&load_fixture("two_laps.tcx")).unwrap();
    let extractor = FieldExtractor::new(&activity);

    let whole = extractor.positions(Scope::Activity).unwrap();
    let mut per_lap = Vec::new();
    for lap in 0..activity.laps.len() {
        per_lap.extend(extractor.positions(Scope::Lap(lap)).unwrap());
    }
    assert_eq!(whole, per_lap);
}

#[test]
fn test_row_serialization_matches_schema() {
    let reader = TcxReader::new(fixture_path("two_laps.tcx")).unwrap();
    let value = serde_json::to_value(&reader.table().rows()[3]).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), COLUMNS.len());
    for column in COLUMNS {
        assert!(object.contains_key(column), "missing column {column}");
    }
    assert_eq!(value["heart_rate"], 128.0);
    assert_eq!(value["time"], "2023-04-02T09:00:04");
}

// ---- missing_heart_rate.tcx: trackpoint 1 of 3 omits heart rate ----

#[test]
fn test_missing_field_keeps_row_alignment() {
    let reader = TcxReader::new(fixture_path("missing_heart_rate.tcx")).unwrap();
    let table = reader.table();

    // one row per trackpoint, with the gap marked rather than shifted
    assert_eq!(table.len(), 3);
    let rows = table.rows();
    assert_eq!(rows[0].heart_rate, Some(100.0));
    assert_eq!(rows[1].heart_rate, None);
    assert_eq!(rows[2].heart_rate, Some(120.0));

    // neighbouring columns stay attached to their own trackpoint
    assert_eq!(rows[1].distance, Some(2.0));
    assert_eq!(rows[2].distance, Some(3.0));
}

// ---- bad_timestamp.tcx ----

#[test]
fn test_malformed_timestamp_fails_time_extraction() {
    let activity = parse_tcx(&load_fixture("bad_timestamp.tcx")).unwrap();
    let extractor = FieldExtractor::new(&activity);
    match extractor.times(Scope::Activity) {
        Err(TcxError::InvalidTimestamp { value }) => assert_eq!(value, "not-a-timestamp"),
        other => panic!("expected InvalidTimestamp, got {other:?}"),
    }
}

#[test]
fn test_malformed_timestamp_fails_construction() {
    // the facade assembles the whole-activity table eagerly
    match TcxReader::new(fixture_path("bad_timestamp.tcx")) {
        Err(TcxError::InvalidTimestamp { .. }) => {}
        other => panic!("expected InvalidTimestamp, got {other:?}"),
    }
}

// ---- load failures ----

#[test]
fn test_missing_file() {
    match TcxReader::new("tests/fixtures/does_not_exist.tcx") {
        Err(TcxError::Load { path, .. }) => {
            assert!(path.ends_with("does_not_exist.tcx"));
        }
        other => panic!("expected Load error, got {other:?}"),
    }
}

#[test]
fn test_not_xml() {
    assert!(TcxReader::from_xml("certainly not xml <<<").is_err());
}
