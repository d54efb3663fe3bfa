use std::fs;

use polars::prelude::DataFrame;
use proptest::prelude::{ProptestConfig, prop, prop_assert_eq, proptest};
use serde_json::{Value, json};

use housing_ingest::{read_csv_frame, records_to_frame};
use housing_model::{CategoricalColumn, MISSING_CATEGORY, Schema, TrainingProfile};
use housing_profile::{ProfileError, build_profile, compare, load_profile, write_profile};

fn schema() -> Schema {
    Schema::new(
        vec!["x".to_string(), "y".to_string()],
        vec![CategoricalColumn::new("cat").with_allowed(["A", "B"])],
    )
    .unwrap()
}

fn frame(rows: Value) -> DataFrame {
    let records: Vec<_> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row.as_object().unwrap().clone())
        .collect();
    records_to_frame(&records).unwrap()
}

#[test]
fn profile_counts_non_missing_and_folds_missing_categories() {
    let df = frame(json!([
        {"x": 1.0, "y": 10.0, "cat": "A"},
        {"x": 2.0, "y": null, "cat": null},
        {"x": 3.0, "y": 30.0, "cat": "A"},
        {"x": 4.0, "y": 40.0, "cat": "B"}
    ]));

    let profile = build_profile(&df, &schema()).unwrap();
    let x = profile.numeric_profile("x").unwrap();
    assert_eq!(x.count, 4);
    assert_eq!(x.q50, 2.5);
    let y = profile.numeric_profile("y").unwrap();
    assert_eq!(y.count, 3);
    assert_eq!(y.q50, 30.0);

    let cat = profile.frequencies("cat").unwrap();
    assert_eq!(cat["A"], 0.5);
    assert_eq!(cat["B"], 0.25);
    assert_eq!(cat[MISSING_CATEGORY], 0.25);
    let total: f64 = cat.values().sum();
    assert!((total - 1.0).abs() < 1e-12);
}

#[test]
fn empty_numeric_column_is_surfaced() {
    let df = frame(json!([
        {"x": 1.0, "y": null, "cat": "A"},
        {"x": 2.0, "y": null, "cat": "A"}
    ]));
    let err = build_profile(&df, &schema()).unwrap_err();
    assert!(matches!(err, ProfileError::EmptyNumericColumn { column } if column == "y"));
}

#[test]
fn profile_requires_schema_columns() {
    let df = frame(json!([{"x": 1.0, "cat": "A"}]));
    let err = build_profile(&df, &schema()).unwrap_err();
    assert!(matches!(err, ProfileError::MissingColumn { column } if column == "y"));
}

#[test]
fn zero_baseline_median_uses_unit_denominator() {
    let baseline = frame(json!([
        {"x": -1.0, "y": 1.0, "cat": "A"},
        {"x": 0.0, "y": 1.0, "cat": "A"},
        {"x": 1.0, "y": 1.0, "cat": "A"}
    ]));
    let current = frame(json!([
        {"x": 3.0, "y": 1.0, "cat": "A"},
        {"x": 5.0, "y": 1.0, "cat": "A"}
    ]));

    let profile = build_profile(&baseline, &schema()).unwrap();
    let report = compare(&current, &profile).unwrap();
    let x = report.numeric["x"];
    assert_eq!(x.baseline_q50, 0.0);
    assert_eq!(x.current_q50, 4.0);
    assert_eq!(x.rel_shift, x.current_q50);
}

#[test]
fn unknown_share_and_top_categories() {
    let baseline = frame(json!([
        {"x": 1.0, "y": 1.0, "cat": "A"},
        {"x": 1.0, "y": 1.0, "cat": "B"}
    ]));
    let current = frame(json!([
        {"x": 1.0, "y": 1.0, "cat": "C"},
        {"x": 1.0, "y": 1.0, "cat": "A"},
        {"x": 1.0, "y": 1.0, "cat": "D"},
        {"x": 1.0, "y": 1.0, "cat": "A"},
        {"x": 1.0, "y": 1.0, "cat": "E"},
        {"x": 1.0, "y": 1.0, "cat": "F"},
        {"x": 1.0, "y": 1.0, "cat": null},
        {"x": 1.0, "y": 1.0, "cat": "G"}
    ]));

    let profile = build_profile(&baseline, &schema()).unwrap();
    let report = compare(&current, &profile).unwrap();
    let cat = &report.categorical["cat"];

    assert!((cat.unknown_share - 0.75).abs() < 1e-12);
    let top: Vec<&str> = cat.current_top.iter().map(|(v, _)| v.as_str()).collect();
    assert_eq!(top, vec!["A", "C", "D", "E", "F"]);
    assert_eq!(cat.current_top[0].1, 0.25);
}

#[test]
fn columns_outside_profile_are_ignored() {
    let df = frame(json!([
        {"x": 1.0, "y": 2.0, "cat": "A", "C": 1000.0},
        {"x": 2.0, "y": 3.0, "cat": "B", "C": -5000.0}
    ]));
    let profile = build_profile(&df, &schema()).unwrap();

    let shifted = frame(json!([
        {"x": 1.0, "y": 2.0, "cat": "A", "C": "anything"},
        {"x": 2.0, "y": 3.0, "cat": "B", "C": null}
    ]));
    let report = compare(&shifted, &profile).unwrap();
    assert!(!report.numeric.contains_key("C"));
    assert!(!report.categorical.contains_key("C"));
    assert_eq!(report.numeric.len(), 2);
}

#[test]
fn profile_column_missing_from_batch_is_an_error() {
    let df = frame(json!([{"x": 1.0, "y": 2.0, "cat": "A"}]));
    let profile = build_profile(&df, &schema()).unwrap();
    let batch = frame(json!([{"x": 1.0, "cat": "A"}]));

    let err = compare(&batch, &profile).unwrap_err();
    assert!(matches!(err, ProfileError::MissingColumn { column } if column == "y"));
}

#[test]
fn profile_file_round_trip_and_absence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports").join("training_profile.json");
    assert!(load_profile(&path).unwrap().is_none());

    let df = frame(json!([
        {"x": 1.0, "y": 2.0, "cat": "A"},
        {"x": 3.0, "y": 4.0, "cat": "B"}
    ]));
    let profile = build_profile(&df, &schema()).unwrap();
    write_profile(&path, &profile).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();
    assert!(value["numeric"]["x"]["q50"].is_number());
    assert!(value["categorical"]["cat"]["A"].is_number());

    let loaded: TrainingProfile = load_profile(&path).unwrap().unwrap();
    assert_eq!(loaded, profile);
}

#[test]
fn infinite_cells_do_not_break_the_stored_profile() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("train.csv");
    fs::write(&csv, "x,y,cat\n1,10,A\n2,20,B\ninf,30,A\n").unwrap();

    let df = read_csv_frame(&csv).unwrap();
    let profile = build_profile(&df, &schema()).unwrap();
    let x = profile.numeric_profile("x").unwrap();
    assert_eq!(x.count, 2);
    assert!((x.q99 - 1.99).abs() < 1e-12);

    let path = dir.path().join("training_profile.json");
    write_profile(&path, &profile).unwrap();
    let loaded = load_profile(&path).unwrap().unwrap();
    assert_eq!(loaded, profile);
}

#[test]
fn empty_or_malformed_profile_fails_loudly() {
    let dir = tempfile::tempdir().unwrap();
    let empty = dir.path().join("empty.json");
    fs::write(&empty, "").unwrap();
    assert!(matches!(
        load_profile(&empty),
        Err(ProfileError::Malformed { .. })
    ));

    let wrong_shape = dir.path().join("wrong.json");
    fs::write(&wrong_shape, r#"{"numeric": []}"#).unwrap();
    assert!(matches!(
        load_profile(&wrong_shape),
        Err(ProfileError::Malformed { .. })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn same_data_shows_no_drift(
        rows in prop::collection::vec(
            (-1.0e4..1.0e4f64, -1.0e4..1.0e4f64, prop::sample::select(vec!["A", "B", "Q", ""])),
            1..40,
        )
    ) {
        let records: Vec<_> = rows
            .iter()
            .map(|(x, y, cat)| {
                let mut record = serde_json::Map::new();
                record.insert("x".into(), json!(x));
                record.insert("y".into(), json!(y));
                let cat = if cat.is_empty() { Value::Null } else { json!(cat) };
                record.insert("cat".into(), cat);
                record
            })
            .collect();
        let df = records_to_frame(&records).unwrap();

        let profile = build_profile(&df, &schema()).unwrap();
        let report = compare(&df, &profile).unwrap();
        for drift in report.numeric.values() {
            prop_assert_eq!(drift.rel_shift, 0.0);
        }
        for drift in report.categorical.values() {
            prop_assert_eq!(drift.unknown_share, 0.0);
        }
    }
}
