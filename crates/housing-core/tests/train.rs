mod common;

use std::fs;

use serde_json::Value;

use housing_core::{PredictError, load_predictor, run_training};
use housing_model::{AppConfig, RunManifest, SchemaError};
use housing_registry::ModelRegistry;

use common::{housing_rows, record, write_csv};

fn config_in(dir: &std::path::Path) -> AppConfig {
    let csv_path = dir.join("housing.csv");
    write_csv(&csv_path, &housing_rows(300, 7));

    let mut config = AppConfig::default();
    config.data.csv_path = csv_path;
    config.output.artifacts_dir = dir.join("artifacts");
    config.model.alphas = vec![0.1, 1.0, 10.0];
    config
}

#[test]
fn training_writes_every_artifact_and_activates_model() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let run = run_training(&config, None).unwrap();

    assert!(run.model_path.is_file());
    assert!(run.profile_path.is_file());
    assert!(run.metrics_path.is_file());
    assert!(run.manifest_path.is_file());
    assert!(run.metrics.r2 > 0.8, "r2 = {}", run.metrics.r2);
    assert_eq!(run.meta["train_rows"] + run.meta["test_rows"], 300.0);
    assert!(config.model.alphas.contains(&run.meta["alpha"]));

    let registry = ModelRegistry::new(config.output.registry_dir());
    assert_eq!(registry.resolve_active().unwrap(), run.model_path);

    let manifest: RunManifest =
        serde_json::from_str(&fs::read_to_string(&run.manifest_path).unwrap()).unwrap();
    assert_eq!(manifest.run_id, run.run_id);
    assert_eq!(manifest.data_path, config.data.csv_path);
    assert_eq!(manifest.config_sha256.len(), 64);

    let metrics: Value = serde_json::from_str(&fs::read_to_string(&run.metrics_path).unwrap()).unwrap();
    for key in ["rmse", "mae", "r2", "cv_rmse_mean", "cv_rmse_std", "run_id", "model_path"] {
        assert!(metrics.get(key).is_some(), "metrics.json lacks {key}");
    }
}

#[test]
fn same_config_and_data_reuse_run_id() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let first = run_training(&config, None).unwrap();
    let second = run_training(&config, None).unwrap();
    assert_eq!(first.run_id, second.run_id);
    assert_eq!(first.model_path, second.model_path);
    assert_eq!(first.metrics, second.metrics);
}

#[test]
fn trained_model_serves_predictions_with_drift() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let run = run_training(&config, None).unwrap();

    let predictor = load_predictor(&run.active_model_path, Some(run.profile_path.as_path())).unwrap();
    assert!(predictor.has_profile());

    let rows = housing_rows(5, 99);
    let records: Vec<_> = rows.iter().map(record).collect();
    let prediction = predictor.predict_records(&records).unwrap();
    assert_eq!(prediction.predictions.len(), 5);
    assert!(prediction.predictions.iter().all(|value| value.is_finite()));
    let drift = prediction.drift.unwrap();
    assert_eq!(drift.numeric.len(), 8);
    assert_eq!(drift.categorical.len(), 1);

    let strict = predictor.with_strict_categories(true);
    let mut bad = records[0].clone();
    bad.insert("ocean_proximity".into(), "MARS".into());
    let err = strict.predict_records(&[bad]).unwrap_err();
    assert!(matches!(
        err,
        PredictError::Schema(SchemaError::UnknownCategory { ref values, .. }) if values == &["MARS"]
    ));
}

#[test]
fn missing_profile_file_disables_drift() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let run = run_training(&config, None).unwrap();

    let absent = dir.path().join("nope.json");
    let predictor = load_predictor(&run.model_path, Some(absent.as_path())).unwrap();
    let records: Vec<_> = housing_rows(2, 3).iter().map(record).collect();
    assert!(predictor.predict_records(&records).unwrap().drift.is_none());
}

#[test]
fn out_of_bin_income_fails_training() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.data.income_cat_bins = vec![0.0, 1.0, 2.0];
    config.data.income_cat_labels = vec![1, 2];

    let err = run_training(&config, None).unwrap_err();
    assert!(format!("{err:#}").contains("outside the stratification bins"), "{err:#}");
}
