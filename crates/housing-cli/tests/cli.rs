use std::fs;
use std::path::PathBuf;

use serde_json::json;

use housing_cli::artifacts::{profile_path, registry, resolve_model_path};
use housing_cli::input::read_records;
use housing_model::{AppConfig, RunId};

fn config_in(dir: &std::path::Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.output.artifacts_dir = dir.join("artifacts");
    config
}

#[test]
fn records_file_accepts_request_body_and_bare_array() {
    let dir = tempfile::tempdir().unwrap();
    let wrapped = dir.path().join("wrapped.json");
    fs::write(&wrapped, json!({"records": [{"a": 1.0}, {"a": 2.0}]}).to_string()).unwrap();
    let bare = dir.path().join("bare.json");
    fs::write(&bare, json!([{"a": 1.0}]).to_string()).unwrap();
    let empty = dir.path().join("empty.json");
    fs::write(&empty, "[]").unwrap();

    assert_eq!(read_records(&wrapped).unwrap().len(), 2);
    assert_eq!(read_records(&bare).unwrap()[0]["a"], json!(1.0));
    assert!(read_records(&empty).unwrap().is_empty());
}

#[test]
fn records_file_rejects_other_shapes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scalar.json");
    fs::write(&path, "42").unwrap();
    assert!(read_records(&path).is_err());
    assert!(read_records(&dir.path().join("missing.json")).is_err());
}

#[test]
fn explicit_model_path_wins_over_registry() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.serve.model_path = Some(PathBuf::from("pinned.json"));
    assert_eq!(
        resolve_model_path(&config).unwrap(),
        PathBuf::from("pinned.json")
    );
}

#[test]
fn model_path_falls_back_to_active_entry() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    assert!(resolve_model_path(&config).is_err());

    let registry = registry(&config);
    let run_id = RunId::new("run-1").unwrap();
    let saved = registry.save(&json!({"weights": []}), &run_id).unwrap();
    registry.set_active(&run_id).unwrap();

    let resolved = resolve_model_path(&config).unwrap();
    assert_eq!(
        fs::read_to_string(resolved).unwrap(),
        fs::read_to_string(saved).unwrap()
    );
}

#[test]
fn profile_path_defaults_to_reports_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    assert_eq!(profile_path(&config), config.output.profile_path());

    config.serve.training_profile_path = Some(PathBuf::from("elsewhere.json"));
    assert_eq!(profile_path(&config), PathBuf::from("elsewhere.json"));
}
