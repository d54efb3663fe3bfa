//! End-to-end training run: split, fit, evaluate, and persist artifacts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{info, info_span};

use housing_ingest::{column_f64, read_csv_frame};
use housing_model::{AppConfig, EnvironmentInfo, RegressionMetrics, RunId, RunManifest, Schema};
use housing_profile::{build_profile, write_profile};
use housing_registry::{ModelRegistry, derive_run_id, sha256_file, sha256_json, write_json};
use housing_validate::{SchemaValidator, ValidationOptions};

use crate::cv::select_alpha;
use crate::error::TrainError;
use crate::metrics::regression_metrics;
use crate::model::{HousingModel, ModelArtifact, Regressor};
use crate::split::stratified_split;

/// Paths and numbers produced by [`run_training`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingRun {
    pub run_id: RunId,
    pub model_path: PathBuf,
    pub active_model_path: PathBuf,
    pub profile_path: PathBuf,
    pub metrics_path: PathBuf,
    pub manifest_path: PathBuf,
    pub metrics: RegressionMetrics,
    pub meta: BTreeMap<String, f64>,
}

/// Body of `metrics.json`.
#[derive(Debug, Serialize)]
struct MetricsReport<'a> {
    #[serde(flatten)]
    metrics: RegressionMetrics,
    #[serde(flatten)]
    meta: &'a BTreeMap<String, f64>,
    run_id: &'a RunId,
    model_path: &'a Path,
}

/// Splits a training frame into validated features and a numeric target.
///
/// Every target value must be present and numeric.
pub fn features_and_target(
    df: &DataFrame,
    target: &str,
    schema: &Schema,
) -> Result<(DataFrame, Vec<f64>), TrainError> {
    if df.column(target).is_err() {
        return Err(TrainError::MissingColumn {
            column: target.to_string(),
        });
    }
    let values = column_f64(df, target)?;
    let invalid = values.iter().filter(|value| value.is_none()).count();
    if invalid > 0 {
        return Err(TrainError::InvalidTarget {
            column: target.to_string(),
            rows: invalid,
        });
    }
    let targets = values.into_iter().flatten().collect();

    let features = df.drop(target)?;
    let validated = SchemaValidator::new(schema).validate(&features, ValidationOptions::default())?;
    let features = validated.required_frame(schema)?;
    Ok((features, targets))
}

/// Runs one training pass described by `config`.
///
/// The run id is derived from the config and data hashes, so retraining the
/// same data with the same config overwrites the same registry entry.
pub fn run_training(config: &AppConfig, config_path: Option<&Path>) -> Result<TrainingRun> {
    let started = Instant::now();
    let schema = Schema::housing();
    let data = &config.data;
    let output = &config.output;

    let config_sha256 = sha256_json(config).context("failed to hash config")?;
    let data_sha256 = sha256_file(&data.csv_path).context("failed to hash training data")?;
    let run_id = derive_run_id(&config_sha256, &data_sha256)?;

    let span = info_span!("train", run_id = %run_id);
    let _guard = span.enter();

    let df = read_csv_frame(&data.csv_path)
        .with_context(|| format!("failed to load {}", data.csv_path.display()))?;
    info!(rows = df.height(), columns = df.width(), "loaded training data");

    let (train, test) = stratified_split(&df, data)?;
    let (x_train, y_train) = features_and_target(&train, &data.target, &schema)
        .context("invalid training split")?;
    let (x_test, y_test) =
        features_and_target(&test, &data.target, &schema).context("invalid test split")?;

    let selection = select_alpha(&x_train, &y_train, &schema, &config.model)?;
    let model = HousingModel::fit(&x_train, &y_train, &schema, selection.alpha)?;

    let predictions = model.predict(&x_test)?;
    let metrics = regression_metrics(&y_test, &predictions);
    info!(
        rmse = metrics.rmse,
        mae = metrics.mae,
        r2 = metrics.r2,
        "evaluated on test split"
    );

    let profile = build_profile(&x_train, &schema)?;
    let profile_path = output.profile_path();
    write_profile(&profile_path, &profile)?;

    let registry = ModelRegistry::new(output.registry_dir());
    let artifact = ModelArtifact {
        run_id: run_id.clone(),
        trained_at: Utc::now(),
        schema,
        model,
    };
    let model_path = registry.save(&artifact, &run_id)?;
    let active_model_path = registry.set_active(&run_id)?;

    let meta = BTreeMap::from([
        ("alpha".to_string(), selection.alpha),
        ("cv_rmse_mean".to_string(), selection.rmse_mean),
        ("cv_rmse_std".to_string(), selection.rmse_std),
        ("train_rows".to_string(), x_train.height() as f64),
        ("test_rows".to_string(), x_test.height() as f64),
    ]);

    let metrics_path = output.metrics_path();
    write_json(
        &metrics_path,
        &MetricsReport {
            metrics,
            meta: &meta,
            run_id: &run_id,
            model_path: &model_path,
        },
    )?;

    let manifest_path = output.manifest_path();
    let manifest = RunManifest {
        run_id: run_id.clone(),
        created_at: Utc::now(),
        environment: EnvironmentInfo::current(),
        config_path: config_path.map(Path::to_path_buf),
        config_sha256,
        data_path: data.csv_path.clone(),
        data_sha256,
        model_path: model_path.clone(),
        active_model_path: active_model_path.clone(),
        training_profile_path: profile_path.clone(),
        metrics_path: metrics_path.clone(),
        metrics,
        meta: meta.clone(),
    };
    write_json(&manifest_path, &manifest)?;

    info!(
        duration_ms = started.elapsed().as_millis() as u64,
        model = %model_path.display(),
        "training finished"
    );

    Ok(TrainingRun {
        run_id,
        model_path,
        active_model_path,
        profile_path,
        metrics_path,
        manifest_path,
        metrics,
        meta,
    })
}
