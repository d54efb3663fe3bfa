use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RunId;

/// Held-out evaluation of a trained model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

/// Facts about the process that produced a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub housing_version: String,
    pub os: String,
    pub arch: String,
}

impl EnvironmentInfo {
    pub fn current() -> Self {
        Self {
            housing_version: env!("CARGO_PKG_VERSION").to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

/// Reproducibility record written at the end of every training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub created_at: DateTime<Utc>,
    pub environment: EnvironmentInfo,
    pub config_path: Option<PathBuf>,
    pub config_sha256: String,
    pub data_path: PathBuf,
    pub data_sha256: String,
    pub model_path: PathBuf,
    pub active_model_path: PathBuf,
    pub training_profile_path: PathBuf,
    pub metrics_path: PathBuf,
    pub metrics: RegressionMetrics,
    pub meta: BTreeMap<String, f64>,
}
