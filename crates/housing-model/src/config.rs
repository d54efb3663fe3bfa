//! Application configuration loaded once at startup.
//!
//! One TOML file drives both training and serving:
//!
//! ```toml
//! [data]
//! csv_path = "data/housing.csv"
//! target = "median_house_value"
//!
//! [serve]
//! bind = "127.0.0.1:8000"
//! ```
//!
//! Every section has defaults, so an empty file is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {message}")]
    Invalid { message: String },
}

/// Data loading and split settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub csv_path: PathBuf,
    pub target: String,
    pub stratify_col: String,
    pub test_size: f64,
    pub random_state: u64,
    /// Right-closed bin edges for the stratification column; `"inf"` is accepted.
    #[serde(deserialize_with = "deserialize_bins")]
    pub income_cat_bins: Vec<f64>,
    pub income_cat_labels: Vec<u32>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("data/housing.csv"),
            target: "median_house_value".to_string(),
            stratify_col: "median_income".to_string(),
            test_size: 0.2,
            random_state: 42,
            income_cat_bins: vec![0.0, 1.5, 3.0, 4.5, 6.0, f64::INFINITY],
            income_cat_labels: vec![1, 2, 3, 4, 5],
        }
    }
}

/// Regression settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Ridge penalties to try; the best by cross-validated RMSE wins.
    pub alphas: Vec<f64>,
    pub cv_folds: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            alphas: vec![1.0],
            cv_folds: 3,
        }
    }
}

/// Where training writes its artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub artifacts_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from("artifacts"),
        }
    }
}

impl OutputConfig {
    pub fn registry_dir(&self) -> PathBuf {
        self.artifacts_dir.join("models").join("registry")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.artifacts_dir.join("reports")
    }

    pub fn profile_path(&self) -> PathBuf {
        self.reports_dir().join("training_profile.json")
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.reports_dir().join("metrics.json")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.reports_dir().join("manifest.json")
    }
}

/// Serving behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    pub bind: String,
    /// Explicit model artifact; the registry's active entry when unset.
    pub model_path: Option<PathBuf>,
    /// Training profile for drift reporting; drift is disabled when the file is absent.
    pub training_profile_path: Option<PathBuf>,
    pub allow_extra_columns: bool,
    pub strict_categories: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            model_path: None,
            training_profile_path: None,
            allow_extra_columns: false,
            strict_categories: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub output: OutputConfig,
    pub serve: ServeConfig,
}

impl AppConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let data = &self.data;
        if !(data.test_size > 0.0 && data.test_size < 1.0) {
            return Err(invalid(format!(
                "data.test_size must be in (0, 1), got {}",
                data.test_size
            )));
        }
        if data.income_cat_bins.len() < 2 {
            return Err(invalid("data.income_cat_bins needs at least two edges"));
        }
        if data.income_cat_bins.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(invalid("data.income_cat_bins must be strictly increasing"));
        }
        if data.income_cat_labels.len() + 1 != data.income_cat_bins.len() {
            return Err(invalid(format!(
                "data.income_cat_labels has {} labels for {} bins",
                data.income_cat_labels.len(),
                data.income_cat_bins.len() - 1
            )));
        }
        if self.model.alphas.is_empty() || self.model.alphas.iter().any(|alpha| *alpha < 0.0) {
            return Err(invalid("model.alphas must be non-empty and non-negative"));
        }
        if self.model.cv_folds < 2 {
            return Err(invalid("model.cv_folds must be at least 2"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        message: message.into(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BinEdge {
    Number(f64),
    Text(String),
}

fn deserialize_bins<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    let edges = Vec::<BinEdge>::deserialize(deserializer)?;
    edges
        .into_iter()
        .map(|edge| match edge {
            BinEdge::Number(value) => Ok(value),
            BinEdge::Text(text) => match text.trim().trim_start_matches('.') {
                "inf" | "Inf" | "infinity" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => other.parse::<f64>().map_err(serde::de::Error::custom),
            },
        })
        .collect()
}
