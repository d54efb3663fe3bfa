//! Shared data model for the housing price pipeline.

pub mod api;
pub mod config;
pub mod drift;
pub mod error;
pub mod ids;
pub mod manifest;
pub mod profile;
pub mod schema;

pub use api::{PredictRequest, PredictResponse, Record};
pub use config::{AppConfig, ConfigError, DataConfig, ModelConfig, OutputConfig, ServeConfig};
pub use drift::{CategoricalDrift, DriftReport, NumericDrift};
pub use error::{ModelError, Result};
pub use ids::RunId;
pub use manifest::{EnvironmentInfo, RegressionMetrics, RunManifest};
pub use profile::{MISSING_CATEGORY, NumericProfile, TrainingProfile};
pub use schema::{CategoricalColumn, Schema, SchemaError, SchemaErrorKind};
