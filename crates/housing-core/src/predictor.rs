//! Validate, predict, and compare against the training profile.

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{debug, info};

use housing_ingest::records_to_frame;
use housing_model::{DriftReport, Record, Schema, TrainingProfile};
use housing_profile::{compare, load_profile};
use housing_registry::read_json;
use housing_validate::{SchemaValidator, ValidationOptions};

use crate::error::PredictError;
use crate::model::{HousingModel, ModelArtifact, Regressor};

/// Result of one prediction call.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// One value per input row, in input order.
    pub predictions: Vec<f64>,
    /// `None` when the predictor was built without a training profile.
    pub drift: Option<DriftReport>,
}

/// Serves predictions from one immutable model.
#[derive(Debug, Clone)]
pub struct Predictor<M = HousingModel> {
    schema: Schema,
    model: M,
    profile: Option<TrainingProfile>,
    options: ValidationOptions,
}

impl<M: Regressor> Predictor<M> {
    pub fn new(schema: Schema, model: M) -> Self {
        Self {
            schema,
            model,
            profile: None,
            options: ValidationOptions::default(),
        }
    }

    pub fn with_profile(mut self, profile: Option<TrainingProfile>) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_allow_extra_columns(mut self, enable: bool) -> Self {
        self.options = self.options.with_allow_extra_columns(enable);
        self
    }

    pub fn with_strict_categories(mut self, enable: bool) -> Self {
        self.options = self.options.with_strict_categories(enable);
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn has_profile(&self) -> bool {
        self.profile.is_some()
    }

    /// Predicts every row of `batch`.
    ///
    /// Schema failures come back unchanged as [`PredictError::Schema`].
    pub fn predict(&self, batch: &DataFrame) -> Result<Prediction, PredictError> {
        let options = self.options.with_require_non_empty(true);
        let validated = SchemaValidator::new(&self.schema).validate(batch, options)?;
        let features = validated.required_frame(&self.schema)?;

        let predictions = self.model.predict(&features)?;
        let drift = self
            .profile
            .as_ref()
            .map(|profile| compare(&features, profile))
            .transpose()?;

        debug!(rows = features.height(), drift = drift.is_some(), "predicted batch");
        Ok(Prediction { predictions, drift })
    }

    /// Predicts JSON row records.
    pub fn predict_records(&self, records: &[Record]) -> Result<Prediction, PredictError> {
        let frame = records_to_frame(records).map_err(PredictError::Records)?;
        self.predict(&frame)
    }
}

impl Predictor<HousingModel> {
    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self::new(artifact.schema, artifact.model)
    }
}

/// Builds a predictor from a model artifact and an optional profile file.
///
/// A profile path that does not exist disables drift; an unreadable or
/// malformed profile is an error.
pub fn load_predictor(model_path: &Path, profile_path: Option<&Path>) -> Result<Predictor> {
    let artifact: ModelArtifact = read_json(model_path)
        .with_context(|| format!("failed to load model artifact {}", model_path.display()))?;
    let run_id = artifact.run_id.clone();

    let profile = match profile_path {
        Some(path) => load_profile(path)
            .with_context(|| format!("failed to load training profile {}", path.display()))?,
        None => None,
    };

    info!(
        run_id = %run_id,
        model = %model_path.display(),
        profile_loaded = profile.is_some(),
        "loaded predictor"
    );
    Ok(Predictor::from_artifact(artifact).with_profile(profile))
}
