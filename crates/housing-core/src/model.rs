//! The trained housing model and its persisted artifact.

use chrono::{DateTime, Utc};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::debug;

use housing_model::{RunId, Schema};

use crate::error::RegressionError;
use crate::features::{FeaturePipeline, FeaturePlan};
use crate::ridge::RidgeRegression;

/// Anything that maps validated feature rows to predictions.
///
/// The frame holds exactly the schema's required columns in canonical order.
pub trait Regressor {
    fn predict(&self, features: &DataFrame) -> Result<Vec<f64>, RegressionError>;
}

/// Feature pipeline followed by ridge regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingModel {
    pipeline: FeaturePipeline,
    ridge: RidgeRegression,
}

impl HousingModel {
    /// Fits the housing feature plan and a ridge regressor on `features`.
    pub fn fit(
        features: &DataFrame,
        targets: &[f64],
        schema: &Schema,
        alpha: f64,
    ) -> Result<Self, RegressionError> {
        Self::fit_with_plan(&FeaturePlan::housing(), features, targets, schema, alpha)
    }

    pub fn fit_with_plan(
        plan: &FeaturePlan,
        features: &DataFrame,
        targets: &[f64],
        schema: &Schema,
        alpha: f64,
    ) -> Result<Self, RegressionError> {
        if features.height() != targets.len() {
            return Err(RegressionError::LengthMismatch {
                rows: features.height(),
                targets: targets.len(),
            });
        }
        let pipeline = plan.fit(features, schema)?;
        let matrix = pipeline.transform(features)?;
        let ridge = RidgeRegression::fit(&matrix, targets, alpha)?;
        debug!(
            rows = matrix.rows(),
            features = matrix.cols(),
            alpha,
            "fitted ridge model"
        );
        Ok(Self { pipeline, ridge })
    }

    pub fn alpha(&self) -> f64 {
        self.ridge.alpha
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    pub fn ridge(&self) -> &RidgeRegression {
        &self.ridge
    }
}

impl Regressor for HousingModel {
    fn predict(&self, features: &DataFrame) -> Result<Vec<f64>, RegressionError> {
        let matrix = self.pipeline.transform(features)?;
        self.ridge.predict(&matrix)
    }
}

/// What the registry stores for each run.
///
/// The schema travels with the model so serving validates against exactly
/// the contract the model was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub run_id: RunId,
    pub trained_at: DateTime<Utc>,
    pub schema: Schema,
    pub model: HousingModel,
}
