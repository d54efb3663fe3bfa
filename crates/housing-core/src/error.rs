//! Error types for modelling, prediction and training.

use polars::prelude::PolarsError;
use thiserror::Error;

use housing_ingest::IngestError;
use housing_model::SchemaError;
use housing_profile::ProfileError;
use housing_validate::ValidationError;

/// Failures inside the feature pipeline or the regressor.
#[derive(Debug, Error)]
pub enum RegressionError {
    #[error("normal equations are singular; use a larger ridge penalty")]
    SingularSystem,
    #[error("cannot fit a model on zero rows")]
    NoRows,
    #[error("{rows} feature rows but {targets} targets")]
    LengthMismatch { rows: usize, targets: usize },
    #[error("model expects {expected} features, got {found}")]
    FeatureMismatch { expected: usize, found: usize },
    #[error("input column {column:?} is missing")]
    MissingFeature { column: String },
    #[error("input column {column:?} has no values to learn from")]
    NoValues { column: String },
    #[error(transparent)]
    Frame(#[from] PolarsError),
}

/// Failures answering a prediction request.
///
/// [`PredictError::Schema`] and [`PredictError::Records`] describe bad client
/// input; every other variant is a server fault.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("invalid prediction records: {0}")]
    Records(#[source] IngestError),
    #[error("model prediction failed: {0}")]
    Model(#[from] RegressionError),
    #[error("drift comparison failed: {0}")]
    Drift(#[from] ProfileError),
    #[error("failed to prepare model input: {0}")]
    Frame(#[from] PolarsError),
}

impl PredictError {
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Schema(_) => true,
            Self::Records(error) => !matches!(error, IngestError::Polars(_)),
            Self::Model(_) | Self::Drift(_) | Self::Frame(_) => false,
        }
    }

    pub fn as_schema_error(&self) -> Option<&SchemaError> {
        match self {
            Self::Schema(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ValidationError> for PredictError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::Schema(error) => Self::Schema(error),
            ValidationError::Frame(error) => Self::Frame(error),
        }
    }
}

/// Failures specific to preparing and fitting a training run.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("column {column:?} is missing from the training data")]
    MissingColumn { column: String },
    #[error("target column {column:?} has {rows} missing or non-numeric rows")]
    InvalidTarget { column: String, rows: usize },
    #[error("{column} has {count} values outside the stratification bins")]
    OutOfBins { column: String, count: usize },
    #[error("split produced {train} training and {test} test rows")]
    EmptySplit { train: usize, test: usize },
    #[error("{rows} training rows cannot be split into {folds} folds")]
    TooFewRows { rows: usize, folds: usize },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Regression(#[from] RegressionError),
    #[error(transparent)]
    Frame(#[from] PolarsError),
}
