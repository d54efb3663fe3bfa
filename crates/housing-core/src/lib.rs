//! Housing price model: feature pipeline, ridge regression, prediction with
//! drift reporting, and the training run that produces registry artifacts.

pub mod cv;
pub mod error;
pub mod features;
pub mod metrics;
pub mod model;
pub mod predictor;
pub mod ridge;
pub mod split;
pub mod train;

pub use cv::{CrossValidation, cross_validate, kfold_indices, select_alpha};
pub use error::{PredictError, RegressionError, TrainError};
pub use features::{FeatureMatrix, FeaturePipeline, FeaturePlan, RatioFeature, safe_log1p, safe_ratio};
pub use metrics::{regression_metrics, rmse};
pub use model::{HousingModel, ModelArtifact, Regressor};
pub use predictor::{Prediction, Predictor, load_predictor};
pub use ridge::RidgeRegression;
pub use split::{SplitIndices, income_categories, stratified_indices, stratified_split};
pub use train::{TrainingRun, features_and_target, run_training};
