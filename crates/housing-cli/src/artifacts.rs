//! Locating the model and profile a command should use.

use std::path::PathBuf;

use anyhow::{Context, Result};

use housing_core::{Predictor, load_predictor};
use housing_model::AppConfig;
use housing_registry::ModelRegistry;

pub fn registry(config: &AppConfig) -> ModelRegistry {
    ModelRegistry::new(config.output.registry_dir())
}

/// The explicit `serve.model_path`, or the registry's active artifact.
pub fn resolve_model_path(config: &AppConfig) -> Result<PathBuf> {
    if let Some(path) = &config.serve.model_path {
        return Ok(path.clone());
    }
    registry(config)
        .resolve_active()
        .context("no model to load; run `housing train` or set serve.model_path")
}

pub fn profile_path(config: &AppConfig) -> PathBuf {
    config
        .serve
        .training_profile_path
        .clone()
        .unwrap_or_else(|| config.output.profile_path())
}

/// Builds the predictor described by the `[serve]` section.
pub fn configured_predictor(config: &AppConfig) -> Result<Predictor> {
    let model_path = resolve_model_path(config)?;
    let profile_path = profile_path(config);
    let predictor = load_predictor(&model_path, Some(profile_path.as_path()))?;
    Ok(predictor
        .with_allow_extra_columns(config.serve.allow_extra_columns)
        .with_strict_categories(config.serve.strict_categories))
}
