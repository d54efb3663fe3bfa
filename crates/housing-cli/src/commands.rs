use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use housing_cli::artifacts::{configured_predictor, registry};
use housing_cli::input::read_records;
use housing_core::{ModelArtifact, TrainingRun, run_training};
use housing_model::{AppConfig, PredictResponse, RunId};
use housing_serve::{AppState, serve};

use crate::cli::{ActivateArgs, ConfigArgs, PredictArgs, ServeArgs};

fn load_config(path: &Path) -> Result<AppConfig> {
    let config = AppConfig::from_path(path)?;
    info!(path = %path.display(), "loaded config");
    Ok(config)
}

pub fn run_train(args: &ConfigArgs) -> Result<TrainingRun> {
    let config = load_config(&args.config)?;
    run_training(&config, Some(args.config.as_path()))
}

pub fn run_predict(args: &PredictArgs) -> Result<PredictResponse> {
    let config = load_config(&args.config.config)?;
    let predictor = configured_predictor(&config)?;
    let records = read_records(&args.input)?;

    let span = info_span!("predict", rows = records.len());
    let _guard = span.enter();
    let started = Instant::now();
    let prediction = predictor.predict_records(&records)?;
    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
    info!(latency_ms, "scored records");

    Ok(PredictResponse {
        predictions: prediction.predictions,
        drift: prediction.drift,
        latency_ms,
    })
}

pub fn run_serve(args: &ServeArgs) -> Result<()> {
    let config = load_config(&args.config.config)?;
    let bind = args.bind.as_deref().unwrap_or(&config.serve.bind);
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address {bind}"))?;
    let predictor = configured_predictor(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(serve(addr, AppState::new(predictor)))
}

pub fn run_activate(args: &ActivateArgs) -> Result<ActiveModel> {
    let config = load_config(&args.config.config)?;
    let run_id = RunId::new(args.run_id.as_str())?;
    registry(&config).set_active(&run_id)?;
    active_model(&config)
}

pub fn run_active(args: &ConfigArgs) -> Result<ActiveModel> {
    let config = load_config(&args.config)?;
    active_model(&config)
}

fn active_model(config: &AppConfig) -> Result<ActiveModel> {
    let (artifact, path) = registry(config).load_active::<ModelArtifact>()?;
    Ok(ActiveModel { artifact, path })
}

pub struct ActiveModel {
    pub artifact: ModelArtifact,
    pub path: PathBuf,
}
