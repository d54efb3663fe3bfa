//! CLI argument definitions for the `housing` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "housing",
    version,
    about = "Train, serve, and monitor the housing price model",
    long_about = "Train a regression model on tabular housing data, score batches of\n\
                  records against the active model, and report input drift\n\
                  relative to the training data."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Train a model, register it, and mark it active.
    Train(ConfigArgs),

    /// Score a JSON file of records with the configured model.
    Predict(PredictArgs),

    /// Serve predictions over HTTP.
    Serve(ServeArgs),

    /// Inspect or change the active model.
    #[command(subcommand)]
    Registry(RegistryCommand),
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Path to the TOML configuration file.
    #[arg(long = "config", value_name = "PATH", default_value = "configs/housing.toml")]
    pub config: PathBuf,
}

#[derive(Args)]
pub struct PredictArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// JSON file holding `{"records": [...]}` or a bare array of records.
    #[arg(long = "input", value_name = "PATH")]
    pub input: PathBuf,
}

#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Address to bind (overrides `serve.bind`).
    #[arg(long = "bind", value_name = "ADDR")]
    pub bind: Option<String>,
}

#[derive(Subcommand)]
pub enum RegistryCommand {
    /// Point the active entry at an existing run.
    Activate(ActivateArgs),

    /// Show the run currently marked active.
    Active(ConfigArgs),
}

#[derive(Args)]
pub struct ActivateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Run id of a previously saved model.
    #[arg(value_name = "RUN_ID")]
    pub run_id: String,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
