use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read csv {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("dataset is empty: {path}")]
    Empty { path: PathBuf },
    #[error("duplicate column {column:?} in {source_name}")]
    DuplicateColumn { column: String, source_name: String },
    #[error("column {column:?} row {row}: nested JSON values are not supported")]
    UnsupportedValue { column: String, row: usize },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
