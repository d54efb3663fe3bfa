use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

use housing_registry::RegistryError;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("column {column:?} is not in the dataset")]
    MissingColumn { column: String },

    /// Quantiles are undefined without at least one usable value.
    #[error("numeric column {column:?} has no non-missing values")]
    EmptyNumericColumn { column: String },

    #[error("training profile {path} is malformed")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read training profile {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Write(#[from] RegistryError),

    #[error(transparent)]
    Frame(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, ProfileError>;
