//! Registry error types.

use std::path::PathBuf;

use thiserror::Error;

use housing_model::RunId;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// `set_active` was asked to point at a run that was never saved.
    #[error("no model artifact for run {run_id} at {path}")]
    ArtifactNotFound { run_id: RunId, path: PathBuf },

    /// The registry has no usable active pointer.
    #[error("no active model in {dir}")]
    NoActiveModel { dir: PathBuf },

    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize {path}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl RegistryError {
    pub(crate) fn io(
        operation: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io {
            operation,
            path,
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
