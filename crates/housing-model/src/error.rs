use thiserror::Error;

/// Errors raised while constructing model-level values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid run id: {0:?}")]
    InvalidRunId(String),
    #[error("schema must declare at least one required column")]
    EmptySchema,
    #[error("column declared more than once in schema: {0}")]
    DuplicateColumn(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
