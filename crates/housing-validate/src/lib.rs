//! Required-column validation for training and inference datasets.

mod validator;

pub use validator::{SchemaValidator, ValidatedDataset, ValidationError, ValidationOptions};

/// Validates `df` against `schema` with the given options.
pub fn validate(
    schema: &housing_model::Schema,
    df: &polars::prelude::DataFrame,
    options: ValidationOptions,
) -> Result<ValidatedDataset, ValidationError> {
    SchemaValidator::new(schema).validate(df, options)
}
