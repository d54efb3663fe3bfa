use std::collections::BTreeSet;

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, PolarsError, Series};
use thiserror::Error;
use tracing::debug;

use housing_ingest::{column_f64, column_names, column_strings};
use housing_model::{Schema, SchemaError};

/// Flags controlling how strictly a dataset is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Accept columns the schema does not name (they are carried through unchanged).
    pub allow_extra_columns: bool,
    /// Reject categorical values outside the schema's allow-lists.
    pub strict_categories: bool,
    /// Reject datasets without rows.
    pub require_non_empty: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            allow_extra_columns: false,
            strict_categories: false,
            require_non_empty: true,
        }
    }
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allow_extra_columns(mut self, enable: bool) -> Self {
        self.allow_extra_columns = enable;
        self
    }

    pub fn with_strict_categories(mut self, enable: bool) -> Self {
        self.strict_categories = enable;
        self
    }

    pub fn with_require_non_empty(mut self, enable: bool) -> Self {
        self.require_non_empty = enable;
        self
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    /// The input breaks the schema contract.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// The frame itself could not be read or rebuilt.
    #[error("failed to rebuild validated frame: {0}")]
    Frame(#[from] PolarsError),
}

/// A dataset that passed [`SchemaValidator::validate`].
///
/// Required numeric columns are `Float64` with nulls for missing values and
/// required categorical columns are `String`.
#[derive(Debug, Clone)]
pub struct ValidatedDataset {
    frame: DataFrame,
}

impl ValidatedDataset {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Exactly the schema's required columns, in canonical order.
    pub fn required_frame(&self, schema: &Schema) -> Result<DataFrame, PolarsError> {
        self.frame.select(schema.required_columns())
    }
}

/// Enforces a [`Schema`] on incoming tabular data.
#[derive(Debug, Clone, Copy)]
pub struct SchemaValidator<'a> {
    schema: &'a Schema,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Checks `df` against the schema and returns a coerced copy.
    ///
    /// Checks run in a fixed order: empty input, missing columns, unexpected
    /// columns, numeric coercion, then categories. The first failing check is
    /// reported. `df` is never modified.
    pub fn validate(
        &self,
        df: &DataFrame,
        options: ValidationOptions,
    ) -> Result<ValidatedDataset, ValidationError> {
        if options.require_non_empty && df.height() == 0 {
            return Err(SchemaError::EmptyInput.into());
        }

        let present = column_names(df);
        let missing: Vec<String> = self
            .schema
            .required_columns()
            .into_iter()
            .filter(|name| !present.iter().any(|column| column.as_str() == *name))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns { missing }.into());
        }

        let extra: Vec<String> = present
            .iter()
            .filter(|name| !self.schema.is_required(name))
            .cloned()
            .collect();
        if !extra.is_empty() && !options.allow_extra_columns {
            return Err(SchemaError::UnexpectedColumns { extra }.into());
        }

        let mut all_missing = Vec::new();
        let mut columns: Vec<Column> = Vec::with_capacity(present.len());
        for name in &present {
            let column = if self.schema.is_numeric(name) {
                let values = column_f64(df, name)?;
                if df.height() > 0 && values.iter().all(Option::is_none) {
                    all_missing.push(name.clone());
                }
                Series::new(name.as_str().into(), values).into_column()
            } else if self.schema.is_required(name) {
                let values = column_strings(df, name)?;
                Series::new(name.as_str().into(), values).into_column()
            } else {
                df.column(name)?.clone()
            };
            columns.push(column);
        }
        if !all_missing.is_empty() {
            // Report in schema order rather than frame order.
            let columns = self
                .schema
                .numeric_columns()
                .iter()
                .filter(|name| all_missing.contains(name))
                .cloned()
                .collect();
            return Err(SchemaError::AllValuesMissing { columns }.into());
        }

        let frame = DataFrame::new(columns)?;

        if options.strict_categories {
            self.check_categories(&frame)?;
        }

        debug!(
            rows = frame.height(),
            columns = frame.width(),
            extra_columns = extra.len(),
            "dataset validated"
        );
        Ok(ValidatedDataset { frame })
    }

    fn check_categories(&self, frame: &DataFrame) -> Result<(), ValidationError> {
        for column in self.schema.categorical_columns() {
            if column.allowed.is_none() {
                continue;
            }
            let unknown: BTreeSet<String> = column_strings(frame, &column.name)?
                .into_iter()
                .flatten()
                .filter(|value| !column.is_allowed(value))
                .collect();
            if !unknown.is_empty() {
                return Err(SchemaError::UnknownCategory {
                    column: column.name.clone(),
                    values: unknown.into_iter().collect(),
                }
                .into());
            }
        }
        Ok(())
    }
}

impl ValidationError {
    /// The schema failure, if this is one.
    pub fn as_schema_error(&self) -> Option<&SchemaError> {
        match self {
            Self::Schema(error) => Some(error),
            Self::Frame(_) => None,
        }
    }
}
