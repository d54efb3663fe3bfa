//! Required-column contract shared by training and serving.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ModelError;

/// Numeric columns the housing dataset must provide, in model order.
pub const HOUSING_NUMERIC_COLUMNS: &[&str] = &[
    "longitude",
    "latitude",
    "housing_median_age",
    "total_rooms",
    "total_bedrooms",
    "population",
    "households",
    "median_income",
];

/// Categorical columns the housing dataset must provide.
pub const HOUSING_CATEGORICAL_COLUMNS: &[&str] = &["ocean_proximity"];

/// Accepted `ocean_proximity` values.
pub const OCEAN_PROXIMITY_VALUES: &[&str] =
    &["<1H OCEAN", "INLAND", "ISLAND", "NEAR BAY", "NEAR OCEAN"];

/// A required categorical column and its optional allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
}

impl CategoricalColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allowed: None,
        }
    }

    pub fn with_allowed<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_allowed(&self, value: &str) -> bool {
        self.allowed
            .as_ref()
            .is_none_or(|allowed| allowed.iter().any(|candidate| candidate == value))
    }
}

/// The fixed set of columns a dataset must carry.
///
/// Column names are exact and case-sensitive. Numeric columns keep their
/// declaration order; that order, followed by the categorical columns, is the
/// canonical order the model is fit and evaluated on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SchemaRepr", into = "SchemaRepr")]
pub struct Schema {
    numeric: Vec<String>,
    categorical: Vec<CategoricalColumn>,
}

#[derive(Serialize, Deserialize)]
struct SchemaRepr {
    numeric: Vec<String>,
    categorical: Vec<CategoricalColumn>,
}

impl TryFrom<SchemaRepr> for Schema {
    type Error = ModelError;

    fn try_from(raw: SchemaRepr) -> Result<Self, Self::Error> {
        Schema::new(raw.numeric, raw.categorical)
    }
}

impl From<Schema> for SchemaRepr {
    fn from(schema: Schema) -> Self {
        Self {
            numeric: schema.numeric,
            categorical: schema.categorical,
        }
    }
}

impl Schema {
    pub fn new(
        numeric: Vec<String>,
        categorical: Vec<CategoricalColumn>,
    ) -> Result<Self, ModelError> {
        if numeric.is_empty() && categorical.is_empty() {
            return Err(ModelError::EmptySchema);
        }
        let mut seen = BTreeSet::new();
        let names = numeric
            .iter()
            .map(String::as_str)
            .chain(categorical.iter().map(|column| column.name.as_str()));
        for name in names {
            if !seen.insert(name) {
                return Err(ModelError::DuplicateColumn(name.to_string()));
            }
        }
        Ok(Self {
            numeric,
            categorical,
        })
    }

    /// The California housing contract.
    pub fn housing() -> Self {
        Self {
            numeric: HOUSING_NUMERIC_COLUMNS
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            categorical: vec![
                CategoricalColumn::new(HOUSING_CATEGORICAL_COLUMNS[0])
                    .with_allowed(OCEAN_PROXIMITY_VALUES.iter().copied()),
            ],
        }
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric
    }

    pub fn categorical_columns(&self) -> &[CategoricalColumn] {
        &self.categorical
    }

    pub fn categorical_names(&self) -> impl Iterator<Item = &str> {
        self.categorical.iter().map(|column| column.name.as_str())
    }

    /// All required columns in canonical order.
    pub fn required_columns(&self) -> Vec<&str> {
        self.numeric
            .iter()
            .map(String::as_str)
            .chain(self.categorical_names())
            .collect()
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.numeric.iter().any(|column| column == name)
            || self.categorical_names().any(|column| column == name)
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.numeric.iter().any(|column| column == name)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::housing()
    }
}

/// Discriminant of a [`SchemaError`], stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaErrorKind {
    EmptyInput,
    MissingColumns,
    UnexpectedColumns,
    AllValuesMissing,
    UnknownCategory,
}

impl SchemaErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::MissingColumns => "missing_columns",
            Self::UnexpectedColumns => "unexpected_columns",
            Self::AllValuesMissing => "all_values_missing",
            Self::UnknownCategory => "unknown_category",
        }
    }
}

/// A dataset that does not satisfy the [`Schema`].
///
/// This is a client-side failure: the input must change, not the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("input dataset is empty")]
    EmptyInput,
    #[error("missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
    #[error("unexpected extra columns: {}", .extra.join(", "))]
    UnexpectedColumns { extra: Vec<String> },
    #[error("numeric columns contain no valid numbers: {}", .columns.join(", "))]
    AllValuesMissing { columns: Vec<String> },
    #[error("unknown {column} categories: {}", .values.join(", "))]
    UnknownCategory { column: String, values: Vec<String> },
}

impl SchemaError {
    pub fn kind(&self) -> SchemaErrorKind {
        match self {
            Self::EmptyInput => SchemaErrorKind::EmptyInput,
            Self::MissingColumns { .. } => SchemaErrorKind::MissingColumns,
            Self::UnexpectedColumns { .. } => SchemaErrorKind::UnexpectedColumns,
            Self::AllValuesMissing { .. } => SchemaErrorKind::AllValuesMissing,
            Self::UnknownCategory { .. } => SchemaErrorKind::UnknownCategory,
        }
    }

    /// Key/value detail set attached to the failure.
    pub fn details(&self) -> BTreeMap<&'static str, Vec<String>> {
        let mut details = BTreeMap::new();
        match self {
            Self::EmptyInput => {}
            Self::MissingColumns { missing } => {
                details.insert("missing", missing.clone());
            }
            Self::UnexpectedColumns { extra } => {
                details.insert("extra", extra.clone());
            }
            Self::AllValuesMissing { columns } => {
                details.insert("all_nan_columns", columns.clone());
            }
            Self::UnknownCategory { column, values } => {
                details.insert("column", vec![column.clone()]);
                details.insert("unknown", values.clone());
            }
        }
        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn housing_schema_orders_numeric_before_categorical() {
        let schema = Schema::housing();
        let required = schema.required_columns();
        assert_eq!(required.len(), 9);
        assert_eq!(required[0], "longitude");
        assert_eq!(required[8], "ocean_proximity");
        assert!(schema.is_numeric("median_income"));
        assert!(!schema.is_numeric("ocean_proximity"));
        assert!(schema.is_required("ocean_proximity"));
        assert!(!schema.is_required("Ocean_Proximity"));
    }

    #[test]
    fn rejects_duplicate_and_empty_schemas() {
        assert_eq!(Schema::new(vec![], vec![]), Err(ModelError::EmptySchema));
        let duplicate = Schema::new(vec!["x".into()], vec![CategoricalColumn::new("x")]);
        assert_eq!(duplicate, Err(ModelError::DuplicateColumn("x".into())));
    }

    #[test]
    fn allow_list_membership() {
        let open = CategoricalColumn::new("cat");
        assert!(open.is_allowed("anything"));
        let closed = CategoricalColumn::new("cat").with_allowed(["A", "B"]);
        assert!(closed.is_allowed("A"));
        assert!(!closed.is_allowed("a"));
    }

    #[test]
    fn schema_round_trips_through_json_with_validation() {
        let json = serde_json::to_string(&Schema::housing()).unwrap();
        let back: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Schema::housing());
        let bad = r#"{"numeric":["x","x"],"categorical":[]}"#;
        assert!(serde_json::from_str::<Schema>(bad).is_err());
    }

    #[test]
    fn details_carry_the_offending_names() {
        let error = SchemaError::UnknownCategory {
            column: "cat".into(),
            values: vec!["Z".into()],
        };
        assert_eq!(error.kind(), SchemaErrorKind::UnknownCategory);
        let details = error.details();
        assert_eq!(details["unknown"], vec!["Z".to_string()]);
        assert_eq!(details["column"], vec!["cat".to_string()]);
        assert!(SchemaError::EmptyInput.details().is_empty());

        let all_missing = SchemaError::AllValuesMissing {
            columns: vec!["total_rooms".into()],
        };
        assert_eq!(
            all_missing.details()["all_nan_columns"],
            vec!["total_rooms".to_string()]
        );
    }

    #[test]
    fn messages_are_readable() {
        insta::assert_snapshot!(
            SchemaError::MissingColumns { missing: vec!["y".into(), "cat".into()] },
            @"missing required columns: y, cat"
        );
        insta::assert_snapshot!(
            SchemaError::UnknownCategory { column: "ocean_proximity".into(), values: vec!["MARS".into()] },
            @"unknown ocean_proximity categories: MARS"
        );
    }
}
