//! Summaries of the training distribution.

use std::collections::HashMap;

use polars::prelude::DataFrame;
use tracing::debug;

use housing_ingest::{column_f64, column_strings};
use housing_model::{MISSING_CATEGORY, NumericProfile, Schema, TrainingProfile};

use crate::error::{ProfileError, Result};
use crate::quantile::{quantile, sorted_present};

/// Profiles every schema column of the training features.
///
/// Must run on validated data. Missing categorical values are counted under
/// [`MISSING_CATEGORY`].
pub fn build_profile(df: &DataFrame, schema: &Schema) -> Result<TrainingProfile> {
    let mut profile = TrainingProfile::default();

    for name in schema.numeric_columns() {
        let values = numeric_values(df, name)?;
        let summary = numeric_profile(name, &values)?;
        profile.numeric.insert(name.clone(), summary);
    }

    for name in schema.categorical_names() {
        let values = categorical_values(df, name)?;
        let frequencies = category_frequencies(&values).into_iter().collect();
        profile.categorical.insert(name.to_string(), frequencies);
    }

    debug!(
        rows = df.height(),
        numeric = profile.numeric.len(),
        categorical = profile.categorical.len(),
        "built training profile"
    );
    Ok(profile)
}

fn numeric_profile(column: &str, values: &[Option<f64>]) -> Result<NumericProfile> {
    let sorted = sorted_present(values);
    let at = |q: f64| {
        quantile(&sorted, q).ok_or_else(|| ProfileError::EmptyNumericColumn {
            column: column.to_string(),
        })
    };
    Ok(NumericProfile {
        count: sorted.len(),
        q01: at(0.01)?,
        q05: at(0.05)?,
        q50: at(0.50)?,
        q95: at(0.95)?,
        q99: at(0.99)?,
    })
}

pub(crate) fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    ensure_column(df, column)?;
    Ok(column_f64(df, column)?)
}

/// Column values with missing entries folded into the sentinel category.
pub(crate) fn categorical_values(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    ensure_column(df, column)?;
    Ok(column_strings(df, column)?
        .into_iter()
        .map(|value| value.unwrap_or_else(|| MISSING_CATEGORY.to_string()))
        .collect())
}

/// Relative frequency of each distinct value, in first-seen order.
pub(crate) fn category_frequencies(values: &[String]) -> Vec<(String, f64)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values.iter().map(String::as_str) {
        match positions.get(value) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                positions.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }

    let total = values.len() as f64;
    counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count as f64 / total))
        .collect()
}

fn ensure_column(df: &DataFrame, column: &str) -> Result<()> {
    if df.column(column).is_err() {
        return Err(ProfileError::MissingColumn {
            column: column.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequencies_keep_first_seen_order() {
        let values: Vec<String> = ["B", "A", "B", "C"].iter().map(|v| v.to_string()).collect();
        let frequencies = category_frequencies(&values);
        assert_eq!(
            frequencies,
            vec![
                ("B".to_string(), 0.5),
                ("A".to_string(), 0.25),
                ("C".to_string(), 0.25)
            ]
        );
    }

    #[test]
    fn no_values_means_no_frequencies() {
        assert!(category_frequencies(&[]).is_empty());
    }

    #[test]
    fn empty_numeric_column_is_an_error() {
        let err = numeric_profile("x", &[None, None]).unwrap_err();
        assert!(matches!(err, ProfileError::EmptyNumericColumn { column } if column == "x"));
    }
}
