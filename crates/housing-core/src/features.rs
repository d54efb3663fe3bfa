//! Feature engineering for the housing regressor.
//!
//! Numeric inputs are median-imputed, then turned into ratio, log and
//! passthrough features that are each standardized. Categorical inputs are
//! imputed with their most frequent value and one-hot encoded; categories
//! unseen at fit time encode as all zeros.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use housing_ingest::{column_f64, column_strings};
use housing_model::{MISSING_CATEGORY, Schema};
use housing_profile::{quantile, sorted_present};

use crate::error::RegressionError;

/// `numerator / denominator`, or 0.0 when the denominator is zero.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// `ln(1 + x)` with negative inputs clipped to zero.
pub fn safe_log1p(value: f64) -> f64 {
    value.max(0.0).ln_1p()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioFeature {
    pub name: String,
    pub numerator: String,
    pub denominator: String,
}

impl RatioFeature {
    fn new(name: &str, numerator: &str, denominator: &str) -> Self {
        Self {
            name: name.to_string(),
            numerator: numerator.to_string(),
            denominator: denominator.to_string(),
        }
    }
}

/// Which engineered features to derive from the schema's numeric columns.
///
/// Numeric columns that feed neither a ratio nor a log feature are passed
/// through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturePlan {
    pub ratios: Vec<RatioFeature>,
    pub log_columns: Vec<String>,
}

impl FeaturePlan {
    pub fn housing() -> Self {
        Self {
            ratios: vec![
                RatioFeature::new("bedrooms", "total_bedrooms", "total_rooms"),
                RatioFeature::new("rooms_per_house", "total_rooms", "households"),
                RatioFeature::new("people_per_house", "population", "households"),
            ],
            log_columns: [
                "total_bedrooms",
                "total_rooms",
                "population",
                "households",
                "median_income",
            ]
            .iter()
            .map(|name| (*name).to_string())
            .collect(),
        }
    }

    /// Engineered numeric features in output order: ratios, logs, passthrough.
    fn kinds(&self, schema: &Schema) -> Vec<(String, FeatureKind)> {
        let mut used: BTreeSet<&str> = BTreeSet::new();
        let mut kinds = Vec::new();
        for ratio in &self.ratios {
            used.insert(&ratio.numerator);
            used.insert(&ratio.denominator);
            kinds.push((
                ratio.name.clone(),
                FeatureKind::Ratio {
                    numerator: ratio.numerator.clone(),
                    denominator: ratio.denominator.clone(),
                },
            ));
        }
        for column in &self.log_columns {
            used.insert(column);
            kinds.push((
                format!("log_{column}"),
                FeatureKind::Log {
                    column: column.clone(),
                },
            ));
        }
        for column in schema.numeric_columns() {
            if !used.contains(column.as_str()) {
                kinds.push((
                    column.clone(),
                    FeatureKind::Passthrough {
                        column: column.clone(),
                    },
                ));
            }
        }
        kinds
    }

    /// Learns imputation, scaling and encoding parameters from `df`.
    pub fn fit(
        &self,
        df: &DataFrame,
        schema: &Schema,
    ) -> Result<FeaturePipeline, RegressionError> {
        let mut medians = BTreeMap::new();
        for column in schema.numeric_columns() {
            let values = read_numeric(df, column)?;
            let median = quantile(&sorted_present(&values), 0.5).ok_or_else(|| {
                RegressionError::NoValues {
                    column: column.clone(),
                }
            })?;
            medians.insert(column.clone(), median);
        }

        let inputs = imputed_inputs(df, &medians)?;
        let numeric = self
            .kinds(schema)
            .into_iter()
            .map(|(name, kind)| {
                let raw = kind.compute(&inputs)?;
                let (mean, scale) = standardization(&raw);
                Ok(ScaledFeature {
                    name,
                    kind,
                    mean,
                    scale,
                })
            })
            .collect::<Result<Vec<_>, RegressionError>>()?;

        let categorical = schema
            .categorical_names()
            .map(|column| OneHotEncoder::fit(df, column))
            .collect::<Result<Vec<_>, RegressionError>>()?;

        Ok(FeaturePipeline {
            medians,
            numeric,
            categorical,
        })
    }
}

impl Default for FeaturePlan {
    fn default() -> Self {
        Self::housing()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum FeatureKind {
    Ratio { numerator: String, denominator: String },
    Log { column: String },
    Passthrough { column: String },
}

impl FeatureKind {
    fn compute(&self, inputs: &BTreeMap<&str, Vec<f64>>) -> Result<Vec<f64>, RegressionError> {
        let input = |column: &str| {
            inputs
                .get(column)
                .ok_or_else(|| RegressionError::MissingFeature {
                    column: column.to_string(),
                })
        };
        Ok(match self {
            Self::Ratio {
                numerator,
                denominator,
            } => input(numerator.as_str())?
                .iter()
                .zip(input(denominator.as_str())?)
                .map(|(num, den)| safe_ratio(*num, *den))
                .collect(),
            Self::Log { column } => input(column.as_str())?.iter().copied().map(safe_log1p).collect(),
            Self::Passthrough { column } => input(column.as_str())?.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScaledFeature {
    name: String,
    #[serde(flatten)]
    kind: FeatureKind,
    mean: f64,
    scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OneHotEncoder {
    column: String,
    /// Replacement for missing values: the most frequent training value.
    fill: String,
    /// Sorted training categories, one output column each.
    categories: Vec<String>,
}

impl OneHotEncoder {
    fn fit(df: &DataFrame, column: &str) -> Result<Self, RegressionError> {
        let values = read_categorical(df, column)?;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for value in values.iter().flatten() {
            *counts.entry(value.as_str()).or_default() += 1;
        }
        // Ties go to the smallest value.
        let fill = counts
            .iter()
            .fold(None::<(&str, usize)>, |best, (value, count)| match best {
                Some((_, best_count)) if best_count >= *count => best,
                _ => Some((*value, *count)),
            })
            .map_or(MISSING_CATEGORY, |(value, _)| value)
            .to_string();

        let mut categories: BTreeSet<String> =
            counts.keys().map(|value| (*value).to_string()).collect();
        if values.iter().any(Option::is_none) {
            categories.insert(fill.clone());
        }

        Ok(Self {
            column: column.to_string(),
            fill,
            categories: categories.into_iter().collect(),
        })
    }

    fn encode(&self, value: Option<&str>, out: &mut [f64]) {
        let value = value.unwrap_or(self.fill.as_str());
        let found = self
            .categories
            .binary_search_by(|category| category.as_str().cmp(value));
        if let Ok(idx) = found {
            out[idx] = 1.0;
        }
    }
}

/// Fitted preprocessing: turns validated input columns into a dense design
/// matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePipeline {
    medians: BTreeMap<String, f64>,
    numeric: Vec<ScaledFeature>,
    categorical: Vec<OneHotEncoder>,
}

impl FeaturePipeline {
    /// Output column names in matrix order.
    pub fn feature_names(&self) -> Vec<String> {
        let numeric = self.numeric.iter().map(|feature| feature.name.clone());
        let categorical = self.categorical.iter().flat_map(|encoder| {
            encoder
                .categories
                .iter()
                .map(move |category| format!("{}_{category}", encoder.column))
        });
        numeric.chain(categorical).collect()
    }

    pub fn width(&self) -> usize {
        self.numeric.len()
            + self
                .categorical
                .iter()
                .map(|encoder| encoder.categories.len())
                .sum::<usize>()
    }

    /// Median used to fill missing values of a numeric input.
    pub fn median(&self, column: &str) -> Option<f64> {
        self.medians.get(column).copied()
    }

    pub fn transform(&self, df: &DataFrame) -> Result<FeatureMatrix, RegressionError> {
        let rows = df.height();
        let cols = self.width();
        let mut values = vec![0.0; rows * cols];

        let inputs = imputed_inputs(df, &self.medians)?;
        for (col, feature) in self.numeric.iter().enumerate() {
            let raw = feature.kind.compute(&inputs)?;
            for (row, value) in raw.into_iter().enumerate() {
                values[row * cols + col] = (value - feature.mean) / feature.scale;
            }
        }

        let mut offset = self.numeric.len();
        for encoder in &self.categorical {
            let width = encoder.categories.len();
            let column = read_categorical(df, &encoder.column)?;
            for (row, value) in column.iter().enumerate() {
                let start = row * cols + offset;
                encoder.encode(value.as_deref(), &mut values[start..start + width]);
            }
            offset += width;
        }

        Ok(FeatureMatrix { rows, cols, values })
    }
}

/// Dense row-major matrix of model inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl FeatureMatrix {
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        Self {
            rows: rows.len(),
            cols,
            values: rows.iter().flatten().copied().collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, idx: usize) -> &[f64] {
        &self.values[idx * self.cols..(idx + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).map(move |idx| self.row(idx))
    }
}

fn read_numeric(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>, RegressionError> {
    if df.column(column).is_err() {
        return Err(RegressionError::MissingFeature {
            column: column.to_string(),
        });
    }
    Ok(column_f64(df, column)?)
}

fn read_categorical(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>, RegressionError> {
    if df.column(column).is_err() {
        return Err(RegressionError::MissingFeature {
            column: column.to_string(),
        });
    }
    Ok(column_strings(df, column)?)
}

fn imputed_inputs<'a>(
    df: &DataFrame,
    medians: &'a BTreeMap<String, f64>,
) -> Result<BTreeMap<&'a str, Vec<f64>>, RegressionError> {
    medians
        .iter()
        .map(|(column, median)| {
            let values = read_numeric(df, column)?
                .into_iter()
                .map(|value| value.unwrap_or(*median))
                .collect();
            Ok((column.as_str(), values))
        })
        .collect()
}

/// Mean and population standard deviation; constant columns keep scale 1.0.
fn standardization(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 1.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    let scale = if std > 1e-12 * mean.abs().max(1.0) {
        std
    } else {
        1.0
    };
    (mean, scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_transforms() {
        assert_eq!(safe_ratio(3.0, 0.0), 0.0);
        assert_eq!(safe_ratio(3.0, 2.0), 1.5);
        assert_eq!(safe_log1p(-5.0), 0.0);
        assert!((safe_log1p(std::f64::consts::E - 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn standardization_keeps_unit_scale_for_constants() {
        assert_eq!(standardization(&[2.0, 2.0, 2.0]), (2.0, 1.0));
        let (mean, scale) = standardization(&[1.0, 3.0]);
        assert_eq!(mean, 2.0);
        assert_eq!(scale, 1.0);
        let (_, scale) = standardization(&[0.0, 4.0]);
        assert_eq!(scale, 2.0);
    }

    #[test]
    fn housing_plan_passes_location_and_age_through() {
        let kinds = FeaturePlan::housing().kinds(&Schema::housing());
        let names: Vec<&str> = kinds.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "bedrooms",
                "rooms_per_house",
                "people_per_house",
                "log_total_bedrooms",
                "log_total_rooms",
                "log_population",
                "log_households",
                "log_median_income",
                "longitude",
                "latitude",
                "housing_median_age",
            ]
        );
    }
}
