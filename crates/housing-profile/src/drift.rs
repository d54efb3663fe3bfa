//! Batch-versus-training distribution comparison.

use polars::prelude::DataFrame;
use tracing::debug;

use housing_model::{CategoricalDrift, DriftReport, NumericDrift, TrainingProfile};

use crate::error::{ProfileError, Result};
use crate::profiler::{categorical_values, category_frequencies, numeric_values};
use crate::quantile::{quantile, sorted_present};

/// Baseline medians at or below this magnitude are replaced by 1.0 as the
/// shift denominator.
pub const MEDIAN_EPSILON: f64 = 1e-9;

/// Number of current categories reported per column.
pub const TOP_CATEGORIES: usize = 5;

/// Compares `df` against `profile`.
///
/// Only columns named by the profile are inspected; anything else in the
/// batch is ignored.
pub fn compare(df: &DataFrame, profile: &TrainingProfile) -> Result<DriftReport> {
    let mut report = DriftReport::default();

    for (name, baseline) in &profile.numeric {
        let sorted = sorted_present(&numeric_values(df, name)?);
        let current_q50 =
            quantile(&sorted, 0.5).ok_or_else(|| ProfileError::EmptyNumericColumn {
                column: name.clone(),
            })?;
        report.numeric.insert(
            name.clone(),
            NumericDrift {
                current_q50,
                baseline_q50: baseline.q50,
                rel_shift: relative_shift(current_q50, baseline.q50),
            },
        );
    }

    for (name, baseline) in &profile.categorical {
        let current = category_frequencies(&categorical_values(df, name)?);
        let unknown_share = current
            .iter()
            .filter(|(value, _)| !baseline.contains_key(value))
            .map(|(_, share)| share)
            .sum();

        let mut current_top = current;
        // Stable: equal shares stay in first-seen order.
        current_top.sort_by(|left, right| right.1.total_cmp(&left.1));
        current_top.truncate(TOP_CATEGORIES);

        report.categorical.insert(
            name.clone(),
            CategoricalDrift {
                unknown_share,
                current_top,
            },
        );
    }

    if let Some((column, shift)) = report.max_abs_shift() {
        debug!(rows = df.height(), column, shift, "compared batch to profile");
    }
    Ok(report)
}

/// `(current - baseline) / |baseline|`, with a denominator of 1.0 when the
/// baseline is effectively zero.
pub fn relative_shift(current: f64, baseline: f64) -> f64 {
    let denominator = if baseline.abs() > MEDIAN_EPSILON {
        baseline.abs()
    } else {
        1.0
    };
    (current - baseline) / denominator
}
