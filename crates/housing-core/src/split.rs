//! Stratified train/test split on binned income.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::info;

use housing_ingest::{column_f64, filter_rows};
use housing_model::DataConfig;

use crate::error::TrainError;

/// Assigns each value to a right-closed bin `(edges[i], edges[i + 1]]`.
///
/// Missing values and values outside every bin are counted and reported as
/// [`TrainError::OutOfBins`].
pub fn income_categories(
    column: &str,
    values: &[Option<f64>],
    edges: &[f64],
    labels: &[u32],
) -> Result<Vec<u32>, TrainError> {
    let mut out_of_bins = 0;
    let categories: Vec<u32> = values
        .iter()
        .map(|value| {
            value
                .and_then(|value| {
                    edges
                        .windows(2)
                        .zip(labels)
                        .find(|(bin, _)| value > bin[0] && value <= bin[1])
                        .map(|(_, label)| *label)
                })
                .unwrap_or_else(|| {
                    out_of_bins += 1;
                    0
                })
        })
        .collect();

    if out_of_bins > 0 {
        return Err(TrainError::OutOfBins {
            column: column.to_string(),
            count: out_of_bins,
        });
    }
    Ok(categories)
}

/// Row indices of each side of a split, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles each stratum with a seeded RNG and moves `round(test_size * n)`
/// of its rows to the test side.
pub fn stratified_indices(strata: &[u32], test_size: f64, seed: u64) -> SplitIndices {
    let mut groups: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (idx, stratum) in strata.iter().enumerate() {
        groups.entry(*stratum).or_default().push(idx);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(strata.len());
    let mut test = Vec::new();
    for rows in groups.values_mut() {
        rows.shuffle(&mut rng);
        let n_test = ((rows.len() as f64 * test_size).round() as usize).min(rows.len());
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }
    train.sort_unstable();
    test.sort_unstable();
    SplitIndices { train, test }
}

/// Splits `df` into train and test frames stratified on the configured
/// income column. Row order within each side follows `df`.
pub fn stratified_split(
    df: &DataFrame,
    data: &DataConfig,
) -> Result<(DataFrame, DataFrame), TrainError> {
    if df.column(&data.stratify_col).is_err() {
        return Err(TrainError::MissingColumn {
            column: data.stratify_col.clone(),
        });
    }
    let income = column_f64(df, &data.stratify_col)?;
    let strata = income_categories(
        &data.stratify_col,
        &income,
        &data.income_cat_bins,
        &data.income_cat_labels,
    )?;

    let split = stratified_indices(&strata, data.test_size, data.random_state);
    if split.train.is_empty() || split.test.is_empty() {
        return Err(TrainError::EmptySplit {
            train: split.train.len(),
            test: split.test.len(),
        });
    }

    let mut mask = vec![false; df.height()];
    for idx in &split.test {
        mask[*idx] = true;
    }
    let test = filter_rows(df, &mask)?;
    let train_mask: Vec<bool> = mask.iter().map(|in_test| !in_test).collect();
    let train = filter_rows(df, &train_mask)?;

    info!(train = train.height(), test = test.height(), "split dataset");
    Ok((train, test))
}
