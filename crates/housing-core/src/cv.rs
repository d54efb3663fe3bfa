//! K-fold cross-validation and ridge penalty selection.

use polars::prelude::DataFrame;
use tracing::{debug, info};

use housing_ingest::filter_rows;
use housing_model::{ModelConfig, Schema};

use crate::error::{RegressionError, TrainError};
use crate::metrics::rmse;
use crate::model::{HousingModel, Regressor};

/// Cross-validated RMSE for one penalty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossValidation {
    pub alpha: f64,
    pub rmse_mean: f64,
    /// Population standard deviation across folds.
    pub rmse_std: f64,
}

/// Contiguous, unshuffled folds; the first `n % k` folds get one extra row.
pub fn kfold_indices(n: usize, k: usize) -> Vec<Vec<usize>> {
    let base = n / k;
    let extra = n % k;
    let mut start = 0;
    (0..k)
        .map(|fold| {
            let size = base + usize::from(fold < extra);
            let rows: Vec<usize> = (start..start + size).collect();
            start += size;
            rows
        })
        .collect()
}

pub fn cross_validate(
    features: &DataFrame,
    targets: &[f64],
    schema: &Schema,
    alpha: f64,
    folds: usize,
) -> Result<CrossValidation, TrainError> {
    let rows = features.height();
    if folds < 2 || rows < folds {
        return Err(TrainError::TooFewRows { rows, folds });
    }

    let mut scores = Vec::with_capacity(folds);
    for fold in kfold_indices(rows, folds) {
        let mut held_out = vec![false; rows];
        for idx in &fold {
            held_out[*idx] = true;
        }
        let keep: Vec<bool> = held_out.iter().map(|held| !held).collect();

        let train = filter_rows(features, &keep)?;
        let train_targets: Vec<f64> = targets
            .iter()
            .zip(&keep)
            .filter(|(_, keep)| **keep)
            .map(|(target, _)| *target)
            .collect();
        let test = filter_rows(features, &held_out)?;
        let test_targets: Vec<f64> = fold.iter().map(|idx| targets[*idx]).collect();

        let model = HousingModel::fit(&train, &train_targets, schema, alpha)?;
        let predictions = model.predict(&test)?;
        scores.push(rmse(&test_targets, &predictions));
    }

    let n = scores.len() as f64;
    let rmse_mean = scores.iter().sum::<f64>() / n;
    let rmse_std = (scores.iter().map(|s| (s - rmse_mean).powi(2)).sum::<f64>() / n).sqrt();
    debug!(alpha, rmse_mean, rmse_std, "cross-validated penalty");
    Ok(CrossValidation {
        alpha,
        rmse_mean,
        rmse_std,
    })
}

/// Cross-validates every configured penalty and keeps the lowest mean RMSE.
/// Ties go to the penalty listed first.
pub fn select_alpha(
    features: &DataFrame,
    targets: &[f64],
    schema: &Schema,
    config: &ModelConfig,
) -> Result<CrossValidation, TrainError> {
    let mut best: Option<CrossValidation> = None;
    for alpha in &config.alphas {
        let result = cross_validate(features, targets, schema, *alpha, config.cv_folds)?;
        if best.is_none_or(|best| result.rmse_mean < best.rmse_mean) {
            best = Some(result);
        }
    }
    let best = best.ok_or(RegressionError::NoRows)?;
    info!(
        alpha = best.alpha,
        cv_rmse_mean = best.rmse_mean,
        cv_rmse_std = best.rmse_std,
        "selected ridge penalty"
    );
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_cover_rows_once() {
        let folds = kfold_indices(10, 3);
        assert_eq!(folds, vec![vec![0, 1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);
    }
}
