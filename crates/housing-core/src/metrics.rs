//! Held-out regression metrics.

use housing_model::RegressionMetrics;

pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len().min(y_pred.len());
    if n == 0 {
        return 0.0;
    }
    let mse = y_true
        .iter()
        .zip(y_pred)
        .map(|(truth, pred)| (truth - pred).powi(2))
        .sum::<f64>()
        / n as f64;
    mse.sqrt()
}

/// RMSE, MAE and R² of `y_pred` against `y_true`.
///
/// R² of a constant target is 1.0 for a perfect fit and 0.0 otherwise.
pub fn regression_metrics(y_true: &[f64], y_pred: &[f64]) -> RegressionMetrics {
    let n = y_true.len().min(y_pred.len());
    if n == 0 {
        return RegressionMetrics {
            rmse: 0.0,
            mae: 0.0,
            r2: 0.0,
        };
    }

    let mae = y_true
        .iter()
        .zip(y_pred)
        .map(|(truth, pred)| (truth - pred).abs())
        .sum::<f64>()
        / n as f64;

    let mean = y_true.iter().sum::<f64>() / n as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(truth, pred)| (truth - pred).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|truth| (truth - mean).powi(2)).sum();
    let r2 = if ss_tot == 0.0 {
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    };

    RegressionMetrics {
        rmse: rmse(y_true, y_pred),
        mae,
        r2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        let metrics = regression_metrics(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 6.0]);
        assert_eq!(metrics.rmse, 1.0);
        assert_eq!(metrics.mae, 0.5);
        // ss_res = 4, ss_tot = 5
        assert!((metrics.r2 - 0.2).abs() < 1e-12);
    }

    #[test]
    fn constant_target() {
        assert_eq!(regression_metrics(&[2.0, 2.0], &[2.0, 2.0]).r2, 1.0);
        assert_eq!(regression_metrics(&[2.0, 2.0], &[2.0, 3.0]).r2, 0.0);
    }
}
