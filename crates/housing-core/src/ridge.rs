//! Ridge regression solved from the normal equations.

use serde::{Deserialize, Serialize};

use crate::error::RegressionError;
use crate::features::FeatureMatrix;

/// Linear model with an L2 penalty on the coefficients.
///
/// The intercept is not penalized: features and targets are centered before
/// solving `(XᵀX + αI) w = Xᵀy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeRegression {
    pub alpha: f64,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl RidgeRegression {
    pub fn fit(x: &FeatureMatrix, y: &[f64], alpha: f64) -> Result<Self, RegressionError> {
        let n = x.rows();
        if n == 0 {
            return Err(RegressionError::NoRows);
        }
        if y.len() != n {
            return Err(RegressionError::LengthMismatch {
                rows: n,
                targets: y.len(),
            });
        }

        let p = x.cols();
        let mut means = vec![0.0; p];
        for row in x.iter_rows() {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= n as f64;
        }
        let y_mean = y.iter().sum::<f64>() / n as f64;

        let mut gram = vec![0.0; p * p];
        let mut rhs = vec![0.0; p];
        let mut centered = vec![0.0; p];
        for (row, target) in x.iter_rows().zip(y) {
            for (slot, (value, mean)) in centered.iter_mut().zip(row.iter().zip(&means)) {
                *slot = value - mean;
            }
            let target = target - y_mean;
            for i in 0..p {
                rhs[i] += centered[i] * target;
                for j in i..p {
                    gram[i * p + j] += centered[i] * centered[j];
                }
            }
        }
        for i in 0..p {
            for j in 0..i {
                gram[i * p + j] = gram[j * p + i];
            }
            gram[i * p + i] += alpha;
        }

        let coefficients = solve(gram, rhs, p)?;
        let intercept = y_mean
            - means
                .iter()
                .zip(&coefficients)
                .map(|(mean, coef)| mean * coef)
                .sum::<f64>();

        Ok(Self {
            alpha,
            intercept,
            coefficients,
        })
    }

    pub fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>, RegressionError> {
        if x.cols() != self.coefficients.len() {
            return Err(RegressionError::FeatureMismatch {
                expected: self.coefficients.len(),
                found: x.cols(),
            });
        }
        Ok(x.iter_rows()
            .map(|row| {
                self.intercept
                    + row
                        .iter()
                        .zip(&self.coefficients)
                        .map(|(value, coef)| value * coef)
                        .sum::<f64>()
            })
            .collect())
    }
}

/// Gaussian elimination with partial pivoting on a row-major `n × n` system.
fn solve(mut a: Vec<f64>, mut b: Vec<f64>, n: usize) -> Result<Vec<f64>, RegressionError> {
    let magnitude = a.iter().fold(0.0_f64, |acc, value| acc.max(value.abs()));
    let tolerance = magnitude * 1e-12;

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&left, &right| a[left * n + col].abs().total_cmp(&a[right * n + col].abs()))
            .unwrap_or(col);
        if a[pivot * n + col].abs() <= tolerance {
            return Err(RegressionError::SingularSystem);
        }
        if pivot != col {
            for k in 0..n {
                a.swap(col * n + k, pivot * n + k);
            }
            b.swap(col, pivot);
        }

        for row in col + 1..n {
            let factor = a[row * n + col] / a[col * n + col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row * n + k] -= factor * a[col * n + k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row * n + k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row * n + row];
    }
    Ok(x)
}
