use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Median shift of one numeric column against its training baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericDrift {
    pub current_q50: f64,
    pub baseline_q50: f64,
    pub rel_shift: f64,
}

/// Category mix of one categorical column in the current batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalDrift {
    /// Share of the batch taking values never seen during training.
    pub unknown_share: f64,
    /// Up to five most frequent values, most frequent first.
    pub current_top: Vec<(String, f64)>,
}

/// Per-batch comparison against a [`crate::TrainingProfile`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub numeric: BTreeMap<String, NumericDrift>,
    pub categorical: BTreeMap<String, CategoricalDrift>,
}

impl DriftReport {
    /// Largest absolute median shift across numeric columns.
    pub fn max_abs_shift(&self) -> Option<(&str, f64)> {
        self.numeric
            .iter()
            .map(|(name, drift)| (name.as_str(), drift.rel_shift.abs()))
            .max_by(|left, right| left.1.total_cmp(&right.1))
    }

    /// Largest unknown-category share across categorical columns.
    pub fn max_unknown_share(&self) -> Option<(&str, f64)> {
        self.categorical
            .iter()
            .map(|(name, drift)| (name.as_str(), drift.unknown_share))
            .max_by(|left, right| left.1.total_cmp(&right.1))
    }
}
