use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Category used for missing categorical values in profiles and drift reports.
pub const MISSING_CATEGORY: &str = "<<MISSING>>";

/// Summary of one numeric training column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericProfile {
    /// Number of non-missing values.
    pub count: usize,
    pub q01: f64,
    pub q05: f64,
    pub q50: f64,
    pub q95: f64,
    pub q99: f64,
}

/// Statistical summary of the training distribution.
///
/// Serialized as the `training_profile.json` artifact with top-level keys
/// `numeric` and `categorical`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingProfile {
    pub numeric: BTreeMap<String, NumericProfile>,
    /// Relative frequency of each observed value, per categorical column.
    pub categorical: BTreeMap<String, BTreeMap<String, f64>>,
}

impl TrainingProfile {
    pub fn numeric_profile(&self, column: &str) -> Option<&NumericProfile> {
        self.numeric.get(column)
    }

    pub fn frequencies(&self, column: &str) -> Option<&BTreeMap<String, f64>> {
        self.categorical.get(column)
    }
}
