use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::DriftReport;

/// One input row: column name to JSON scalar.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    /// One prediction per input record, in input order.
    pub predictions: Vec<f64>,
    pub drift: Option<DriftReport>,
    pub latency_ms: f64,
}
