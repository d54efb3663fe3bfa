//! Reading prediction inputs from disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use housing_model::{PredictRequest, Record};

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsFile {
    Request(PredictRequest),
    Bare(Vec<Record>),
}

/// Reads records from a JSON file shaped like a predict request body or a
/// bare array of records.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let parsed: RecordsFile = serde_json::from_str(&text).with_context(|| {
        format!(
            "{} is neither {{\"records\": [...]}} nor an array of records",
            path.display()
        )
    })?;
    Ok(match parsed {
        RecordsFile::Request(request) => request.records,
        RecordsFile::Bare(records) => records,
    })
}
