use std::collections::BTreeSet;
use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::polars_utils::parse_f64;

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn normalize_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Loads a headed CSV file into a frame.
///
/// Blank cells are null. A column whose non-blank cells all parse as numbers
/// is `Float64`; every other column is kept as `String`.
pub fn read_csv_frame(path: &Path) -> Result<DataFrame> {
    let csv_error = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(normalize_header)
        .collect();
    let mut seen = BTreeSet::new();
    for header in &headers {
        if !seen.insert(header.as_str()) {
            return Err(IngestError::DuplicateColumn {
                column: header.clone(),
                source_name: path.display().to_string(),
            });
        }
    }

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(record.get(idx).and_then(normalize_cell));
        }
    }

    let rows = cells.first().map_or(0, Vec::len);
    if headers.is_empty() || rows == 0 {
        return Err(IngestError::Empty {
            path: path.to_path_buf(),
        });
    }
    debug!(path = %path.display(), rows, columns = headers.len(), "csv loaded");

    let columns: Vec<Column> = headers
        .iter()
        .zip(cells)
        .map(|(name, values)| typed_column(name, values))
        .collect();
    Ok(DataFrame::new(columns)?)
}

fn typed_column(name: &str, values: Vec<Option<String>>) -> Column {
    let numeric = values
        .iter()
        .flatten()
        .all(|value| value.trim().parse::<f64>().is_ok());
    if numeric {
        let parsed: Vec<Option<f64>> = values
            .iter()
            .map(|value| value.as_deref().and_then(parse_f64))
            .collect();
        Series::new(name.into(), parsed).into_column()
    } else {
        Series::new(name.into(), values).into_column()
    }
}
