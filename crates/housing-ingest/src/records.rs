//! Conversion of request records into a column-oriented frame.

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use serde_json::Value;

use housing_model::Record;

use crate::error::{IngestError, Result};

/// Builds a frame from row records.
///
/// Columns appear in first-seen order across all records. A key absent from a
/// record is a null cell. A column whose non-null values are all JSON numbers
/// becomes `Float64`; any other column becomes `String`, with numbers and
/// booleans rendered as text so no value is dropped before validation.
pub fn records_to_frame(records: &[Record]) -> Result<DataFrame> {
    let mut names: Vec<&str> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !names.contains(&key.as_str()) {
                names.push(key.as_str());
            }
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(names.len());
    for name in names {
        let cells: Vec<Option<&Value>> = records
            .iter()
            .map(|record| record.get(name).filter(|value| !value.is_null()))
            .collect();
        columns.push(build_column(name, &cells)?);
    }
    Ok(DataFrame::new(columns)?)
}

fn build_column(name: &str, cells: &[Option<&Value>]) -> Result<Column> {
    let all_numeric = cells.iter().flatten().all(|value| value.is_number());
    if all_numeric {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|cell| cell.and_then(Value::as_f64))
            .collect();
        return Ok(Series::new(name.into(), values).into_column());
    }

    let mut values: Vec<Option<String>> = Vec::with_capacity(cells.len());
    for (row, cell) in cells.iter().enumerate() {
        let text = match cell {
            None => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Number(number)) => Some(number.to_string()),
            Some(Value::Bool(flag)) => Some(flag.to_string()),
            Some(_) => {
                return Err(IngestError::UnsupportedValue {
                    column: name.to_string(),
                    row,
                });
            }
        };
        values.push(text);
    }
    Ok(Series::new(name.into(), values).into_column())
}
