pub mod csv_frame;
pub mod error;
pub mod polars_utils;
pub mod records;

pub use csv_frame::read_csv_frame;
pub use error::IngestError;
pub use polars_utils::{
    any_to_f64, any_to_string, column_f64, column_names, column_strings, filter_rows,
    format_numeric, parse_f64,
};
pub use records::records_to_frame;
