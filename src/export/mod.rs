//! Result export.

mod csv;

pub use csv::{results_to_csv_string, write_results_csv, CSV_HEADER};
