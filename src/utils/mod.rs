//! Utility modules shared by the loaders
//!
//! - Table helpers: CSV reading and typed column extraction with validation

pub mod table_helpers;

pub use table_helpers::{
    f64_column, i32_column, pad_region_code, parse_number, read_csv, require_columns,
    string_column,
};
