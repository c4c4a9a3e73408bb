//! CSV table helpers with column validation
//!
//! Thin layer over Polars that reads a CSV eagerly and pulls typed columns out
//! of it, so a missing or mistyped column fails with the file and column name
//! rather than deep inside the scan.

use anyhow::{anyhow, Context, Result};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;

/// Width of a county region code ("17079"); CSV inference drops leading zeros
pub const REGION_CODE_WIDTH: usize = 5;

/// Read a headered CSV into a DataFrame
///
/// The whole file is scanned for schema inference so sparse columns are not
/// mistyped from their first rows.
pub fn read_csv(path: &Path, context: &str) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("{}: Failed to create CSV reader: {:?}", context, path))?
        .finish()
        .with_context(|| format!("{}: Failed to load CSV: {:?}", context, path))
}

/// Check that every expected column is present
///
/// # Errors
/// Names the first missing column and lists the available ones.
pub fn require_columns(df: &DataFrame, columns: &[&str], context: &str) -> Result<()> {
    let actual_cols: HashSet<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for &expected in columns {
        if !actual_cols.contains(expected) {
            return Err(anyhow!(
                "{}: Missing expected column '{}'. Available columns: {:?}",
                context,
                expected,
                actual_cols
            ));
        }
    }

    Ok(())
}

/// Column as text, whatever type inference picked for it
pub fn string_column(df: &DataFrame, name: &str, context: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .with_context(|| format!("{}: Missing {} column", context, name))?
        .cast(&DataType::String)
        .with_context(|| format!("{}: Column '{}' cannot be read as text", context, name))?;

    Ok(column
        .str()?
        .into_iter()
        .map(|opt| opt.map(|s| s.trim().to_string()))
        .collect())
}

/// Column as floats; unparseable cells become `None`
pub fn f64_column(df: &DataFrame, name: &str, context: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .with_context(|| format!("{}: Missing {} column", context, name))?
        .cast(&DataType::Float64)
        .with_context(|| format!("{}: Column '{}' is not numeric", context, name))?;

    Ok(column
        .f64()?
        .into_iter()
        .map(|opt| opt.filter(|v| v.is_finite()))
        .collect())
}

/// Column as integers; unparseable cells become `None`
pub fn i32_column(df: &DataFrame, name: &str, context: &str) -> Result<Vec<Option<i32>>> {
    let column = df
        .column(name)
        .with_context(|| format!("{}: Missing {} column", context, name))?
        .cast(&DataType::Int32)
        .with_context(|| format!("{}: Column '{}' is not an integer", context, name))?;

    Ok(column.i32()?.into_iter().collect())
}

/// Left-pad a numeric region code with zeros ("6095" -> "06095")
///
/// Non-numeric codes are returned trimmed but otherwise untouched.
pub fn pad_region_code(raw: &str) -> String {
    let code = raw.trim();
    if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) {
        format!("{:0>width$}", code, width = REGION_CODE_WIDTH)
    } else {
        code.to_string()
    }
}

/// Parse a yield-style number that may carry thousands separators ("1,234.5")
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_columns() {
        let df = df![
            "ANSI Code" => &[17079i64, 6095],
            "Location" => &["Jasper County, Illinois", "Solano County, California"],
        ]
        .unwrap();

        assert!(require_columns(&df, &["ANSI Code", "Location"], "test").is_ok());

        let err = require_columns(&df, &["State Initial"], "test").unwrap_err();
        assert!(err.to_string().contains("State Initial"));
    }

    #[test]
    fn test_string_column_from_integers() {
        let df = df!["ANSI Code" => &[17079i64, 6095]].unwrap();
        let codes = string_column(&df, "ANSI Code", "test").unwrap();
        assert_eq!(codes, vec![Some("17079".to_string()), Some("6095".to_string())]);
    }

    #[test]
    fn test_f64_column_casts_integers_and_keeps_nulls() {
        let df = df!["17079" => &[Some(0i64), None, Some(1)]].unwrap();
        let values = f64_column(&df, "17079", "test").unwrap();
        assert_eq!(values, vec![Some(0.0), None, Some(1.0)]);
    }

    #[test]
    fn test_missing_column_names_column() {
        let df = df!["Year" => &[2001i32]].unwrap();
        let err = f64_column(&df, "Value", "yields").unwrap_err();
        assert!(err.to_string().contains("Value"));
    }

    #[test]
    fn test_pad_region_code() {
        assert_eq!(pad_region_code("6095"), "06095");
        assert_eq!(pad_region_code(" 17079 "), "17079");
        assert_eq!(pad_region_code("ABC"), "ABC");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_number(" 151.2 "), Some(151.2));
        assert_eq!(parse_number("(D)"), None);
        assert_eq!(parse_number(""), None);
    }
}
