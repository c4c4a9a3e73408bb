//! Crop yield observations
//!
//! Read-only input keyed by (year, region code). Besides decorating output
//! rows through the yield join, the table defines which regions a crop is
//! processed for: every region that reports a yield for it.

use anyhow::Result;
use std::path::Path;
use tracing::warn;

use crate::utils::{i32_column, pad_region_code, read_csv, require_columns, string_column, parse_number};

pub const COL_YEAR: &str = "Year";
pub const COL_REGION_CODE: &str = "ANSI Code";
pub const COL_VALUE: &str = "Value";

#[derive(Debug, Clone, PartialEq)]
pub struct YieldRecord {
    pub year: i32,
    pub region_code: String,
    /// `None` when the source value is suppressed or unparseable
    pub yield_value: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct YieldTable {
    records: Vec<YieldRecord>,
}

impl YieldTable {
    pub fn from_records(records: Vec<YieldRecord>) -> Self {
        Self { records }
    }

    /// Load a cleaned yield CSV (`Year`, `ANSI Code`, `Value`)
    ///
    /// Rows without a year or region code are skipped with a warning.
    pub fn load(path: &Path) -> Result<Self> {
        let context = "yields";
        let df = read_csv(path, context)?;
        require_columns(&df, &[COL_YEAR, COL_REGION_CODE, COL_VALUE], context)?;

        let years = i32_column(&df, COL_YEAR, context)?;
        let codes = string_column(&df, COL_REGION_CODE, context)?;
        // Read as text: values can carry thousands separators or "(D)"
        let values = string_column(&df, COL_VALUE, context)?;

        let mut records = Vec::with_capacity(years.len());
        let mut skipped = 0usize;
        for ((year, code), value) in years.into_iter().zip(codes).zip(values) {
            match (year, code) {
                (Some(year), Some(code)) => records.push(YieldRecord {
                    year,
                    region_code: pad_region_code(&code),
                    yield_value: value.as_deref().and_then(parse_number),
                }),
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!("{:?}: skipped {} yield rows without year or region code", path, skipped);
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[YieldRecord] {
        &self.records
    }

    /// Distinct region codes in order of first appearance
    pub fn region_codes(&self) -> Vec<String> {
        let mut seen = rustc_hash::FxHashSet::default();
        self.records
            .iter()
            .filter(|r| seen.insert(r.region_code.as_str()))
            .map(|r| r.region_code.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
