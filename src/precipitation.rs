//! Daily precipitation tables
//!
//! One wide table per state: a `Date` column plus one column of daily
//! amounts (inches) per region code. The scan reads a single region column
//! over a season's dates; any gap (absent column, date row or cell) is a
//! missing-data error, never an implicit zero.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{DroughtError, DroughtResult};
use crate::season::GrowingSeasonWindow;
use crate::utils::{f64_column, pad_region_code, read_csv, require_columns, string_column};

pub const COL_DATE: &str = "Date";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Precipitation for every region of one state
#[derive(Debug, Clone, Default)]
pub struct PrecipitationTable {
    state: String,
    /// Date -> row
    index: FxHashMap<NaiveDate, usize>,
    /// Region code -> daily amounts by row
    columns: FxHashMap<String, Vec<Option<f64>>>,
}

impl PrecipitationTable {
    /// Build from already-materialised columns.
    ///
    /// Every column must have one value per date. Duplicate dates are
    /// rejected since the row they refer to would be ambiguous.
    pub fn from_columns(
        state: &str,
        dates: Vec<NaiveDate>,
        columns: FxHashMap<String, Vec<Option<f64>>>,
    ) -> Result<Self> {
        let mut index = FxHashMap::default();
        for (row, date) in dates.iter().enumerate() {
            if index.insert(*date, row).is_some() {
                anyhow::bail!("precipitation table {}: duplicate date {}", state, date);
            }
        }

        for (region, values) in &columns {
            if values.len() != dates.len() {
                anyhow::bail!(
                    "precipitation table {}: region {} has {} values for {} dates",
                    state,
                    region,
                    values.len(),
                    dates.len()
                );
            }
        }

        Ok(Self {
            state: state.to_string(),
            index,
            columns,
        })
    }

    /// Load a state's wide CSV (`Date`, then one column per region code)
    pub fn load(path: &Path, state: &str) -> Result<Self> {
        let context = format!("precipitation {}", state);
        let df = read_csv(path, &context)?;
        require_columns(&df, &[COL_DATE], &context)?;

        let dates = string_column(&df, COL_DATE, &context)?
            .into_iter()
            .enumerate()
            .map(|(row, raw)| {
                let raw = raw.with_context(|| format!("{}: empty Date in row {}", context, row + 1))?;
                NaiveDate::parse_from_str(&raw, DATE_FORMAT)
                    .with_context(|| format!("{}: bad Date '{}' in row {}", context, raw, row + 1))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut columns = FxHashMap::default();
        for name in df.get_column_names() {
            let name = name.to_string();
            if name == COL_DATE {
                continue;
            }
            let values = f64_column(&df, &name, &context)?;
            columns.insert(pad_region_code(&name), values);
        }

        info!(
            "Loaded precipitation for {}: {} days x {} regions",
            state,
            dates.len(),
            columns.len()
        );

        Self::from_columns(state, dates, columns)
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn has_region(&self, region: &str) -> bool {
        self.columns.contains_key(region)
    }

    pub fn days(&self) -> usize {
        self.index.len()
    }

    /// Readings for one region over a season, in season order
    ///
    /// # Errors
    /// `MissingRegionColumn` if the region has no column; `MissingData` at
    /// the first season date with no row or an empty cell.
    pub fn season_readings(
        &self,
        region: &str,
        window: &GrowingSeasonWindow,
    ) -> DroughtResult<Vec<(NaiveDate, f64)>> {
        let column = self
            .columns
            .get(region)
            .ok_or_else(|| DroughtError::MissingRegionColumn {
                region: region.to_string(),
                state: self.state.clone(),
            })?;

        window
            .dates()
            .iter()
            .map(|date| {
                self.index
                    .get(date)
                    .and_then(|row| column[*row])
                    .map(|amount| (*date, amount))
                    .ok_or_else(|| DroughtError::MissingData {
                        region: region.to_string(),
                        date: *date,
                    })
            })
            .collect()
    }
}

/// Precipitation tables keyed by state
#[derive(Debug, Clone, Default)]
pub struct PrecipitationArchive {
    tables: FxHashMap<String, PrecipitationTable>,
}

impl PrecipitationArchive {
    pub fn insert(&mut self, table: PrecipitationTable) {
        self.tables.insert(table.state.clone(), table);
    }

    /// Load `<dir>/<STATE>_AVGPrecip.csv` for each state
    ///
    /// A state with no file is left out with a warning; its regions then
    /// report missing data when scanned. A file that exists but does not
    /// parse is an error.
    pub fn load(dir: &Path, states: &[String]) -> Result<Self> {
        let mut archive = Self::default();
        for state in states {
            let path = dir.join(format!("{}_AVGPrecip.csv", state));
            if !path.exists() {
                warn!("No precipitation table for {} at {:?}", state, path);
                continue;
            }
            debug!("Reading precipitation table {:?}", path);
            let table = PrecipitationTable::load(&path, state)
                .with_context(|| format!("Failed to load precipitation for state {}", state))?;
            archive.insert(table);
        }
        Ok(archive)
    }

    pub fn get(&self, state: &str) -> Option<&PrecipitationTable> {
        self.tables.get(state)
    }

    /// Season readings for a region of `state`
    ///
    /// A state with no table reports the region's column as missing.
    pub fn season_readings(
        &self,
        state: &str,
        region: &str,
        window: &GrowingSeasonWindow,
    ) -> DroughtResult<Vec<(NaiveDate, f64)>> {
        match self.tables.get(state) {
            Some(table) => table.season_readings(region, window),
            None => Err(DroughtError::MissingRegionColumn {
                region: region.to_string(),
                state: state.to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
