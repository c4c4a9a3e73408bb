//! Pipeline configuration
//!
//! Defaults reproduce the processed-data layout and the 1991-2020 study
//! window. A JSON file can override any field; `DROUGHT_DATA_DIR` and
//! `DROUGHT_OUTPUT_DIR` override the directories last, so deployments can
//! point at another data root without editing the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::crops::CropTable;
use crate::detector::DEFAULT_DRY_THRESHOLD_IN;

pub const ENV_DATA_DIR: &str = "DROUGHT_DATA_DIR";
pub const ENV_OUTPUT_DIR: &str = "DROUGHT_OUTPUT_DIR";

/// What to do when a region-year hits a gap in the precipitation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDataPolicy {
    /// Fail the whole crop run
    #[default]
    Abort,
    /// Log the region-year, leave it out of the output, continue
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root of the processed inputs (region reference, yields, Weather_Data/)
    pub data_dir: PathBuf,
    /// Where `<Crop>_Droughts.csv` files are written
    pub output_dir: PathBuf,
    /// First year of the requested range (anchor year for year-crossing crops)
    pub first_year: i32,
    /// Last harvest year, inclusive
    pub last_year: i32,
    /// Daily amount in inches at or below which a day is dry
    pub dry_threshold_in: f64,
    /// Scan regions on the rayon pool
    pub parallel: bool,
    pub missing_data: MissingDataPolicy,
    pub crops: CropTable,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("Processed_Data"),
            output_dir: PathBuf::from("Processed_Data/Final_Data"),
            first_year: 1991,
            last_year: 2020,
            dry_threshold_in: DEFAULT_DRY_THRESHOLD_IN,
            parallel: true,
            missing_data: MissingDataPolicy::Abort,
            crops: CropTable::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file; omitted fields keep defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: PipelineConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Optional file, then environment overrides, then validation
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply directory overrides from a key lookup (the environment in
    /// production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.trim().is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.first_year > self.last_year {
            anyhow::bail!(
                "first_year {} is after last_year {}",
                self.first_year,
                self.last_year
            );
        }
        if !self.dry_threshold_in.is_finite() || self.dry_threshold_in < 0.0 {
            anyhow::bail!("dry_threshold_in must be a finite, non-negative amount");
        }
        self.crops.validate().context("invalid crop table")?;
        Ok(())
    }

    pub fn regions_path(&self) -> PathBuf {
        self.data_dir.join("Areas_of_Interest.csv")
    }

    pub fn yield_path(&self, crop: &str) -> PathBuf {
        self.data_dir.join(format!("Cleaned_{}_Yield.csv", crop))
    }

    pub fn weather_dir(&self) -> PathBuf {
        self.data_dir.join("Weather_Data")
    }

    pub fn output_path(&self, crop: &str) -> PathBuf {
        self.output_dir.join(format!("{}_Droughts.csv", crop))
    }
}
