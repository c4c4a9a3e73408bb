//! Data Loading
//!
//! Loads the region reference, one yield table per configured crop and the
//! state precipitation tables those crops need, all through Polars CSV
//! readers.
//!
//! Layout under `data_dir`:
//! - `Areas_of_Interest.csv`
//! - `Cleaned_<Crop>_Yield.csv`
//! - `Weather_Data/<STATE>_AVGPrecip.csv`

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::precipitation::PrecipitationArchive;
use crate::regions::RegionReference;
use crate::yields::YieldTable;

/// Main data holder for drought processing
#[derive(Debug, Default)]
pub struct DroughtData {
    /// Region code -> label and state
    pub regions: RegionReference,

    /// (crop name, yields) for every crop whose yield file loaded
    pub yields: Vec<(String, YieldTable)>,

    /// Crops whose yield file could not be read
    pub yield_failures: Vec<(String, anyhow::Error)>,

    /// State precipitation tables for the regions above
    pub precipitation: PrecipitationArchive,
}

impl DroughtData {
    /// Load everything the configured crops need
    ///
    /// A bad region reference aborts the load. A missing or malformed yield
    /// file only takes its own crop out. Only states that host a yield
    /// region are read; a state without a table file is left out and its
    /// regions then surface as missing data during the run.
    pub fn load(config: &PipelineConfig) -> Result<Self> {
        info!("Loading drought inputs from {:?}", config.data_dir);

        let regions = RegionReference::load(&config.regions_path())
            .context("Failed to load region reference")?;

        let mut yields = Vec::new();
        let mut yield_failures = Vec::new();
        for calendar in config.crops.iter() {
            let path = config.yield_path(&calendar.name);
            match YieldTable::load(&path) {
                Ok(table) => {
                    info!("  {} yields: {} rows", calendar.name, table.len());
                    yields.push((calendar.name.clone(), table));
                }
                Err(err) => {
                    warn!("  {} yields unavailable: {:#}", calendar.name, err);
                    yield_failures.push((calendar.name.clone(), err));
                }
            }
        }

        let states = Self::needed_states(&regions, &yields);
        let precipitation = PrecipitationArchive::load(&config.weather_dir(), &states)?;

        info!("  Regions: {}", regions.len());
        info!("  Precipitation tables: {} of {} states", precipitation.len(), states.len());

        Ok(DroughtData {
            regions,
            yields,
            yield_failures,
            precipitation,
        })
    }

    /// States hosting at least one yield region
    fn needed_states(regions: &RegionReference, yields: &[(String, YieldTable)]) -> Vec<String> {
        let codes: Vec<String> = yields.iter().flat_map(|(_, table)| table.region_codes()).collect();
        regions.states_for(codes.iter().map(String::as_str))
    }

    /// Yield table for a crop, case-insensitive
    pub fn yields_for(&self, crop: &str) -> Option<&YieldTable> {
        self.yields
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(crop))
            .map(|(_, table)| table)
    }
}
