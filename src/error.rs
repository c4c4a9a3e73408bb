//! Error taxonomy for drought exposure processing
//!
//! Domain failures are typed so callers can tell a bad crop name apart from a
//! hole in the precipitation record. Loading code (files, CSV parsing) uses
//! `anyhow` instead and converts into these variants only where the pipeline
//! needs to branch on them.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DroughtError {
    /// Crop identifier is not in the configured crop table
    #[error("unknown crop '{crop}' (supported: {supported})")]
    UnknownCrop { crop: String, supported: String },

    /// Region code has no entry in the region reference table
    #[error("unknown region code '{0}'")]
    UnknownRegion(String),

    /// The precipitation table for the region's state has no column for it
    #[error("no precipitation column for region {region} in state table '{state}'")]
    MissingRegionColumn { region: String, state: String },

    /// A date inside the active season has no reading for the region
    #[error("missing precipitation reading for region {region} on {date}")]
    MissingData { region: String, date: NaiveDate },

    /// Season window cannot be built for the requested years
    #[error("cannot build growing season for {crop}: {reason}")]
    SeasonWindow { crop: String, reason: String },

    /// Malformed "MM-DD" offset in the crop table
    #[error("invalid month-day '{0}' (expected MM-DD)")]
    InvalidMonthDay(String),

    /// Any of the above, tagged with the region-year being processed
    #[error("{crop} / region {region} / year {year}: {source}")]
    RegionYear {
        crop: String,
        region: String,
        year: i32,
        #[source]
        source: Box<DroughtError>,
    },
}

impl DroughtError {
    /// Wrap an error with the crop, region and year it happened in.
    pub fn in_region_year(self, crop: &str, region: &str, year: i32) -> Self {
        DroughtError::RegionYear {
            crop: crop.to_string(),
            region: region.to_string(),
            year,
            source: Box::new(self),
        }
    }

    /// True for gaps in the precipitation input (absent column, date or value).
    pub fn is_missing_data(&self) -> bool {
        match self {
            DroughtError::MissingData { .. } | DroughtError::MissingRegionColumn { .. } => true,
            DroughtError::RegionYear { source, .. } => source.is_missing_data(),
            _ => false,
        }
    }
}

pub type DroughtResult<T> = std::result::Result<T, DroughtError>;
