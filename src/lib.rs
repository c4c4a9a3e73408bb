//! Crop Drought Exposure Engine
//!
//! Measures how much dry weather each agricultural region saw during each
//! growing season and lines that up with the crop yield it reported.
//!
//! Layout:
//! - `crops`, `season`: crop calendars and per-year growing-season windows
//! - `detector`, `severity`: dry-run state machine and episode buckets
//! - `aggregate`, `join`: region-year summaries and the yield left join
//! - `regions`, `precipitation`, `yields`, `data`: input tables (Polars CSV)
//! - `pipeline`, `output`: per-crop orchestration and the drought CSV
//! - `config`, `error`, `logging`, `utils`: ambient plumbing

pub mod aggregate;
pub mod config;
pub mod crops;
pub mod data;
pub mod detector;
pub mod error;
pub mod join;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod precipitation;
pub mod regions;
pub mod season;
pub mod severity;
pub mod utils;
pub mod yields;

// Re-export commonly used types
pub use aggregate::{aggregate, BucketStats, RegionYearSummary};
pub use config::{MissingDataPolicy, PipelineConfig};
pub use crops::{CropCalendar, CropTable, MonthDay};
pub use data::DroughtData;
pub use detector::{scan_season, DroughtEpisode, EpisodeDetector, RunState, SeasonScan, DEFAULT_DRY_THRESHOLD_IN};
pub use error::{DroughtError, DroughtResult};
pub use join::{DroughtRecord, YieldJoiner};
pub use output::{records_to_dataframe, write_csv, write_records};
pub use pipeline::{CropReport, DroughtPipeline, SkippedRegionYear};
pub use precipitation::{PrecipitationArchive, PrecipitationTable};
pub use regions::{RegionInfo, RegionReference};
pub use season::{GrowingSeasonWindow, SeasonWindowBuilder};
pub use severity::{severity, SeverityBucket};
pub use yields::{YieldRecord, YieldTable};
