//! Region-year aggregation
//!
//! Folds the episodes of one region-year into a single summary row: per
//! severity bucket the episode count, the episodes themselves (for the period
//! and length lists) and the days spent in that bucket; across buckets the
//! total drought days and the fraction of the season they cover.
//!
//! Episodes stay typed until the output boundary; `periods_label` and
//! `lengths_label` render the display strings.

use smallvec::SmallVec;

use crate::detector::DroughtEpisode;
use crate::regions::RegionInfo;
use crate::severity::SeverityBucket;

/// Episodes that fell into one severity bucket, in chronological order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketStats {
    episodes: SmallVec<[DroughtEpisode; 4]>,
}

impl BucketStats {
    pub fn count(&self) -> usize {
        self.episodes.len()
    }

    pub fn total_days(&self) -> u32 {
        self.episodes.iter().map(|e| e.length_days).sum()
    }

    pub fn episodes(&self) -> &[DroughtEpisode] {
        &self.episodes
    }

    /// "2004-05-01 to 2004-05-08, 2004-07-10 to 2004-07-16"; empty if none
    pub fn periods_label(&self) -> String {
        self.episodes
            .iter()
            .map(|e| e.period_label())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// "7, 6"; empty if none
    pub fn lengths_label(&self) -> String {
        self.episodes
            .iter()
            .map(|e| e.length_days.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One output row before the yield join
#[derive(Debug, Clone, PartialEq)]
pub struct RegionYearSummary {
    pub year: i32,
    pub region_code: String,
    pub state: String,
    pub location: String,
    /// Indexed by `SeverityBucket::index()`
    buckets: [BucketStats; 3],
    pub total_drought_days: u32,
    pub season_days: u32,
    /// total_drought_days / season_days, within [0, 1]
    pub drought_fraction: f64,
    pub total_precipitation_in: f64,
}

impl RegionYearSummary {
    pub fn bucket(&self, bucket: SeverityBucket) -> &BucketStats {
        &self.buckets[bucket.index()]
    }

    pub fn episode_count(&self) -> usize {
        self.buckets.iter().map(BucketStats::count).sum()
    }
}

/// Build the summary for one region-year.
///
/// `episodes` must be the detector output for a season of `season_days`
/// days; their order is preserved inside each bucket.
pub fn aggregate(
    year: i32,
    region: &RegionInfo,
    episodes: &[DroughtEpisode],
    season_days: usize,
    total_precipitation_in: f64,
) -> RegionYearSummary {
    let mut buckets: [BucketStats; 3] = Default::default();
    for episode in episodes {
        buckets[episode.severity.index()].episodes.push(episode.clone());
    }

    let total_drought_days: u32 = buckets.iter().map(BucketStats::total_days).sum();
    let drought_fraction = if season_days > 0 {
        f64::from(total_drought_days) / season_days as f64
    } else {
        0.0
    };

    RegionYearSummary {
        year,
        region_code: region.code.clone(),
        state: region.state.clone(),
        location: region.location.clone(),
        buckets,
        total_drought_days,
        season_days: season_days as u32,
        drought_fraction,
        total_precipitation_in,
    }
}
