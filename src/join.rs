//! Yield join
//!
//! Left join of region-year summaries onto yield observations by exact
//! (year, region code). Summaries are never dropped: an unmatched summary
//! keeps a null yield. Yield rows without a summary contribute nothing.

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::aggregate::RegionYearSummary;
use crate::yields::YieldTable;

/// A summary row with its (possibly absent) yield
#[derive(Debug, Clone, PartialEq)]
pub struct DroughtRecord {
    pub summary: RegionYearSummary,
    pub yield_value: Option<f64>,
}

/// Lookup index over a yield table
pub struct YieldJoiner<'a> {
    /// year -> region code -> yield
    index: FxHashMap<i32, FxHashMap<&'a str, Option<f64>>>,
}

impl<'a> YieldJoiner<'a> {
    /// Index the table. When a (year, region) key repeats, the first row wins.
    pub fn new(yields: &'a YieldTable) -> Self {
        let mut index: FxHashMap<i32, FxHashMap<&'a str, Option<f64>>> = FxHashMap::default();
        let mut duplicates = 0usize;
        for record in yields.records() {
            let by_region = index.entry(record.year).or_default();
            if by_region.contains_key(record.region_code.as_str()) {
                duplicates += 1;
                continue;
            }
            by_region.insert(record.region_code.as_str(), record.yield_value);
        }
        if duplicates > 0 {
            warn!("Yield table has {} duplicate (year, region) rows; kept the first of each", duplicates);
        }
        Self { index }
    }

    pub fn lookup(&self, year: i32, region_code: &str) -> Option<f64> {
        self.index
            .get(&year)
            .and_then(|by_region| by_region.get(region_code))
            .copied()
            .flatten()
    }

    /// Attach yields to summaries, preserving their order.
    pub fn join(&self, summaries: Vec<RegionYearSummary>) -> Vec<DroughtRecord> {
        summaries
            .into_iter()
            .map(|summary| {
                let yield_value = self.lookup(summary.year, &summary.region_code);
                DroughtRecord { summary, yield_value }
            })
            .collect()
    }
}
