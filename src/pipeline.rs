//! Drought pipeline - per-crop coordinator
//!
//! For one crop: region -> harvest year -> season window -> precipitation
//! scan -> summary, then the yield join. Regions are independent, so they
//! can be scanned on the rayon pool; results are collected in region order
//! either way, and within a region years run in ascending order.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate, RegionYearSummary};
use crate::config::{MissingDataPolicy, PipelineConfig};
use crate::crops::CropCalendar;
use crate::data::DroughtData;
use crate::detector::scan_season;
use crate::error::DroughtResult;
use crate::join::{DroughtRecord, YieldJoiner};
use crate::precipitation::PrecipitationArchive;
use crate::regions::{RegionInfo, RegionReference};
use crate::season::SeasonWindowBuilder;
use crate::yields::YieldTable;

/// A region-year left out under `MissingDataPolicy::Skip`
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRegionYear {
    pub region_code: String,
    pub year: i32,
    pub reason: String,
}

/// Output of one crop run
#[derive(Debug, Clone)]
pub struct CropReport {
    pub crop: String,
    /// One row per processed (region, year), region order then ascending year
    pub records: Vec<DroughtRecord>,
    pub skipped: Vec<SkippedRegionYear>,
}

/// Summaries of one region, before merging
struct RegionOutcome {
    summaries: Vec<RegionYearSummary>,
    skipped: Vec<SkippedRegionYear>,
}

/// Main drought pipeline
pub struct DroughtPipeline {
    config: PipelineConfig,
    regions: RegionReference,
    precipitation: PrecipitationArchive,
}

impl DroughtPipeline {
    pub fn new(
        config: PipelineConfig,
        regions: RegionReference,
        precipitation: PrecipitationArchive,
    ) -> Self {
        Self {
            config,
            regions,
            precipitation,
        }
    }

    /// Build from loaded inputs; yield tables stay with the caller
    pub fn from_data(config: PipelineConfig, data: &mut DroughtData) -> Self {
        let regions = std::mem::take(&mut data.regions);
        let precipitation = std::mem::take(&mut data.precipitation);
        Self::new(config, regions, precipitation)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Scan one region-year and fold it into a summary
    pub fn summarize_region_year(
        &self,
        calendar: &CropCalendar,
        region: &RegionInfo,
        year: i32,
    ) -> DroughtResult<RegionYearSummary> {
        let window = SeasonWindowBuilder::new(calendar).window(year)?;
        let readings = self
            .precipitation
            .season_readings(&region.state, &region.code, &window)?;

        let scan = scan_season(readings, self.config.dry_threshold_in);
        if scan.trailing_dry_days > 0 {
            debug!(
                "{} {} {}: season ended inside a {}-day dry run (not recorded)",
                calendar.name, region.code, year, scan.trailing_dry_days
            );
        }

        Ok(aggregate(
            year,
            region,
            &scan.episodes,
            window.len_days(),
            scan.total_precipitation_in,
        ))
    }

    fn summarize_region(
        &self,
        calendar: &CropCalendar,
        region_code: &str,
        years: &[i32],
    ) -> DroughtResult<RegionOutcome> {
        let region = self.regions.get(region_code)?;
        info!("Calculating {} drought data for {}", calendar.name, region.location);

        let mut summaries = Vec::with_capacity(years.len());
        let mut skipped = Vec::new();

        for &year in years {
            match self.summarize_region_year(calendar, region, year) {
                Ok(summary) => summaries.push(summary),
                Err(err)
                    if err.is_missing_data()
                        && self.config.missing_data == MissingDataPolicy::Skip =>
                {
                    warn!(
                        "Skipping {} region {} year {}: {}",
                        calendar.name, region_code, year, err
                    );
                    skipped.push(SkippedRegionYear {
                        region_code: region_code.to_string(),
                        year,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err.in_region_year(&calendar.name, region_code, year)),
            }
        }

        Ok(RegionOutcome { summaries, skipped })
    }

    /// Run one crop over the given regions and join yields
    ///
    /// # Errors
    /// `UnknownCrop`, `SeasonWindow` for an unusable year range,
    /// `UnknownRegion`, or the first region-year failure (in region order)
    /// wrapped in `RegionYear`. No partial report is returned on error.
    pub fn run_crop(
        &self,
        crop: &str,
        region_codes: &[String],
        yields: &YieldTable,
    ) -> DroughtResult<CropReport> {
        let calendar = self.config.crops.get(crop)?;
        let years = SeasonWindowBuilder::new(calendar)
            .harvest_years(self.config.first_year, self.config.last_year)?;

        info!(
            "Drought calculations for {}: {} regions x {} seasons",
            calendar.name,
            region_codes.len(),
            years.len()
        );

        // collect() on an indexed parallel iterator keeps region order
        let outcomes: Vec<DroughtResult<RegionOutcome>> = if self.config.parallel {
            region_codes
                .par_iter()
                .map(|code| self.summarize_region(calendar, code, &years))
                .collect()
        } else {
            region_codes
                .iter()
                .map(|code| self.summarize_region(calendar, code, &years))
                .collect()
        };

        let mut summaries = Vec::with_capacity(region_codes.len() * years.len());
        let mut skipped = Vec::new();
        for outcome in outcomes {
            let outcome = outcome?;
            summaries.extend(outcome.summaries);
            skipped.extend(outcome.skipped);
        }

        let records = YieldJoiner::new(yields).join(summaries);

        info!(
            "{}: {} region-years summarised, {} skipped",
            calendar.name,
            records.len(),
            skipped.len()
        );

        Ok(CropReport {
            crop: calendar.name.clone(),
            records,
            skipped,
        })
    }

    /// Run one crop over every region that reports a yield for it
    pub fn run_crop_for_yields(&self, crop: &str, yields: &YieldTable) -> DroughtResult<CropReport> {
        let region_codes = yields.region_codes();
        self.run_crop(crop, &region_codes, yields)
    }

    /// Run several crops; each crop succeeds or fails on its own
    pub fn run_all<'a, I>(&self, crops: I) -> Vec<(String, DroughtResult<CropReport>)>
    where
        I: IntoIterator<Item = (&'a str, &'a YieldTable)>,
    {
        crops
            .into_iter()
            .map(|(crop, yields)| {
                let result = self.run_crop_for_yields(crop, yields);
                if let Err(err) = &result {
                    warn!("{} failed: {}", crop, err);
                }
                (crop.to_string(), result)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DroughtError;
    use crate::precipitation::PrecipitationTable;
    use crate::severity::SeverityBucket;
    use crate::yields::YieldRecord;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rustc_hash::FxHashMap;

    const DRY: f64 = 0.0;
    const WET: f64 = 0.4;

    fn region(code: &str, state: &str) -> RegionInfo {
        RegionInfo {
            code: code.to_string(),
            location: format!("County {}, {}", code, state),
            state: state.to_string(),
        }
    }

    /// Daily series covering `first..=last` for each region, filled by `amount`
    fn table<F>(state: &str, codes: &[&str], first: NaiveDate, last: NaiveDate, amount: F) -> PrecipitationTable
    where
        F: Fn(&str, NaiveDate) -> Option<f64>,
    {
        let dates: Vec<NaiveDate> = first.iter_days().take_while(|d| *d <= last).collect();
        let mut columns = FxHashMap::default();
        for code in codes {
            columns.insert(
                code.to_string(),
                dates.iter().map(|d| amount(code, *d)).collect(),
            );
        }
        PrecipitationTable::from_columns(state, dates, columns).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pipeline(config: PipelineConfig, tables: Vec<PrecipitationTable>, regions: Vec<RegionInfo>) -> DroughtPipeline {
        let mut archive = PrecipitationArchive::default();
        for t in tables {
            archive.insert(t);
        }
        DroughtPipeline::new(config, RegionReference::from_regions(regions), archive)
    }

    /// Always wet except a 10-day dry spell starting 2001-06-01
    fn june_spell(_code: &str, d: NaiveDate) -> Option<f64> {
        if d >= date(2001, 6, 1) && d < date(2001, 6, 11) {
            Some(DRY)
        } else {
            Some(WET)
        }
    }

    #[test]
    fn test_single_region_year() {
        let mut config = PipelineConfig::default();
        config.first_year = 2001;
        config.last_year = 2001;
        let p = pipeline(
            config,
            vec![table("IL", &["17079"], date(2001, 1, 1), date(2001, 12, 31), june_spell)],
            vec![region("17079", "IL")],
        );

        let yields = YieldTable::from_records(vec![YieldRecord {
            year: 2001,
            region_code: "17079".to_string(),
            yield_value: Some(152.0),
        }]);
        let report = p.run_crop_for_yields("corn", &yields).unwrap();

        assert_eq!(report.crop, "Corn");
        assert_eq!(report.records.len(), 1);
        let record = &report.records[0];
        assert_eq!(record.yield_value, Some(152.0));

        let s = &record.summary;
        assert_eq!(s.bucket(SeverityBucket::Medium).count(), 1);
        assert_eq!(
            s.bucket(SeverityBucket::Medium).periods_label(),
            "2001-06-01 to 2001-06-11"
        );
        assert_eq!(s.total_drought_days, 10);
        assert_eq!(s.season_days, 214);
        assert_relative_eq!(s.drought_fraction, 10.0 / 214.0);
        assert_relative_eq!(s.total_precipitation_in, 204.0 * WET, epsilon = 1e-9);
    }

    #[test]
    fn test_unknown_crop_is_fatal() {
        let p = pipeline(PipelineConfig::default(), vec![], vec![]);
        let err = p.run_crop("Rice", &[], &YieldTable::default()).unwrap_err();
        assert!(matches!(err, DroughtError::UnknownCrop { .. }));
        assert!(p.config().crops.get("wheat").is_ok());
    }

    #[test]
    fn test_unknown_region_is_fatal() {
        let mut config = PipelineConfig::default();
        config.first_year = 2001;
        config.last_year = 2001;
        let p = pipeline(config, vec![], vec![]);
        let err = p.run_crop("Corn", &["17079".to_string()], &YieldTable::default()).unwrap_err();
        assert_eq!(err, DroughtError::UnknownRegion("17079".to_string()));
    }

    #[test]
    fn test_missing_data_aborts_with_context() {
        let mut config = PipelineConfig::default();
        config.first_year = 2001;
        config.last_year = 2002;
        config.parallel = false;
        // 2002 is absent from the table
        let p = pipeline(
            config,
            vec![table("IL", &["17079"], date(2001, 1, 1), date(2001, 12, 31), june_spell)],
            vec![region("17079", "IL")],
        );

        let err = p.run_crop("Corn", &["17079".to_string()], &YieldTable::default()).unwrap_err();
        match err {
            DroughtError::RegionYear { crop, region, year, source } => {
                assert_eq!(crop, "Corn");
                assert_eq!(region, "17079");
                assert_eq!(year, 2002);
                assert_eq!(
                    *source,
                    DroughtError::MissingData {
                        region: "17079".to_string(),
                        date: date(2002, 4, 1)
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_data_skip_policy() {
        crate::logging::init_test();
        let mut config = PipelineConfig::default();
        config.first_year = 2001;
        config.last_year = 2002;
        config.missing_data = MissingDataPolicy::Skip;
        let p = pipeline(
            config,
            vec![table("IL", &["17079"], date(2001, 1, 1), date(2001, 12, 31), june_spell)],
            vec![region("17079", "IL")],
        );

        let report = p.run_crop("Corn", &["17079".to_string()], &YieldTable::default()).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].summary.year, 2001);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].year, 2002);
    }

    #[test]
    fn test_cross_year_crop_labels_harvest_year() {
        let mut config = PipelineConfig::default();
        config.first_year = 1991;
        config.last_year = 1992;
        let p = pipeline(
            config,
            vec![table("KS", &["20001"], date(1991, 1, 1), date(1992, 12, 31), |_, d| {
                // Dry from 1991-12-25 through 1992-01-09, closed by rain on 01-10
                if d >= date(1991, 12, 25) && d < date(1992, 1, 10) { Some(DRY) } else { Some(WET) }
            })],
            vec![region("20001", "KS")],
        );

        let report = p.run_crop("Wheat", &["20001".to_string()], &YieldTable::default()).unwrap();
        assert_eq!(report.records.len(), 1);
        let s = &report.records[0].summary;
        assert_eq!(s.year, 1992);
        assert_eq!(s.season_days, 274);
        assert_eq!(
            s.bucket(SeverityBucket::Long).periods_label(),
            "1991-12-25 to 1992-01-10"
        );
        assert_eq!(s.bucket(SeverityBucket::Long).lengths_label(), "16");
    }

    #[test]
    fn test_parallel_matches_sequential_order() {
        let codes = ["17079", "18095", "17113", "18001", "17001"];
        let regions: Vec<RegionInfo> = codes
            .iter()
            .map(|c| region(c, if c.starts_with("17") { "IL" } else { "IN" }))
            .collect();
        let dry_every = |code: &str, d: NaiveDate| {
            // Region-dependent rhythm so rows differ between regions
            let period = 6 + code.as_bytes()[4] as i64 % 7;
            let n = d.signed_duration_since(date(2000, 1, 1)).num_days();
            Some(if n % (period + 1) == period { WET } else { DRY })
        };
        let tables = vec![
            table("IL", &["17079", "17113", "17001"], date(2000, 1, 1), date(2005, 12, 31), dry_every),
            table("IN", &["18095", "18001"], date(2000, 1, 1), date(2005, 12, 31), dry_every),
        ];
        let region_codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();

        let mut config = PipelineConfig::default();
        config.first_year = 2000;
        config.last_year = 2005;

        config.parallel = true;
        let parallel = pipeline(config.clone(), tables.clone(), regions.clone())
            .run_crop("Soybean", &region_codes, &YieldTable::default())
            .unwrap();
        config.parallel = false;
        let sequential = pipeline(config, tables, regions)
            .run_crop("Soybean", &region_codes, &YieldTable::default())
            .unwrap();

        assert_eq!(parallel.records, sequential.records);
        assert_eq!(parallel.records.len(), 30);

        let keys: Vec<(String, i32)> = parallel
            .records
            .iter()
            .map(|r| (r.summary.region_code.clone(), r.summary.year))
            .collect();
        let expected: Vec<(String, i32)> = codes
            .iter()
            .flat_map(|c| (2000..=2005).map(move |y| (c.to_string(), y)))
            .collect();
        assert_eq!(keys, expected);

        for r in &parallel.records {
            let s = &r.summary;
            let bucket_sum: u32 = SeverityBucket::ALL.iter().map(|b| s.bucket(*b).total_days()).sum();
            assert_eq!(s.total_drought_days, bucket_sum);
            assert!((0.0..=1.0).contains(&s.drought_fraction));
        }
    }

    #[test]
    fn test_run_all_isolates_crops() {
        let mut config = PipelineConfig::default();
        config.first_year = 2001;
        config.last_year = 2001;
        let p = pipeline(
            config,
            vec![table("IL", &["17079"], date(2001, 1, 1), date(2001, 12, 31), june_spell)],
            vec![region("17079", "IL")],
        );

        let yields = YieldTable::from_records(vec![YieldRecord {
            year: 2001,
            region_code: "17079".to_string(),
            yield_value: Some(50.0),
        }]);
        let results = p.run_all(vec![("Wheat", &yields), ("Corn", &yields), ("Rice", &yields)]);

        assert_eq!(results.len(), 3);
        // Wheat needs an anchor year; a one-year range cannot produce output
        assert!(matches!(results[0].1, Err(DroughtError::SeasonWindow { .. })));
        assert!(results[1].1.is_ok());
        assert!(matches!(results[2].1, Err(DroughtError::UnknownCrop { .. })));
    }
}
