//! Drought table output
//!
//! One row per joined region-year. Column names follow the
//! `<Crop>_Droughts.csv` layout the downstream analysis reads.

use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

use crate::join::DroughtRecord;
use crate::severity::SeverityBucket;

pub const COL_YEAR: &str = "Year";
pub const COL_COUNTY: &str = "County";
pub const COL_STATE: &str = "State";
pub const COL_LOCATION: &str = "Location";
pub const COL_TOTAL_DROUGHT_TIME: &str = "Total Drought Time";
pub const COL_DROUGHT_PERCENTAGE: &str = "Total Drought Percentage";
pub const COL_PRECIPITATION: &str = "Total Precipitation";
pub const COL_YIELD: &str = "Yield Value";

/// Per-bucket column names: count, periods, lengths, total time
fn bucket_columns(bucket: SeverityBucket) -> [&'static str; 4] {
    match bucket {
        SeverityBucket::Short => ["Num_Short", "Periods_S", "Lengths_S", "Total Short Time"],
        SeverityBucket::Medium => ["Num_Med", "Periods_M", "Lengths_M", "Total Med Time"],
        SeverityBucket::Long => ["Num_Long", "Periods_L", "Lengths_L", "Total Long Time"],
    }
}

/// Build the output frame
///
/// Column order: identity, then count/periods/lengths per bucket, then the
/// per-bucket totals, overall totals, precipitation and yield.
pub fn records_to_dataframe(records: &[DroughtRecord]) -> PolarsResult<DataFrame> {
    let n = records.len();

    let mut columns: Vec<Column> = vec![
        Column::new(COL_YEAR.into(), records.iter().map(|r| r.summary.year).collect::<Vec<i32>>()),
        Column::new(
            COL_COUNTY.into(),
            records.iter().map(|r| r.summary.region_code.as_str()).collect::<Vec<&str>>(),
        ),
        Column::new(
            COL_STATE.into(),
            records.iter().map(|r| r.summary.state.as_str()).collect::<Vec<&str>>(),
        ),
        Column::new(
            COL_LOCATION.into(),
            records.iter().map(|r| r.summary.location.as_str()).collect::<Vec<&str>>(),
        ),
    ];

    for bucket in SeverityBucket::ALL {
        let [num, periods, lengths, _] = bucket_columns(bucket);
        let mut counts = Vec::with_capacity(n);
        let mut period_labels = Vec::with_capacity(n);
        let mut length_labels = Vec::with_capacity(n);
        for r in records {
            let stats = r.summary.bucket(bucket);
            counts.push(stats.count() as u32);
            period_labels.push(stats.periods_label());
            length_labels.push(stats.lengths_label());
        }
        columns.push(Column::new(num.into(), counts));
        columns.push(Column::new(periods.into(), period_labels));
        columns.push(Column::new(lengths.into(), length_labels));
    }

    for bucket in SeverityBucket::ALL {
        let total = bucket_columns(bucket)[3];
        let days: Vec<u32> = records.iter().map(|r| r.summary.bucket(bucket).total_days()).collect();
        columns.push(Column::new(total.into(), days));
    }

    columns.push(Column::new(
        COL_TOTAL_DROUGHT_TIME.into(),
        records.iter().map(|r| r.summary.total_drought_days).collect::<Vec<u32>>(),
    ));
    columns.push(Column::new(
        COL_DROUGHT_PERCENTAGE.into(),
        records.iter().map(|r| r.summary.drought_fraction).collect::<Vec<f64>>(),
    ));
    columns.push(Column::new(
        COL_PRECIPITATION.into(),
        records.iter().map(|r| r.summary.total_precipitation_in).collect::<Vec<f64>>(),
    ));
    columns.push(Column::new(
        COL_YIELD.into(),
        records.iter().map(|r| r.yield_value).collect::<Vec<Option<f64>>>(),
    ));

    DataFrame::new(columns)
}

/// Write a frame as CSV with a header row, creating parent directories
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }

    let mut file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("Failed to write CSV {:?}", path))?;

    info!("Wrote {} rows to {:?}", df.height(), path);
    Ok(())
}

/// Build and write one crop's drought table
pub fn write_records(records: &[DroughtRecord], path: &Path) -> Result<()> {
    let mut df = records_to_dataframe(records).context("Failed to build drought table")?;
    write_csv(&mut df, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::detector::DroughtEpisode;
    use crate::regions::RegionInfo;
    use crate::severity::severity;
    use chrono::NaiveDate;

    fn episode(start: (i32, u32, u32), length_days: u32) -> DroughtEpisode {
        let start = NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap();
        DroughtEpisode {
            start,
            end: start + chrono::Duration::days(length_days as i64),
            length_days,
            severity: severity(length_days).unwrap(),
        }
    }

    fn record(yield_value: Option<f64>) -> DroughtRecord {
        let region = RegionInfo {
            code: "17079".to_string(),
            location: "Jasper County, Illinois".to_string(),
            state: "IL".to_string(),
        };
        let episodes = vec![episode((2001, 5, 1), 6), episode((2001, 6, 1), 7), episode((2001, 8, 1), 16)];
        DroughtRecord {
            summary: aggregate(2001, &region, &episodes, 214, 20.5),
            yield_value,
        }
    }

    #[test]
    fn test_column_layout() {
        let df = records_to_dataframe(&[record(Some(150.0))]).unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "Year", "County", "State", "Location",
                "Num_Short", "Periods_S", "Lengths_S",
                "Num_Med", "Periods_M", "Lengths_M",
                "Num_Long", "Periods_L", "Lengths_L",
                "Total Short Time", "Total Med Time", "Total Long Time",
                "Total Drought Time", "Total Drought Percentage", "Total Precipitation",
                "Yield Value",
            ]
        );
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn test_bucket_values() {
        let df = records_to_dataframe(&[record(None)]).unwrap();

        let periods_s = df.column("Periods_S").unwrap().str().unwrap().get(0).unwrap().to_string();
        assert_eq!(periods_s, "2001-05-01 to 2001-05-07, 2001-06-01 to 2001-06-08");
        let lengths_s = df.column("Lengths_S").unwrap().str().unwrap().get(0).unwrap().to_string();
        assert_eq!(lengths_s, "6, 7");
        let periods_m = df.column("Periods_M").unwrap().str().unwrap().get(0).unwrap().to_string();
        assert_eq!(periods_m, "");

        let total = df.column("Total Drought Time").unwrap().u32().unwrap().get(0);
        assert_eq!(total, Some(29));
        let yields = df.column("Yield Value").unwrap().f64().unwrap().get(0);
        assert_eq!(yields, None);
    }

    #[test]
    fn test_empty_records_give_empty_frame() {
        let df = records_to_dataframe(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 20);
    }
}
