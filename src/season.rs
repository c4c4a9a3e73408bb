//! Growing-season windows
//!
//! Turns a crop calendar plus a harvest year into the contiguous run of
//! calendar days the crop spends in the field. Year-crossing crops start in
//! the previous calendar year, so the first year of a requested range only
//! anchors the first season and never gets a window of its own.

use chrono::NaiveDate;

use crate::crops::CropCalendar;
use crate::error::{DroughtError, DroughtResult};

/// Ordered, gapless season for one crop and harvest year
#[derive(Debug, Clone, PartialEq)]
pub struct GrowingSeasonWindow {
    pub crop: String,
    /// Year the season is labelled with (the harvest year)
    pub harvest_year: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    dates: Vec<NaiveDate>,
}

impl GrowingSeasonWindow {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of days in the season (never zero)
    pub fn len_days(&self) -> usize {
        self.dates.len()
    }
}

/// Builds season windows for a single crop
pub struct SeasonWindowBuilder<'a> {
    calendar: &'a CropCalendar,
}

impl<'a> SeasonWindowBuilder<'a> {
    pub fn new(calendar: &'a CropCalendar) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &CropCalendar {
        self.calendar
    }

    /// Season whose harvest falls in `year`.
    pub fn window(&self, year: i32) -> DroughtResult<GrowingSeasonWindow> {
        let cal = self.calendar;
        let start_year = if cal.crosses_year { year - 1 } else { year };

        let start = cal.planting.in_year(start_year).ok_or_else(|| self.error(format!(
            "planting day {} does not exist in {}",
            cal.planting, start_year
        )))?;
        let end = cal.harvest.in_year(year).ok_or_else(|| self.error(format!(
            "harvest day {} does not exist in {}",
            cal.harvest, year
        )))?;

        if end < start {
            return Err(self.error(format!("season ends ({}) before it starts ({})", end, start)));
        }

        let dates: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();

        Ok(GrowingSeasonWindow {
            crop: cal.name.clone(),
            harvest_year: year,
            start,
            end,
            dates,
        })
    }

    /// Harvest years that produce a summary for the inclusive range
    /// `first..=last`.
    ///
    /// Year-crossing crops consume `first` as the anchor of the first season,
    /// so they need at least two years and yield `first + 1..=last`.
    pub fn harvest_years(&self, first: i32, last: i32) -> DroughtResult<Vec<i32>> {
        if first > last {
            return Err(self.error(format!("empty year range {}..={}", first, last)));
        }

        let years: Vec<i32> = (first..=last).collect();
        if !self.calendar.crosses_year {
            return Ok(years);
        }

        if years.len() < 2 {
            return Err(self.error(format!(
                "year range {}..={} has {} year(s); a season crossing the year boundary \
                 needs an anchor year plus at least one harvest year",
                first,
                last,
                years.len()
            )));
        }

        Ok(years[1..].to_vec())
    }

    fn error(&self, reason: String) -> DroughtError {
        DroughtError::SeasonWindow {
            crop: self.calendar.name.clone(),
            reason,
        }
    }
}
