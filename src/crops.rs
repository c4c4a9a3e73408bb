//! Crop calendar table
//!
//! Maps each supported crop to its planting and harvest month-days. One table
//! drives season construction for every crop; crops whose harvest falls
//! before planting in calendar order are flagged as crossing the year boundary
//! (winter wheat: planted in November, harvested the following July).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DroughtError, DroughtResult};

/// Calendar month-day without a year ("04-01").
///
/// Ordering is calendar order within a year, which is what the
/// year-crossing check relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> DroughtResult<Self> {
        // 2000 is a leap year, so 02-29 is accepted here and rejected per year
        if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
            return Err(DroughtError::InvalidMonthDay(format!("{:02}-{:02}", month, day)));
        }
        Ok(Self { month, day })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Anchor this month-day in a concrete year.
    ///
    /// Returns `None` for 02-29 in a non-leap year.
    pub fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = DroughtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DroughtError::InvalidMonthDay(s.to_string());
        let (m, d) = s.trim().split_once('-').ok_or_else(invalid)?;
        let month = m.parse::<u32>().map_err(|_| invalid())?;
        let day = d.parse::<u32>().map_err(|_| invalid())?;
        MonthDay::new(month, day).map_err(|_| invalid())
    }
}

impl TryFrom<String> for MonthDay {
    type Error = DroughtError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthDay> for String {
    fn from(md: MonthDay) -> Self {
        md.to_string()
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// Growing-season definition for one crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CropCalendarFields")]
pub struct CropCalendar {
    /// Display name, also used in file names ("Corn" -> Cleaned_Corn_Yield.csv)
    pub name: String,
    /// First day of the season
    pub planting: MonthDay,
    /// Last day of the season (inclusive)
    pub harvest: MonthDay,
    /// Season starts in the year before the harvest year
    pub crosses_year: bool,
}

/// Serialized form; an omitted `crosses_year` is derived from the offsets
#[derive(Deserialize)]
struct CropCalendarFields {
    name: String,
    planting: MonthDay,
    harvest: MonthDay,
    #[serde(default)]
    crosses_year: Option<bool>,
}

impl From<CropCalendarFields> for CropCalendar {
    fn from(fields: CropCalendarFields) -> Self {
        let mut calendar = CropCalendar::new(&fields.name, fields.planting, fields.harvest);
        if let Some(flag) = fields.crosses_year {
            calendar.crosses_year = flag;
        }
        calendar
    }
}

impl CropCalendar {
    pub fn new(name: &str, planting: MonthDay, harvest: MonthDay) -> Self {
        Self {
            name: name.to_string(),
            planting,
            harvest,
            crosses_year: harvest < planting,
        }
    }

    /// The flag must agree with the offsets; a table that claims otherwise
    /// would silently produce empty or year-long windows.
    pub fn validate(&self) -> DroughtResult<()> {
        let implied = self.harvest < self.planting;
        if implied != self.crosses_year {
            return Err(DroughtError::SeasonWindow {
                crop: self.name.clone(),
                reason: format!(
                    "crosses_year={} but season {} -> {} {}",
                    self.crosses_year,
                    self.planting,
                    self.harvest,
                    if implied { "wraps into the next year" } else { "fits in one year" }
                ),
            });
        }
        Ok(())
    }
}

/// Supported crops, in processing order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CropTable {
    crops: Vec<CropCalendar>,
}

impl CropTable {
    pub fn new(crops: Vec<CropCalendar>) -> DroughtResult<Self> {
        let table = Self { crops };
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> DroughtResult<()> {
        for (i, crop) in self.crops.iter().enumerate() {
            crop.validate()?;
            if self.crops[..i]
                .iter()
                .any(|c| c.name.eq_ignore_ascii_case(&crop.name))
            {
                return Err(DroughtError::SeasonWindow {
                    crop: crop.name.clone(),
                    reason: "crop listed twice in crop table".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Look up a crop by name, ignoring case.
    pub fn get(&self, crop: &str) -> DroughtResult<&CropCalendar> {
        self.crops
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(crop.trim()))
            .ok_or_else(|| DroughtError::UnknownCrop {
                crop: crop.to_string(),
                supported: self.names().join(", "),
            })
    }

    pub fn names(&self) -> Vec<&str> {
        self.crops.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CropCalendar> {
        self.crops.iter()
    }
}

impl Default for CropTable {
    fn default() -> Self {
        let md = |m, d| MonthDay { month: m, day: d };
        Self {
            crops: vec![
                CropCalendar::new("Corn", md(4, 1), md(10, 31)),
                CropCalendar::new("Soybean", md(5, 1), md(11, 30)),
                CropCalendar::new("Wheat", md(11, 1), md(7, 31)),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_day_parse_and_display() {
        let md: MonthDay = "4-1".parse().unwrap();
        assert_eq!(md.month(), 4);
        assert_eq!(md.day(), 1);
        assert_eq!(md.to_string(), "04-01");

        assert!("13-01".parse::<MonthDay>().is_err());
        assert!("02-30".parse::<MonthDay>().is_err());
        assert!("0401".parse::<MonthDay>().is_err());
        assert!("02-29".parse::<MonthDay>().is_ok());
    }

    #[test]
    fn test_leap_day_only_exists_in_leap_years() {
        let leap = MonthDay::new(2, 29).unwrap();
        assert!(leap.in_year(2000).is_some());
        assert!(leap.in_year(1999).is_none());
    }

    #[test]
    fn test_default_table() {
        let table = CropTable::default();
        assert!(table.validate().is_ok());
        assert_eq!(table.names(), vec!["Corn", "Soybean", "Wheat"]);

        assert!(!table.get("corn").unwrap().crosses_year);
        assert!(!table.get("SOYBEAN").unwrap().crosses_year);
        assert!(table.get("Wheat").unwrap().crosses_year);
    }

    #[test]
    fn test_unknown_crop_lists_supported_set() {
        let table = CropTable::default();
        let err = table.get("Rice").unwrap_err();
        match err {
            DroughtError::UnknownCrop { crop, supported } => {
                assert_eq!(crop, "Rice");
                assert_eq!(supported, "Corn, Soybean, Wheat");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_inconsistent_crosses_year_flag_rejected() {
        let mut wheat = CropTable::default().get("Wheat").unwrap().clone();
        wheat.crosses_year = false;
        assert!(CropTable::new(vec![wheat]).is_err());
    }

    #[test]
    fn test_duplicate_crop_rejected() {
        let corn = CropTable::default().get("Corn").unwrap().clone();
        let mut again = corn.clone();
        again.name = "CORN".to_string();
        assert!(CropTable::new(vec![corn, again]).is_err());
    }

    #[test]
    fn test_crop_table_from_json() {
        let json = r#"[
            {"name": "Barley", "planting": "03-15", "harvest": "08-15"},
            {"name": "Rye", "planting": "10-01", "harvest": "06-30"},
            {"name": "Spelt", "planting": "09-15", "harvest": "07-15", "crosses_year": true}
        ]"#;
        let table: CropTable = serde_json::from_str(json).unwrap();
        assert!(table.validate().is_ok());
        assert_eq!(table.get("rye").unwrap().planting.to_string(), "10-01");
        assert!(table.get("rye").unwrap().crosses_year);
        assert!(!table.get("barley").unwrap().crosses_year);

        let contradicting = r#"[{"name": "Oats", "planting": "03-15", "harvest": "08-15", "crosses_year": true}]"#;
        let table: CropTable = serde_json::from_str(contradicting).unwrap();
        assert!(table.validate().is_err());

        let bad = r#"[{"name": "Oats", "planting": "3/15", "harvest": "08-15"}]"#;
        assert!(serde_json::from_str::<CropTable>(bad).is_err());
    }
}
