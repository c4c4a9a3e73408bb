//! Drought episode detection
//!
//! Scans one region's daily precipitation over a growing season, in date
//! order, and emits every dry run of at least five days that is closed by a
//! wet day.
//!
//! State machine:
//!   - `NotInRun` + dry day  -> `Dry { run_length: 1, run_start: day }`
//!   - `Dry` + dry day       -> `Dry { run_length + 1, .. }`
//!   - `Dry` + wet day       -> episode (if run_length >= 5) ending on the wet
//!                              day, then `NotInRun`
//!   - `NotInRun` + wet day  -> `NotInRun`
//!
//! A run still open when the season ends is dropped: an episode only counts
//! once rain has been observed to end it.

use chrono::NaiveDate;
use serde::Serialize;

use crate::severity::{severity, SeverityBucket};

/// Daily amount (inches) at or below which a day counts as dry
pub const DEFAULT_DRY_THRESHOLD_IN: f64 = 0.00005;

/// A qualifying dry run, closed by the first wet day after it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroughtEpisode {
    /// First dry day
    pub start: NaiveDate,
    /// First wet day after the run
    pub end: NaiveDate,
    /// Number of dry days (the closing wet day is not counted)
    pub length_days: u32,
    pub severity: SeverityBucket,
}

impl DroughtEpisode {
    /// "1995-06-02 to 1995-06-12"
    pub fn period_label(&self) -> String {
        format!("{} to {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotInRun,
    Dry { run_length: u32, run_start: NaiveDate },
}

/// Incremental detector; feed days strictly in chronological order.
#[derive(Debug, Clone)]
pub struct EpisodeDetector {
    threshold: f64,
    state: RunState,
}

impl EpisodeDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            state: RunState::NotInRun,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Inclusive: an amount exactly at the threshold is dry.
    pub fn is_dry(&self, amount: f64) -> bool {
        amount <= self.threshold
    }

    /// Advance by one day. Returns the episode this day closes, if any.
    pub fn step(&mut self, day: NaiveDate, amount: f64) -> Option<DroughtEpisode> {
        if self.is_dry(amount) {
            self.state = match self.state {
                RunState::NotInRun => RunState::Dry {
                    run_length: 1,
                    run_start: day,
                },
                RunState::Dry { run_length, run_start } => RunState::Dry {
                    run_length: run_length + 1,
                    run_start,
                },
            };
            return None;
        }

        let closed = match self.state {
            RunState::Dry { run_length, run_start } => {
                severity(run_length).map(|bucket| DroughtEpisode {
                    start: run_start,
                    end: day,
                    length_days: run_length,
                    severity: bucket,
                })
            }
            RunState::NotInRun => None,
        };

        self.state = RunState::NotInRun;
        closed
    }

    /// Length of the dry run still open, if any. Never becomes an episode.
    pub fn open_run_days(&self) -> u32 {
        match self.state {
            RunState::Dry { run_length, .. } => run_length,
            RunState::NotInRun => 0,
        }
    }
}

/// Everything one pass over a season produces
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonScan {
    /// Closed episodes in chronological order
    pub episodes: Vec<DroughtEpisode>,
    /// Dry days at the end of the season with no closing wet day
    pub trailing_dry_days: u32,
    /// Sum of all daily amounts in the season, inches
    pub total_precipitation_in: f64,
    /// Number of days scanned
    pub days: usize,
}

/// Scan a season of `(date, amount)` readings in order.
pub fn scan_season<I>(readings: I, threshold: f64) -> SeasonScan
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    let mut detector = EpisodeDetector::new(threshold);
    let mut episodes = Vec::new();
    let mut total_precipitation_in = 0.0;
    let mut days = 0;

    for (day, amount) in readings {
        days += 1;
        total_precipitation_in += amount;
        if let Some(episode) = detector.step(day, amount) {
            episodes.push(episode);
        }
    }

    SeasonScan {
        episodes,
        trailing_dry_days: detector.open_run_days(),
        total_precipitation_in,
        days,
    }
}
