//! Drought severity buckets
//!
//! Duration-only classification. The buckets partition `[5, ∞)` days with
//! half-open upper bounds: Short 5-8, Medium 9-14, Long 15+.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shortest dry run that counts as a drought episode, in days
pub const MIN_EPISODE_DAYS: u32 = 5;

/// First length classified as Medium
pub const MEDIUM_MIN_DAYS: u32 = 9;

/// First length classified as Long
pub const LONG_MIN_DAYS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityBucket {
    Short,
    Medium,
    Long,
}

impl SeverityBucket {
    pub const ALL: [SeverityBucket; 3] =
        [SeverityBucket::Short, SeverityBucket::Medium, SeverityBucket::Long];

    /// Stable array index (Short = 0, Medium = 1, Long = 2)
    pub fn index(self) -> usize {
        match self {
            SeverityBucket::Short => 0,
            SeverityBucket::Medium => 1,
            SeverityBucket::Long => 2,
        }
    }

    /// Column suffix used in the output table ("S", "M", "L")
    pub fn suffix(self) -> &'static str {
        match self {
            SeverityBucket::Short => "S",
            SeverityBucket::Medium => "M",
            SeverityBucket::Long => "L",
        }
    }
}

impl fmt::Display for SeverityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeverityBucket::Short => write!(f, "Short"),
            SeverityBucket::Medium => write!(f, "Medium"),
            SeverityBucket::Long => write!(f, "Long"),
        }
    }
}

/// Classify a dry run by its length in days.
///
/// Returns `None` for runs shorter than [`MIN_EPISODE_DAYS`], which never
/// qualify as episodes.
pub fn severity(length_days: u32) -> Option<SeverityBucket> {
    match length_days {
        d if d < MIN_EPISODE_DAYS => None,
        d if d < MEDIUM_MIN_DAYS => Some(SeverityBucket::Short),
        d if d < LONG_MIN_DAYS => Some(SeverityBucket::Medium),
        _ => Some(SeverityBucket::Long),
    }
}
