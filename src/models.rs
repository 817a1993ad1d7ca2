// Core data structures for heureum market trend analysis

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Sentinel value substituted for "breakout" interest readings that have no
/// numeric score from the source.
pub const BREAKOUT_VALUE: f64 = 10_000.0;

/// Aggregation window granularity
///
/// A pipeline run uses exactly one granularity; monthly and weekly keys are
/// never mixed within the same run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Monthly,
    Weekly,
}

impl Granularity {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
        }
    }

    /// Create from string (supports both English and Korean names)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "monthly" | "month" | "월별" => Some(Self::Monthly),
            "weekly" | "week" | "주별" => Some(Self::Weekly),
            _ => None,
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Chronologically ordered period token
///
/// Monthly keys render as `YYYY-MM`, weekly keys as `YYYY-Www` (ISO week).
/// Both are zero-padded and fixed-width, so lexicographic ordering of the
/// underlying string equals chronological ordering. Everything downstream
/// relies on this: aligned series are `BTreeMap`s keyed by `PeriodKey`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodKey(String);

impl PeriodKey {
    /// Normalize a date into a period key at the given granularity
    pub fn from_date(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Monthly => Self(format!("{:04}-{:02}", date.year(), date.month())),
            Granularity::Weekly => {
                let iso = date.iso_week();
                Self(format!("{:04}-W{:02}", iso.year(), iso.week()))
            }
        }
    }

    /// Parse an already-normalized key, validating its shape
    ///
    /// Accepts `YYYY-MM` (month 01-12) and `YYYY-Www` (week 01-53).
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() < 7 || !bytes[..4].iter().all(u8::is_ascii_digit) || bytes[4] != b'-' {
            return None;
        }

        let rest = &s[5..];
        if let Some(week) = rest.strip_prefix('W') {
            let n: u32 = week.parse().ok()?;
            if week.len() == 2 && (1..=53).contains(&n) {
                return Some(Self(s.to_string()));
            }
            return None;
        }

        let n: u32 = rest.parse().ok()?;
        if rest.len() == 2 && (1..=12).contains(&n) {
            return Some(Self(s.to_string()));
        }
        None
    }

    /// Get string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One search-interest sample for a keyword within a period
///
/// Produced by the interest source, one record per (keyword, period). Many
/// keywords map onto one category; the aggregator averages them into a
/// category-level series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestRecord {
    pub period: PeriodKey,
    pub keyword: String,
    pub category: String,
    /// Interest value on the source's 0-100 scale, or [`BREAKOUT_VALUE`]
    pub value: f64,
}

/// One bestseller list entry as loaded from the input CSV
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestsellerEntry {
    pub period: PeriodKey,
    pub rank: u32,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
}

/// A bestseller entry after category classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedEntry {
    pub period: PeriodKey,
    pub title: String,
    pub category: String,
}
