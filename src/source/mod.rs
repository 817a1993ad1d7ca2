//! Pluggable search-interest data source
//!
//! The analysis core never talks to the network itself; it consumes
//! [`InterestRecord`]s produced here. A source returns, per keyword, either a
//! raw time-indexed value series or an explicit "no data" result. Transient
//! failures are retried inside the source; a keyword that still fails is
//! recorded as absent and never aborts the run.

pub mod client;

pub use client::TrendsClient;

use crate::models::{Granularity, InterestRecord, PeriodKey};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while fetching interest data
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server error with status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Response body could not be decoded
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Configured endpoint is not a valid URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl SourceError {
    /// Check if this error is transient and worth retrying
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::ServerError(status) => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Decode(_) | Self::InvalidEndpoint(_) => false,
        }
    }
}

/// One raw interest sample as delivered by the source
#[derive(Debug, Clone, PartialEq)]
pub struct InterestPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A source of per-keyword search-interest time series
#[async_trait]
pub trait InterestSource: Send + Sync {
    /// Fetch the raw interest series for one keyword
    ///
    /// `Ok(None)` means the source explicitly reported no data for the
    /// keyword; it is not an error.
    async fn interest_over_time(
        &self,
        keyword: &str,
    ) -> Result<Option<Vec<InterestPoint>>, SourceError>;
}

/// Default keyword map for the Korean economy/business book market
///
/// Keys are the categories the classifier emits; values are the search
/// keywords whose interest is averaged into that category's series.
pub fn default_keyword_map() -> BTreeMap<String, Vec<String>> {
    let entries: [(&str, &[&str]); 6] = [
        ("부동산/주거", &["부동산", "아파트", "청약"]),
        ("주식/ETF", &["주식", "ETF", "배당", "나스닥"]),
        ("암호화폐/디지털자산", &["비트코인", "암호화폐", "이더리움"]),
        ("거시경제/금리/인플레", &["금리", "인플레이션", "환율", "물가"]),
        ("은퇴/연금/노후", &["연금", "은퇴", "국민연금"]),
        ("경영전략/조직/리더십", &["경영전략", "마케팅", "스타트업"]),
    ];

    entries
        .iter()
        .map(|(category, keywords)| {
            (
                category.to_string(),
                keywords.iter().map(|k| k.to_string()).collect(),
            )
        })
        .collect()
}

/// Collect interest records for every keyword in the map
///
/// Raw samples are bucketed into periods at the given granularity and
/// averaged, yielding one record per (keyword, period). A keyword whose
/// fetch fails after retries is logged and skipped; the run always
/// completes with whatever data was obtainable.
pub async fn collect_interest<S: InterestSource + ?Sized>(
    source: &S,
    keyword_map: &BTreeMap<String, Vec<String>>,
    granularity: Granularity,
) -> Vec<InterestRecord> {
    let mut records = Vec::new();

    for (category, keywords) in keyword_map {
        info!(category = %category, keywords = keywords.len(), "Collecting category interest");

        for keyword in keywords {
            match source.interest_over_time(keyword).await {
                Ok(Some(points)) => {
                    let before = records.len();
                    records.extend(bucket_points(&points, keyword, category, granularity));
                    debug!(
                        keyword = %keyword,
                        periods = records.len() - before,
                        "Keyword series collected"
                    );
                }
                Ok(None) => {
                    debug!(keyword = %keyword, "No data for keyword");
                }
                Err(e) => {
                    warn!(keyword = %keyword, error = %e, "Keyword fetch failed, skipping");
                }
            }
        }
    }

    records
}

/// Average raw samples into one value per period
fn bucket_points(
    points: &[InterestPoint],
    keyword: &str,
    category: &str,
    granularity: Granularity,
) -> Vec<InterestRecord> {
    let mut sums: BTreeMap<PeriodKey, (f64, u32)> = BTreeMap::new();
    for point in points {
        let entry = sums
            .entry(PeriodKey::from_date(point.date, granularity))
            .or_insert((0.0, 0));
        entry.0 += point.value;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(period, (sum, count))| InterestRecord {
            period,
            keyword: keyword.to_string(),
            category: category.to_string(),
            value: sum / f64::from(count),
        })
        .collect()
}
