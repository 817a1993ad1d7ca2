//! HTTP trends client with rate limiting and retry
//!
//! Talks to a Google-Trends-compatible timeline endpoint. Requests are
//! throttled through a governor rate limiter and retried with jittered
//! exponential backoff on transient failures. Response bodies carry the
//! usual anti-hijacking guard prefix (`)]}',`), which is stripped before
//! JSON parsing. "Breakout" readings without a numeric score are mapped to
//! the breakout sentinel; rows with no value at all are treated as absent,
//! not zero.

use crate::config::SourceConfig;
use crate::models::BREAKOUT_VALUE;
use crate::source::{InterestPoint, InterestSource, SourceError};
use crate::utils::retry::{with_retry_if, RetryConfig};
use async_trait::async_trait;
use chrono::DateTime;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize)]
struct TimelineResponse {
    default: TimelineDefault,
}

#[derive(Debug, Deserialize)]
struct TimelineDefault {
    #[serde(rename = "timelineData")]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    /// Unix timestamp in seconds, as a string
    time: String,

    #[serde(default)]
    value: Vec<Option<f64>>,

    #[serde(default, rename = "formattedValue")]
    formatted_value: Vec<String>,
}

/// Rate-limited, retrying interest source over HTTP
pub struct TrendsClient {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    retry: RetryConfig,
    endpoint: String,
    geo: String,
}

impl TrendsClient {
    /// Create a client from source configuration
    ///
    /// # Errors
    ///
    /// Returns `SourceError::InvalidEndpoint` when the configured endpoint
    /// is not a valid URL, or `SourceError::Http` when the HTTP client
    /// cannot be built.
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        Url::parse(&config.endpoint)
            .map_err(|e| SourceError::InvalidEndpoint(format!("{}: {e}", config.endpoint)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .build()?;

        let rate = NonZeroU32::new(config.rate_limit.max(1)).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            retry: RetryConfig::new(config.max_retries),
            endpoint: config.endpoint.clone(),
            geo: config.geo.clone(),
        })
    }

    /// Single fetch attempt, no retry
    async fn fetch_once(&self, keyword: &str) -> Result<Option<Vec<InterestPoint>>, SourceError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", keyword), ("geo", &self.geo)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Timeout
                } else {
                    SourceError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::ServerError(status.as_u16()));
        }

        let body = response.text().await?;
        parse_timeline(&body)
    }
}

#[async_trait]
impl InterestSource for TrendsClient {
    async fn interest_over_time(
        &self,
        keyword: &str,
    ) -> Result<Option<Vec<InterestPoint>>, SourceError> {
        self.rate_limiter.until_ready().await;

        with_retry_if(
            &self.retry,
            || self.fetch_once(keyword),
            SourceError::is_recoverable,
        )
        .await
    }
}

/// Strip the JSON guard prefix some trends endpoints prepend
fn strip_guard(body: &str) -> &str {
    body.trim_start()
        .trim_start_matches(")]}'")
        .trim_start_matches(|c| c == ',' || c == '\n' || c == '\r')
}

/// Parse a timeline response body into interest points
///
/// An empty timeline means the source has no data for the keyword. Rows
/// without a numeric value and without a breakout marker are skipped.
fn parse_timeline(body: &str) -> Result<Option<Vec<InterestPoint>>, SourceError> {
    let response: TimelineResponse = serde_json::from_str(strip_guard(body))
        .map_err(|e| SourceError::Decode(format!("Invalid timeline JSON: {e}")))?;

    if response.default.timeline_data.is_empty() {
        return Ok(None);
    }

    let mut points = Vec::new();
    for row in &response.default.timeline_data {
        let value = if row.formatted_value.iter().any(|v| v == "Breakout") {
            BREAKOUT_VALUE
        } else {
            match row.value.first().copied().flatten() {
                Some(v) => v,
                None => continue,
            }
        };

        let secs: i64 = row
            .time
            .parse()
            .map_err(|_| SourceError::Decode(format!("Invalid timestamp: {}", row.time)))?;
        let date = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| SourceError::Decode(format!("Timestamp out of range: {secs}")))?
            .date_naive();

        points.push(InterestPoint { date, value });
    }

    if points.is_empty() {
        return Ok(None);
    }
    Ok(Some(points))
}
