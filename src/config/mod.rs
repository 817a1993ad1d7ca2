//! Configuration management
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use crate::models::Granularity;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Interest data source configuration
    pub source: SourceConfig,

    /// Analysis pipeline configuration
    pub analysis: AnalysisConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Interest source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Trends timeline endpoint URL
    pub endpoint: String,

    /// Geographic region code (e.g. "KR")
    pub geo: String,

    /// Rate limit (requests per second)
    pub rate_limit: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Maximum number of retry attempts per keyword
    pub max_retries: u32,
}

/// Analysis pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Period granularity for the whole run
    pub granularity: Granularity,

    /// Minimum overlapping periods for a category to be correlated
    pub min_overlap: usize,

    /// Absolute-correlation threshold below which a pattern is "none"
    pub pattern_threshold: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::Monthly,
            min_overlap: crate::analysis::MIN_OVERLAP,
            pattern_threshold: crate::analysis::DEFAULT_PATTERN_THRESHOLD,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("HEUREUM_ENDPOINT").unwrap_or_else(|_| {
            String::from("https://trends.google.com/trends/api/widgetdata/multiline")
        });

        let geo = std::env::var("HEUREUM_GEO").unwrap_or_else(|_| String::from("KR"));

        let rate_limit = std::env::var("HEUREUM_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let request_timeout_secs = std::env::var("HEUREUM_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let max_retries = std::env::var("HEUREUM_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let granularity = std::env::var("HEUREUM_GRANULARITY")
            .ok()
            .and_then(|v| Granularity::parse(&v))
            .unwrap_or(Granularity::Monthly);

        let min_overlap = std::env::var("HEUREUM_MIN_OVERLAP")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(crate::analysis::MIN_OVERLAP);

        let pattern_threshold = std::env::var("HEUREUM_PATTERN_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(crate::analysis::DEFAULT_PATTERN_THRESHOLD);

        let log_level = std::env::var("HEUREUM_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));
        let log_format =
            std::env::var("HEUREUM_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            source: SourceConfig {
                endpoint,
                geo,
                rate_limit,
                request_timeout_secs,
                max_retries,
            },
            analysis: AnalysisConfig {
                granularity,
                min_overlap,
                pattern_threshold,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.source.endpoint.is_empty() {
            anyhow::bail!("source endpoint must not be empty");
        }

        if self.source.rate_limit == 0 {
            anyhow::bail!("rate_limit must be greater than 0");
        }

        if self.analysis.min_overlap < 3 {
            anyhow::bail!("min_overlap must be at least 3 for a meaningful rank correlation");
        }

        if self.analysis.pattern_threshold <= 0.0 || self.analysis.pattern_threshold >= 1.0 {
            anyhow::bail!("pattern_threshold must be between 0 and 1 exclusive");
        }

        Ok(())
    }
}
