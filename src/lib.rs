//! heureum - Korean book market trend correlation
//!
//! Aligns search-interest time series against bestseller category shares and
//! measures whether interest moves with the market in the same period or one
//! period ahead.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`source`] - Search-interest collection with rate limiting and retry
//! - [`classify`] - Book title category classification
//! - [`analysis`] - Aggregation, correlation, and insight generation
//! - [`export`] - CSV import and export of the artifact tables
//! - [`pipeline`] - End-to-end analysis composition
//! - [`models`] - Core data structures and types
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use heureum::classify::{korean_book_rules, CategoryClassifier};
//! use heureum::config::AnalysisConfig;
//! use heureum::pipeline::run_analysis;
//!
//! fn main() -> anyhow::Result<()> {
//!     let classifier = CategoryClassifier::new(&korean_book_rules())?;
//!     let report = run_analysis(&[], &[], &classifier, &AnalysisConfig::default());
//!     println!("{} insights", report.insights.len());
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod source;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analysis::{CorrelationResult, Insight, Pattern, ShareTable};
    pub use crate::classify::{CategoryClassifier, ClassifyStats};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::models::{BestsellerEntry, ClassifiedEntry, Granularity, InterestRecord, PeriodKey};
    pub use crate::pipeline::{run_analysis, AnalysisReport};
    pub use crate::source::{InterestSource, TrendsClient};
}

// Direct re-exports for convenience
pub use models::{BestsellerEntry, ClassifiedEntry, Granularity, InterestRecord, PeriodKey};
