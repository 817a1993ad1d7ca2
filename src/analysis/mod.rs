//! Analysis pipeline stages: aggregation, new-entry detection, correlation,
//! and insight generation

pub mod aggregate;
pub mod correlation;
pub mod insights;
pub mod new_entries;

pub use aggregate::{aggregate_interest, InterestSeries, ShareTable};
pub use correlation::{
    analyze_categories, correlate, spearman, CorrelationResult, Pattern,
    DEFAULT_PATTERN_THRESHOLD, MIN_OVERLAP,
};
pub use insights::{generate_insights, Insight};
pub use new_entries::{new_entries, NewEntryTable};
