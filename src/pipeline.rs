//! End-to-end analysis pipeline
//!
//! Composes the pure stages into a single run: classify bestseller entries,
//! aggregate interest into category series, build the share and new-entries
//! tables, correlate each category, and generate insights. Every stage is
//! deterministic, so the same inputs always produce the same report.

use crate::analysis::{
    aggregate_interest, analyze_categories, generate_insights, new_entries, CorrelationResult,
    Insight, InterestSeries, NewEntryTable, ShareTable,
};
use crate::classify::{CategoryClassifier, ClassifyStats};
use crate::config::AnalysisConfig;
use crate::models::{BestsellerEntry, ClassifiedEntry, InterestRecord};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Everything one analysis run produces
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Bestseller entries with their assigned categories
    pub classified: Vec<ClassifiedEntry>,

    /// Classification quality summary
    pub classify_stats: ClassifyStats,

    /// Per-category aligned interest series
    pub interest_series: BTreeMap<String, InterestSeries>,

    /// Per-period category share table (rows sum to 100)
    pub share: ShareTable,

    /// Per-period new-title counts
    pub new_entries: NewEntryTable,

    /// Per-category correlation results
    pub correlations: Vec<CorrelationResult>,

    /// Generated insight sentences
    pub insights: Vec<Insight>,
}

/// Run the full analysis over interest records and bestseller entries
pub fn run_analysis(
    records: &[InterestRecord],
    entries: &[BestsellerEntry],
    classifier: &CategoryClassifier,
    config: &AnalysisConfig,
) -> AnalysisReport {
    let classified = classifier.classify_entries(entries);
    let classify_stats = ClassifyStats::from_entries(&classified);
    info!(
        total = classify_stats.total,
        unclassified = classify_stats.unclassified,
        "Classified bestseller entries"
    );
    if classify_stats.unclassified_ratio() > 0.5 {
        warn!(
            ratio = %format!("{:.2}", classify_stats.unclassified_ratio()),
            samples = ?classify_stats.unclassified_samples,
            "More than half of the titles were unclassified, rules may need tuning"
        );
    }

    let interest_series = aggregate_interest(records);
    info!(categories = interest_series.len(), "Aggregated interest series");

    let share = ShareTable::from_entries(&classified);
    let new_entries = new_entries(&classified);
    info!(periods = share.len(), "Built share and new-entry tables");

    let correlations = analyze_categories(
        &interest_series,
        &share,
        config.min_overlap,
        config.pattern_threshold,
    );
    info!(results = correlations.len(), "Correlated categories");

    let insights = generate_insights(&correlations, &share);
    info!(insights = insights.len(), "Generated insights");

    AnalysisReport {
        classified,
        classify_stats,
        interest_series,
        share,
        new_entries,
        correlations,
        insights,
    }
}
