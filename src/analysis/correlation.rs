//! Correlation engine for interest-vs-share pattern classification
//!
//! For each category the engine aligns the interest series and the share
//! series on their common periods, computes Spearman rank correlation both
//! concurrently and at one period of lag (interest at t against share at
//! t+1), and classifies the relationship into a behavioral pattern.
//!
//! The engine is total over its inputs: statistical degeneracies (constant
//! series, too few lag pairs) fall back to `corr = 0, p = 1` instead of
//! erroring, because the output feeds a qualitative narrative rather than a
//! statistical claim. The only way a category disappears from the result set
//! is the minimum-overlap exclusion, which is logged at debug level.

use crate::analysis::aggregate::{InterestSeries, ShareTable};
use crate::classify::UNCLASSIFIED;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::BTreeMap;
use tracing::debug;

/// Minimum number of overlapping periods for a category to be analyzed
pub const MIN_OVERLAP: usize = 3;

/// Default absolute-correlation threshold below which a pattern is "none"
pub const DEFAULT_PATTERN_THRESHOLD: f64 = 0.3;

/// Qualitative interest/share relationship for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    /// Search interest and share move together within the same period
    Concurrent,

    /// Share follows search interest with one period of lag
    Lagged,

    /// No meaningful correlation either way
    None,
}

impl Pattern {
    /// Apply the pattern decision rule to a correlation pair
    ///
    /// Order matters: the below-threshold check runs first, then the two
    /// correlations are compared as **signed** values, not magnitudes. A
    /// strongly negative concurrent correlation therefore loses to a weakly
    /// positive lagged one, and an exact tie classifies as lagged.
    pub fn classify(corr_concurrent: f64, corr_lagged: f64, threshold: f64) -> Self {
        if corr_concurrent.abs() < threshold && corr_lagged.abs() < threshold {
            Self::None
        } else if corr_concurrent > corr_lagged {
            Self::Concurrent
        } else {
            Self::Lagged
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concurrent => "concurrent",
            Self::Lagged => "lagged",
            Self::None => "none",
        }
    }

    /// Get Korean name
    pub fn korean_name(&self) -> &'static str {
        match self {
            Self::Concurrent => "동행형",
            Self::Lagged => "지연형",
            Self::None => "무관형",
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Correlation summary for one category with sufficient data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub category: String,
    pub corr_concurrent: f64,
    pub p_concurrent: f64,
    pub corr_lagged: f64,
    pub p_lagged: f64,
    pub pattern: Pattern,
    /// Mean interest over the aligned periods
    pub trend_avg: f64,
    /// Mean share over the aligned periods
    pub share_avg: f64,
}

/// Assign average ranks to a series, ties sharing their mean rank
fn rank(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && (indexed[j].1 - indexed[i].1).abs() < 1e-10 {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 0.5;
        for k in i..j {
            ranks[indexed[k].0] = avg_rank;
        }
        i = j;
    }

    ranks
}

/// Pearson correlation, `None` when either series has zero variance
fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x: f64 = x.iter().sum::<f64>() / n;
    let mean_y: f64 = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Two-sided p-value for a correlation coefficient via Student's t
///
/// With fewer than three pairs significance cannot be assessed and the
/// p-value is 1. A perfect correlation has p = 0.
fn p_value(r: f64, n: usize) -> f64 {
    if n < 3 {
        return 1.0;
    }
    if r.abs() >= 1.0 - 1e-12 {
        return 0.0;
    }

    let dof = (n - 2) as f64;
    let t = r.abs() * (dof / (1.0 - r * r)).sqrt();
    match StudentsT::new(0.0, 1.0, dof) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t)),
        Err(_) => 1.0,
    }
}

/// Spearman rank correlation with two-sided p-value
///
/// Returns `None` for degenerate inputs (mismatched lengths, fewer than two
/// pairs, or zero rank variance); the caller maps that to the `(0, 1)`
/// fallback.
pub fn spearman(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let r = pearson(&rank(x), &rank(y))?;
    Some((r, p_value(r, x.len())))
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Correlate one category's interest series against its share series
///
/// Returns `None` when fewer than `min_overlap` periods are common to both
/// series; no partial record is emitted for such categories.
pub fn correlate(
    category: &str,
    interest: &InterestSeries,
    share: &InterestSeries,
    min_overlap: usize,
    threshold: f64,
) -> Option<CorrelationResult> {
    // BTreeMap keys iterate chronologically, so the intersection is ordered.
    let common: Vec<_> = interest.keys().filter(|k| share.contains_key(*k)).collect();

    if common.len() < min_overlap {
        debug!(
            category = %category,
            overlap = common.len(),
            min_overlap = min_overlap,
            "Excluding category with insufficient overlapping periods"
        );
        return None;
    }

    let trend: Vec<f64> = common.iter().map(|k| interest[*k]).collect();
    let shares: Vec<f64> = common.iter().map(|k| share[*k]).collect();

    let (corr_concurrent, p_concurrent) = spearman(&trend, &shares).unwrap_or((0.0, 1.0));

    // Lag-1: interest at position t paired with share at position t+1 within
    // the aligned window. Fewer than two pairs falls back to (0, 1).
    let n = trend.len();
    let (corr_lagged, p_lagged) = spearman(&trend[..n - 1], &shares[1..]).unwrap_or((0.0, 1.0));

    let pattern = Pattern::classify(corr_concurrent, corr_lagged, threshold);

    Some(CorrelationResult {
        category: category.to_string(),
        corr_concurrent: round3(corr_concurrent),
        p_concurrent: round3(p_concurrent),
        corr_lagged: round3(corr_lagged),
        p_lagged: round3(p_lagged),
        pattern,
        trend_avg: round1(trend.iter().sum::<f64>() / n as f64),
        share_avg: round1(shares.iter().sum::<f64>() / n as f64),
    })
}

/// Run the correlation engine over every analyzable category
///
/// Categories are taken from the share table in sorted order (so the result
/// order is deterministic), skipping the unclassified bucket and categories
/// with no interest series at all.
pub fn analyze_categories(
    interest_by_category: &BTreeMap<String, InterestSeries>,
    share: &ShareTable,
    min_overlap: usize,
    threshold: f64,
) -> Vec<CorrelationResult> {
    share
        .categories()
        .iter()
        .filter(|category| category.as_str() != UNCLASSIFIED)
        .filter_map(|category| {
            let interest = interest_by_category.get(category)?;
            correlate(
                category,
                interest,
                &share.series(category),
                min_overlap,
                threshold,
            )
        })
        .collect()
}
