//! Period-level series aggregation
//!
//! Two independent reductions feed the correlation engine:
//!
//! - interest aggregation: raw per-keyword interest records are averaged into
//!   one value per (period, category), collapsing several keyword sub-series
//!   into a single category-level series;
//! - share aggregation: classified bestseller entries are counted per
//!   (period, category) and converted into percentage shares of the period.
//!
//! Both reductions return fresh immutable tables; nothing is accumulated
//! across calls. Values retain full precision here, rounding happens only at
//! the export/report boundary.

use crate::models::{ClassifiedEntry, InterestRecord, PeriodKey};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Per-category time series keyed chronologically
pub type InterestSeries = BTreeMap<PeriodKey, f64>;

/// Average interest records into per-category period series
///
/// Records sharing a (period, category) key are averaged across keywords.
pub fn aggregate_interest(records: &[InterestRecord]) -> BTreeMap<String, InterestSeries> {
    let mut sums: BTreeMap<(String, PeriodKey), (f64, u32)> = BTreeMap::new();

    for record in records {
        let entry = sums
            .entry((record.category.clone(), record.period.clone()))
            .or_insert((0.0, 0));
        entry.0 += record.value;
        entry.1 += 1;
    }

    let mut series: BTreeMap<String, InterestSeries> = BTreeMap::new();
    for ((category, period), (sum, count)) in sums {
        series
            .entry(category)
            .or_default()
            .insert(period, sum / f64::from(count));
    }

    series
}

/// Per-period category share table
///
/// Each row holds the percentage of that period's entries belonging to each
/// category; rows sum to 100 within floating-point tolerance. Periods with
/// zero entries are omitted entirely rather than emitted as all-zero rows,
/// so the sum-to-100 invariant holds for every row that exists.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShareTable {
    rows: BTreeMap<PeriodKey, BTreeMap<String, f64>>,
    categories: BTreeSet<String>,
}

impl ShareTable {
    /// Build the share table from classified entries
    pub fn from_entries(entries: &[ClassifiedEntry]) -> Self {
        let mut counts: BTreeMap<PeriodKey, BTreeMap<String, u32>> = BTreeMap::new();
        let mut categories = BTreeSet::new();

        for entry in entries {
            *counts
                .entry(entry.period.clone())
                .or_default()
                .entry(entry.category.clone())
                .or_insert(0) += 1;
            categories.insert(entry.category.clone());
        }

        let rows = counts
            .into_iter()
            .map(|(period, by_category)| {
                let total: u32 = by_category.values().sum();
                let shares = by_category
                    .into_iter()
                    .map(|(category, count)| {
                        (category, f64::from(count) / f64::from(total) * 100.0)
                    })
                    .collect();
                (period, shares)
            })
            .collect();

        Self { rows, categories }
    }

    /// All periods present, in chronological order
    pub fn periods(&self) -> impl Iterator<Item = &PeriodKey> {
        self.rows.keys()
    }

    /// All categories seen anywhere in the table
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Share for one (period, category) cell
    ///
    /// Returns 0.0 when the period exists but the category had no entries
    /// that period, and `None` when the period itself is absent.
    pub fn share(&self, period: &PeriodKey, category: &str) -> Option<f64> {
        self.rows
            .get(period)
            .map(|row| row.get(category).copied().unwrap_or(0.0))
    }

    /// Full share series for one category over every period in the table
    ///
    /// Periods where the category had no entries contribute 0.0, matching
    /// the zero-filled pivot the correlation engine aligns against.
    pub fn series(&self, category: &str) -> InterestSeries {
        self.rows
            .iter()
            .map(|(period, row)| {
                (period.clone(), row.get(category).copied().unwrap_or(0.0))
            })
            .collect()
    }

    /// One full row, if the period exists
    pub fn row(&self, period: &PeriodKey) -> Option<&BTreeMap<String, f64>> {
        self.rows.get(period)
    }

    /// Number of periods in the table
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no periods at all
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(s: &str) -> PeriodKey {
        PeriodKey::parse(s).unwrap()
    }

    fn record(p: &str, keyword: &str, category: &str, value: f64) -> InterestRecord {
        InterestRecord {
            period: period(p),
            keyword: keyword.to_string(),
            category: category.to_string(),
            value,
        }
    }

    fn entry(p: &str, title: &str, category: &str) -> ClassifiedEntry {
        ClassifiedEntry {
            period: period(p),
            title: title.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_interest_averages_across_keywords() {
        let records = vec![
            record("2024-01", "주식", "주식/ETF", 40.0),
            record("2024-01", "배당", "주식/ETF", 60.0),
            record("2024-02", "주식", "주식/ETF", 30.0),
        ];

        let series = aggregate_interest(&records);
        let stock = &series["주식/ETF"];

        assert!((stock[&period("2024-01")] - 50.0).abs() < 1e-9);
        assert!((stock[&period("2024-02")] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_interest_categories_are_independent() {
        let records = vec![
            record("2024-01", "주식", "주식/ETF", 40.0),
            record("2024-01", "금리", "거시경제/금리/인플레", 80.0),
        ];

        let series = aggregate_interest(&records);
        assert_eq!(series.len(), 2);
        assert!((series["거시경제/금리/인플레"][&period("2024-01")] - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_share_rows_sum_to_100() {
        let entries = vec![
            entry("2024-01", "a", "주식/ETF"),
            entry("2024-01", "b", "주식/ETF"),
            entry("2024-01", "c", "부동산/주거"),
            entry("2024-02", "d", "부동산/주거"),
        ];

        let share = ShareTable::from_entries(&entries);
        for p in share.periods() {
            let row = share.row(p).unwrap();
            let total: f64 = row.values().sum();
            assert!((total - 100.0).abs() < 0.01, "row {p} sums to {total}");
        }
    }

    #[test]
    fn test_share_values() {
        let entries = vec![
            entry("2024-01", "a", "주식/ETF"),
            entry("2024-01", "b", "주식/ETF"),
            entry("2024-01", "c", "부동산/주거"),
            entry("2024-01", "d", "부동산/주거"),
        ];

        let share = ShareTable::from_entries(&entries);
        assert_eq!(share.share(&period("2024-01"), "주식/ETF"), Some(50.0));
        assert_eq!(share.share(&period("2024-01"), "부동산/주거"), Some(50.0));
    }

    #[test]
    fn test_missing_category_reads_zero() {
        let entries = vec![
            entry("2024-01", "a", "주식/ETF"),
            entry("2024-02", "b", "부동산/주거"),
        ];

        let share = ShareTable::from_entries(&entries);
        assert_eq!(share.share(&period("2024-02"), "주식/ETF"), Some(0.0));

        let series = share.series("주식/ETF");
        assert_eq!(series.len(), 2);
        assert!((series[&period("2024-02")]).abs() < 1e-9);
    }

    #[test]
    fn test_empty_periods_are_omitted() {
        let entries = vec![entry("2024-01", "a", "주식/ETF")];
        let share = ShareTable::from_entries(&entries);

        assert_eq!(share.len(), 1);
        assert_eq!(share.share(&period("2024-02"), "주식/ETF"), None);
    }

    #[test]
    fn test_empty_input_yields_empty_table() {
        let share = ShareTable::from_entries(&[]);
        assert!(share.is_empty());
        assert!(share.categories().is_empty());
    }
}
