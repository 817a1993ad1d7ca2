//! New-entry detection across consecutive periods
//!
//! A title is a new entry for a period when it appears on that period's list
//! but not on the immediately preceding one. The first period in the data has
//! no predecessor to diff against and therefore produces no row, by design.

use crate::models::{ClassifiedEntry, PeriodKey};
use std::collections::{BTreeMap, HashSet};

/// Per-period, per-category counts of newly entered titles
pub type NewEntryTable = BTreeMap<PeriodKey, BTreeMap<String, u32>>;

/// Count titles appearing in each period that were absent the period before
///
/// Periods are processed in chronological key order, not input order. Titles
/// are compared by exact text identity.
pub fn new_entries(entries: &[ClassifiedEntry]) -> NewEntryTable {
    let mut by_period: BTreeMap<&PeriodKey, Vec<&ClassifiedEntry>> = BTreeMap::new();
    for entry in entries {
        by_period.entry(&entry.period).or_default().push(entry);
    }

    let mut table = NewEntryTable::new();
    let mut previous_titles: Option<HashSet<&str>> = None;

    for (period, period_entries) in &by_period {
        let titles: HashSet<&str> = period_entries.iter().map(|e| e.title.as_str()).collect();

        if let Some(prev) = &previous_titles {
            let mut counts: BTreeMap<String, u32> = BTreeMap::new();
            let mut seen: HashSet<&str> = HashSet::new();
            for entry in period_entries {
                if !prev.contains(entry.title.as_str()) && seen.insert(entry.title.as_str()) {
                    *counts.entry(entry.category.clone()).or_insert(0) += 1;
                }
            }
            table.insert((*period).clone(), counts);
        }

        previous_titles = Some(titles);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(s: &str) -> PeriodKey {
        PeriodKey::parse(s).unwrap()
    }

    fn entry(p: &str, title: &str, category: &str) -> ClassifiedEntry {
        ClassifiedEntry {
            period: period(p),
            title: title.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_first_period_produces_no_row() {
        let entries = vec![entry("2024-01", "a", "주식/ETF")];
        let table = new_entries(&entries);
        assert!(table.is_empty());
    }

    #[test]
    fn test_new_titles_counted_by_category() {
        let entries = vec![
            entry("2024-01", "a", "주식/ETF"),
            entry("2024-01", "b", "부동산/주거"),
            entry("2024-02", "a", "주식/ETF"),
            entry("2024-02", "c", "주식/ETF"),
            entry("2024-02", "d", "부동산/주거"),
        ];

        let table = new_entries(&entries);
        let feb = &table[&period("2024-02")];

        // "a" carried over; "c" and "d" are new
        assert_eq!(feb.get("주식/ETF"), Some(&1));
        assert_eq!(feb.get("부동산/주거"), Some(&1));
    }

    #[test]
    fn test_unchanged_list_yields_empty_row() {
        let entries = vec![
            entry("2024-01", "a", "주식/ETF"),
            entry("2024-02", "a", "주식/ETF"),
        ];

        let table = new_entries(&entries);
        assert!(table[&period("2024-02")].is_empty());
    }

    #[test]
    fn test_chronological_order_independent_of_input_order() {
        // February listed before January in the input
        let entries = vec![
            entry("2024-02", "b", "주식/ETF"),
            entry("2024-01", "a", "주식/ETF"),
        ];

        let table = new_entries(&entries);

        // January is the true first period, so only February gets a row
        assert_eq!(table.len(), 1);
        assert_eq!(table[&period("2024-02")].get("주식/ETF"), Some(&1));
    }

    #[test]
    fn test_diff_is_against_immediate_predecessor_only() {
        let entries = vec![
            entry("2024-01", "a", "주식/ETF"),
            entry("2024-02", "b", "주식/ETF"),
            // "a" returns in March after skipping February: counts as new
            entry("2024-03", "a", "주식/ETF"),
        ];

        let table = new_entries(&entries);
        assert_eq!(table[&period("2024-03")].get("주식/ETF"), Some(&1));
    }

    #[test]
    fn test_duplicate_titles_counted_once() {
        let entries = vec![
            entry("2024-01", "a", "주식/ETF"),
            entry("2024-02", "b", "주식/ETF"),
            entry("2024-02", "b", "주식/ETF"),
        ];

        let table = new_entries(&entries);
        assert_eq!(table[&period("2024-02")].get("주식/ETF"), Some(&1));
    }
}
