//! Common test utilities

use heureum::models::{BestsellerEntry, InterestRecord, PeriodKey};

/// Monthly period keys starting at 2024-01
pub fn months(count: u32) -> Vec<PeriodKey> {
    (1..=count)
        .map(|m| PeriodKey::parse(&format!("2024-{m:02}")).unwrap())
        .collect()
}

/// Create an interest record for a category (keyword matches category)
#[allow(dead_code)]
pub fn interest(period: &PeriodKey, category: &str, value: f64) -> InterestRecord {
    InterestRecord {
        period: period.clone(),
        keyword: category.to_string(),
        category: category.to_string(),
        value,
    }
}

/// Create a bestseller entry with the given title
pub fn entry(period: &PeriodKey, rank: u32, title: String) -> BestsellerEntry {
    BestsellerEntry {
        period: period.clone(),
        rank,
        title,
        subtitle: None,
    }
}

/// Build one period's worth of entries: `stock` titles that classify as
/// 주식/ETF plus fillers that classify as unclassified, ten entries total
#[allow(dead_code)]
pub fn period_entries(period: &PeriodKey, stock: usize) -> Vec<BestsellerEntry> {
    let mut entries = Vec::new();
    for i in 0..stock {
        entries.push(entry(period, i as u32 + 1, format!("주식 공부 {i}")));
    }
    for i in stock..10 {
        entries.push(entry(period, i as u32 + 1, format!("여행 에세이 {i}")));
    }
    entries
}
