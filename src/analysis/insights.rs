//! Natural-language insight generation
//!
//! Derives a fixed, ordered set of up to five Korean summary sentences from
//! the correlation results and the share table. Each slot is independent: a
//! slot with no qualifying category is simply omitted. Pure function, no
//! state.

use crate::analysis::aggregate::ShareTable;
use crate::analysis::correlation::{CorrelationResult, Pattern};
use serde::{Deserialize, Serialize};

/// One generated finding, tagged with its slot number (1-5)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub slot: u8,
    pub text: String,
}

/// Generate the insight list from the full analysis output
///
/// Slots, in order:
/// 1. category with the highest average share, with its peak period/value;
/// 2. strongest concurrent category by concurrent correlation;
/// 3. strongest lagged category by lagged correlation;
/// 4. first none-pattern category in result order (deterministic "first
///    row" pick, not "best");
/// 5. aggregate pattern counts (emitted whenever any result exists).
pub fn generate_insights(results: &[CorrelationResult], share: &ShareTable) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(insight) = top_share_insight(share) {
        insights.push(insight);
    }

    let top_concurrent = results
        .iter()
        .filter(|r| r.pattern == Pattern::Concurrent)
        .max_by(|a, b| {
            a.corr_concurrent
                .partial_cmp(&b.corr_concurrent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    if let Some(r) = top_concurrent {
        insights.push(Insight {
            slot: 2,
            text: format!(
                "2) 동행형 주제: '{}' 카테고리는 검색량과 당월 점유율 간 상관계수 r={:.2}로, \
                 검색 관심 상승이 즉시 도서 판매로 연결되는 동행형 패턴을 보였다.",
                r.category, r.corr_concurrent
            ),
        });
    }

    let top_lagged = results
        .iter()
        .filter(|r| r.pattern == Pattern::Lagged)
        .max_by(|a, b| {
            a.corr_lagged
                .partial_cmp(&b.corr_lagged)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    if let Some(r) = top_lagged {
        insights.push(Insight {
            slot: 3,
            text: format!(
                "3) 지연형 주제: '{}' 분야는 1개월 지연 상관(r={:.2})이 동행 상관(r={:.2})보다 높아, \
                 트렌드 발생 후 한 주기 뒤 도서 구매로 이어지는 지연형 반응이 확인됐다.",
                r.category, r.corr_lagged, r.corr_concurrent
            ),
        });
    }

    if let Some(r) = results.iter().find(|r| r.pattern == Pattern::None) {
        insights.push(Insight {
            slot: 4,
            text: format!(
                "4) 안정형 주제: '{}' 카테고리는 검색 트렌드와 상관계수 r={:.2}로 거의 무관했으며, \
                 트렌드보다 입소문과 추천 중심의 판매 구조를 시사한다.",
                r.category, r.corr_concurrent
            ),
        });
    }

    if !results.is_empty() {
        let concurrent_count = results
            .iter()
            .filter(|r| r.pattern == Pattern::Concurrent)
            .count();
        let lagged_count = results.iter().filter(|r| r.pattern == Pattern::Lagged).count();
        insights.push(Insight {
            slot: 5,
            text: format!(
                "5) 종합: 분석된 {}개 카테고리 중 {}개는 동행형, {}개는 지연형 반응을 보여, \
                 외부 트렌드가 도서 시장에 실질적 영향을 미치는 것으로 확인됐다.",
                results.len(),
                concurrent_count,
                lagged_count
            ),
        });
    }

    insights
}

/// Slot 1: the largest category by average share, with its peak
fn top_share_insight(share: &ShareTable) -> Option<Insight> {
    let mut top: Option<(&str, f64)> = None;
    for category in share.categories() {
        let series = share.series(category);
        if series.is_empty() {
            continue;
        }
        let avg = series.values().sum::<f64>() / series.len() as f64;
        // Strictly greater keeps the first category on ties, and category
        // iteration is sorted, so the pick is deterministic.
        if top.map_or(true, |(_, best)| avg > best) {
            top = Some((category, avg));
        }
    }

    let (category, avg) = top?;
    let series = share.series(category);
    let (peak_period, peak_value) = series
        .iter()
        .fold(None::<(&crate::models::PeriodKey, f64)>, |acc, (p, &v)| {
            match acc {
                Some((_, best)) if best >= v => acc,
                _ => Some((p, v)),
            }
        })?;

    Some(Insight {
        slot: 1,
        text: format!(
            "1) 주제별 점유율: '{category}' 분야는 평균 점유율 {avg:.1}%로 경제/경영 베스트셀러의 \
             최대 세그먼트였으며, {peak_period}에는 {peak_value:.1}%까지 상승해 기간 중 최고치를 기록했다."
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassifiedEntry, PeriodKey};

    fn result(category: &str, conc: f64, lag: f64, pattern: Pattern) -> CorrelationResult {
        CorrelationResult {
            category: category.to_string(),
            corr_concurrent: conc,
            p_concurrent: 0.05,
            corr_lagged: lag,
            p_lagged: 0.05,
            pattern,
            trend_avg: 50.0,
            share_avg: 20.0,
        }
    }

    fn share_table() -> ShareTable {
        let entry = |p: &str, title: &str, category: &str| ClassifiedEntry {
            period: PeriodKey::parse(p).unwrap(),
            title: title.to_string(),
            category: category.to_string(),
        };
        ShareTable::from_entries(&[
            entry("2024-01", "a", "주식/ETF"),
            entry("2024-01", "b", "주식/ETF"),
            entry("2024-01", "c", "부동산/주거"),
            entry("2024-02", "d", "주식/ETF"),
        ])
    }

    #[test]
    fn test_all_slots_present() {
        let results = vec![
            result("주식/ETF", 0.8, 0.2, Pattern::Concurrent),
            result("부동산/주거", 0.1, 0.7, Pattern::Lagged),
            result("은퇴/연금/노후", 0.05, 0.1, Pattern::None),
        ];

        let insights = generate_insights(&results, &share_table());
        let slots: Vec<u8> = insights.iter().map(|i| i.slot).collect();
        assert_eq!(slots, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_missing_patterns_omit_slots() {
        let results = vec![result("주식/ETF", 0.8, 0.2, Pattern::Concurrent)];

        let insights = generate_insights(&results, &share_table());
        let slots: Vec<u8> = insights.iter().map(|i| i.slot).collect();
        assert_eq!(slots, vec![1, 2, 5]);
    }

    #[test]
    fn test_empty_results_only_share_slot() {
        let insights = generate_insights(&[], &share_table());
        let slots: Vec<u8> = insights.iter().map(|i| i.slot).collect();
        assert_eq!(slots, vec![1]);
    }

    #[test]
    fn test_top_share_category_named() {
        // 주식/ETF: (2/3)*100 avg with 100 in February -> clear winner
        let insights = generate_insights(&[], &share_table());
        assert!(insights[0].text.contains("주식/ETF"));
        assert!(insights[0].text.contains("2024-02"));
    }

    #[test]
    fn test_best_concurrent_selected() {
        let results = vec![
            result("부동산/주거", 0.5, 0.1, Pattern::Concurrent),
            result("주식/ETF", 0.9, 0.1, Pattern::Concurrent),
        ];

        let insights = generate_insights(&results, &share_table());
        let slot2 = insights.iter().find(|i| i.slot == 2).unwrap();
        assert!(slot2.text.contains("주식/ETF"));
    }

    #[test]
    fn test_first_none_category_selected() {
        let results = vec![
            result("가_카테고리", 0.1, 0.1, Pattern::None),
            result("나_카테고리", 0.0, 0.0, Pattern::None),
        ];

        let insights = generate_insights(&results, &share_table());
        let slot4 = insights.iter().find(|i| i.slot == 4).unwrap();
        assert!(slot4.text.contains("가_카테고리"));
    }

    #[test]
    fn test_count_summary() {
        let results = vec![
            result("a", 0.8, 0.2, Pattern::Concurrent),
            result("b", 0.7, 0.1, Pattern::Concurrent),
            result("c", 0.1, 0.6, Pattern::Lagged),
        ];

        let insights = generate_insights(&results, &share_table());
        let slot5 = insights.iter().find(|i| i.slot == 5).unwrap();
        assert!(slot5.text.contains("3개 카테고리"));
        assert!(slot5.text.contains("2개는 동행형"));
        assert!(slot5.text.contains("1개는 지연형"));
    }
}
