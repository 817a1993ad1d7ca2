//! Book title category classification
//!
//! Maps free-text titles onto market categories using an ordered rule list.
//! Rules are evaluated in priority order and the first matching pattern wins;
//! titles matching no rule fall back to [`UNCLASSIFIED`]. Classification is a
//! pure function of the title text and the rule list, so re-running it over
//! the same batch always yields the same labels regardless of input order.

use crate::models::{BestsellerEntry, ClassifiedEntry};
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use thiserror::Error;

/// Fallback category for titles matching no rule
pub const UNCLASSIFIED: &str = "기타/미분류";

/// Errors that can occur while building a classifier
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// A rule pattern failed to compile
    #[error("Invalid pattern for category '{category}': {source}")]
    InvalidPattern {
        category: String,
        #[source]
        source: regex::Error,
    },

    /// The rule list was empty
    #[error("Classifier requires at least one rule")]
    EmptyRuleList,
}

/// Default category rules for the Korean economy/business book market
///
/// Order is the priority order: a real-estate title mentioning "투자" is
/// still real estate, because that rule is checked first.
pub fn korean_book_rules() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "부동산/주거",
            r"(부동산|아파트|집|청약|재개발|토지|분양|갭투자|빌라|주거)",
        ),
        (
            "주식/ETF",
            r"(주식|ETF|배당|종목|나스닥|S&P|펀드|차트|퀀트|증권|투자)",
        ),
        (
            "암호화폐/디지털자산",
            r"(비트코인|암호화폐|코인|블록체인|NFT|이더리움|가상자산|디지털)",
        ),
        (
            "거시경제/금리/인플레",
            r"(금리|인플레|물가|연준|경제위기|경기침체|GDP|환율|통화|경제)",
        ),
        (
            "은퇴/연금/노후",
            r"(연금|은퇴|노후|퇴직|FIRE|조기은퇴|국민연금|생애)",
        ),
        (
            "경영전략/조직/리더십",
            r"(경영|전략|리더십|마케팅|조직|스타트업|CEO|혁신|브랜드|OKR)",
        ),
    ]
}

/// One compiled classification rule
#[derive(Debug, Clone)]
struct Rule {
    category: String,
    pattern: Regex,
}

/// Ordered first-match-wins title classifier
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    rules: Vec<Rule>,
}

impl CategoryClassifier {
    /// Build a classifier from an ordered `(category, pattern)` list
    ///
    /// Patterns are compiled case-insensitively. The order of the slice is
    /// the evaluation priority.
    pub fn new<S: AsRef<str>>(rules: &[(S, S)]) -> Result<Self, ClassifyError> {
        if rules.is_empty() {
            return Err(ClassifyError::EmptyRuleList);
        }

        let rules = rules
            .iter()
            .map(|(category, pattern)| {
                let pattern = RegexBuilder::new(pattern.as_ref())
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ClassifyError::InvalidPattern {
                        category: category.as_ref().to_string(),
                        source,
                    })?;
                Ok(Rule {
                    category: category.as_ref().to_string(),
                    pattern,
                })
            })
            .collect::<Result<Vec<_>, ClassifyError>>()?;

        Ok(Self { rules })
    }

    /// Classify a title (and optional subtitle) into a category
    ///
    /// Empty or whitespace-only text never matches and yields
    /// [`UNCLASSIFIED`].
    pub fn classify(&self, title: &str, subtitle: Option<&str>) -> &str {
        let text = match subtitle {
            Some(sub) => format!("{title} {sub}"),
            None => title.to_string(),
        };

        if text.trim().is_empty() {
            return UNCLASSIFIED;
        }

        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(&text))
            .map_or(UNCLASSIFIED, |rule| rule.category.as_str())
    }

    /// Classify a batch of bestseller entries
    pub fn classify_entries(&self, entries: &[BestsellerEntry]) -> Vec<ClassifiedEntry> {
        entries
            .iter()
            .map(|entry| ClassifiedEntry {
                period: entry.period.clone(),
                title: entry.title.clone(),
                category: self
                    .classify(&entry.title, entry.subtitle.as_deref())
                    .to_string(),
            })
            .collect()
    }

    /// Categories known to this classifier, in rule order
    pub fn categories(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.category.as_str()).collect()
    }
}

/// Summary statistics for one classification batch
#[derive(Debug, Clone, Default)]
pub struct ClassifyStats {
    /// Total entries classified
    pub total: usize,

    /// Entries that fell through to [`UNCLASSIFIED`]
    pub unclassified: usize,

    /// Entry count per category
    pub by_category: BTreeMap<String, usize>,

    /// Up to ten unclassified titles, for rule tuning
    pub unclassified_samples: Vec<String>,
}

impl ClassifyStats {
    /// Compute statistics over a classified batch
    pub fn from_entries(entries: &[ClassifiedEntry]) -> Self {
        let mut stats = Self {
            total: entries.len(),
            ..Self::default()
        };

        for entry in entries {
            *stats.by_category.entry(entry.category.clone()).or_insert(0) += 1;
            if entry.category == UNCLASSIFIED {
                stats.unclassified += 1;
                if stats.unclassified_samples.len() < 10 {
                    stats.unclassified_samples.push(entry.title.clone());
                }
            }
        }

        stats
    }

    /// Fraction of entries that were unclassified
    pub fn unclassified_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.unclassified as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeriodKey;

    fn classifier() -> CategoryClassifier {
        CategoryClassifier::new(&korean_book_rules()).unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let c = classifier();
        // "아파트 투자" matches both the real-estate and stock rules;
        // real estate has priority.
        assert_eq!(c.classify("아파트 투자 마법공식", None), "부동산/주거");
    }

    #[test]
    fn test_subtitle_participates() {
        let c = classifier();
        assert_eq!(
            c.classify("부의 추월차선", Some("비트코인으로 시작하는")),
            "암호화폐/디지털자산"
        );
    }

    #[test]
    fn test_case_insensitive_match() {
        let c = classifier();
        assert_eq!(c.classify("etf 투자의 정석", None), "주식/ETF");
        assert_eq!(c.classify("fire족으로 살기", None), "은퇴/연금/노후");
    }

    #[test]
    fn test_empty_text_is_unclassified() {
        let c = classifier();
        assert_eq!(c.classify("", None), UNCLASSIFIED);
        assert_eq!(c.classify("   ", Some(" ")), UNCLASSIFIED);
    }

    #[test]
    fn test_no_match_is_unclassified() {
        let c = classifier();
        assert_eq!(c.classify("그림으로 배우는 요리", None), UNCLASSIFIED);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let c = classifier();
        let title = "금리의 배신";
        let first = c.classify(title, None).to_string();
        for _ in 0..10 {
            assert_eq!(c.classify(title, None), first);
        }
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = CategoryClassifier::new(&[("broken", "(unclosed")]);
        assert!(matches!(err, Err(ClassifyError::InvalidPattern { .. })));
    }

    #[test]
    fn test_empty_rule_list_rejected() {
        let rules: Vec<(&str, &str)> = vec![];
        assert!(matches!(
            CategoryClassifier::new(&rules),
            Err(ClassifyError::EmptyRuleList)
        ));
    }

    #[test]
    fn test_stats() {
        let c = classifier();
        let entries = vec![
            BestsellerEntry {
                period: PeriodKey::parse("2024-01").unwrap(),
                rank: 1,
                title: "주식투자 무작정 따라하기".to_string(),
                subtitle: None,
            },
            BestsellerEntry {
                period: PeriodKey::parse("2024-01").unwrap(),
                rank: 2,
                title: "수상한 저택의 비밀".to_string(),
                subtitle: None,
            },
        ];

        let classified = c.classify_entries(&entries);
        let stats = ClassifyStats::from_entries(&classified);

        assert_eq!(stats.total, 2);
        assert_eq!(stats.unclassified, 1);
        assert!((stats.unclassified_ratio() - 0.5).abs() < f64::EPSILON);
        assert_eq!(stats.by_category["주식/ETF"], 1);
        assert_eq!(stats.unclassified_samples, vec!["수상한 저택의 비밀"]);
    }
}
