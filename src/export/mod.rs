//! CSV import and export of the pipeline's artifact tables
//!
//! The analysis core exposes three main artifacts — the interest series
//! table, the correlation result table, and the share table — plus the
//! auxiliary new-entries table. This module renders them to CSV and reads
//! back the two input tables (interest records and bestseller lists).
//!
//! Rounding to one decimal place happens here, at the reporting boundary;
//! the tables themselves keep full precision.

use crate::analysis::aggregate::ShareTable;
use crate::analysis::correlation::CorrelationResult;
use crate::analysis::new_entries::NewEntryTable;
use crate::models::{BestsellerEntry, InterestRecord, PeriodKey};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading CSV inputs
#[derive(Error, Debug)]
pub enum CsvError {
    /// I/O failure reading the file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The header row lacks a required column
    #[error("Missing required column '{0}' in CSV header")]
    MissingColumn(&'static str),

    /// A data row could not be parsed
    #[error("Invalid row at line {line}: {message}")]
    InvalidRow { line: usize, message: String },
}

/// Quote a field when it contains CSV metacharacters
fn escape_field(field: &str) -> String {
    if field.contains(['"', ',', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split one CSV line, honoring quoted fields with doubled quotes
fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    fields.push(current);
    fields
}

/// Render the interest series table
///
/// Columns: period, keyword, category, value (one decimal).
pub fn render_interest_csv(records: &[InterestRecord]) -> String {
    let mut out = String::from("period,keyword,category,value\n");
    for r in records {
        out.push_str(&format!(
            "{},{},{},{:.1}\n",
            r.period,
            escape_field(&r.keyword),
            escape_field(&r.category),
            r.value
        ));
    }
    out
}

/// Render the correlation result table
pub fn render_correlation_csv(results: &[CorrelationResult]) -> String {
    let mut out = String::from(
        "category,corr_concurrent,p_concurrent,corr_lagged,p_lagged,pattern,trend_avg,share_avg\n",
    );
    for r in results {
        out.push_str(&format!(
            "{},{:.3},{:.3},{:.3},{:.3},{},{:.1},{:.1}\n",
            escape_field(&r.category),
            r.corr_concurrent,
            r.p_concurrent,
            r.corr_lagged,
            r.p_lagged,
            r.pattern.korean_name(),
            r.trend_avg,
            r.share_avg
        ));
    }
    out
}

/// Render the share table: rows are periods, columns are categories
pub fn render_share_csv(share: &ShareTable) -> String {
    let categories: Vec<&String> = share.categories().iter().collect();

    let mut out = String::from("period");
    for category in &categories {
        out.push(',');
        out.push_str(&escape_field(category));
    }
    out.push('\n');

    for period in share.periods() {
        out.push_str(period.as_str());
        for category in &categories {
            let value = share.share(period, category).unwrap_or(0.0);
            out.push_str(&format!(",{value:.1}"));
        }
        out.push('\n');
    }

    out
}

/// Render the new-entries table: rows are periods, columns are categories
pub fn render_new_entries_csv(table: &NewEntryTable) -> String {
    let categories: BTreeSet<&String> = table.values().flat_map(|row| row.keys()).collect();

    let mut out = String::from("period");
    for category in &categories {
        out.push(',');
        out.push_str(&escape_field(category));
    }
    out.push('\n');

    for (period, row) in table {
        out.push_str(period.as_str());
        for category in &categories {
            let count = row.get(*category).copied().unwrap_or(0);
            out.push_str(&format!(",{count}"));
        }
        out.push('\n');
    }

    out
}

/// Parse a bestseller list CSV
///
/// Requires `period` (also accepted: `month`, `ymw`) and `title` columns;
/// `rank` and `subtitle` are optional.
pub fn parse_bestsellers(text: &str) -> Result<Vec<BestsellerEntry>, CsvError> {
    let mut lines = text.trim_start_matches('\u{feff}').lines().enumerate();

    let (_, header) = lines.next().ok_or(CsvError::MissingColumn("period"))?;
    let columns: Vec<String> = split_line(header)
        .iter()
        .map(|c| c.trim().to_lowercase())
        .collect();

    let period_idx = columns
        .iter()
        .position(|c| c == "period" || c == "month" || c == "ymw")
        .ok_or(CsvError::MissingColumn("period"))?;
    let title_idx = columns
        .iter()
        .position(|c| c == "title")
        .ok_or(CsvError::MissingColumn("title"))?;
    let rank_idx = columns.iter().position(|c| c == "rank");
    let subtitle_idx = columns.iter().position(|c| c == "subtitle");

    let mut entries = Vec::new();
    for (i, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_line(line);
        let line_no = i + 1;

        let get = |idx: usize| -> Result<&str, CsvError> {
            fields.get(idx).map(String::as_str).ok_or(CsvError::InvalidRow {
                line: line_no,
                message: format!("expected at least {} fields", idx + 1),
            })
        };

        let period = PeriodKey::parse(get(period_idx)?.trim()).ok_or(CsvError::InvalidRow {
            line: line_no,
            message: format!("invalid period key '{}'", fields[period_idx]),
        })?;

        let rank = match rank_idx {
            Some(idx) => get(idx)?.trim().parse().map_err(|_| CsvError::InvalidRow {
                line: line_no,
                message: format!("invalid rank '{}'", fields[idx]),
            })?,
            None => 0,
        };

        let subtitle = subtitle_idx
            .and_then(|idx| fields.get(idx))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from);

        entries.push(BestsellerEntry {
            period,
            rank,
            title: get(title_idx)?.trim().to_string(),
            subtitle,
        });
    }

    Ok(entries)
}

/// Parse an interest series CSV as written by [`render_interest_csv`]
///
/// Requires `period` (also accepted: `month`, `ymw`), `keyword`, `category`
/// and `value` (also accepted: `index`) columns. Rows with an empty value
/// cell are treated as absent and skipped.
pub fn parse_interest(text: &str) -> Result<Vec<InterestRecord>, CsvError> {
    let mut lines = text.trim_start_matches('\u{feff}').lines().enumerate();

    let (_, header) = lines.next().ok_or(CsvError::MissingColumn("period"))?;
    let columns: Vec<String> = split_line(header)
        .iter()
        .map(|c| c.trim().to_lowercase())
        .collect();

    let find = |names: &[&str], missing: &'static str| -> Result<usize, CsvError> {
        columns
            .iter()
            .position(|c| names.contains(&c.as_str()))
            .ok_or(CsvError::MissingColumn(missing))
    };

    let period_idx = find(&["period", "month", "ymw"], "period")?;
    let keyword_idx = find(&["keyword"], "keyword")?;
    let category_idx = find(&["category"], "category")?;
    let value_idx = find(&["value", "index"], "value")?;

    let mut records = Vec::new();
    for (i, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_line(line);
        let line_no = i + 1;

        let field = |idx: usize| fields.get(idx).map(String::as_str).unwrap_or("").trim();

        let value_text = field(value_idx);
        if value_text.is_empty() {
            continue;
        }
        let value: f64 = value_text.parse().map_err(|_| CsvError::InvalidRow {
            line: line_no,
            message: format!("invalid value '{value_text}'"),
        })?;
        if value < 0.0 {
            return Err(CsvError::InvalidRow {
                line: line_no,
                message: format!("negative interest value {value}"),
            });
        }

        let period = PeriodKey::parse(field(period_idx)).ok_or(CsvError::InvalidRow {
            line: line_no,
            message: format!("invalid period key '{}'", field(period_idx)),
        })?;

        records.push(InterestRecord {
            period,
            keyword: field(keyword_idx).to_string(),
            category: field(category_idx).to_string(),
            value,
        });
    }

    Ok(records)
}

/// Read and parse a bestseller list CSV from disk
pub fn read_bestsellers(path: &Path) -> Result<Vec<BestsellerEntry>, CsvError> {
    let text = fs::read_to_string(path)?;
    parse_bestsellers(&text)
}

/// Read and parse an interest series CSV from disk
pub fn read_interest(path: &Path) -> Result<Vec<InterestRecord>, CsvError> {
    let text = fs::read_to_string(path)?;
    parse_interest(&text)
}

/// Writes the artifact tables into an output directory
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    /// Create a writer, creating the output directory if needed
    pub fn new(output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir).context("Failed to create output directory")?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(name);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write the interest series table to `interest.csv`
    pub fn write_interest(&self, records: &[InterestRecord]) -> Result<PathBuf> {
        self.write("interest.csv", &render_interest_csv(records))
    }

    /// Write the correlation result table to `correlation.csv`
    pub fn write_correlations(&self, results: &[CorrelationResult]) -> Result<PathBuf> {
        self.write("correlation.csv", &render_correlation_csv(results))
    }

    /// Write the share table to `share.csv`
    pub fn write_share(&self, share: &ShareTable) -> Result<PathBuf> {
        self.write("share.csv", &render_share_csv(share))
    }

    /// Write the new-entries table to `new_entries.csv`
    pub fn write_new_entries(&self, table: &NewEntryTable) -> Result<PathBuf> {
        self.write("new_entries.csv", &render_new_entries_csv(table))
    }
}
