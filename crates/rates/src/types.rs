//! Rate index type definitions.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// One price observation for an item at a market on a given day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRecord {
    /// Trading day of the bulletin
    pub date: NaiveDate,

    /// Minimum price; `None` when the cell did not hold a number
    pub min_price: Option<f64>,

    /// Maximum price; `None` when the cell did not hold a number
    pub max_price: Option<f64>,

    /// Market name
    pub market: String,

    /// Unit/quantity descriptor, empty when the source has no unit column
    pub unit: String,
}

/// Most recent records for one item, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ItemHistory {
    entries: Vec<RateRecord>,
}

impl ItemHistory {
    /// Sort by date descending and keep the `depth` most recent records.
    ///
    /// The sort is stable: records sharing a date keep their scan order.
    pub fn from_records(mut records: Vec<RateRecord>, depth: usize) -> Self {
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records.truncate(depth);
        Self { entries: records }
    }

    pub fn entries(&self) -> &[RateRecord] {
        &self.entries
    }

    /// Newest record, if any.
    pub fn latest(&self) -> Option<&RateRecord> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonical item name -> recency-bounded history.
///
/// Built once per ingestion pass and read-only afterwards.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RateIndex {
    items: BTreeMap<String, ItemHistory>,
}

impl RateIndex {
    /// Build an index from per-item record lists in scan order.
    pub fn build(records: BTreeMap<String, Vec<RateRecord>>, depth: usize) -> Self {
        let items = records
            .into_iter()
            .map(|(item, rows)| (item, ItemHistory::from_records(rows, depth)))
            .collect();

        Self { items }
    }

    pub fn get(&self, item: &str) -> Option<&ItemHistory> {
        self.items.get(item)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.contains_key(item)
    }

    /// Item names in sorted order.
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ItemHistory)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total records held across every item.
    pub fn record_count(&self) -> usize {
        self.items.values().map(ItemHistory::len).sum()
    }
}

/// Why a workbook or a row was left out of the index.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum IngestIssue {
    /// The workbook could not be opened or has no worksheet
    #[error("unreadable workbook: {0}")]
    Unreadable(String),

    /// One or more required header columns are absent
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The date cell is not `DD-MM-YYYY`
    #[error("invalid date '{0}'")]
    InvalidDate(String),

    /// The item cell is blank
    #[error("empty item name")]
    EmptyItem,
}

/// A workbook skipped in its entirety.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRejection {
    pub path: PathBuf,
    pub issue: IngestIssue,
}

/// A single skipped row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRejection {
    pub path: PathBuf,

    /// 1-based row number in the worksheet
    pub row: usize,

    pub issue: IngestIssue,
}

/// Summary of one ingestion pass.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub source_dir: PathBuf,

    /// The source directory did not exist or could not be listed
    pub directory_missing: bool,

    /// Workbooks matching the naming convention
    pub files_scanned: usize,

    pub files_accepted: usize,

    /// Rows folded into the index, before per-item truncation
    pub rows_accepted: usize,

    /// Distinct items in the resulting index
    pub items: usize,

    pub file_rejections: Vec<FileRejection>,

    pub row_rejections: Vec<RowRejection>,
}

impl IngestReport {
    pub fn files_rejected(&self) -> usize {
        self.file_rejections.len()
    }

    pub fn rows_rejected(&self) -> usize {
        self.row_rejections.len()
    }
}

/// Result of an ingestion pass: the fresh index plus its report.
#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    pub index: RateIndex,
    pub report: IngestReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, market: &str) -> RateRecord {
        RateRecord {
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            min_price: Some(1000.0),
            max_price: Some(1500.0),
            market: market.to_string(),
            unit: String::new(),
        }
    }

    #[test]
    fn test_history_sorted_descending_and_truncated() {
        let records = (1..=8).map(|d| record(d, "Pune")).collect();
        let history = ItemHistory::from_records(records, 5);

        assert_eq!(history.len(), 5);
        let days: Vec<u32> = history
            .entries()
            .iter()
            .map(|r| r.date.format("%d").to_string().parse().unwrap())
            .collect();
        assert_eq!(days, vec![8, 7, 6, 5, 4]);
        assert_eq!(history.latest().unwrap().date, record(8, "Pune").date);
    }

    #[test]
    fn test_history_equal_dates_keep_scan_order() {
        let records = vec![record(1, "first"), record(2, "newer"), record(1, "second")];
        let history = ItemHistory::from_records(records, 5);

        let markets: Vec<&str> = history.entries().iter().map(|r| r.market.as_str()).collect();
        assert_eq!(markets, vec!["newer", "first", "second"]);
    }

    #[test]
    fn test_index_build_and_lookup() {
        let mut rows = BTreeMap::new();
        rows.insert("कांदा".to_string(), vec![record(1, "Pune"), record(3, "Pune")]);
        rows.insert("बटाटा".to_string(), vec![record(2, "Pune")]);

        let index = RateIndex::build(rows, 5);

        assert_eq!(index.len(), 2);
        assert_eq!(index.record_count(), 3);
        assert!(index.contains("कांदा"));
        assert!(index.get("टोमॅटो").is_none());
        assert_eq!(index.get("कांदा").unwrap().latest().unwrap().date, record(3, "").date);
    }

    #[test]
    fn test_issue_messages() {
        let issue = IngestIssue::MissingColumns(vec!["Date".to_string(), "Market".to_string()]);
        assert_eq!(issue.to_string(), "missing required columns: Date, Market");
        assert_eq!(
            IngestIssue::InvalidDate("2024/06/01".to_string()).to_string(),
            "invalid date '2024/06/01'"
        );
    }
}
