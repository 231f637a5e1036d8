//! Rate ingestion: directory scan, schema validation, row folding.
//!
//! Every problem below the directory level is recorded in the
//! [`IngestReport`] and logged; nothing aborts the pass.

use crate::frame::{format_number, Frame, FrameReader, WorkbookReader};
use crate::types::{
    FileRejection, IngestIssue, IngestOutcome, IngestReport, RateIndex, RateRecord, RowRejection,
};
use chrono::NaiveDate;
use mandi_core::config::RatesConfig;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Date format of the bulletin `Date` column.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Builds a [`RateIndex`] from a directory of rate workbooks.
pub struct RateIngestor<R = WorkbookReader> {
    config: RatesConfig,
    reader: R,
}

impl RateIngestor<WorkbookReader> {
    pub fn new(config: RatesConfig) -> Self {
        Self::with_reader(config, WorkbookReader)
    }
}

impl<R: FrameReader> RateIngestor<R> {
    pub fn with_reader(config: RatesConfig, reader: R) -> Self {
        Self { config, reader }
    }

    /// Scan `source_dir` and build a fresh index from every matching workbook.
    ///
    /// Files are read in file-name order. Rows that fail validation are
    /// dropped one by one; a workbook missing a required column is dropped
    /// whole. Both are recorded in the report.
    ///
    /// # Arguments
    /// * `source_dir` - Directory holding the `<prefix>*.xlsx` workbooks
    ///
    /// # Returns
    /// The new index together with its ingestion report. A missing directory
    /// yields an empty index with `directory_missing` set rather than an error.
    pub fn load(&self, source_dir: &Path) -> IngestOutcome {
        tracing::info!("Loading rate workbooks from {:?}", source_dir);

        let files = match self.discover(source_dir) {
            Some(files) => files,
            None => {
                tracing::error!(
                    "Rate directory {:?} not found; serving an empty index",
                    source_dir
                );
                return IngestOutcome {
                    index: RateIndex::default(),
                    report: IngestReport {
                        source_dir: source_dir.to_path_buf(),
                        directory_missing: true,
                        ..Default::default()
                    },
                };
            }
        };

        let frames = files.into_iter().map(|path| {
            let frame = self.reader.read_frame(&path);
            (path, frame)
        });

        let mut outcome = self.fold(frames);
        outcome.report.source_dir = source_dir.to_path_buf();
        outcome
    }

    /// Workbooks in `dir` matching the naming convention, in file-name order.
    ///
    /// Returns `None` when `dir` is not a readable directory.
    pub fn discover(&self, dir: &Path) -> Option<Vec<PathBuf>> {
        if !dir.is_dir() {
            return None;
        }

        let files = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable directory entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| self.matches_name(&entry.file_name().to_string_lossy()))
            .map(|entry| entry.into_path())
            .collect();

        Some(files)
    }

    fn matches_name(&self, name: &str) -> bool {
        name.starts_with(&self.config.file_prefix) && name.ends_with(&self.config.file_extension)
    }

    /// Fold already-read frames, in order, into a fresh index.
    ///
    /// Rows from every frame are merged per item before the history is
    /// sorted and truncated.
    pub fn fold<I>(&self, frames: I) -> IngestOutcome
    where
        I: IntoIterator<Item = (PathBuf, Result<Frame, IngestIssue>)>,
    {
        let mut report = IngestReport::default();
        let mut records: BTreeMap<String, Vec<RateRecord>> = BTreeMap::new();

        for (path, frame) in frames {
            report.files_scanned += 1;

            let frame = match frame {
                Ok(frame) => frame,
                Err(issue) => {
                    tracing::error!("Skipping {:?}: {}", path, issue);
                    report.file_rejections.push(FileRejection { path, issue });
                    continue;
                }
            };

            let columns = match self.resolve_columns(&frame) {
                Ok(columns) => columns,
                Err(issue) => {
                    tracing::warn!("Skipping {:?}: {}", path, issue);
                    report.file_rejections.push(FileRejection { path, issue });
                    continue;
                }
            };

            report.files_accepted += 1;
            let accepted = fold_rows(&frame, &columns, &path, &mut records, &mut report);
            tracing::debug!("Accepted {} rows from {:?}", accepted, path);
        }

        let index = RateIndex::build(records, self.config.history_depth);
        report.items = index.len();

        if index.is_empty() {
            tracing::warn!("No valid rate data loaded");
        } else {
            tracing::info!(
                "Loaded rates for {} items ({} rows, {} files rejected, {} rows rejected)",
                report.items,
                report.rows_accepted,
                report.files_rejected(),
                report.rows_rejected()
            );
        }

        IngestOutcome { index, report }
    }

    fn resolve_columns(&self, frame: &Frame) -> Result<ColumnPositions, IngestIssue> {
        let names = &self.config.columns;

        let missing: Vec<String> = names
            .required()
            .iter()
            .filter(|name| frame.column(name).is_none())
            .map(|name| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(IngestIssue::MissingColumns(missing));
        }

        let position = |name: &str| frame.column(name).unwrap_or_default();

        Ok(ColumnPositions {
            date: position(&names.date),
            market: position(&names.market),
            item: position(&names.item),
            min_price: position(&names.min_price),
            max_price: position(&names.max_price),
            unit: frame.column(&names.unit),
        })
    }
}

/// Column positions of a frame that passed schema validation.
struct ColumnPositions {
    date: usize,
    market: usize,
    item: usize,
    min_price: usize,
    max_price: usize,
    unit: Option<usize>,
}

/// Fold one frame's rows into `records`, returning the accepted row count.
fn fold_rows(
    frame: &Frame,
    columns: &ColumnPositions,
    path: &Path,
    records: &mut BTreeMap<String, Vec<RateRecord>>,
    report: &mut IngestReport,
) -> usize {
    let mut accepted = 0;

    for (i, row) in frame.rows.iter().enumerate() {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let sheet_row = frame.sheet_row(i);
        let mut reject = |issue: IngestIssue| {
            tracing::warn!("Skipping row {} in {:?}: {}", sheet_row, path, issue);
            report.row_rejections.push(RowRejection {
                path: path.to_path_buf(),
                row: sheet_row,
                issue,
            });
        };

        let date_text = Frame::cell(row, columns.date);
        let date = match parse_date(date_text) {
            Some(date) => date,
            None => {
                reject(IngestIssue::InvalidDate(date_text.to_string()));
                continue;
            }
        };

        let item = Frame::cell(row, columns.item);
        if item.is_empty() {
            reject(IngestIssue::EmptyItem);
            continue;
        }

        let record = RateRecord {
            date,
            min_price: parse_price(Frame::cell(row, columns.min_price)),
            max_price: parse_price(Frame::cell(row, columns.max_price)),
            market: Frame::cell(row, columns.market).to_string(),
            unit: columns
                .unit
                .map(|c| Frame::cell(row, c).to_string())
                .unwrap_or_default(),
        };

        records.entry(item.to_string()).or_default().push(record);
        accepted += 1;
    }

    report.rows_accepted += accepted;
    accepted
}

/// Parse a `DD-MM-YYYY` bulletin date.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

/// Parse a price cell, tolerating thousands separators.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Display form of an optional price.
pub fn display_price(price: Option<f64>) -> String {
    price.map(format_number).unwrap_or_else(|| "-".to_string())
}
