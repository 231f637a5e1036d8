//! Tabular frames read from rate workbooks.
//!
//! A frame is the first worksheet of a workbook flattened to text cells:
//! one header row followed by data rows.

use crate::types::IngestIssue;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// Header row plus data rows, every cell as trimmed text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,

    /// 1-based worksheet row number of the header row
    pub header_row: usize,
}

impl Frame {
    /// Build a frame whose header sits on the first worksheet row.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows,
            header_row: 1,
        }
    }

    /// Position of the column with the given header.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Cell text, or an empty string for short rows.
    pub fn cell<'a>(row: &'a [String], column: usize) -> &'a str {
        row.get(column).map(|c| c.trim()).unwrap_or("")
    }

    /// Worksheet row number of the `index`-th data row.
    pub fn sheet_row(&self, index: usize) -> usize {
        self.header_row + index + 1
    }
}

/// Source of frames for the ingestor.
pub trait FrameReader {
    fn read_frame(&self, path: &Path) -> Result<Frame, IngestIssue>;
}

/// Reads the first worksheet of `.xlsx`/`.xls`/`.ods` workbooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookReader;

impl FrameReader for WorkbookReader {
    fn read_frame(&self, path: &Path) -> Result<Frame, IngestIssue> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| IngestIssue::Unreadable(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| IngestIssue::Unreadable("workbook has no worksheets".to_string()))?
            .map_err(|e| IngestIssue::Unreadable(e.to_string()))?;

        let header_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

        let mut rows = range.rows();
        let headers = match rows.next() {
            Some(header) => header.iter().map(cell_text).collect(),
            None => return Ok(Frame::default()),
        };

        let rows = rows
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        Ok(Frame {
            headers,
            rows,
            header_row,
        })
    }
}

/// Render a worksheet cell as text the row parser understands.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        other => other.to_string(),
    }
}

/// Whole numbers print without a fractional part.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new(
            vec!["Date".to_string(), " Market ".to_string(), "शेतिमाल".to_string()],
            vec![
                vec!["01-06-2024".to_string(), "Pune".to_string()],
                vec![],
            ],
        )
    }

    #[test]
    fn test_column_lookup_trims_headers() {
        let frame = frame();
        assert_eq!(frame.column("Date"), Some(0));
        assert_eq!(frame.column("Market"), Some(1));
        assert_eq!(frame.column("किमान"), None);
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let frame = frame();
        assert_eq!(Frame::cell(&frame.rows[0], 1), "Pune");
        assert_eq!(Frame::cell(&frame.rows[0], 2), "");
        assert_eq!(Frame::cell(&frame.rows[1], 0), "");
    }

    #[test]
    fn test_sheet_row_numbers() {
        let frame = frame();
        assert_eq!(frame.sheet_row(0), 2);
        assert_eq!(frame.sheet_row(1), 3);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(1500.0)), "1500");
        assert_eq!(cell_text(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::String("  कांदा ".to_string())), "कांदा");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_unreadable_workbook() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), b"not a workbook").unwrap();

        let result = WorkbookReader.read_frame(temp.path());
        assert!(matches!(result, Err(IngestIssue::Unreadable(_))));
    }
}
