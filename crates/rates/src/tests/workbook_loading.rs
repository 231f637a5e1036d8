//! End-to-end ingestion tests over real workbooks on disk.

use crate::ingest::RateIngestor;
use mandi_core::config::RatesConfig;
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tempfile::TempDir;

#[cfg(test)]
mod tests {
    use super::*;

    enum Cell<'a> {
        Text(&'a str),
        Number(f64),
    }

    const HEADERS: [&str; 6] = ["Date", "Market", "शेतिमाल", "परिमाण", "किमान", "कमाल"];

    /// Write a single-sheet workbook with a header row.
    fn write_workbook(path: &Path, headers: &[&str], rows: &[Vec<Cell>]) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }

        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32 + 1, c as u16);
                match cell {
                    Cell::Text(text) => {
                        sheet.write_string(r, c, *text).unwrap();
                    }
                    Cell::Number(n) => {
                        sheet.write_number(r, c, *n).unwrap();
                    }
                }
            }
        }

        workbook.save(path).unwrap();
    }

    fn rate_row<'a>(date: &'a str, item: &'a str, min: f64, max: f64) -> Vec<Cell<'a>> {
        vec![
            Cell::Text(date),
            Cell::Text("Pune"),
            Cell::Text(item),
            Cell::Text("क्विंटल"),
            Cell::Number(min),
            Cell::Number(max),
        ]
    }

    #[test]
    fn test_two_files_merge_for_same_item() {
        let temp = TempDir::new().unwrap();
        write_workbook(
            &temp.path().join("Pune_market_rates_2024_06_a.xlsx"),
            &HEADERS,
            &[
                rate_row("01-06-2024", "कांदा", 1000.0, 1500.0),
                rate_row("03-06-2024", "कांदा", 1200.0, 1700.0),
                rate_row("05-06-2024", "कांदा", 1400.0, 1900.0),
            ],
        );
        write_workbook(
            &temp.path().join("Pune_market_rates_2024_06_b.xlsx"),
            &HEADERS,
            &[
                rate_row("02-06-2024", "कांदा", 1100.0, 1600.0),
                rate_row("04-06-2024", "कांदा", 1300.0, 1800.0),
                rate_row("06-06-2024", "कांदा", 1500.0, 2000.0),
            ],
        );

        let outcome = RateIngestor::new(RatesConfig::default()).load(temp.path());
        let history = outcome.index.get("कांदा").unwrap();

        assert_eq!(outcome.report.files_accepted, 2);
        assert_eq!(outcome.report.rows_accepted, 6);
        assert_eq!(history.len(), 5);

        let dates: Vec<String> = history
            .entries()
            .iter()
            .map(|r| r.date.format("%d-%m-%Y").to_string())
            .collect();
        assert_eq!(
            dates,
            vec!["06-06-2024", "05-06-2024", "04-06-2024", "03-06-2024", "02-06-2024"]
        );
        assert_eq!(history.latest().unwrap().max_price, Some(2000.0));
        assert_eq!(history.latest().unwrap().unit, "क्विंटल");
    }

    #[test]
    fn test_naming_convention_filters_files() {
        let temp = TempDir::new().unwrap();
        let rows = [rate_row("01-06-2024", "बटाटा", 800.0, 1200.0)];

        write_workbook(&temp.path().join("Pune_market_rates_today.xlsx"), &HEADERS, &rows);
        write_workbook(&temp.path().join("Nashik_rates_today.xlsx"), &HEADERS, &rows);
        write_workbook(&temp.path().join("Pune_market_rates_today.xlsm"), &HEADERS, &rows);
        std::fs::write(temp.path().join("Pune_market_rates_notes.txt"), "ignore me").unwrap();

        let outcome = RateIngestor::new(RatesConfig::default()).load(temp.path());

        assert_eq!(outcome.report.files_scanned, 1);
        assert_eq!(outcome.index.get("बटाटा").unwrap().len(), 1);
    }

    #[test]
    fn test_schema_rejection_and_row_rejections_on_disk() {
        let temp = TempDir::new().unwrap();
        write_workbook(
            &temp.path().join("Pune_market_rates_1.xlsx"),
            &["Date", "Market", "शेतिमाल", "किमान"],
            &[vec![
                Cell::Text("01-06-2024"),
                Cell::Text("Pune"),
                Cell::Text("लसूण"),
                Cell::Number(5000.0),
            ]],
        );
        write_workbook(
            &temp.path().join("Pune_market_rates_2.xlsx"),
            &HEADERS,
            &[
                rate_row("Unknown Date", "आले", 3000.0, 4000.0),
                rate_row("02-06-2024", "आले", 3100.0, 4100.0),
            ],
        );

        let outcome = RateIngestor::new(RatesConfig::default()).load(temp.path());
        let report = &outcome.report;

        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.files_rejected(), 1);
        assert!(outcome.index.get("लसूण").is_none());
        assert_eq!(report.rows_accepted, 1);
        assert_eq!(report.rows_rejected(), 1);
        assert_eq!(report.row_rejections[0].row, 2);
        assert_eq!(outcome.index.get("आले").unwrap().len(), 1);

        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["fileRejections"][0]["issue"]["kind"], "missingColumns");
    }

    #[test]
    fn test_empty_directory_is_operational() {
        let temp = TempDir::new().unwrap();
        let outcome = RateIngestor::new(RatesConfig::default()).load(temp.path());

        assert!(outcome.index.is_empty());
        assert!(!outcome.report.directory_missing);
        assert_eq!(outcome.report.files_scanned, 0);
    }
}
