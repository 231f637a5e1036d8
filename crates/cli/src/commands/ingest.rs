//! Ingest command handler.
//!
//! Loads the rate workbooks and prints the ingestion report, or the
//! retained history of a single item.

use clap::Args;
use mandi_core::{config::AppConfig, AppError, AppResult};
use mandi_rates::{IngestReport, RateIndex};

/// Load the rate workbooks and report what was accepted
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Show the retained history of one item (aliases accepted)
    #[arg(short, long)]
    pub item: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");

        let outcome = super::load_rates(config);

        match self.item {
            Some(ref item) => self.print_item(config, &outcome.index, item),
            None if self.json => {
                println!("{}", super::to_json(&outcome.report)?);
                Ok(())
            }
            None => {
                print_report(&outcome.report, &outcome.index);
                Ok(())
            }
        }?;

        if outcome.report.directory_missing {
            return Err(AppError::Ingest(format!(
                "Data directory not found: {}",
                outcome.report.source_dir.display()
            )));
        }

        Ok(())
    }

    fn print_item(&self, config: &AppConfig, index: &RateIndex, query: &str) -> AppResult<()> {
        let item = mandi_rates::alias_table(config).resolve(query.trim());
        let history = index.get(&item);

        if self.json {
            let entries = history.map(|h| h.entries()).unwrap_or_default();
            let output = serde_json::json!({
                "item": item,
                "known": history.is_some(),
                "entries": entries,
            });
            println!("{}", super::to_json(&output)?);
        } else {
            println!(
                "{}",
                mandi_reply::render_lookup(&item, history, &config.rates.piece_unit)
            );
        }

        Ok(())
    }
}

fn print_report(report: &IngestReport, index: &RateIndex) {
    println!("Source: {}", report.source_dir.display());
    if report.directory_missing {
        println!("Directory not found; the index is empty.");
        return;
    }

    println!(
        "Files: {} scanned, {} accepted, {} rejected",
        report.files_scanned,
        report.files_accepted,
        report.files_rejected()
    );
    println!(
        "Rows: {} accepted, {} rejected",
        report.rows_accepted,
        report.rows_rejected()
    );
    println!("Items: {} ({} retained entries)", index.len(), index.record_count());

    for rejection in &report.file_rejections {
        println!("  skipped {}: {}", rejection.path.display(), rejection.issue);
    }
    for rejection in &report.row_rejections {
        println!(
            "  {} row {}: {}",
            rejection.path.display(),
            rejection.row,
            rejection.issue
        );
    }
}
