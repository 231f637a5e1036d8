//! Command handlers for the mandi CLI.

pub mod ask;
pub mod chat;
pub mod ingest;
pub mod news;
pub mod weather;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use ingest::IngestCommand;
pub use news::NewsCommand;
pub use weather::WeatherCommand;

use mandi_core::{config::AppConfig, AppError, AppResult};
use mandi_rates::IngestOutcome;
use mandi_reply::Responder;
use std::sync::Arc;

/// Ingest the data directory and log a summary of the report.
pub(crate) fn load_rates(config: &AppConfig) -> IngestOutcome {
    let outcome = mandi_rates::load(config);
    let report = &outcome.report;

    if report.directory_missing {
        tracing::warn!(
            "Data directory {:?} not found; every rate query will report the item as unknown",
            report.source_dir
        );
    }

    for rejection in &report.file_rejections {
        tracing::warn!("Skipped {:?}: {}", rejection.path, rejection.issue);
    }

    tracing::info!(
        "Ingested {} rows for {} items from {}/{} files ({} rows rejected)",
        report.rows_accepted,
        report.items,
        report.files_accepted,
        report.files_scanned,
        report.rows_rejected()
    );

    outcome
}

/// Build the responder over a freshly ingested index.
pub(crate) fn build_responder(config: &AppConfig) -> AppResult<Responder> {
    let index = Arc::new(load_rates(config).index);
    Responder::from_config(config, index)
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::Serialization(e.to_string()))
}
