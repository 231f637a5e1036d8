//! Market rate consolidation.
//!
//! Reads market bulletin workbooks into a per-item, recency-bounded
//! [`RateIndex`] and resolves free-text item names through an
//! [`AliasTable`].

pub mod alias;
pub mod frame;
pub mod ingest;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use alias::AliasTable;
pub use frame::{Frame, FrameReader, WorkbookReader};
pub use ingest::{display_price, parse_date, RateIngestor};
pub use types::{
    FileRejection, IngestIssue, IngestOutcome, IngestReport, ItemHistory, RateIndex, RateRecord,
    RowRejection,
};

use mandi_core::AppConfig;

/// Ingest the configured data directory.
pub fn load(config: &AppConfig) -> IngestOutcome {
    RateIngestor::new(config.rates.clone()).load(&config.data_dir())
}

/// Alias table built from configuration.
pub fn alias_table(config: &AppConfig) -> AliasTable {
    AliasTable::new(config.aliases.iter().map(|(k, v)| (k.as_str(), v.clone())))
}
