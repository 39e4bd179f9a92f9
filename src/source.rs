//! Quote document sources
//!
//! Quote snapshots are stored as one JSON array per month at
//! `{YYYY}/{YYYY}-{MM}.json`. A missing document is an empty month, and a
//! document that fails to load is logged and also treated as empty, so a
//! year always aggregates whatever months did load.
//!
//! - **fs**: documents under a local data directory
//! - **http**: documents under a base URL, fetched concurrently (feature `async`)

pub mod fs;
#[cfg(feature = "async")]
pub mod http;

pub use fs::FsQuoteSource;
#[cfg(feature = "async")]
pub use http::HttpQuoteSource;

use crate::error::Result;
use crate::quote::QuoteRecord;
use crate::types::YearMonth;
use hashbrown::HashMap;
use rayon::prelude::*;

/// Provider of monthly quote documents
pub trait QuoteSource: Send + Sync {
    /// Records of one month; `Ok(vec![])` when the document does not exist
    fn fetch_month(&self, month: YearMonth) -> Result<Vec<QuoteRecord>>;

    /// Source name for logging
    fn name(&self) -> &str;
}

/// Relative location of a month's document
pub fn document_path(month: YearMonth) -> String {
    format!("{:04}/{}.json", month.year, month.key())
}

/// Parse a month document (a JSON array of records)
pub fn parse_document(text: &str) -> Result<Vec<QuoteRecord>> {
    Ok(serde_json::from_str(text)?)
}

/// Load one month, treating any failure as an empty month
pub fn load_month<S: QuoteSource + ?Sized>(source: &S, month: YearMonth) -> Vec<QuoteRecord> {
    match source.fetch_month(month) {
        Ok(records) => {
            log::debug!("{}: {} records for {}", source.name(), records.len(), month);
            records
        }
        Err(e) => {
            log::warn!("{}: no data for {} ({})", source.name(), month, e);
            Vec::new()
        }
    }
}

/// Load all twelve months of a year in parallel, one slot per month (January first)
pub fn load_months<S: QuoteSource + ?Sized>(source: &S, year: i32) -> Vec<Vec<QuoteRecord>> {
    let months: Vec<YearMonth> = YearMonth::months_of(year).collect();
    let per_month: Vec<Vec<QuoteRecord>> = months
        .par_iter()
        .map(|month| load_month(source, *month))
        .collect();

    log::info!(
        "{}: loaded {} records for {}",
        source.name(),
        per_month.iter().map(Vec::len).sum::<usize>(),
        year
    );
    per_month
}

/// Load all twelve months of a year, concatenated in month order
pub fn load_year<S: QuoteSource + ?Sized>(source: &S, year: i32) -> Vec<QuoteRecord> {
    load_months(source, year).into_iter().flatten().collect()
}

/// Month documents held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuoteSource {
    months: HashMap<YearMonth, Vec<QuoteRecord>>,
}

impl InMemoryQuoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// File records under their dated month; undated records are skipped
    pub fn from_records(records: Vec<QuoteRecord>) -> Self {
        let mut source = Self::new();
        for rec in records {
            let month: Option<YearMonth> =
                rec.date().and_then(|d| d.get(..7)).and_then(|k| k.parse().ok());
            if let Some(month) = month {
                source.months.entry(month).or_insert_with(Vec::new).push(rec);
            }
        }
        source
    }
}

impl QuoteSource for InMemoryQuoteSource {
    fn fetch_month(&self, month: YearMonth) -> Result<Vec<QuoteRecord>> {
        Ok(self.months.get(&month).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
