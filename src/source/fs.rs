//! Month documents under a local data directory

use super::{document_path, parse_document, QuoteSource};
use crate::error::Result;
use crate::quote::QuoteRecord;
use crate::types::YearMonth;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads `{root}/{YYYY}/{YYYY}-{MM}.json`
#[derive(Debug, Clone)]
pub struct FsQuoteSource {
    root: PathBuf,
}

impl FsQuoteSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a month's document
    pub fn month_path(&self, month: YearMonth) -> PathBuf {
        self.root.join(document_path(month))
    }
}

impl QuoteSource for FsQuoteSource {
    fn fetch_month(&self, month: YearMonth) -> Result<Vec<QuoteRecord>> {
        let path = self.month_path(month);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&path)?;
        parse_document(&text)
    }

    fn name(&self) -> &str {
        "fs"
    }
}
