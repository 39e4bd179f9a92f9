//! Month documents served over HTTP
//!
//! The twelve documents of a year are requested concurrently and joined
//! before returning. Any month that is absent (404), unreachable or malformed
//! contributes no records. There is no retry and no internal timeout; dropping
//! the returned future cancels every outstanding request.

use super::{document_path, parse_document};
use crate::error::{FxError, Result};
use crate::quote::QuoteRecord;
use crate::types::YearMonth;
use reqwest::{Client, StatusCode};
use tokio::task::JoinSet;

/// Reads `{base_url}/{YYYY}/{YYYY}-{MM}.json`
#[derive(Debug, Clone)]
pub struct HttpQuoteSource {
    client: Client,
    base_url: String,
}

impl HttpQuoteSource {
    /// Create a source rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("bocfx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FxError::DataError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// URL of a month's document
    pub fn month_url(&self, month: YearMonth) -> String {
        format!("{}/{}", self.base_url, document_path(month))
    }

    /// Fetch one month; a 404 is an empty month
    pub async fn fetch_month(&self, month: YearMonth) -> Result<Vec<QuoteRecord>> {
        fetch(&self.client, &self.month_url(month)).await
    }

    /// Fetch all months of a year concurrently, one slot per month (January first)
    pub async fn load_months(&self, year: i32) -> Vec<Vec<QuoteRecord>> {
        let mut tasks = JoinSet::new();
        for month in YearMonth::months_of(year) {
            let client = self.client.clone();
            let url = self.month_url(month);
            tasks.spawn(async move { (month, fetch(&client, &url).await) });
        }

        let mut slots: Vec<Vec<QuoteRecord>> = vec![Vec::new(); 12];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((month, Ok(records))) => {
                    log::debug!("http: {} records for {}", records.len(), month);
                    slots[(month.month - 1) as usize] = records;
                }
                Ok((month, Err(e))) => log::warn!("http: no data for {} ({})", month, e),
                Err(e) => log::warn!("http: month request aborted ({})", e),
            }
        }

        log::info!(
            "http: loaded {} records for {}",
            slots.iter().map(Vec::len).sum::<usize>(),
            year
        );
        slots
    }
}

async fn fetch(client: &Client, url: &str) -> Result<Vec<QuoteRecord>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FxError::DataError(format!("HTTP request failed: {}", e)))?;

    if response.status() == StatusCode::NOT_FOUND {
        return Ok(Vec::new());
    }
    if !response.status().is_success() {
        return Err(FxError::DataError(format!(
            "{} returned {}",
            url,
            response.status()
        )));
    }

    let text = response
        .text()
        .await
        .map_err(|e| FxError::DataError(format!("Failed to read response: {}", e)))?;
    parse_document(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_url() {
        let source = HttpQuoteSource::new("https://example.invalid/data/").unwrap();
        assert_eq!(
            source.month_url(YearMonth::new(2024, 6).unwrap()),
            "https://example.invalid/data/2024/2024-06.json"
        );
    }
}
