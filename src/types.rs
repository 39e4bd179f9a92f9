//! Core types and constants

use crate::error::{FxError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rate in the published convention: CNY per 100 USD
pub type RatePer100 = f64;

/// US dollar amount
pub type Usd = f64;

/// Renminbi amount
pub type Cny = f64;

/// Percentage (1.0 == 1%)
pub type Percentage = f64;

/// Selectable rate column of a quote snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RateColumn {
    Buying,
    CashBuying,
    Selling,
    CashSelling,
    Middle,
}

impl RateColumn {
    /// Field name as it appears in quote documents
    pub fn as_str(&self) -> &'static str {
        match self {
            RateColumn::Buying => "buying",
            RateColumn::CashBuying => "cashBuying",
            RateColumn::Selling => "selling",
            RateColumn::CashSelling => "cashSelling",
            RateColumn::Middle => "middle",
        }
    }

    /// All columns in export order
    pub fn all() -> [RateColumn; 5] {
        [
            RateColumn::Buying,
            RateColumn::CashBuying,
            RateColumn::Selling,
            RateColumn::CashSelling,
            RateColumn::Middle,
        ]
    }
}

impl Default for RateColumn {
    fn default() -> Self {
        RateColumn::Middle
    }
}

impl fmt::Display for RateColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RateColumn {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().replace(['-', '_'], "").to_lowercase();
        match key.as_str() {
            "buying" => Ok(RateColumn::Buying),
            "cashbuying" => Ok(RateColumn::CashBuying),
            "selling" => Ok(RateColumn::Selling),
            "cashselling" => Ok(RateColumn::CashSelling),
            "middle" => Ok(RateColumn::Middle),
            _ => Err(FxError::ParseError(format!("Unknown rate column: {}", s))),
        }
    }
}

/// Calendar month a quote document or baseline belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Create a validated year/month
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(FxError::InvalidInput(format!(
                "Invalid year/month: {}-{}",
                year, month
            )));
        }
        Ok(Self { year, month })
    }

    /// Month containing the given date
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The twelve months of a year, January first
    pub fn months_of(year: i32) -> impl Iterator<Item = YearMonth> {
        (1..=12).map(move |month| YearMonth { year, month })
    }

    /// Document key, e.g. `2024-06`
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Baseline persistence key, e.g. `baseline:2024-06`
    pub fn baseline_key(&self) -> String {
        format!("baseline:{}", self.key())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for YearMonth {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self> {
        let (y, m) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| FxError::ParseError(format!("Expected YYYY-MM, got: {}", s)))?;
        let year = y
            .parse::<i32>()
            .map_err(|e| FxError::ParseError(format!("Invalid year in {}: {}", s, e)))?;
        let month = m
            .parse::<u32>()
            .map_err(|e| FxError::ParseError(format!("Invalid month in {}: {}", s, e)))?;
        YearMonth::new(year, month)
    }
}
