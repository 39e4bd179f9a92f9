//! Locked baseline rates
//!
//! A baseline is a user-locked reference rate (CNY per 100 USD) for one
//! month. It is stored as text under the key `baseline:{YYYY}-{MM}`; writes
//! replace the whole value and the last write wins. A missing or unreadable
//! value falls back to a caller-supplied default at month load.

use crate::error::{FxError, Result};
use crate::types::{RatePer100, YearMonth};
use hashbrown::HashMap;

#[cfg(feature = "rusqlite-support")]
pub use sqlite::SqliteBaselineStore;

/// Key-value persistence for baselines
pub trait BaselineStore {
    /// Raw stored text for a key
    fn get_raw(&self, key: &str) -> Result<Option<String>>;

    /// Replace the stored text for a key
    fn put_raw(&mut self, key: &str, value: &str) -> Result<()>;

    /// Locked baseline for a month, if a valid one is stored
    fn get(&self, month: YearMonth) -> Result<Option<RatePer100>> {
        let key = month.baseline_key();
        Ok(self.get_raw(&key)?.and_then(|text| {
            let parsed = parse_baseline(&text);
            if parsed.is_none() {
                log::warn!("Ignoring invalid stored baseline {}={:?}", key, text);
            }
            parsed
        }))
    }

    /// Lock a baseline for a month
    fn lock(&mut self, month: YearMonth, rate: RatePer100) -> Result<()> {
        let rate = validate_baseline(rate)?;
        log::info!("Locking baseline {} at {}", month, rate);
        self.put_raw(&month.baseline_key(), &rate.to_string())
    }

    /// Locked baseline, or `default` when none is stored
    fn get_or(&self, month: YearMonth, default: RatePer100) -> Result<RatePer100> {
        Ok(self.get(month)?.unwrap_or(default))
    }
}

/// Baselines must be positive and finite
pub fn validate_baseline(rate: RatePer100) -> Result<RatePer100> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(FxError::InvalidInput(format!(
            "Baseline must be a positive finite rate, got {}",
            rate
        )));
    }
    Ok(rate)
}

/// Parse stored baseline text
pub fn parse_baseline(text: &str) -> Option<RatePer100> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Baselines kept in process memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryBaselineStore {
    values: HashMap<String, String>,
}

impl InMemoryBaselineStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BaselineStore for InMemoryBaselineStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn put_raw(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(feature = "rusqlite-support")]
mod sqlite {
    use super::BaselineStore;
    use crate::error::{FxError, Result};
    use rusqlite::{params, Connection, OptionalExtension};
    use std::path::Path;

    /// Baselines persisted in a SQLite key-value table
    pub struct SqliteBaselineStore {
        conn: Connection,
    }

    impl SqliteBaselineStore {
        /// Create or open the store at path
        pub fn new(db_path: &Path) -> Result<Self> {
            let conn = Connection::open(db_path)
                .map_err(|e| FxError::StorageError(format!("Failed to open database: {}", e)))?;
            let store = Self { conn };
            store.create_tables()?;
            Ok(store)
        }

        /// Create in-memory store (for testing)
        pub fn new_in_memory() -> Result<Self> {
            let conn = Connection::open_in_memory().map_err(|e| {
                FxError::StorageError(format!("Failed to create in-memory database: {}", e))
            })?;
            let store = Self { conn };
            store.create_tables()?;
            Ok(store)
        }

        fn create_tables(&self) -> Result<()> {
            self.conn
                .execute(
                    "CREATE TABLE IF NOT EXISTS kv (
                        key TEXT PRIMARY KEY,
                        value TEXT NOT NULL
                    )",
                    [],
                )
                .map_err(|e| FxError::StorageError(format!("Failed to create kv table: {}", e)))?;
            Ok(())
        }
    }

    impl BaselineStore for SqliteBaselineStore {
        fn get_raw(&self, key: &str) -> Result<Option<String>> {
            self.conn
                .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(|e| FxError::StorageError(format!("Failed to read {}: {}", key, e)))
        }

        fn put_raw(&mut self, key: &str, value: &str) -> Result<()> {
            self.conn
                .execute(
                    "INSERT INTO kv (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    params![key, value],
                )
                .map_err(|e| FxError::StorageError(format!("Failed to write {}: {}", key, e)))?;
            Ok(())
        }
    }
}
