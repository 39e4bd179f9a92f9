//! Capture log status
//!
//! The capture job appends one CSV row per scrape of the official rate page
//! (`capturedAtUtc, publishTime, middle, htmlSha256, source`). Only the last
//! two rows matter here: they tell when the last capture ran, what rate it
//! saw, and whether the publish time moved since the capture before it.

use crate::error::{Availability, Unavailable};
use crate::quote::parse_rate;
use crate::types::RatePer100;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::{Asia::Shanghai, Tz};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
struct CaptureRow {
    #[serde(rename = "capturedAtUtc")]
    captured_at_utc: String,
    #[serde(rename = "publishTime")]
    publish_time: String,
    #[serde(default)]
    middle: String,
    #[serde(rename = "htmlSha256", default)]
    html_sha256: String,
    #[serde(default)]
    source: String,
}

/// Summary of the most recent captures
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureStatus {
    /// Raw `capturedAtUtc` of the last row
    pub last_capture: String,
    pub last_publish_time: String,
    pub last_middle: Option<RatePer100>,
    /// Publish time differs from the previous capture's
    pub publish_time_changed: bool,
    pub html_sha256: String,
    pub source: String,
}

impl CaptureStatus {
    /// Read status from capture log text
    pub fn from_csv(text: &str) -> Availability<Self> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| Unavailable::no_data(format!("capture log header unreadable: {}", e)))?
            .clone();

        let mut prev: Option<StringRecord> = None;
        let mut last: Option<StringRecord> = None;
        for record in reader.records() {
            match record {
                Ok(record) => prev = last.replace(record),
                Err(e) => log::warn!("Skipping unreadable capture log row: {}", e),
            }
        }

        let last = last.ok_or_else(|| Unavailable::no_data("capture log is empty"))?;
        let last: CaptureRow = last.deserialize(Some(&headers)).map_err(|e| {
            Unavailable::no_data(format!("last capture log row is malformed: {}", e))
        })?;
        let prev = prev.map(|p| p.deserialize::<CaptureRow>(Some(&headers)));
        let publish_time_changed = match prev {
            Some(Ok(p)) => p.publish_time != last.publish_time,
            Some(Err(e)) => {
                log::warn!("Previous capture log row is malformed: {}", e);
                false
            }
            None => false,
        };

        Ok(Self {
            last_middle: parse_rate(&Value::String(last.middle)),
            last_capture: last.captured_at_utc,
            last_publish_time: last.publish_time,
            publish_time_changed,
            html_sha256: last.html_sha256,
            source: last.source,
        })
    }

    /// Read status from a capture log file; a missing file has no status
    pub fn from_path(path: &Path) -> Availability<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Unavailable::no_data(format!("capture log {} unreadable: {}", path.display(), e))
        })?;
        Self::from_csv(&text)
    }

    /// Last capture time, if it parses as a UTC timestamp
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.last_capture.as_str();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    /// Last capture time in the publisher's timezone
    pub fn captured_at_local(&self) -> Option<DateTime<Tz>> {
        self.captured_at().map(|dt| dt.with_timezone(&Shanghai))
    }
}
