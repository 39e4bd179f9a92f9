//! Quote snapshot records
//!
//! A [`QuoteRecord`] is one published USD/CNY reference rate snapshot exactly
//! as it was captured. Records keep every field of the source document in its
//! original order so that exports reproduce them verbatim; typed access goes
//! through [`QuoteRecord::rate`], which applies [`parse_rate`].

use crate::types::RateColumn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One published rate snapshot
///
/// Immutable once built: the engine only derives aggregates from records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteRecord {
    fields: Map<String, Value>,
}

impl QuoteRecord {
    /// Create a record with its date and publish time
    pub fn new(date: impl Into<String>, publish_time: impl Into<String>) -> Self {
        Self::default()
            .with_field("date", date.into())
            .with_field("publishTime", publish_time.into())
    }

    /// Builder: set a field (rates may be given as text or number)
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Builder: set a rate column
    pub fn with_rate(self, column: RateColumn, value: impl Into<Value>) -> Self {
        self.with_field(column.as_str(), value)
    }

    /// Calendar date (`YYYY-MM-DD`); `None` when absent or empty
    pub fn date(&self) -> Option<&str> {
        match self.fields.get("date") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Sortable publish timestamp; empty when absent
    pub fn publish_time(&self) -> &str {
        match self.fields.get("publishTime") {
            Some(Value::String(s)) => s.as_str(),
            _ => "",
        }
    }

    /// Parsed value of a rate column, `None` unless finite
    pub fn rate(&self, column: RateColumn) -> Option<f64> {
        self.fields.get(column.as_str()).and_then(parse_rate)
    }

    /// Raw field rendered as text (missing and null render empty)
    pub fn text(&self, name: &str) -> String {
        match self.fields.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            // Whole floats print without a fractional part ("717", not "717.0").
            Some(Value::Number(n)) if n.is_f64() => {
                n.as_f64().map(|f| f.to_string()).unwrap_or_default()
            }
            Some(other) => other.to_string(),
        }
    }

    /// All fields in document order
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Permissive rate parsing shared by every component
///
/// Accepts JSON numbers and numeric strings (surrounding whitespace trimmed).
/// Empty strings, non-numeric text, non-finite results and any other JSON type
/// yield `None`; nothing is ever coerced to zero.
pub fn parse_rate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Records ordered by publish time (lexical, stable for ties)
pub fn sort_by_publish_time(records: &[QuoteRecord]) -> Vec<&QuoteRecord> {
    let mut sorted: Vec<&QuoteRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.publish_time().cmp(b.publish_time()));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rate_permissive() {
        assert_eq!(parse_rate(&json!("716.50")), Some(716.5));
        assert_eq!(parse_rate(&json!("  715.8 ")), Some(715.8));
        assert_eq!(parse_rate(&json!(714.6)), Some(714.6));
        assert_eq!(parse_rate(&json!(700)), Some(700.0));
    }

    #[test]
    fn test_parse_rate_rejects_non_finite() {
        assert_eq!(parse_rate(&json!("")), None);
        assert_eq!(parse_rate(&json!("   ")), None);
        assert_eq!(parse_rate(&json!("n/a")), None);
        assert_eq!(parse_rate(&json!("inf")), None);
        assert_eq!(parse_rate(&json!("NaN")), None);
        assert_eq!(parse_rate(&json!(null)), None);
        assert_eq!(parse_rate(&json!(true)), None);
    }

    #[test]
    fn test_record_accessors() {
        let rec = QuoteRecord::new("2024-06-03", "2024-06-03 09:15:00")
            .with_rate(RateColumn::Middle, "716.50")
            .with_rate(RateColumn::Buying, 714.2);

        assert_eq!(rec.date(), Some("2024-06-03"));
        assert_eq!(rec.publish_time(), "2024-06-03 09:15:00");
        assert_eq!(rec.rate(RateColumn::Middle), Some(716.5));
        assert_eq!(rec.rate(RateColumn::Buying), Some(714.2));
        assert_eq!(rec.rate(RateColumn::Selling), None);
        assert_eq!(rec.text("middle"), "716.50");
        assert_eq!(rec.text("buying"), "714.2");
        assert_eq!(rec.text("selling"), "");
    }

    #[test]
    fn test_number_text_matches_document_value() {
        let rec = QuoteRecord::default()
            .with_rate(RateColumn::Middle, 717.0)
            .with_rate(RateColumn::Buying, 716.5)
            .with_rate(RateColumn::Selling, 720)
            .with_field("ok", true);
        assert_eq!(rec.text("middle"), "717");
        assert_eq!(rec.text("buying"), "716.5");
        assert_eq!(rec.text("selling"), "720");
        assert_eq!(rec.text("ok"), "true");
    }

    #[test]
    fn test_empty_date_is_missing() {
        let rec = QuoteRecord::new("", "2024-06-03 09:15:00");
        assert_eq!(rec.date(), None);
        assert_eq!(QuoteRecord::default().publish_time(), "");
    }

    #[test]
    fn test_round_trip_keeps_field_order() {
        let text = r#"{"date":"2024-06-03","publishTime":"2024-06-03 09:15:00","publishTimeRaw":"2024/06/03 09:15:00","currency":"USD","middle":"716.50"}"#;
        let rec: QuoteRecord = serde_json::from_str(text).unwrap();
        assert_eq!(serde_json::to_string(&rec).unwrap(), text);
    }

    #[test]
    fn test_sort_by_publish_time_is_stable() {
        let records = vec![
            QuoteRecord::new("2024-06-03", "2024-06-03 14:30:00").with_field("tag", "b"),
            QuoteRecord::new("2024-06-03", "2024-06-03 09:15:00").with_field("tag", "a"),
            QuoteRecord::new("2024-06-03", "2024-06-03 14:30:00").with_field("tag", "c"),
        ];
        let sorted = sort_by_publish_time(&records);
        let tags: Vec<String> = sorted.iter().map(|r| r.text("tag")).collect();
        assert_eq!(tags, vec!["a", "b", "c"]);
    }
}
