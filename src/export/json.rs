//! Raw snapshot JSON export

use crate::error::Result;
use crate::quote::QuoteRecord;

/// Pretty-printed array of the records exactly as captured
pub fn to_json(records: &[QuoteRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_is_verbatim() {
        let text = r#"[
  {
    "date": "2024-06-03",
    "publishTime": "2024-06-03 09:15:00",
    "currency": "USD",
    "middle": "716.50",
    "source": "https://example.invalid/boc"
  }
]"#;
        let records: Vec<QuoteRecord> = serde_json::from_str(text).unwrap();
        assert_eq!(to_json(&records).unwrap(), text);
    }

    #[test]
    fn test_json_empty() {
        assert_eq!(to_json(&[]).unwrap(), "[]");
    }
}
