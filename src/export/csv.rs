//! Raw snapshot CSV export
//!
//! Header `date,publishTime,buying,cashBuying,selling,cashSelling,middle`.
//! `publishTime` is always double-quoted (inner quotes doubled); every other
//! field is written as captured, unquoted. Lines are `\n`-separated with no
//! trailing newline.

use crate::error::{FxError, Result};
use crate::export::RAW_HEADER;
use crate::quote::QuoteRecord;
use csv::{QuoteStyle, Terminator, WriterBuilder};

/// Render records as CSV text in their given order
pub fn to_csv(records: &[QuoteRecord]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(RAW_HEADER)?;
    for rec in records {
        let quoted_time = format!("\"{}\"", rec.text("publishTime").replace('"', "\"\""));
        writer.write_record([
            rec.text("date"),
            quoted_time,
            rec.text("buying"),
            rec.text("cashBuying"),
            rec.text("selling"),
            rec.text("cashSelling"),
            rec.text("middle"),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| FxError::DataError(format!("Failed to flush CSV: {}", e)))?;
    let mut text = String::from_utf8(bytes)
        .map_err(|e| FxError::DataError(format!("CSV is not UTF-8: {}", e)))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}
