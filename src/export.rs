//! Exportable artifacts
//!
//! - **workbook**: two-sheet SpreadsheetML document (raw snapshots, daily
//!   averages next to daily first publishes)
//! - **csv**: raw snapshot CSV
//! - **json**: raw snapshot JSON
//!
//! The functions here only turn domain data into rows of text; layout and
//! escaping live in [`workbook`].

pub mod csv;
pub mod json;
pub mod workbook;

pub use self::csv::to_csv;
pub use self::json::to_json;
pub use self::workbook::{escape_markup, side_by_side, Rows, Sheet, Workbook};

use crate::aggregate::{day_over_day, DailyAggregate};
use crate::constants::SUMMARY_GAP_COLUMNS;
use crate::quote::QuoteRecord;
use crate::types::{RateColumn, YearMonth};

/// Columns of the raw snapshot table
pub const RAW_HEADER: [&str; 7] = [
    "date",
    "publishTime",
    "buying",
    "cashBuying",
    "selling",
    "cashSelling",
    "middle",
];

pub const RAW_SHEET_NAME: &str = "All Published Values";
pub const SUMMARY_SHEET_NAME: &str = "Averages & First";

const AVERAGES_TITLE: &str = "Day Averages";
const AVERAGES_HEADER: [&str; 6] = ["date", "avg(selected)", "%chg vs prev", "min", "max", "publishes"];
const FIRSTS_TITLE: &str = "Day First Published Values";

/// Fixed-decimal text; `-` for non-finite values
pub fn fmt_fixed(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{:.*}", decimals, value)
    } else {
        "-".to_string()
    }
}

fn header(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

/// Header plus one row per record, fields as captured
pub fn raw_rows(records: &[QuoteRecord]) -> Rows {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(header(&RAW_HEADER));
    for rec in records {
        rows.push(RAW_HEADER.iter().map(|field| rec.text(field)).collect());
    }
    rows
}

/// Daily averages table with day-over-day change
pub fn average_rows(daily: &[DailyAggregate]) -> Rows {
    let mut rows = vec![vec![AVERAGES_TITLE.to_string()], header(&AVERAGES_HEADER)];
    for (day, change) in daily.iter().zip(day_over_day(daily)) {
        rows.push(vec![
            day.date.clone(),
            fmt_fixed(day.avg, 2),
            change
                .avg_pct
                .map(|pct| format!("{}%", fmt_fixed(pct, 2)))
                .unwrap_or_default(),
            fmt_fixed(day.min, 2),
            fmt_fixed(day.max, 2),
            day.publishes.to_string(),
        ]);
    }
    rows
}

/// Each day's first publish, fields as captured
pub fn first_publish_rows(daily: &[DailyAggregate]) -> Rows {
    let mut rows = vec![vec![FIRSTS_TITLE.to_string()], header(&RAW_HEADER)];
    for day in daily {
        let rec = &day.first_record;
        rows.push(vec![
            day.date.clone(),
            day.first_time.clone(),
            rec.text("buying"),
            rec.text("cashBuying"),
            rec.text("selling"),
            rec.text("cashSelling"),
            rec.text("middle"),
        ]);
    }
    rows
}

/// Averages and first publishes side by side
pub fn summary_rows(daily: &[DailyAggregate]) -> Rows {
    side_by_side(
        &average_rows(daily),
        &first_publish_rows(daily),
        SUMMARY_GAP_COLUMNS,
    )
}

/// The two-sheet export workbook
pub fn spreadsheet(records: &[QuoteRecord], daily: &[DailyAggregate]) -> Workbook {
    Workbook::new()
        .sheet(RAW_SHEET_NAME, raw_rows(records))
        .sheet(SUMMARY_SHEET_NAME, summary_rows(daily))
}

/// Download file names for each artifact
pub fn csv_file_name(month: YearMonth) -> String {
    format!("boc_usd_cny_raw_{}.csv", month.key())
}

pub fn json_file_name(month: YearMonth) -> String {
    format!("boc_usd_cny_raw_{}.json", month.key())
}

pub fn spreadsheet_file_name(month: YearMonth, column: RateColumn) -> String {
    format!("boc_usd_cny_{}_{}.xls", month.key(), column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DailyAggregator;

    fn records() -> Vec<QuoteRecord> {
        vec![
            QuoteRecord::new("2024-06-03", "2024-06-03 09:15:00")
                .with_rate(RateColumn::Buying, "713.20")
                .with_rate(RateColumn::Middle, "716.50"),
            QuoteRecord::new("2024-06-03", "2024-06-03 14:30:00").with_rate(RateColumn::Middle, "717.00"),
            QuoteRecord::new("2024-06-04", "2024-06-04 09:10:00").with_rate(RateColumn::Middle, "715.80"),
        ]
    }

    #[test]
    fn test_fmt_fixed() {
        assert_eq!(fmt_fixed(716.75, 2), "716.75");
        assert_eq!(fmt_fixed(715.8, 2), "715.80");
        assert_eq!(fmt_fixed(f64::NAN, 2), "-");
    }

    #[test]
    fn test_raw_rows() {
        let rows = raw_rows(&records());
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.len() == 7));
        assert_eq!(rows[1][2], "713.20");
        assert_eq!(rows[2][2], "");
    }

    #[test]
    fn test_average_rows() {
        let daily = DailyAggregator::new(RateColumn::Middle).aggregate(&records());
        let rows = average_rows(&daily);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2], vec!["2024-06-03", "716.75", "", "716.50", "717.00", "2"]);
        assert_eq!(rows[3][2], "-0.13%");
    }

    #[test]
    fn test_summary_layout() {
        let daily = DailyAggregator::new(RateColumn::Middle).aggregate(&records());
        let rows = summary_rows(&daily);
        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows[0],
            ["Day Averages", "", "", "", "Day First Published Values"]
        );
        assert_eq!(rows[2].len(), 6 + 3 + 7);
        assert_eq!(&rows[2][6..9], &["", "", ""]);
        assert_eq!(rows[2][9..], ["2024-06-03", "2024-06-03 09:15:00", "713.20", "", "", "", "716.50"]);
    }

    #[test]
    fn test_spreadsheet_sheets() {
        let recs = records();
        let daily = DailyAggregator::new(RateColumn::Middle).aggregate(&recs);
        let wb = spreadsheet(&recs, &daily);
        assert_eq!(wb.sheets().len(), 2);
        assert_eq!(wb.sheets()[0].name, RAW_SHEET_NAME);
        assert_eq!(wb.sheets()[1].name, SUMMARY_SHEET_NAME);
        assert_eq!(wb.to_xml(), spreadsheet(&recs, &daily).to_xml());
        assert!(wb.to_xml().contains("ss:Name=\"Averages &amp; First\""));
    }

    #[test]
    fn test_file_names() {
        let ym = YearMonth::new(2024, 6).unwrap();
        assert_eq!(csv_file_name(ym), "boc_usd_cny_raw_2024-06.csv");
        assert_eq!(json_file_name(ym), "boc_usd_cny_raw_2024-06.json");
        assert_eq!(spreadsheet_file_name(ym, RateColumn::Middle), "boc_usd_cny_2024-06_middle.xls");
    }
}
