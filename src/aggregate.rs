//! Daily aggregation of quote snapshots
//!
//! Groups a year's records by calendar date and summarizes the selected rate
//! column for each day. The `middle` column average is always carried as well,
//! since the day-average exposure comparison is defined on it.

use crate::quote::{sort_by_publish_time, QuoteRecord};
use crate::stats::{mean, min_max, pct_change, pct_change_opt};
use crate::types::{Percentage, RateColumn};
use serde::Serialize;
use std::collections::BTreeMap;

/// One calendar day's summary for a rate column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAggregate {
    pub date: String,
    /// Mean of the finite column values
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    /// Count of finite column values
    pub publishes: usize,
    /// Column value of the earliest publish, if finite
    pub first: Option<f64>,
    /// Publish time of the earliest record (always present)
    pub first_time: String,
    /// Mean of finite `middle` values, independent of the column
    pub avg_middle: Option<f64>,
    /// Earliest record of the day as captured
    #[serde(skip)]
    pub first_record: QuoteRecord,
}

/// Day-over-day percent changes of a daily aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChange {
    pub date: String,
    /// `avg` vs the previous day's `avg`
    pub avg_pct: Option<Percentage>,
    /// `first` vs the previous day's `first`
    pub first_pct: Option<Percentage>,
}

/// Groups quotes by date and computes per-day statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyAggregator {
    column: RateColumn,
}

impl DailyAggregator {
    /// Create an aggregator for a rate column
    pub fn new(column: RateColumn) -> Self {
        Self { column }
    }

    pub fn column(&self) -> RateColumn {
        self.column
    }

    /// Aggregate records into an ascending-by-date sequence
    ///
    /// Records without a date are dropped. Days with no finite value for the
    /// column are left out entirely.
    pub fn aggregate(&self, records: &[QuoteRecord]) -> Vec<DailyAggregate> {
        let groups = group_by_date(records);
        let mut daily = Vec::with_capacity(groups.len());

        for (date, rows) in groups {
            if let Some(agg) = self.summarize_day(date, &rows) {
                daily.push(agg);
            }
        }

        log::debug!(
            "Aggregated {} records into {} days ({})",
            records.len(),
            daily.len(),
            self.column
        );
        daily
    }

    fn summarize_day(&self, date: &str, rows: &[&QuoteRecord]) -> Option<DailyAggregate> {
        let values: Vec<f64> = rows.iter().filter_map(|r| r.rate(self.column)).collect();
        let avg = mean(&values)?;
        let (min, max) = min_max(&values)?;

        let middles: Vec<f64> = rows
            .iter()
            .filter_map(|r| r.rate(RateColumn::Middle))
            .collect();

        let first_record = *rows.first()?;

        Some(DailyAggregate {
            date: date.to_string(),
            avg,
            min,
            max,
            publishes: values.len(),
            first: first_record.rate(self.column),
            first_time: first_record.publish_time().to_string(),
            avg_middle: mean(&middles),
            first_record: first_record.clone(),
        })
    }
}

/// Group records by date, each group sorted by publish time
///
/// Keys iterate in lexical (chronological) order; ties within a group keep
/// their input order.
pub fn group_by_date(records: &[QuoteRecord]) -> BTreeMap<&str, Vec<&QuoteRecord>> {
    let mut groups: BTreeMap<&str, Vec<&QuoteRecord>> = BTreeMap::new();
    for record in sort_by_publish_time(records) {
        if let Some(date) = record.date() {
            groups.entry(date).or_default().push(record);
        }
    }
    groups
}

/// Percent change of each day vs the day before it in the sequence
pub fn day_over_day(daily: &[DailyAggregate]) -> Vec<DailyChange> {
    daily
        .iter()
        .enumerate()
        .map(|(i, day)| {
            let prev = i.checked_sub(1).map(|p| &daily[p]);
            DailyChange {
                date: day.date.clone(),
                avg_pct: prev.and_then(|p| pct_change(day.avg, p.avg)),
                first_pct: prev.and_then(|p| pct_change_opt(day.first, p.first)),
            }
        })
        .collect()
}

/// The latest aggregate strictly before `date`
pub fn previous_day<'a>(daily: &'a [DailyAggregate], date: &str) -> Option<&'a DailyAggregate> {
    let idx = daily.partition_point(|d| d.date.as_str() < date);
    idx.checked_sub(1).map(|i| &daily[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quote(date: &str, time: &str, middle: &str) -> QuoteRecord {
        QuoteRecord::new(date, time).with_rate(RateColumn::Middle, middle)
    }

    fn scenario() -> Vec<QuoteRecord> {
        vec![
            quote("2024-06-03", "2024-06-03 09:15:00", "716.50"),
            quote("2024-06-03", "2024-06-03 14:30:00", "717.00"),
            quote("2024-06-04", "2024-06-04 09:10:00", "715.80"),
        ]
    }

    #[test]
    fn test_daily_scenario() {
        let daily = DailyAggregator::new(RateColumn::Middle).aggregate(&scenario());
        assert_eq!(daily.len(), 2);

        let d1 = &daily[0];
        assert_eq!(d1.date, "2024-06-03");
        assert_eq!(d1.avg, 716.75);
        assert_eq!(d1.min, 716.5);
        assert_eq!(d1.max, 717.0);
        assert_eq!(d1.publishes, 2);
        assert_eq!(d1.first, Some(716.5));
        assert_eq!(d1.first_time, "2024-06-03 09:15:00");
        assert_eq!(d1.avg_middle, Some(716.75));

        let d2 = &daily[1];
        assert_eq!(d2.avg, 715.8);
        assert_eq!(d2.min, 715.8);
        assert_eq!(d2.max, 715.8);
        assert_eq!(d2.first, Some(715.8));
        assert_eq!(d2.publishes, 1);
    }

    #[test]
    fn test_first_uses_earliest_publish_regardless_of_input_order() {
        let mut records = scenario();
        records.reverse();
        let daily = DailyAggregator::new(RateColumn::Middle).aggregate(&records);
        assert_eq!(daily[0].first_time, "2024-06-03 09:15:00");
        assert_eq!(daily[0].first, Some(716.5));
    }

    #[test]
    fn test_same_publish_time_keeps_input_order() {
        let records = vec![
            quote("2024-06-03", "2024-06-03 14:30:00", "717.00"),
            quote("2024-06-03", "2024-06-03 09:15:00", "716.40"),
            quote("2024-06-03", "2024-06-03 09:15:00", "716.60"),
        ];
        let groups = group_by_date(&records);
        let middles: Vec<String> = groups["2024-06-03"].iter().map(|r| r.text("middle")).collect();
        assert_eq!(middles, vec!["716.40", "716.60", "717.00"]);

        let daily = DailyAggregator::new(RateColumn::Middle).aggregate(&records);
        assert_eq!(daily[0].first, Some(716.4));
        assert_eq!(daily[0].first_time, "2024-06-03 09:15:00");
    }

    #[test]
    fn test_missing_date_dropped_and_empty_day_excluded() {
        let records = vec![
            QuoteRecord::default().with_rate(RateColumn::Middle, "700.00"),
            quote("2024-06-05", "2024-06-05 09:00:00", "-"),
            quote("2024-06-06", "2024-06-06 09:00:00", "716.00"),
        ];
        let daily = DailyAggregator::new(RateColumn::Middle).aggregate(&records);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].date, "2024-06-06");
    }

    #[test]
    fn test_non_finite_first_keeps_time() {
        let records = vec![
            quote("2024-06-03", "2024-06-03 09:15:00", "n/a"),
            quote("2024-06-03", "2024-06-03 10:00:00", "716.00"),
        ];
        let daily = DailyAggregator::new(RateColumn::Middle).aggregate(&records);
        assert_eq!(daily[0].first, None);
        assert_eq!(daily[0].first_time, "2024-06-03 09:15:00");
        assert_eq!(daily[0].publishes, 1);
    }

    #[test]
    fn test_avg_middle_independent_of_column() {
        let records = vec![
            quote("2024-06-03", "2024-06-03 09:15:00", "716.00")
                .with_rate(RateColumn::Selling, "719.00"),
            quote("2024-06-03", "2024-06-03 10:00:00", "")
                .with_rate(RateColumn::Selling, "721.00"),
        ];
        let daily = DailyAggregator::new(RateColumn::Selling).aggregate(&records);
        assert_eq!(daily[0].avg, 720.0);
        assert_eq!(daily[0].avg_middle, Some(716.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(DailyAggregator::new(RateColumn::Buying).aggregate(&[]).is_empty());
    }

    #[test]
    fn test_day_over_day() {
        let daily = DailyAggregator::new(RateColumn::Middle).aggregate(&scenario());
        let changes = day_over_day(&daily);
        assert_eq!(changes[0].avg_pct, None);
        assert_relative_eq!(
            changes[1].avg_pct.unwrap(),
            (715.8 - 716.75) / 716.75 * 100.0
        );
        assert_relative_eq!(changes[1].first_pct.unwrap(), (715.8 - 716.5) / 716.5 * 100.0);
    }

    #[test]
    fn test_previous_day() {
        let daily = DailyAggregator::new(RateColumn::Middle).aggregate(&scenario());
        assert!(previous_day(&daily, "2024-06-03").is_none());
        assert_eq!(previous_day(&daily, "2024-06-04").unwrap().date, "2024-06-03");
        assert_eq!(previous_day(&daily, "2024-06-10").unwrap().date, "2024-06-04");
    }
}
