//! Per-session working context
//!
//! [`FxContext`] holds everything one dashboard view works from: the selected
//! month and rate column, the month's raw records, the year's records and
//! daily aggregates, and the baseline in force. All computations are methods
//! on this value; nothing is kept in process-wide state.

use crate::aggregate::{day_over_day, DailyAggregate, DailyAggregator, DailyChange};
use crate::baseline::BaselineStore;
use crate::error::{Availability, Result};
use crate::export::{self, Workbook};
use crate::exposure::{Exposure, ExposureModel, ImpactMode, ImpactSummary, PublishImpact};
use crate::intraday::IntradaySeries;
use crate::quote::{sort_by_publish_time, QuoteRecord};
use crate::source::{load_months, QuoteSource};
use crate::types::{RateColumn, RatePer100, YearMonth};

/// Loaded data and selections for one month view
#[derive(Debug, Clone)]
pub struct FxContext {
    month: YearMonth,
    column: RateColumn,
    month_records: Vec<QuoteRecord>,
    year_records: Vec<QuoteRecord>,
    daily: Vec<DailyAggregate>,
    baseline: RatePer100,
    baseline_locked: bool,
}

impl FxContext {
    /// Load a month view from a quote source and baseline store
    ///
    /// Each month document of the year is read once. `default_baseline`
    /// applies when no baseline is locked for the month.
    pub fn load<S, B>(
        source: &S,
        store: &B,
        month: YearMonth,
        column: RateColumn,
        default_baseline: RatePer100,
    ) -> Result<Self>
    where
        S: QuoteSource + ?Sized,
        B: BaselineStore + ?Sized,
    {
        let months = load_months(source, month.year);
        let locked = store.get(month)?;
        Ok(Self::from_months(month, column, months, locked, default_baseline))
    }

    /// Build a view from the year's month documents (January first)
    ///
    /// The month's records are its document exactly as loaded, including
    /// records without a usable date.
    pub fn from_months(
        month: YearMonth,
        column: RateColumn,
        months: Vec<Vec<QuoteRecord>>,
        locked_baseline: Option<RatePer100>,
        default_baseline: RatePer100,
    ) -> Self {
        let month_records = months
            .get((month.month - 1) as usize)
            .cloned()
            .unwrap_or_default();
        let year_records = months.into_iter().flatten().collect();
        Self::assemble(
            month,
            column,
            month_records,
            year_records,
            locked_baseline,
            default_baseline,
        )
    }

    /// Build a view from dated records already in memory
    ///
    /// Records are filed under the month of their date, the way
    /// [`InMemoryQuoteSource`](crate::source::InMemoryQuoteSource) files them.
    pub fn from_records(
        month: YearMonth,
        column: RateColumn,
        year_records: Vec<QuoteRecord>,
        locked_baseline: Option<RatePer100>,
        default_baseline: RatePer100,
    ) -> Self {
        let key = month.key();
        let month_records = year_records
            .iter()
            .filter(|r| r.date().and_then(|d| d.get(..7)) == Some(key.as_str()))
            .cloned()
            .collect();
        Self::assemble(
            month,
            column,
            month_records,
            year_records,
            locked_baseline,
            default_baseline,
        )
    }

    fn assemble(
        month: YearMonth,
        column: RateColumn,
        month_records: Vec<QuoteRecord>,
        year_records: Vec<QuoteRecord>,
        locked_baseline: Option<RatePer100>,
        default_baseline: RatePer100,
    ) -> Self {
        let daily = DailyAggregator::new(column).aggregate(&year_records);
        Self {
            month,
            column,
            month_records,
            year_records,
            daily,
            baseline: locked_baseline.unwrap_or(default_baseline),
            baseline_locked: locked_baseline.is_some(),
        }
    }

    /// Switch the rate column, rebuilding the daily aggregates
    pub fn with_column(mut self, column: RateColumn) -> Self {
        self.column = column;
        self.daily = DailyAggregator::new(column).aggregate(&self.year_records);
        self
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn column(&self) -> RateColumn {
        self.column
    }

    pub fn month_records(&self) -> &[QuoteRecord] {
        &self.month_records
    }

    pub fn year_records(&self) -> &[QuoteRecord] {
        &self.year_records
    }

    pub fn daily(&self) -> &[DailyAggregate] {
        &self.daily
    }

    pub fn day_changes(&self) -> Vec<DailyChange> {
        day_over_day(&self.daily)
    }

    /// Baseline in force (locked value or the default)
    pub fn baseline(&self) -> RatePer100 {
        self.baseline
    }

    pub fn baseline_locked(&self) -> bool {
        self.baseline_locked
    }

    /// Lock a new baseline for this month
    pub fn lock_baseline<B: BaselineStore + ?Sized>(
        &mut self,
        store: &mut B,
        rate: RatePer100,
    ) -> Result<()> {
        store.lock(self.month, rate)?;
        self.baseline = rate;
        self.baseline_locked = true;
        Ok(())
    }

    /// Headline impact of the latest publish
    pub fn impact(&self, mode: ImpactMode, exposure: Exposure) -> Availability<ImpactSummary> {
        ExposureModel::new(exposure).summarize(
            mode,
            &self.year_records,
            &self.daily,
            Some(self.baseline),
        )
    }

    /// Impact of every publish of the year under `mode`
    pub fn impact_series(&self, mode: ImpactMode, exposure: Exposure) -> Vec<PublishImpact> {
        let model = ExposureModel::new(exposure);
        match mode {
            ImpactMode::PrevPublish => model.prev_publish(&self.year_records),
            ImpactMode::PrevDayAvg => model.prev_day_avg(&self.year_records, &self.daily),
            ImpactMode::BaselineLock => sort_by_publish_time(&self.year_records)
                .into_iter()
                .map(|rec| {
                    let rate = rec.rate(RateColumn::Middle);
                    PublishImpact {
                        date: rec.date().unwrap_or_default().to_string(),
                        publish_time: rec.publish_time().to_string(),
                        rate,
                        reference: Some("baseline".to_string()),
                        outcome: model.baseline_lock(rate, Some(self.baseline)),
                    }
                })
                .collect(),
        }
    }

    /// Intraday analysis of one date for the selected column
    pub fn intraday(&self, date: &str) -> IntradaySeries {
        IntradaySeries::for_date(&self.year_records, date, self.column)
    }

    /// Two-sheet workbook of the month's records and the year's daily tables
    pub fn spreadsheet(&self) -> Workbook {
        export::spreadsheet(&self.month_records, &self.daily)
    }

    pub fn csv(&self) -> Result<String> {
        export::to_csv(&self.month_records)
    }

    pub fn json(&self) -> Result<String> {
        export::to_json(&self.month_records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::InMemoryBaselineStore;
    use crate::source::InMemoryQuoteSource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn quote(date: &str, time: &str, middle: &str) -> QuoteRecord {
        QuoteRecord::new(date, time).with_rate(RateColumn::Middle, middle)
    }

    fn records() -> Vec<QuoteRecord> {
        vec![
            quote("2024-05-31", "2024-05-31 09:15:00", "717.20"),
            quote("2024-06-03", "2024-06-03 09:15:00", "716.50"),
            quote("2024-06-03", "2024-06-03 14:30:00", "717.00"),
            quote("2024-06-04", "2024-06-04 09:10:00", "715.80"),
        ]
    }

    fn june() -> YearMonth {
        YearMonth::new(2024, 6).unwrap()
    }

    #[test]
    fn test_load_from_source() {
        let source = InMemoryQuoteSource::from_records(records());
        let store = InMemoryBaselineStore::new();
        let ctx = FxContext::load(&source, &store, june(), RateColumn::Middle, 714.6).unwrap();

        assert_eq!(ctx.month_records().len(), 3);
        assert_eq!(ctx.year_records().len(), 4);
        assert_eq!(ctx.daily().len(), 3);
        assert_eq!(ctx.baseline(), 714.6);
        assert!(!ctx.baseline_locked());
    }

    struct CountingSource {
        inner: InMemoryQuoteSource,
        fetches: AtomicUsize,
    }

    impl QuoteSource for CountingSource {
        fn fetch_month(&self, month: YearMonth) -> Result<Vec<QuoteRecord>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let mut records = self.inner.fetch_month(month)?;
            if month.month == 6 {
                records.push(QuoteRecord::default().with_rate(RateColumn::Middle, "716.00"));
            }
            Ok(records)
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[test]
    fn test_load_reads_each_document_once() {
        let source = CountingSource {
            inner: InMemoryQuoteSource::from_records(records()),
            fetches: AtomicUsize::new(0),
        };
        let store = InMemoryBaselineStore::new();
        let ctx = FxContext::load(&source, &store, june(), RateColumn::Middle, 714.6).unwrap();

        assert_eq!(source.fetches.load(Ordering::SeqCst), 12);
        // The undated record stays in the month document and its exports.
        assert_eq!(ctx.month_records().len(), 4);
        assert_eq!(ctx.year_records().len(), 5);
        assert_eq!(ctx.csv().unwrap().lines().count(), 5);
        assert_eq!(ctx.daily().len(), 3);
    }

    #[test]
    fn test_from_months_uses_month_slot() {
        let mut months = vec![Vec::new(); 12];
        months[4] = vec![quote("2024-05-31", "2024-05-31 09:15:00", "717.20")];
        months[5] = vec![
            quote("2024-06-03", "2024-06-03 09:15:00", "716.50"),
            QuoteRecord::default(),
        ];
        let ctx = FxContext::from_months(june(), RateColumn::Middle, months, None, 714.6);
        assert_eq!(ctx.month_records().len(), 2);
        assert_eq!(ctx.year_records().len(), 3);
        assert_eq!(ctx.daily().len(), 2);
    }

    #[test]
    fn test_locked_baseline_seeds_context() {
        let source = InMemoryQuoteSource::from_records(records());
        let mut store = InMemoryBaselineStore::new();
        store.lock(june(), 716.0).unwrap();

        let ctx = FxContext::load(&source, &store, june(), RateColumn::Middle, 714.6).unwrap();
        assert_eq!(ctx.baseline(), 716.0);
        assert!(ctx.baseline_locked());
    }

    #[test]
    fn test_lock_baseline_updates_store() {
        let mut store = InMemoryBaselineStore::new();
        let mut ctx = FxContext::from_records(june(), RateColumn::Middle, records(), None, 714.6);
        ctx.lock_baseline(&mut store, 715.8).unwrap();

        assert_eq!(store.get(june()).unwrap(), Some(715.8));
        let summary = ctx
            .impact(ImpactMode::BaselineLock, Exposure::Usd(1_500_000_000.0))
            .unwrap();
        assert_eq!(summary.figures.impact, 0.0);
        assert!(ctx.lock_baseline(&mut store, -1.0).is_err());
        assert_eq!(ctx.baseline(), 715.8);
    }

    #[test]
    fn test_with_column_rebuilds_daily() {
        let recs = vec![quote("2024-06-03", "2024-06-03 09:15:00", "716.50")
            .with_rate(RateColumn::Selling, "719.00")];
        let ctx = FxContext::from_records(june(), RateColumn::Middle, recs, None, 714.6)
            .with_column(RateColumn::Selling);
        assert_eq!(ctx.daily()[0].avg, 719.0);
        assert_eq!(ctx.daily()[0].avg_middle, Some(716.5));
    }

    #[test]
    fn test_impact_series_lengths() {
        let ctx = FxContext::from_records(june(), RateColumn::Middle, records(), None, 714.6);
        let exposure = Exposure::Cny(1_500_000_000.0);
        for mode in [ImpactMode::PrevPublish, ImpactMode::PrevDayAvg, ImpactMode::BaselineLock] {
            assert_eq!(ctx.impact_series(mode, exposure).len(), 4);
        }
        let series = ctx.impact_series(ImpactMode::PrevDayAvg, exposure);
        assert_eq!(series[1].reference.as_deref(), Some("2024-05-31"));
    }

    #[test]
    fn test_exports_use_month_records() {
        let ctx = FxContext::from_records(june(), RateColumn::Middle, records(), None, 714.6);
        assert_eq!(ctx.csv().unwrap().lines().count(), 4);
        let wb = ctx.spreadsheet();
        assert_eq!(wb.sheets()[0].rows.len(), 4);
        assert_eq!(wb.sheets()[1].rows.len(), 2 + 3);
        assert!(ctx.json().unwrap().contains("2024-06-04 09:10:00"));
        assert!(!ctx.json().unwrap().contains("2024-05-31"));
    }
}
