//! Intraday series for a single calendar day
//!
//! Produces the publish-ordered values of a rate column, their running mean
//! and the step-to-step percent change, plus the chart scaling bounds.

use crate::constants::{CHART_FLAT_MIN_PAD, CHART_FLAT_REL_PAD, CHART_RANGE_PAD};
use crate::quote::{sort_by_publish_time, QuoteRecord};
use crate::stats::{min_max, pct_change_opt};
use crate::types::{Percentage, RateColumn};
use serde::Serialize;

/// One publish within the day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntradayPoint {
    pub publish_time: String,
    pub value: Option<f64>,
    /// Mean of all finite values up to and including this one
    pub running_avg: Option<f64>,
    /// Change vs the previous publish's value
    pub pct_change: Option<Percentage>,
}

/// Vertical range for plotting a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartBounds {
    pub min: f64,
    pub max: f64,
}

/// Analyzed intraday series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntradaySeries {
    pub date: String,
    pub column: RateColumn,
    pub points: Vec<IntradayPoint>,
    pub bounds: Option<ChartBounds>,
}

impl IntradaySeries {
    /// Analyze the records dated `date` (others are ignored)
    pub fn for_date(records: &[QuoteRecord], date: &str, column: RateColumn) -> Self {
        let day: Vec<QuoteRecord> = records
            .iter()
            .filter(|r| r.date() == Some(date))
            .cloned()
            .collect();
        let mut series = Self::analyze(&day, column);
        series.date = date.to_string();
        series
    }

    /// Analyze one day's records
    pub fn analyze(records: &[QuoteRecord], column: RateColumn) -> Self {
        let sorted = sort_by_publish_time(records);

        let mut points = Vec::with_capacity(sorted.len());
        let mut sum = 0.0;
        let mut count = 0usize;
        let mut prev: Option<Option<f64>> = None;

        for rec in &sorted {
            let value = rec.rate(column);
            let running_avg = value.map(|v| {
                sum += v;
                count += 1;
                sum / count as f64
            });
            let pct = prev.and_then(|p| pct_change_opt(value, p));

            points.push(IntradayPoint {
                publish_time: rec.publish_time().to_string(),
                value,
                running_avg,
                pct_change: pct,
            });
            prev = Some(value);
        }

        let finite: Vec<f64> = points.iter().filter_map(|p| p.value).collect();
        let date = sorted
            .first()
            .and_then(|r| r.date())
            .unwrap_or_default()
            .to_string();

        Self {
            date,
            column,
            points,
            bounds: chart_bounds(&finite),
        }
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn running_avgs(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.running_avg).collect()
    }

    pub fn pct_changes(&self) -> Vec<Option<Percentage>> {
        self.points.iter().map(|p| p.pct_change).collect()
    }
}

/// Padded plotting range of the finite values
///
/// A flat series is padded by `max(0.05, |v| * 0.001)` on both sides;
/// otherwise both ends get 15% of the range. `None` without finite values.
pub fn chart_bounds(values: &[f64]) -> Option<ChartBounds> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (min, max) = min_max(&finite)?;

    let pad = if min == max {
        CHART_FLAT_MIN_PAD.max(min.abs() * CHART_FLAT_REL_PAD)
    } else {
        (max - min) * CHART_RANGE_PAD
    };

    Some(ChartBounds {
        min: min - pad,
        max: max + pad,
    })
}
