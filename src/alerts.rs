//! Threshold alerts on the latest publishes
//!
//! Alerts only evaluate and render a message; delivering it (issue tracker,
//! mail, chat) belongs to the caller.

use crate::constants::{
    DEFAULT_BASELINE_RATE, DEFAULT_EXPOSURE, DEFAULT_IMPACT_ALERT_MILLIONS, DEFAULT_PUBLISH_ALERT_PCT,
};
use crate::error::{Availability, Unavailable};
use crate::exposure::{Exposure, ExposureModel};
use crate::quote::{sort_by_publish_time, QuoteRecord};
use crate::stats::pct_change;
use crate::types::{Percentage, RateColumn, RatePer100, Usd};

/// Fires when the last publish moved at least `threshold_pct` from the one before
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PublishMoveAlert {
    pub threshold_pct: Percentage,
}

impl Default for PublishMoveAlert {
    fn default() -> Self {
        Self {
            threshold_pct: DEFAULT_PUBLISH_ALERT_PCT,
        }
    }
}

/// Outcome of a publish-move check
#[derive(Debug, Clone, PartialEq)]
pub struct PublishMove {
    pub prev_time: String,
    pub prev_middle: RatePer100,
    pub last_time: String,
    pub last_middle: RatePer100,
    pub change_pct: Percentage,
    pub threshold_pct: Percentage,
    pub triggered: bool,
}

impl PublishMoveAlert {
    pub fn new(threshold_pct: Percentage) -> Self {
        Self { threshold_pct }
    }

    /// Compare the last two published `middle` rates
    pub fn evaluate(&self, records: &[QuoteRecord]) -> Availability<PublishMove> {
        let sorted = sort_by_publish_time(records);
        let [.., prev, last] = sorted.as_slice() else {
            return Err(Unavailable::no_data("need at least two publishes"));
        };

        let middles = (prev.rate(RateColumn::Middle), last.rate(RateColumn::Middle));
        let (prev_middle, last_middle) = match middles {
            (Some(p), Some(l)) => (p, l),
            _ => return Err(Unavailable::no_data("middle rate is not numeric")),
        };
        let change_pct = pct_change(last_middle, prev_middle)
            .ok_or_else(|| Unavailable::no_data("previous middle rate is zero"))?;

        Ok(PublishMove {
            prev_time: prev.publish_time().to_string(),
            prev_middle,
            last_time: last.publish_time().to_string(),
            last_middle,
            change_pct,
            threshold_pct: self.threshold_pct,
            triggered: change_pct.abs() >= self.threshold_pct,
        })
    }
}

impl PublishMove {
    pub fn title(&self) -> String {
        "BOC USD/CNY Alert".to_string()
    }

    pub fn message(&self) -> String {
        format!(
            "Threshold: {}%\nChange: {:.4}%\nPrev Publish: {} | Middle: {}\nLast Publish: {} | Middle: {}",
            self.threshold_pct,
            self.change_pct,
            self.prev_time,
            self.prev_middle,
            self.last_time,
            self.last_middle
        )
    }
}

/// Fires when the baseline impact on a USD exposure reaches `threshold_millions`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactAlert {
    pub usd_exposure: Usd,
    pub base_rate: RatePer100,
    pub threshold_millions: f64,
}

impl ImpactAlert {
    pub fn new(usd_exposure: Usd, base_rate: RatePer100, threshold_millions: f64) -> Self {
        Self {
            usd_exposure,
            base_rate,
            threshold_millions,
        }
    }

    /// Baseline-lock impact of the latest published `middle`
    pub fn evaluate(&self, records: &[QuoteRecord]) -> Availability<ImpactCheck> {
        let last = sort_by_publish_time(records)
            .last()
            .copied()
            .ok_or_else(|| Unavailable::no_data("no published rates"))?;

        let model = ExposureModel::new(Exposure::Usd(self.usd_exposure));
        let figures = model.baseline_lock(last.rate(RateColumn::Middle), Some(self.base_rate))?;
        let impact_millions = figures.impact / 1_000_000.0;

        Ok(ImpactCheck {
            publish_time: last.publish_time().to_string(),
            middle: figures.current_rate,
            usd_exposure: self.usd_exposure,
            base_rate: self.base_rate,
            usd_now: figures.usd_now,
            impact: figures.impact,
            impact_millions,
            threshold_millions: self.threshold_millions,
            triggered: impact_millions.abs() >= self.threshold_millions,
        })
    }
}

impl Default for ImpactAlert {
    fn default() -> Self {
        Self::new(DEFAULT_EXPOSURE, DEFAULT_BASELINE_RATE, DEFAULT_IMPACT_ALERT_MILLIONS)
    }
}

/// Outcome of an impact-threshold check
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactCheck {
    pub publish_time: String,
    pub middle: RatePer100,
    pub usd_exposure: Usd,
    pub base_rate: RatePer100,
    pub usd_now: Usd,
    pub impact: Usd,
    pub impact_millions: f64,
    pub threshold_millions: f64,
    pub triggered: bool,
}

impl ImpactCheck {
    pub fn title(&self) -> String {
        format!(
            "FX ALERT: USD Impact {:+.0}M (threshold {:.0}M)",
            self.impact_millions, self.threshold_millions
        )
    }

    pub fn message(&self) -> String {
        format!(
            "USD Exposure: {:.0}\nBase Rate (RMB/100USD): {}\nLatest Middle: {}\nLatest Publish: {}\nUSD Now: {:.0}\nUSD Impact: {:.0} ({:+.2}M)",
            self.usd_exposure,
            self.base_rate,
            self.middle,
            self.publish_time,
            self.usd_now,
            self.impact,
            self.impact_millions
        )
    }
}
