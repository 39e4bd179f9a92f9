//! USD exposure impact model
//!
//! Answers "how many more (or fewer) USD are needed to cover a fixed exposure
//! as the rate moves". Rates stay in the published per-100 convention at the
//! API boundary and are divided by [`RATE_UNIT`] only inside [`usd_required`].
//!
//! Three comparison modes pick the reference side of the comparison:
//!
//! - **prev_publish**: the immediately preceding publish in the full, sorted
//!   record stream (crosses day boundaries)
//! - **prev_day_avg**: the previous data day's average `middle`
//! - **baseline_lock**: the baseline rate locked for the active month
//!
//! Every comparison returns [`Availability`]: missing or non-finite inputs
//! produce [`Unavailable`], never a zero or NaN.

use crate::aggregate::{previous_day, DailyAggregate};
use crate::constants::{RATE_UNIT, SENSITIVITY_BUMP};
use crate::error::{Availability, FxError, Unavailable};
use crate::quote::{sort_by_publish_time, QuoteRecord};
use crate::types::{Cny, RateColumn, RatePer100, Usd};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// USD needed to buy `base_cny` at a per-100 rate
pub fn usd_required(base_cny: Cny, rate_per_100: RatePer100) -> Usd {
    base_cny / (rate_per_100 / RATE_UNIT)
}

/// Comparison policy for the impact figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactMode {
    PrevPublish,
    PrevDayAvg,
    BaselineLock,
}

impl ImpactMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactMode::PrevPublish => "prev_publish",
            ImpactMode::PrevDayAvg => "prev_day_avg",
            ImpactMode::BaselineLock => "baseline_lock",
        }
    }
}

impl fmt::Display for ImpactMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImpactMode {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "_").to_lowercase().as_str() {
            "prev_publish" => Ok(ImpactMode::PrevPublish),
            "prev_day_avg" => Ok(ImpactMode::PrevDayAvg),
            "baseline_lock" | "baseline" => Ok(ImpactMode::BaselineLock),
            _ => Err(FxError::ParseError(format!("Unknown impact mode: {}", s))),
        }
    }
}

/// Notional being tracked
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exposure {
    /// Fixed CNY amount to be covered
    Cny(Cny),
    /// USD amount converted to CNY at the reference rate
    Usd(Usd),
}

impl Exposure {
    pub fn amount(&self) -> f64 {
        match self {
            Exposure::Cny(v) | Exposure::Usd(v) => *v,
        }
    }

    fn validate(&self) -> Availability<()> {
        let amount = self.amount();
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Unavailable::invalid(format!(
                "exposure must be a positive finite amount, got {}",
                amount
            )));
        }
        Ok(())
    }

    /// CNY notional implied at the reference rate
    pub fn base_cny(&self, reference_rate: RatePer100) -> Cny {
        match self {
            Exposure::Cny(cny) => *cny,
            Exposure::Usd(usd) => usd * (reference_rate / RATE_UNIT),
        }
    }

    /// USD cost of the notional at the reference rate
    fn reference_usd(&self, base_cny: Cny, reference_rate: RatePer100) -> Usd {
        match self {
            Exposure::Cny(_) => usd_required(base_cny, reference_rate),
            Exposure::Usd(usd) => *usd,
        }
    }
}

/// Headline figures of one comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactFigures {
    pub base_cny: Cny,
    pub current_rate: RatePer100,
    pub reference_rate: RatePer100,
    pub usd_now: Usd,
    pub usd_reference: Usd,
    /// `usd_now - usd_reference`; positive means more USD required
    pub impact: Usd,
    /// USD delta for a +1 per-100 move from the current rate
    pub sensitivity: Usd,
}

/// Impact of one publish event
#[derive(Debug, Clone, PartialEq)]
pub struct PublishImpact {
    pub date: String,
    pub publish_time: String,
    pub rate: Option<RatePer100>,
    /// Publish time or date of the reference side
    pub reference: Option<String>,
    pub outcome: Availability<ImpactFigures>,
}

/// Impact of the most recent data point under a mode
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactSummary {
    pub mode: ImpactMode,
    pub current: String,
    pub reference: String,
    pub figures: ImpactFigures,
}

/// Converts rate observations into USD impact for a fixed exposure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureModel {
    exposure: Exposure,
}

impl ExposureModel {
    pub fn new(exposure: Exposure) -> Self {
        Self { exposure }
    }

    pub fn exposure(&self) -> Exposure {
        self.exposure
    }

    /// Compare a current rate against a reference rate
    pub fn compare(
        &self,
        current_rate: Option<RatePer100>,
        reference_rate: Option<RatePer100>,
    ) -> Availability<ImpactFigures> {
        self.exposure.validate()?;
        let current = usable_rate(current_rate, "current rate")?;
        let reference = usable_rate(reference_rate, "reference rate")?;
        Ok(self.figures(current, reference))
    }

    fn figures(&self, current: RatePer100, reference: RatePer100) -> ImpactFigures {
        let base_cny = self.exposure.base_cny(reference);
        let usd_reference = self.exposure.reference_usd(base_cny, reference);
        let usd_now = usd_required(base_cny, current);
        let usd_bumped = usd_required(base_cny, current + SENSITIVITY_BUMP);

        ImpactFigures {
            base_cny,
            current_rate: current,
            reference_rate: reference,
            usd_now,
            usd_reference,
            impact: usd_now - usd_reference,
            sensitivity: usd_bumped - usd_now,
        }
    }

    /// Current rate vs a locked baseline (with sensitivity)
    pub fn baseline_lock(
        &self,
        current_rate: Option<RatePer100>,
        baseline: Option<RatePer100>,
    ) -> Availability<ImpactFigures> {
        self.exposure.validate()?;
        let baseline = match baseline {
            None => return Err(Unavailable::no_data("no baseline locked for this month")),
            Some(b) if !b.is_finite() || b <= 0.0 => {
                return Err(Unavailable::invalid(format!(
                    "baseline must be a positive finite rate, got {}",
                    b
                )))
            }
            Some(b) => b,
        };
        let current = usable_rate(current_rate, "current rate")?;
        Ok(self.figures(current, baseline))
    }

    /// Each publish vs the one immediately before it, across day boundaries
    pub fn prev_publish(&self, records: &[QuoteRecord]) -> Vec<PublishImpact> {
        let sorted = sort_by_publish_time(records);
        sorted
            .iter()
            .enumerate()
            .map(|(i, rec)| {
                let prev = i.checked_sub(1).map(|p| sorted[p]);
                let rate = rec.rate(RateColumn::Middle);
                let outcome = match prev {
                    None => Err(Unavailable::no_data("no previous publish")),
                    Some(p) => self.compare(rate, p.rate(RateColumn::Middle)),
                };
                PublishImpact {
                    date: rec.date().unwrap_or_default().to_string(),
                    publish_time: rec.publish_time().to_string(),
                    rate,
                    reference: prev.map(|p| p.publish_time().to_string()),
                    outcome,
                }
            })
            .collect()
    }

    /// Each dated publish vs the previous data day's average `middle`
    pub fn prev_day_avg(
        &self,
        records: &[QuoteRecord],
        daily: &[DailyAggregate],
    ) -> Vec<PublishImpact> {
        sort_by_publish_time(records)
            .into_iter()
            .filter_map(|rec| rec.date().map(|date| (date, rec)))
            .map(|(date, rec)| {
                let prior = previous_day(daily, date);
                let rate = rec.rate(RateColumn::Middle);
                let outcome = match prior {
                    None => Err(Unavailable::no_data(format!("no day before {}", date))),
                    Some(day) => self.compare(rate, day.avg_middle),
                };
                PublishImpact {
                    date: date.to_string(),
                    publish_time: rec.publish_time().to_string(),
                    rate,
                    reference: prior.map(|d| d.date.clone()),
                    outcome,
                }
            })
            .collect()
    }

    /// Headline impact for the most recent record under `mode`
    pub fn summarize(
        &self,
        mode: ImpactMode,
        records: &[QuoteRecord],
        daily: &[DailyAggregate],
        baseline: Option<RatePer100>,
    ) -> Availability<ImpactSummary> {
        let latest = match mode {
            ImpactMode::PrevPublish => self.prev_publish(records).pop(),
            ImpactMode::PrevDayAvg => self.prev_day_avg(records, daily).pop(),
            ImpactMode::BaselineLock => {
                let last = sort_by_publish_time(records)
                    .last()
                    .copied()
                    .ok_or_else(|| Unavailable::no_data("no published rates"))?;
                let figures = self.baseline_lock(last.rate(RateColumn::Middle), baseline)?;
                return Ok(ImpactSummary {
                    mode,
                    current: last.publish_time().to_string(),
                    reference: "baseline".to_string(),
                    figures,
                });
            }
        };

        let latest = latest.ok_or_else(|| Unavailable::no_data("no published rates"))?;
        let figures = latest.outcome?;
        Ok(ImpactSummary {
            mode,
            current: latest.publish_time,
            reference: latest.reference.unwrap_or_default(),
            figures,
        })
    }
}

fn usable_rate(rate: Option<RatePer100>, what: &str) -> Availability<RatePer100> {
    match rate {
        Some(r) if r.is_finite() && r > 0.0 => Ok(r),
        Some(r) => Err(Unavailable::no_data(format!("{} is not usable: {}", what, r))),
        None => Err(Unavailable::no_data(format!("{} is missing", what))),
    }
}
