//! Defaults and fixed parameters
//!
//! Contains default values and constants used throughout the engine

/// Default notional exposure (CNY or USD)
pub const DEFAULT_EXPOSURE: f64 = 1_500_000_000.0;

/// Default baseline rate (CNY per 100 USD) when none is locked for a month
pub const DEFAULT_BASELINE_RATE: f64 = 714.6;

/// Published rates are quoted per this many USD
pub const RATE_UNIT: f64 = 100.0;

/// Sensitivity bump in the per-100 convention (+0.01 CNY per USD)
pub const SENSITIVITY_BUMP: f64 = 1.0;

/// Publish-to-publish move that raises an alert (percent)
pub const DEFAULT_PUBLISH_ALERT_PCT: f64 = 0.15;

/// Baseline impact that raises an alert (millions of USD)
pub const DEFAULT_IMPACT_ALERT_MILLIONS: f64 = 10.0;

/// Chart padding as a share of the value range
pub const CHART_RANGE_PAD: f64 = 0.15;

/// Minimum chart padding for a flat series
pub const CHART_FLAT_MIN_PAD: f64 = 0.05;

/// Flat-series padding relative to the value
pub const CHART_FLAT_REL_PAD: f64 = 0.001;

/// Blank columns between the two tables of the summary sheet
pub const SUMMARY_GAP_COLUMNS: usize = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(RATE_UNIT, 100.0);
        assert_eq!(SUMMARY_GAP_COLUMNS, 3);
        assert!(DEFAULT_BASELINE_RATE > 0.0);
        assert!(DEFAULT_EXPOSURE > 0.0);
    }
}
