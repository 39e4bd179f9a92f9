//! Small numeric helpers shared by the aggregator, intraday analyzer and alerts

use crate::types::Percentage;

/// Arithmetic mean by plain left-to-right summation; `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Percent change `(curr - prev) / prev * 100`
///
/// `None` when either side is non-finite or `prev` is zero.
pub fn pct_change(curr: f64, prev: f64) -> Option<Percentage> {
    if !curr.is_finite() || !prev.is_finite() || prev == 0.0 {
        return None;
    }
    Some((curr - prev) / prev * 100.0)
}

/// [`pct_change`] over optional values
pub fn pct_change_opt(curr: Option<f64>, prev: Option<f64>) -> Option<Percentage> {
    match (curr, prev) {
        (Some(c), Some(p)) => pct_change(c, p),
        _ => None,
    }
}

/// Minimum and maximum of a non-empty slice
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[716.5, 717.0]), Some(716.75));
    }

    #[test]
    fn test_pct_change() {
        assert_relative_eq!(pct_change(102.0, 100.0).unwrap(), 2.0);
        assert_eq!(pct_change(102.0, 0.0), None);
        assert_eq!(pct_change(f64::NAN, 100.0), None);
        assert_eq!(pct_change(100.0, f64::INFINITY), None);
        assert_eq!(pct_change_opt(Some(1.0), None), None);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max(&[]), None);
        assert_eq!(min_max(&[3.0, 1.0, 2.0]), Some((1.0, 3.0)));
    }
}
