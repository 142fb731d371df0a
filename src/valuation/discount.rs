//! Discounting and duration
//!
//! Simple (non-compounded) annual discounting off the interpolated curve:
//! `DF(t) = 1 / (1 + r(t) * days / 365)`.

use crate::cashflow::dates::days_between;
use crate::cashflow::Cashflow;
use crate::curve::YieldCurve;
use chrono::NaiveDate;

/// Day-count basis for discounting and year fractions
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Discount factor for a flow `days` from today. Past-dated flows have none.
pub fn discount_factor(curve: &YieldCurve, days: i64) -> Option<f64> {
    match days {
        d if d < 0 => None,
        0 => Some(1.0),
        d => Some(1.0 / (1.0 + curve.interpolate(d) * d as f64 / DAYS_PER_YEAR)),
    }
}

/// Present value of a sequence of flows. Flows dated today count at face
/// value and past-dated flows are dropped.
pub fn present_value(flows: &[Cashflow], curve: &YieldCurve, today: NaiveDate) -> f64 {
    flows
        .iter()
        .filter_map(|f| discount_factor(curve, days_between(today, f.date)).map(|df| f.amount * df))
        .sum()
}

/// Modified duration in years, or `None` when undefined (no future flows or
/// zero PV).
///
/// Macaulay duration is the PV-weighted mean time to payment; it is divided
/// by one plus the mean interpolated yield over the payment dates.
pub fn modified_duration(flows: &[Cashflow], curve: &YieldCurve, today: NaiveDate) -> Option<f64> {
    let mut total_pv = 0.0;
    let mut weighted_time = 0.0;
    let mut payment_days: Vec<i64> = Vec::new();

    for flow in flows {
        let days = days_between(today, flow.date);
        let df = match discount_factor(curve, days) {
            Some(df) => df,
            None => continue,
        };
        let pv = flow.amount * df;
        total_pv += pv;
        weighted_time += pv * days as f64 / DAYS_PER_YEAR;
        if !payment_days.contains(&days) {
            payment_days.push(days);
        }
    }

    if payment_days.is_empty() || total_pv.abs() < 1e-12 {
        return None;
    }

    let macaulay = weighted_time / total_pv;
    let average_yield = payment_days.iter().map(|d| curve.interpolate(*d)).sum::<f64>() / payment_days.len() as f64;
    Some(macaulay / (1.0 + average_yield))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_flow_today_at_face_value() {
        let curve = YieldCurve::base();
        let today = date(2025, 1, 15);
        let flows = vec![Cashflow::interest(today, 1_234.5, 0.05)];
        assert_eq!(present_value(&flows, &curve, today), 1_234.5);
    }

    #[test]
    fn test_empty_schedule() {
        let curve = YieldCurve::base();
        let today = date(2025, 1, 15);
        assert_eq!(present_value(&[], &curve, today), 0.0);
        assert!(modified_duration(&[], &curve, today).is_none());
    }

    #[test]
    fn test_past_flows_dropped() {
        let curve = YieldCurve::base();
        let today = date(2025, 1, 15);
        let flows = vec![Cashflow::principal(date(2025, 1, 14), 1_000.0)];
        assert_eq!(present_value(&flows, &curve, today), 0.0);
        assert!(modified_duration(&flows, &curve, today).is_none());
    }

    #[test]
    fn test_simple_discounting_one_year() {
        let curve = YieldCurve::base();
        let today = date(2025, 1, 15);
        let flows = vec![Cashflow::principal(date(2026, 1, 15), 1_050_000.0)];
        let pv = present_value(&flows, &curve, today);
        assert_relative_eq!(pv, 1_050_000.0 / 1.045, epsilon = 1e-6);
        assert!((pv - 1_004_784.69).abs() < 0.01);
    }

    #[test]
    fn test_zero_coupon_duration() {
        let curve = YieldCurve::base();
        let today = date(2025, 1, 15);
        let flows = vec![Cashflow::principal(date(2026, 1, 15), 100.0)];
        let duration = modified_duration(&flows, &curve, today).unwrap();
        assert_relative_eq!(duration, 1.0 / 1.045, epsilon = 1e-12);
    }

    #[test]
    fn test_offsetting_flows_have_undefined_duration() {
        let curve = YieldCurve::base();
        let today = date(2025, 1, 15);
        let flows = vec![
            Cashflow::interest(date(2026, 1, 15), 500.0, 0.05),
            Cashflow::interest(date(2026, 1, 15), -500.0, 0.05),
        ];
        assert!(modified_duration(&flows, &curve, today).is_none());
    }

    #[test]
    fn test_liability_duration_is_positive() {
        let curve = YieldCurve::base();
        let today = date(2025, 1, 15);
        let flows = vec![
            Cashflow::interest(date(2026, 1, 15), -3_000.0, 0.03),
            Cashflow::principal(date(2027, 1, 15), -100_000.0),
        ];
        let duration = modified_duration(&flows, &curve, today).unwrap();
        assert!(duration > 1.0 && duration < 2.0);
    }
}
