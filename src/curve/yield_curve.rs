//! Yield curve over the fixed tenor ladder
//!
//! Rates are annualized decimals (0.045 = 4.5%). Interpolation is linear in
//! days between the two bracketing tenors and flat outside the ladder.

use super::shocks::Scenario;
use super::tenor::Tenor;
use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// Illustrative base curve (no live market data)
const BASE_RATES: [f64; 12] = [
    0.0400, // 1M
    0.0410, // 3M
    0.0425, // 6M
    0.0450, // 1Y
    0.0460, // 2Y
    0.0470, // 3Y
    0.0480, // 5Y
    0.0490, // 7Y
    0.0500, // 10Y
    0.0510, // 15Y
    0.0515, // 20Y
    0.0520, // 30Y
];

/// Tenor -> annualized rate mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldCurve {
    /// Rates indexed by `Tenor::index()`
    rates: [f64; 12],
}

impl YieldCurve {
    /// Build a curve from rates in ladder order (1M first)
    pub fn from_rates(rates: [f64; 12]) -> Self {
        Self { rates }
    }

    /// The fixed illustrative base curve
    pub fn base() -> Self {
        Self::from_rates(BASE_RATES)
    }

    /// Build a curve from labelled rates, e.g. `[("1M", 0.04), ...]`.
    ///
    /// Every tenor must be present exactly once and every rate must be finite.
    pub fn from_labeled_rates<'a, I>(points: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut rates: [Option<f64>; 12] = [None; 12];
        for (label, rate) in points {
            let tenor: Tenor = label.parse()?;
            if !rate.is_finite() {
                return Err(EngineError::InvalidRate {
                    label: label.to_string(),
                    rate,
                });
            }
            rates[tenor.index()] = Some(rate);
        }

        let mut out = [0.0; 12];
        for tenor in Tenor::ALL {
            out[tenor.index()] = rates[tenor.index()].ok_or_else(|| EngineError::MissingTenor {
                label: tenor.label().to_string(),
            })?;
        }
        Ok(Self::from_rates(out))
    }

    /// Rate at an exact tenor
    pub fn rate(&self, tenor: Tenor) -> f64 {
        self.rates[tenor.index()]
    }

    /// (tenor, rate) pairs, shortest first
    pub fn points(&self) -> impl Iterator<Item = (Tenor, f64)> + '_ {
        Tenor::ALL.iter().map(move |t| (*t, self.rate(*t)))
    }

    /// Rate for an arbitrary horizon in days.
    ///
    /// At or below the shortest tenor (including `days <= 0`) returns the 1M
    /// rate; beyond the longest returns the 30Y rate.
    pub fn interpolate(&self, days: i64) -> f64 {
        let first = Tenor::ALL[0];
        let last = Tenor::ALL[Tenor::ALL.len() - 1];

        if days <= first.days() {
            return self.rate(first);
        }
        if days >= last.days() {
            return self.rate(last);
        }

        for pair in Tenor::ALL.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if days <= hi.days() {
                let width = hi.days() - lo.days();
                if width <= 0 {
                    return self.rate(lo);
                }
                let weight = (days - lo.days()) as f64 / width as f64;
                return self.rate(lo) + weight * (self.rate(hi) - self.rate(lo));
            }
        }

        self.rate(last)
    }

    /// New curve with each tenor moved by `shock_bps / 10000`
    pub fn shock(&self, scenario: &Scenario) -> Self {
        let mut rates = self.rates;
        for tenor in Tenor::ALL {
            rates[tenor.index()] += scenario.shock_bps(tenor) / 10_000.0;
        }
        Self { rates }
    }
}

impl Default for YieldCurve {
    fn default() -> Self {
        Self::base()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_exact_tenor_points() {
        let curve = YieldCurve::base();
        for (tenor, rate) in curve.points() {
            assert!((curve.interpolate(tenor.days()) - rate).abs() < 1e-12);
        }
        assert!((curve.interpolate(365) - 0.045).abs() < 1e-12);
    }

    #[test]
    fn test_flat_outside_ladder() {
        let curve = YieldCurve::base();
        assert_eq!(curve.interpolate(-10), curve.rate(Tenor::M1));
        assert_eq!(curve.interpolate(0), curve.rate(Tenor::M1));
        assert_eq!(curve.interpolate(15), curve.rate(Tenor::M1));
        assert_eq!(curve.interpolate(20_000), curve.rate(Tenor::Y30));
    }

    #[test]
    fn test_linear_midpoint() {
        let curve = YieldCurve::base();
        // Halfway between 1Y (365) and 2Y (730)
        let mid = curve.interpolate(547);
        let expected = 0.045 + (547.0 - 365.0) / 365.0 * (0.046 - 0.045);
        assert!((mid - expected).abs() < 1e-12);
    }

    #[test]
    fn test_monotone_between_points() {
        // Inverted curve to check the decreasing direction too
        let mut rates = BASE_RATES;
        rates.reverse();
        for curve in [YieldCurve::base(), YieldCurve::from_rates(rates)] {
            for pair in Tenor::ALL.windows(2) {
                let (lo, hi) = (pair[0], pair[1]);
                let increasing = curve.rate(hi) >= curve.rate(lo);
                let mut prev = curve.interpolate(lo.days());
                for d in lo.days()..=hi.days() {
                    let r = curve.interpolate(d);
                    if increasing {
                        assert!(r >= prev - 1e-15);
                    } else {
                        assert!(r <= prev + 1e-15);
                    }
                    prev = r;
                }
            }
        }
    }

    #[test]
    fn test_zero_shock_is_identity() {
        let base = YieldCurve::base();
        let flat = Scenario::new("Zero", BTreeMap::new());
        assert_eq!(base.shock(&flat), base);

        let explicit: BTreeMap<Tenor, f64> = Tenor::ALL.iter().map(|t| (*t, 0.0)).collect();
        assert_eq!(base.shock(&Scenario::new("Explicit zero", explicit)), base);
    }

    #[test]
    fn test_from_labeled_rates() {
        let points: Vec<(&str, f64)> = Tenor::ALL.iter().map(|t| (t.label(), 0.03)).collect();
        let curve = YieldCurve::from_labeled_rates(points).unwrap();
        assert!((curve.interpolate(1000) - 0.03).abs() < 1e-12);

        let missing = YieldCurve::from_labeled_rates(vec![("1M", 0.03)]);
        assert!(matches!(missing, Err(EngineError::MissingTenor { .. })));

        let bad_label = YieldCurve::from_labeled_rates(vec![("4Y", 0.03)]);
        assert!(matches!(bad_label, Err(EngineError::UnknownTenor { .. })));
    }
}
