//! Per-instrument valuation and scenario EVE/NII aggregation
//!
//! Sign convention:
//! `EVE = PV(assets) - |PV(liabilities)| + PV(derivative legs)`
//! `NII = asset interest - |liability interest| + pro-rated swap leg interest`

use super::discount::{modified_duration, present_value, DAYS_PER_YEAR};
use crate::cashflow::dates::days_between;
use crate::cashflow::{Cashflow, CashflowGenerator, CashflowSchedule, ProjectionHorizon};
use crate::curve::YieldCurve;
use crate::error::EngineResult;
use crate::instrument::{BalanceSheetSide, Instrument, InterestRateSwap};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Valuation of one instrument under one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentValuation {
    pub instrument_id: String,
    pub instrument_type: String,
    pub side: BalanceSheetSide,

    /// PV of the full-life schedule(s), signed
    pub pv: f64,

    /// Modified duration (None = undefined)
    pub duration: Option<f64>,

    /// Interest within the NII window, signed (pro-rated for swaps)
    pub nii: f64,
}

/// Value one instrument: full-life schedules for PV and duration, the NII
/// window for earnings. Returns the full-life schedules for the ladder.
pub fn value_instrument(
    generator: &CashflowGenerator<'_>,
    instrument: &Instrument,
    curve: &YieldCurve,
    today: NaiveDate,
    nii_horizon_days: i64,
) -> EngineResult<(InstrumentValuation, Vec<CashflowSchedule>)> {
    let schedules = generator.generate(instrument, ProjectionHorizon::full_life())?;

    let pv: f64 = schedules.iter().map(|s| present_value(&s.flows, curve, today)).sum();
    let all_flows: Vec<Cashflow> = schedules.iter().flat_map(|s| s.flows.iter().cloned()).collect();
    let duration = modified_duration(&all_flows, curve, today);

    let nii = match instrument {
        Instrument::Swap(swap) => swap_nii(swap, curve, today, nii_horizon_days),
        _ => generator
            .generate(instrument, ProjectionHorizon::nii(nii_horizon_days))?
            .iter()
            .map(|s| s.interest_total())
            .sum(),
    };

    let valuation = InstrumentValuation {
        instrument_id: instrument.id().to_string(),
        instrument_type: instrument.instrument_type().to_string(),
        side: instrument.side(),
        pv,
        duration,
        nii,
    };
    Ok((valuation, schedules))
}

/// Swap leg interest over the NII window, pro-rated by the overlap between
/// the swap's remaining term and the window.
///
/// Fixed leg: `fixed_rate * notional`; floating leg: `(r(overlap) + spread) *
/// notional`; both scaled by `overlap_days / 365` and signed by direction.
pub fn swap_nii(swap: &InterestRateSwap, curve: &YieldCurve, today: NaiveDate, horizon_days: i64) -> f64 {
    let end = match swap.end_date {
        Some(end) if swap.is_active(today) => end,
        _ => return 0.0,
    };
    if horizon_days <= 0 {
        return 0.0;
    }
    let overlap_days = days_between(today, end).clamp(0, horizon_days);
    let factor = overlap_days as f64 / DAYS_PER_YEAR;

    let fixed = swap.direction.fixed_sign() * swap.fixed_rate * swap.notional;
    let floating_rate = curve.interpolate(overlap_days) + swap.floating_spread;
    let floating = swap.direction.floating_sign() * floating_rate * swap.notional;
    (fixed + floating) * factor
}

/// Running per-side totals for one scenario
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioTotals {
    pub asset_pv: f64,
    pub liability_pv: f64,
    pub derivative_pv: f64,
    pub asset_interest: f64,
    pub liability_interest: f64,
    pub derivative_interest: f64,
}

impl ScenarioTotals {
    pub fn add(&mut self, valuation: &InstrumentValuation) {
        match valuation.side {
            BalanceSheetSide::Asset => {
                self.asset_pv += valuation.pv;
                self.asset_interest += valuation.nii;
            }
            BalanceSheetSide::Liability => {
                self.liability_pv += valuation.pv;
                self.liability_interest += valuation.nii;
            }
            BalanceSheetSide::Derivative => {
                self.derivative_pv += valuation.pv;
                self.derivative_interest += valuation.nii;
            }
        }
    }

    pub fn eve(&self) -> f64 {
        self.asset_pv - self.liability_pv.abs() + self.derivative_pv
    }

    pub fn nii(&self) -> f64 {
        self.asset_interest - self.liability_interest.abs() + self.derivative_interest
    }
}

/// Percentage change from `base` to `shocked`, rounded to 2 decimals.
/// Zero when the base is exactly zero.
pub fn sensitivity_pct(base: f64, shocked: f64) -> f64 {
    if base == 0.0 {
        return 0.0;
    }
    let pct = (shocked - base) / base * 100.0;
    (pct * 100.0).round() / 100.0
}
