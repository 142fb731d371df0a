//! Per-instrument cash-flow generation
//!
//! Schedules are a pure function of (instrument, curve, today, assumptions) and
//! are rebuilt for every scenario. Nothing is cached between runs.

use super::dates::{days_between, floating_reset_dates, roll_back_schedule};
use super::schedule::{Cashflow, CashflowSchedule, ProjectionHorizon, RateBasis};
use crate::assumptions::BehavioralAssumptions;
use crate::curve::YieldCurve;
use crate::error::{EngineError, EngineResult};
use crate::instrument::{
    FixedLoan, FloatingLoan, Frequency, Instrument, InterestRateSwap, NonMaturityDeposit, TermFunding,
};
use chrono::{Months, NaiveDate};

/// Floor applied to repriced non-maturity deposit rates
pub const NMD_RATE_FLOOR: f64 = 0.0001;

/// Generates schedules against one (possibly shocked) curve
#[derive(Debug, Clone, Copy)]
pub struct CashflowGenerator<'a> {
    today: NaiveDate,
    /// Curve for this scenario
    curve: &'a YieldCurve,
    /// Unshocked curve, for deposit beta pass-through
    base_curve: &'a YieldCurve,
    assumptions: &'a BehavioralAssumptions,
}

impl<'a> CashflowGenerator<'a> {
    pub fn new(
        today: NaiveDate,
        curve: &'a YieldCurve,
        base_curve: &'a YieldCurve,
        assumptions: &'a BehavioralAssumptions,
    ) -> Self {
        Self { today, curve, base_curve, assumptions }
    }

    /// Schedules for one instrument: one per instrument, two for a swap
    /// (fixed leg then floating leg). Instruments maturing today or earlier are
    /// treated as settled and yield none.
    pub fn generate(&self, instrument: &Instrument, horizon: ProjectionHorizon) -> EngineResult<Vec<CashflowSchedule>> {
        let schedules: Vec<CashflowSchedule> = match instrument {
            Instrument::FixedLoan(loan) => self.fixed_loan(loan, horizon)?.into_iter().collect(),
            Instrument::FloatingLoan(loan) => self.floating_loan(loan, horizon)?.into_iter().collect(),
            Instrument::TermFunding(funding) => self.term_funding(funding, horizon)?.into_iter().collect(),
            Instrument::NonMaturityDeposit(deposit) => vec![self.non_maturity_deposit(deposit, horizon)?],
            Instrument::Swap(swap) => self.swap(swap, horizon)?,
        };
        Ok(schedules)
    }

    fn fixed_loan(&self, loan: &FixedLoan, horizon: ProjectionHorizon) -> EngineResult<Option<CashflowSchedule>> {
        let maturity = loan.maturity_date.ok_or_else(|| EngineError::MissingDate {
            id: loan.id.clone(),
            field: "maturity_date",
        })?;
        Ok(self.fixed_rate_schedule(&loan.id, loan.notional, loan.rate, maturity, loan.payment_frequency, 1.0, horizon))
    }

    fn term_funding(&self, funding: &TermFunding, horizon: ProjectionHorizon) -> EngineResult<Option<CashflowSchedule>> {
        let maturity = funding.maturity_date.ok_or_else(|| EngineError::MissingDate {
            id: funding.id.clone(),
            field: "maturity_date",
        })?;
        Ok(self.fixed_rate_schedule(
            &funding.id,
            funding.balance,
            funding.rate,
            maturity,
            funding.payment_frequency,
            -1.0,
            horizon,
        ))
    }

    /// Level coupons of `amount * rate * period_fraction`, principal at maturity.
    /// `sign` is +1 for assets and -1 for funding.
    #[allow(clippy::too_many_arguments)]
    fn fixed_rate_schedule(
        &self,
        id: &str,
        amount: f64,
        rate: f64,
        maturity: NaiveDate,
        frequency: Frequency,
        sign: f64,
        horizon: ProjectionHorizon,
    ) -> Option<CashflowSchedule> {
        if maturity <= self.today {
            return None;
        }
        let mut schedule = CashflowSchedule::new(id, RateBasis::Fixed);
        let coupon = sign * amount * rate * frequency.period_fraction();

        for date in roll_back_schedule(maturity, self.today, frequency.months()) {
            if horizon.contains(self.today, date) {
                schedule.push(Cashflow::interest(date, coupon, rate));
            }
        }
        if horizon.include_principal && horizon.contains(self.today, maturity) {
            schedule.push(Cashflow::principal(maturity, sign * amount));
        }
        Some(schedule.finish())
    }

    /// Floating loan with curve resets and constant prepayment.
    ///
    /// Each period accrues at the rate fixed by the latest reset on or before
    /// the period start. After each period except the last the balance shrinks
    /// by `balance * (1 - (1 - CPR)^period_fraction)`; prepaid principal is a
    /// flow on that payment date and the residual posts at maturity.
    fn floating_loan(&self, loan: &FloatingLoan, horizon: ProjectionHorizon) -> EngineResult<Option<CashflowSchedule>> {
        let maturity = loan.maturity_date.ok_or_else(|| EngineError::MissingDate {
            id: loan.id.clone(),
            field: "maturity_date",
        })?;
        if maturity <= self.today {
            return Ok(None);
        }

        let resets = floating_reset_dates(loan, self.today);
        let reset_rate = |reset: NaiveDate| self.curve.interpolate(days_between(self.today, reset)) + loan.spread;
        let initial_rate = loan.current_rate.unwrap_or_else(|| match resets.first() {
            Some(first) => reset_rate(*first),
            None => self.curve.interpolate(0) + loan.spread,
        });

        let fraction = loan.payment_frequency.period_fraction();
        let survival = (1.0 - self.assumptions.prepayment_cpr).powf(fraction);
        let pay_dates = roll_back_schedule(maturity, self.today, loan.payment_frequency.months());
        let last = pay_dates.len().saturating_sub(1);

        let mut schedule = CashflowSchedule::new(&loan.id, RateBasis::Floating);
        let mut balance = loan.notional;
        let mut period_start = self.today;

        for (i, pay) in pay_dates.iter().enumerate() {
            let rate = resets
                .iter()
                .rev()
                .find(|r| **r <= period_start)
                .map(|r| reset_rate(*r))
                .unwrap_or(initial_rate);

            let in_window = horizon.contains(self.today, *pay);
            if in_window {
                schedule.push(Cashflow::interest(*pay, balance * rate * fraction, rate));
            }

            if i < last {
                let prepaid = balance * (1.0 - survival);
                balance -= prepaid;
                if horizon.include_principal && in_window && prepaid > 0.0 {
                    schedule.push(Cashflow::principal(*pay, prepaid));
                }
            }
            period_start = *pay;
        }

        if horizon.include_principal && horizon.contains(self.today, maturity) {
            schedule.push(Cashflow::principal(maturity, balance));
        }
        Ok(Some(schedule.finish()))
    }

    /// Paid rate after beta pass-through of the scenario move at the
    /// deposit's repricing tenor, floored at `NMD_RATE_FLOOR`.
    pub fn nmd_paid_rate(&self, deposit: &NonMaturityDeposit) -> f64 {
        let tenor = deposit
            .repricing_frequency
            .unwrap_or(Frequency::Monthly)
            .repricing_tenor();
        let market_move = self.curve.rate(tenor) - self.base_curve.rate(tenor);
        (deposit.rate + self.assumptions.nmd_deposit_beta * market_move).max(NMD_RATE_FLOOR)
    }

    /// Non-maturity deposit projected to the behavioral effective maturity
    fn non_maturity_deposit(
        &self,
        deposit: &NonMaturityDeposit,
        horizon: ProjectionHorizon,
    ) -> EngineResult<CashflowSchedule> {
        let mut schedule = CashflowSchedule::new(&deposit.id, RateBasis::Floating);
        let years = self.assumptions.nmd_effective_maturity_years;
        let effective_maturity = years
            .checked_mul(12)
            .and_then(|months| self.today.checked_add_months(Months::new(months)))
            .ok_or_else(|| EngineError::InvalidAssumption {
                name: "nmd_effective_maturity_years",
                value: years as f64,
                reason: format!("{} years from {} is out of the date range", years, self.today),
            })?;

        let rate = self.nmd_paid_rate(deposit);
        let fraction = deposit.payment_frequency.period_fraction();
        let coupon = -deposit.balance * rate * fraction;

        for date in roll_back_schedule(effective_maturity, self.today, deposit.payment_frequency.months()) {
            if horizon.contains(self.today, date) {
                schedule.push(Cashflow::interest(date, coupon, rate));
            }
        }
        if horizon.include_principal && horizon.contains(self.today, effective_maturity) {
            schedule.push(Cashflow::principal(effective_maturity, -deposit.balance));
        }
        Ok(schedule.finish())
    }

    /// Fixed and floating legs, generated separately. Only swaps active today
    /// produce flows; there is no notional exchange.
    fn swap(&self, swap: &InterestRateSwap, horizon: ProjectionHorizon) -> EngineResult<Vec<CashflowSchedule>> {
        let end = swap.end_date.ok_or_else(|| EngineError::MissingDate {
            id: swap.id.clone(),
            field: "end_date",
        })?;
        if swap.start_date.is_none() {
            return Err(EngineError::MissingDate {
                id: swap.id.clone(),
                field: "start_date",
            });
        }
        if !swap.is_active(self.today) {
            return Ok(Vec::new());
        }

        let mut fixed = CashflowSchedule::new(&swap.id, RateBasis::Fixed);
        let fixed_fraction = swap.fixed_frequency.period_fraction();
        let fixed_amount = swap.direction.fixed_sign() * swap.fixed_rate * swap.notional * fixed_fraction;
        for date in roll_back_schedule(end, self.today, swap.fixed_frequency.months()) {
            if horizon.contains(self.today, date) {
                fixed.push(Cashflow::interest(date, fixed_amount, swap.fixed_rate));
            }
        }

        let mut floating = CashflowSchedule::new(&swap.id, RateBasis::Floating);
        let floating_fraction = swap.floating_frequency.period_fraction();
        for date in roll_back_schedule(end, self.today, swap.floating_frequency.months()) {
            if horizon.contains(self.today, date) {
                let rate = self.curve.interpolate(days_between(self.today, date)) + swap.floating_spread;
                let amount = swap.direction.floating_sign() * rate * swap.notional * floating_fraction;
                floating.push(Cashflow::interest(date, amount, rate));
            }
        }

        Ok(vec![fixed.finish(), floating.finish()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashflow::FlowKind;
    use crate::curve::{Scenario, ScenarioKind, Tenor};
    use crate::instrument::{DepositKind, SwapDirection, TermFundingKind};
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 1, 15)
    }

    fn fixed_loan(maturity: Option<NaiveDate>, frequency: Frequency) -> Instrument {
        Instrument::FixedLoan(FixedLoan {
            id: "LOAN001".to_string(),
            notional: 1_000_000.0,
            rate: 0.05,
            origination_date: Some(date(2024, 1, 15)),
            maturity_date: maturity,
            payment_frequency: frequency,
        })
    }

    fn floating_loan(current_rate: Option<f64>) -> FloatingLoan {
        FloatingLoan {
            id: "LOAN002".to_string(),
            notional: 1_000_000.0,
            spread: 0.01,
            benchmark: Some("SOFR".to_string()),
            current_rate,
            origination_date: Some(date(2024, 1, 15)),
            maturity_date: Some(date(2027, 1, 15)),
            payment_frequency: Frequency::Annually,
            repricing_frequency: Frequency::Annually,
            next_repricing_date: Some(date(2026, 1, 15)),
        }
    }

    fn savings(rate: f64) -> NonMaturityDeposit {
        NonMaturityDeposit {
            id: "DEP002".to_string(),
            kind: DepositKind::Savings,
            balance: 100_000.0,
            rate,
            open_date: Some(date(2020, 1, 1)),
            payment_frequency: Frequency::Annually,
            repricing_frequency: Some(Frequency::Monthly),
            next_repricing_date: None,
        }
    }

    fn swap(direction: SwapDirection) -> Instrument {
        Instrument::Swap(InterestRateSwap {
            id: "SWP001".to_string(),
            direction,
            notional: 1_000_000.0,
            fixed_rate: 0.04,
            floating_spread: 0.0,
            start_date: Some(date(2024, 1, 15)),
            end_date: Some(date(2027, 1, 15)),
            fixed_frequency: Frequency::Annually,
            floating_frequency: Frequency::Annually,
        })
    }

    #[test]
    fn test_fixed_loan_annual_interest() {
        let curve = YieldCurve::base();
        let assumptions = BehavioralAssumptions::default();
        let gen = CashflowGenerator::new(today(), &curve, &curve, &assumptions);
        let horizon = ProjectionHorizon { window_days: None, include_principal: false };

        let schedules = gen.generate(&fixed_loan(Some(date(2026, 1, 15)), Frequency::Annually), horizon).unwrap();
        assert_eq!(schedules.len(), 1);
        let flows = &schedules[0].flows;
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].date, date(2026, 1, 15));
        assert_relative_eq!(flows[0].amount, 50_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_fixed_loan_principal_at_maturity() {
        let curve = YieldCurve::base();
        let assumptions = BehavioralAssumptions::default();
        let gen = CashflowGenerator::new(today(), &curve, &curve, &assumptions);

        let schedules = gen
            .generate(&fixed_loan(Some(date(2026, 1, 15)), Frequency::Annually), ProjectionHorizon::full_life())
            .unwrap();
        let by_date = schedules[0].amounts_by_date();
        assert_eq!(by_date.len(), 1);
        assert_relative_eq!(by_date[0].1, 1_050_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_monthly_coupons() {
        let curve = YieldCurve::base();
        let assumptions = BehavioralAssumptions::default();
        let gen = CashflowGenerator::new(today(), &curve, &curve, &assumptions);

        let schedules = gen
            .generate(&fixed_loan(Some(date(2026, 1, 15)), Frequency::Monthly), ProjectionHorizon::nii(365))
            .unwrap();
        assert_eq!(schedules[0].flows.len(), 12);
        assert_relative_eq!(schedules[0].interest_total(), 50_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_missing_maturity_is_error_and_past_maturity_is_empty() {
        let curve = YieldCurve::base();
        let assumptions = BehavioralAssumptions::default();
        let gen = CashflowGenerator::new(today(), &curve, &curve, &assumptions);

        let missing = gen.generate(&fixed_loan(None, Frequency::Annually), ProjectionHorizon::full_life());
        assert!(matches!(missing, Err(EngineError::MissingDate { .. })));

        let matured = Instrument::TermFunding(TermFunding {
            id: "DEP001".to_string(),
            kind: TermFundingKind::CertificateOfDeposit,
            balance: 50_000.0,
            rate: 0.03,
            open_date: Some(date(2023, 1, 1)),
            maturity_date: Some(date(2024, 12, 31)),
            payment_frequency: Frequency::Annually,
        });
        assert!(gen.generate(&matured, ProjectionHorizon::full_life()).unwrap().is_empty());
    }

    #[test]
    fn test_maturity_today_is_settled() {
        let curve = YieldCurve::base();
        let assumptions = BehavioralAssumptions::default();
        let gen = CashflowGenerator::new(today(), &curve, &curve, &assumptions);

        let loan = fixed_loan(Some(today()), Frequency::Annually);
        assert!(gen.generate(&loan, ProjectionHorizon::full_life()).unwrap().is_empty());

        let mut floating = floating_loan(Some(0.06));
        floating.maturity_date = Some(today());
        let schedules = gen.generate(&Instrument::FloatingLoan(floating), ProjectionHorizon::full_life()).unwrap();
        assert!(schedules.is_empty());
    }

    #[test]
    fn test_cd_flows_are_negative() {
        let curve = YieldCurve::base();
        let assumptions = BehavioralAssumptions::default();
        let gen = CashflowGenerator::new(today(), &curve, &curve, &assumptions);
        let cd = Instrument::TermFunding(TermFunding {
            id: "DEP001".to_string(),
            kind: TermFundingKind::CertificateOfDeposit,
            balance: 100_000.0,
            rate: 0.03,
            open_date: Some(date(2024, 7, 15)),
            maturity_date: Some(date(2025, 7, 15)),
            payment_frequency: Frequency::Annually,
        });
        let schedules = gen.generate(&cd, ProjectionHorizon::full_life()).unwrap();
        assert!(schedules[0].flows.iter().all(|f| f.amount < 0.0));
        assert_relative_eq!(schedules[0].total(), -103_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_floating_loan_resets_off_curve() {
        let curve = YieldCurve::base();
        let assumptions = BehavioralAssumptions::default();
        let gen = CashflowGenerator::new(today(), &curve, &curve, &assumptions);
        let loan = Instrument::FloatingLoan(floating_loan(Some(0.06)));

        let schedules = gen.generate(&loan, ProjectionHorizon::full_life()).unwrap();
        let interest: Vec<&Cashflow> = schedules[0].flows.iter().filter(|f| f.kind == FlowKind::Interest).collect();
        assert_eq!(interest.len(), 2);
        // First period runs at the recorded rate
        assert_relative_eq!(interest[0].amount, 60_000.0, epsilon = 1e-6);
        // Second period reset on 2026-01-15 (365 days out) to 1Y + spread
        assert_relative_eq!(interest[1].rate, 0.045 + 0.01, epsilon = 1e-12);
        assert_relative_eq!(interest[1].amount, 55_000.0, epsilon = 1e-6);
        assert_relative_eq!(schedules[0].total(), 1_000_000.0 + 115_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_floating_loan_prepayment() {
        let curve = YieldCurve::base();
        let assumptions = BehavioralAssumptions::new(5, 0.5, 0.10);
        let gen = CashflowGenerator::new(today(), &curve, &curve, &assumptions);
        let loan = Instrument::FloatingLoan(floating_loan(Some(0.06)));

        let schedules = gen.generate(&loan, ProjectionHorizon::full_life()).unwrap();
        let flows = &schedules[0].flows;
        let principal: f64 = flows.iter().filter(|f| f.kind == FlowKind::Principal).map(|f| f.amount).sum();
        // Prepaid + residual always returns the full notional
        assert_relative_eq!(principal, 1_000_000.0, epsilon = 1e-6);

        // Second-year interest accrues on the balance after 10% prepayment
        let second = flows
            .iter()
            .filter(|f| f.kind == FlowKind::Interest)
            .nth(1)
            .unwrap();
        assert_relative_eq!(second.amount, 900_000.0 * 0.055, epsilon = 1e-6);
    }

    #[test]
    fn test_parallel_shock_moves_floating_reset() {
        let base = YieldCurve::base();
        let up = base.shock(&Scenario::from_kind(ScenarioKind::ParallelUp));
        let assumptions = BehavioralAssumptions::default();
        let loan = Instrument::FloatingLoan(floating_loan(Some(0.06)));

        let base_total = CashflowGenerator::new(today(), &base, &base, &assumptions)
            .generate(&loan, ProjectionHorizon::full_life())
            .unwrap()[0]
            .interest_total();
        let up_total = CashflowGenerator::new(today(), &up, &base, &assumptions)
            .generate(&loan, ProjectionHorizon::full_life())
            .unwrap()[0]
            .interest_total();
        assert_relative_eq!(up_total - base_total, 20_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_nmd_beta_and_floor() {
        let base = YieldCurve::base();
        let up = base.shock(&Scenario::from_kind(ScenarioKind::ParallelUp));
        let down = base.shock(&Scenario::from_kind(ScenarioKind::ParallelDown));
        let assumptions = BehavioralAssumptions::new(3, 0.5, 0.0);

        let deposit = savings(0.01);
        let paid_up = CashflowGenerator::new(today(), &up, &base, &assumptions).nmd_paid_rate(&deposit);
        assert_relative_eq!(paid_up, 0.01 + 0.5 * 0.02, epsilon = 1e-12);

        let paid_down = CashflowGenerator::new(today(), &down, &base, &assumptions).nmd_paid_rate(&deposit);
        assert_relative_eq!(paid_down, NMD_RATE_FLOOR, epsilon = 1e-15);

        let schedules = CashflowGenerator::new(today(), &base, &base, &assumptions)
            .generate(&Instrument::NonMaturityDeposit(deposit), ProjectionHorizon::full_life())
            .unwrap();
        let flows = &schedules[0].flows;
        // Three annual coupons, principal at the 3-year effective maturity
        assert_eq!(flows.len(), 4);
        assert_eq!(flows[3].date, date(2028, 1, 15));
        assert_relative_eq!(flows[3].amount, -100_000.0, epsilon = 1e-9);
        assert_relative_eq!(flows[0].amount, -1_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_long_nmd_horizon_keeps_first_year_interest() {
        let curve = YieldCurve::base();
        let assumptions = BehavioralAssumptions::new(150, 0.5, 0.0);
        let gen = CashflowGenerator::new(today(), &curve, &curve, &assumptions);
        let mut deposit = savings(0.01);
        deposit.payment_frequency = Frequency::Monthly;

        let schedules = gen
            .generate(&Instrument::NonMaturityDeposit(deposit), ProjectionHorizon::nii(365))
            .unwrap();
        assert_eq!(schedules[0].flows.len(), 12);
        assert_relative_eq!(schedules[0].interest_total(), -1_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nmd_oversized_effective_maturity_is_error() {
        let curve = YieldCurve::base();
        let assumptions = BehavioralAssumptions::new(400_000_000, 0.5, 0.0);
        let gen = CashflowGenerator::new(today(), &curve, &curve, &assumptions);
        let result = gen.generate(&Instrument::NonMaturityDeposit(savings(0.01)), ProjectionHorizon::full_life());
        assert!(matches!(result, Err(EngineError::InvalidAssumption { .. })));
    }

    #[test]
    fn test_nmd_short_scenario_uses_repricing_tenor() {
        let base = YieldCurve::base();
        let short_up = base.shock(&Scenario::from_kind(ScenarioKind::ShortUp));
        let assumptions = BehavioralAssumptions::new(3, 1.0, 0.0);
        let paid = CashflowGenerator::new(today(), &short_up, &base, &assumptions).nmd_paid_rate(&savings(0.01));
        let expected = 0.01 + (short_up.rate(Tenor::M1) - base.rate(Tenor::M1));
        assert_relative_eq!(paid, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_swap_legs_by_direction() {
        let curve = YieldCurve::base();
        let assumptions = BehavioralAssumptions::default();
        let gen = CashflowGenerator::new(today(), &curve, &curve, &assumptions);

        let payer = gen.generate(&swap(SwapDirection::Payer), ProjectionHorizon::full_life()).unwrap();
        assert_eq!(payer.len(), 2);
        assert_eq!(payer[0].basis, RateBasis::Fixed);
        assert!(payer[0].flows.iter().all(|f| f.amount < 0.0));
        assert!(payer[1].flows.iter().all(|f| f.amount > 0.0));
        assert_relative_eq!(payer[0].flows[0].amount, -40_000.0, epsilon = 1e-6);
        // Floating payment 365 days out uses the 1Y point
        assert_relative_eq!(payer[1].flows[0].amount, 45_000.0, epsilon = 1e-6);

        let receiver = gen.generate(&swap(SwapDirection::Receiver), ProjectionHorizon::full_life()).unwrap();
        assert!(receiver[0].flows.iter().all(|f| f.amount > 0.0));
        assert!(receiver[1].flows.iter().all(|f| f.amount < 0.0));
    }

    #[test]
    fn test_inactive_swap_has_no_flows() {
        let curve = YieldCurve::base();
        let assumptions = BehavioralAssumptions::default();
        let gen = CashflowGenerator::new(date(2023, 6, 1), &curve, &curve, &assumptions);
        assert!(gen.generate(&swap(SwapDirection::Payer), ProjectionHorizon::full_life()).unwrap().is_empty());
    }
}
