//! Cash-flow schedule structures

use super::dates::days_between;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Interest or principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowKind {
    Interest,
    Principal,
}

/// Whether a schedule's coupons are fixed or reset off the curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateBasis {
    Fixed,
    Floating,
}

/// A single dated, signed flow. Positive = inflow, negative = outflow/expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cashflow {
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: FlowKind,
    /// Annual rate used for an interest flow (0 for principal)
    pub rate: f64,
}

impl Cashflow {
    pub fn interest(date: NaiveDate, amount: f64, rate: f64) -> Self {
        Self { date, amount, kind: FlowKind::Interest, rate }
    }

    pub fn principal(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount, kind: FlowKind::Principal, rate: 0.0 }
    }
}

/// Ordered flows for one instrument (or one swap leg)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashflowSchedule {
    pub instrument_id: String,
    pub basis: RateBasis,
    pub flows: Vec<Cashflow>,
}

impl CashflowSchedule {
    pub fn new(instrument_id: impl Into<String>, basis: RateBasis) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            basis,
            flows: Vec::new(),
        }
    }

    pub fn push(&mut self, flow: Cashflow) {
        self.flows.push(flow);
    }

    /// Sort by date, interest before principal on the same day
    pub fn finish(mut self) -> Self {
        self.flows.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| (a.kind == FlowKind::Principal).cmp(&(b.kind == FlowKind::Principal)))
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Sum of all flows
    pub fn total(&self) -> f64 {
        self.flows.iter().map(|f| f.amount).sum()
    }

    /// Sum of interest flows only
    pub fn interest_total(&self) -> f64 {
        self.flows
            .iter()
            .filter(|f| f.kind == FlowKind::Interest)
            .map(|f| f.amount)
            .sum()
    }

    /// Flows netted per date, ascending
    pub fn amounts_by_date(&self) -> Vec<(NaiveDate, f64)> {
        let mut out: Vec<(NaiveDate, f64)> = Vec::new();
        for flow in &self.flows {
            match out.last_mut() {
                Some((date, amount)) if *date == flow.date => *amount += flow.amount,
                _ => out.push((flow.date, flow.amount)),
            }
        }
        out
    }
}

/// Projection window and whether principal is included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionHorizon {
    /// Last day (inclusive, days from today) a flow may fall on; `None` = full life
    pub window_days: Option<i64>,
    pub include_principal: bool,
}

impl ProjectionHorizon {
    /// Full remaining life with principal (EVE use)
    pub fn full_life() -> Self {
        Self {
            window_days: None,
            include_principal: true,
        }
    }

    /// Interest-only earnings window (NII use)
    pub fn nii(window_days: i64) -> Self {
        Self {
            window_days: Some(window_days),
            include_principal: false,
        }
    }

    /// Whether a flow dated `date` falls inside the horizon
    pub fn contains(&self, today: NaiveDate, date: NaiveDate) -> bool {
        match self.window_days {
            Some(limit) => days_between(today, date) <= limit,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_finish_orders_flows() {
        let mut schedule = CashflowSchedule::new("LOAN001", RateBasis::Fixed);
        schedule.push(Cashflow::principal(date(2026, 1, 15), 1_000.0));
        schedule.push(Cashflow::interest(date(2026, 1, 15), 50.0, 0.05));
        schedule.push(Cashflow::interest(date(2025, 7, 15), 25.0, 0.05));
        let schedule = schedule.finish();

        assert_eq!(schedule.flows[0].date, date(2025, 7, 15));
        assert_eq!(schedule.flows[1].kind, FlowKind::Interest);
        assert_eq!(schedule.flows[2].kind, FlowKind::Principal);
        assert!((schedule.total() - 1_075.0).abs() < 1e-9);
        assert!((schedule.interest_total() - 75.0).abs() < 1e-9);
        assert_eq!(schedule.amounts_by_date(), vec![(date(2025, 7, 15), 25.0), (date(2026, 1, 15), 1_050.0)]);
    }

    #[test]
    fn test_horizon_window() {
        let today = date(2025, 1, 15);
        let nii = ProjectionHorizon::nii(365);
        assert!(nii.contains(today, date(2026, 1, 15)));
        assert!(!nii.contains(today, date(2026, 1, 16)));
        assert!(!nii.include_principal);
        assert!(ProjectionHorizon::full_life().contains(today, date(2055, 1, 1)));
    }
}
