//! Valuation run output structures
//!
//! Everything here is plain data for the caller to print, serialize or
//! persist.

use crate::cashflow::dates::days_between;
use crate::cashflow::{CashflowSchedule, FlowKind, RateBasis};
use crate::curve::{ScenarioKind, YieldCurve};
use crate::gap::{BucketExposure, BucketTable, GapBucket};
use crate::instrument::{BalanceSheetSide, Instrument};
use crate::valuation::{discount_factor, ScenarioTotals};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// EVE and NII for one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub kind: ScenarioKind,
    pub scenario: String,
    pub eve: f64,
    pub nii: f64,
    pub totals: ScenarioTotals,
}

/// Base-case dashboard figures
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentMetrics {
    pub base_eve: f64,
    pub base_nii: f64,

    // Percentage change vs base, 2 dp
    pub eve_sensitivity_up: f64,
    pub nii_sensitivity_up: f64,
    pub eve_sensitivity_down: f64,
    pub nii_sensitivity_down: f64,

    pub total_asset_pv: f64,
    pub total_liability_pv: f64,
    /// Base-case asset PV
    pub portfolio_value: f64,

    pub loan_count: usize,
    pub deposit_count: usize,
    pub derivative_count: usize,
}

/// Per-instrument PV under one scenario next to its base PV
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EveDriver {
    pub scenario: String,
    pub instrument_id: String,
    pub instrument_type: String,
    pub base_pv: f64,
    pub shocked_pv: f64,
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NiiDriver {
    pub scenario: String,
    pub instrument_id: String,
    pub instrument_type: String,
    pub nii: f64,
}

/// Grouping used by an NII breakdown row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakdownType {
    Instrument,
    InstrumentType,
    Bucket,
}

/// Scenario NII summed over one instrument, instrument type or repricing bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NiiBreakdownRow {
    pub scenario: String,
    pub breakdown_type: BreakdownType,
    pub breakdown_value: String,
    pub nii: f64,
}

/// Repricing bucket position under one scenario with the NII earned there
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepricingNetPosition {
    pub scenario: String,
    pub bucket: String,
    pub total_assets: f64,
    pub total_liabilities: f64,
    /// total_assets - total_liabilities
    pub net_position: f64,
    pub nii_base: f64,
    pub nii_shocked: f64,
}

/// One dated flow in the cash-flow ladder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LadderRow {
    pub scenario: String,
    pub instrument_id: String,
    pub instrument_type: String,
    pub basis: RateBasis,
    pub date: NaiveDate,
    pub days: i64,
    pub amount: f64,
    pub kind: FlowKind,
    /// None for past-dated flows
    pub discount_factor: Option<f64>,
    pub pv: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurvePoint {
    pub scenario: String,
    pub tenor: String,
    pub rate: f64,
}

/// Portfolio composition by type and category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionRow {
    pub instrument_type: String,
    pub category: String,
    pub volume_count: usize,
    pub total_amount: f64,
    /// Notional-weighted contractual rate, None when no rate is known
    pub average_interest_rate: Option<f64>,
}

/// Instrument left out of a run and why
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedInstrument {
    pub id: String,
    pub reason: String,
}

/// Complete output of one valuation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationReport {
    pub valuation_date: NaiveDate,
    pub metrics: CurrentMetrics,
    /// Catalog order, Base first
    pub scenarios: Vec<ScenarioResult>,
    pub repricing_gap: Vec<GapBucket>,
    pub maturity_gap: Vec<GapBucket>,
    pub repricing_exposures: Vec<BucketExposure>,
    pub eve_drivers: Vec<EveDriver>,
    pub nii_drivers: Vec<NiiDriver>,
    /// Per scenario, one row per instrument, per instrument type and per repricing bucket
    pub nii_breakdown: Vec<NiiBreakdownRow>,
    /// Per scenario, one row per repricing bucket in table order
    pub repricing_net_positions: Vec<RepricingNetPosition>,
    /// Empty unless detailed output was requested
    pub cashflow_ladder: Vec<LadderRow>,
    pub yield_curves: Vec<CurvePoint>,
    pub composition: Vec<CompositionRow>,
    pub skipped: Vec<SkippedInstrument>,
}

impl ValuationReport {
    pub fn scenario(&self, kind: ScenarioKind) -> Option<&ScenarioResult> {
        self.scenarios.iter().find(|s| s.kind == kind)
    }

    pub fn eve(&self, kind: ScenarioKind) -> Option<f64> {
        self.scenario(kind).map(|s| s.eve)
    }

    pub fn nii(&self, kind: ScenarioKind) -> Option<f64> {
        self.scenario(kind).map(|s| s.nii)
    }
}

/// Ladder rows for one instrument's schedules under one scenario curve
pub fn ladder_rows(
    scenario: &str,
    instrument: &Instrument,
    schedules: &[CashflowSchedule],
    curve: &YieldCurve,
    today: NaiveDate,
) -> Vec<LadderRow> {
    let mut rows = Vec::new();
    for schedule in schedules {
        for flow in &schedule.flows {
            let days = days_between(today, flow.date);
            let df = discount_factor(curve, days);
            rows.push(LadderRow {
                scenario: scenario.to_string(),
                instrument_id: schedule.instrument_id.clone(),
                instrument_type: instrument.instrument_type().to_string(),
                basis: schedule.basis,
                date: flow.date,
                days,
                amount: flow.amount,
                kind: flow.kind,
                discount_factor: df,
                pv: df.map_or(0.0, |d| flow.amount * d),
            });
        }
    }
    rows
}

/// Tenor points of a scenario curve
pub fn curve_points(scenario: &str, curve: &YieldCurve) -> Vec<CurvePoint> {
    curve
        .points()
        .map(|(tenor, rate)| CurvePoint {
            scenario: scenario.to_string(),
            tenor: tenor.label().to_string(),
            rate,
        })
        .collect()
}

/// Group instruments by (type, category) in first-seen order
pub fn composition(instruments: &[Instrument]) -> Vec<CompositionRow> {
    // (row, weighted rate sum, weight of rows with a known rate)
    let mut groups: Vec<(CompositionRow, f64, f64)> = Vec::new();

    for instrument in instruments {
        let (instrument_type, category) = (instrument.instrument_type(), instrument.category());
        let idx = match groups
            .iter()
            .position(|(row, _, _)| row.instrument_type == instrument_type && row.category == category)
        {
            Some(idx) => idx,
            None => {
                groups.push((
                    CompositionRow {
                        instrument_type: instrument_type.to_string(),
                        category: category.to_string(),
                        volume_count: 0,
                        total_amount: 0.0,
                        average_interest_rate: None,
                    },
                    0.0,
                    0.0,
                ));
                groups.len() - 1
            }
        };

        let (row, rate_sum, weight) = &mut groups[idx];
        let notional = instrument.notional();
        row.volume_count += 1;
        row.total_amount += notional;
        if let Some(rate) = instrument.contractual_rate() {
            *rate_sum += rate * notional;
            *weight += notional;
        }
    }

    groups
        .into_iter()
        .map(|(mut row, rate_sum, weight)| {
            if weight > 0.0 {
                row.average_interest_rate = Some(rate_sum / weight);
            }
            row
        })
        .collect()
}

/// Spread each instrument's NII over the repricing buckets it is exposed
/// to, one value per bucket in table order.
///
/// An instrument's NII is split evenly across its exposures. Instruments
/// with no exposure land in the catch-all bucket, so the buckets always sum
/// to the scenario NII. `exposures` and `nii` are indexed by instrument.
pub fn bucket_nii(table: &BucketTable, exposures: &[Vec<BucketExposure>], nii: &[f64]) -> Vec<f64> {
    let labels: Vec<&str> = table.labels().collect();
    let index_of = |bucket: &str| labels.iter().position(|l| *l == bucket);
    let fallback = index_of(table.fallback());

    let mut totals = vec![0.0; labels.len()];
    for (instrument_exposures, &value) in exposures.iter().zip(nii) {
        if instrument_exposures.is_empty() {
            if let Some(idx) = fallback {
                totals[idx] += value;
            }
            continue;
        }
        let share = value / instrument_exposures.len() as f64;
        for exposure in instrument_exposures {
            if let Some(idx) = index_of(&exposure.bucket) {
                totals[idx] += share;
            }
        }
    }
    totals
}

/// Net position rows for one scenario, pairing the repricing gap with the
/// base and shocked NII attributed to each bucket
pub fn net_positions(scenario: &str, gap: &[GapBucket], nii_base: &[f64], nii_shocked: &[f64]) -> Vec<RepricingNetPosition> {
    gap.iter()
        .zip(nii_base.iter().zip(nii_shocked))
        .map(|(row, (&base, &shocked))| RepricingNetPosition {
            scenario: scenario.to_string(),
            bucket: row.bucket.clone(),
            total_assets: row.assets,
            total_liabilities: row.liabilities,
            net_position: row.gap,
            nii_base: base,
            nii_shocked: shocked,
        })
        .collect()
}

/// Breakdown rows for one scenario: instruments in snapshot order, then
/// instrument types in first-seen order, then buckets in table order
pub fn nii_breakdown(
    scenario: &str,
    drivers: &[NiiDriver],
    buckets: &[GapBucket],
    bucket_nii: &[f64],
) -> Vec<NiiBreakdownRow> {
    let row = |breakdown_type, breakdown_value: &str, nii| NiiBreakdownRow {
        scenario: scenario.to_string(),
        breakdown_type,
        breakdown_value: breakdown_value.to_string(),
        nii,
    };

    let mut rows: Vec<NiiBreakdownRow> = drivers
        .iter()
        .map(|d| row(BreakdownType::Instrument, &d.instrument_id, d.nii))
        .collect();

    let mut by_type: Vec<(&str, f64)> = Vec::new();
    for driver in drivers {
        match by_type.iter_mut().find(|(t, _)| *t == driver.instrument_type) {
            Some((_, total)) => *total += driver.nii,
            None => by_type.push((driver.instrument_type.as_str(), driver.nii)),
        }
    }
    rows.extend(by_type.into_iter().map(|(t, nii)| row(BreakdownType::InstrumentType, t, nii)));

    rows.extend(
        buckets
            .iter()
            .zip(bucket_nii)
            .map(|(b, &nii)| row(BreakdownType::Bucket, &b.bucket, nii)),
    );
    rows
}

/// Loan, deposit and derivative counts by balance sheet side
pub fn side_counts(instruments: &[Instrument]) -> (usize, usize, usize) {
    instruments.iter().fold((0, 0, 0), |(loans, deposits, derivatives), i| match i.side() {
        BalanceSheetSide::Asset => (loans + 1, deposits, derivatives),
        BalanceSheetSide::Liability => (loans, deposits + 1, derivatives),
        BalanceSheetSide::Derivative => (loans, deposits, derivatives + 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashflow::Cashflow;
    use crate::gap::GapSide;
    use crate::instrument::{DepositKind, FixedLoan, FloatingLoan, Frequency, NonMaturityDeposit};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixed(id: &str, notional: f64, rate: f64) -> Instrument {
        Instrument::FixedLoan(FixedLoan {
            id: id.to_string(),
            notional,
            rate,
            origination_date: None,
            maturity_date: Some(date(2030, 1, 1)),
            payment_frequency: Frequency::Monthly,
        })
    }

    fn floating(id: &str, notional: f64) -> Instrument {
        Instrument::FloatingLoan(FloatingLoan {
            id: id.to_string(),
            notional,
            spread: 0.02,
            benchmark: Some("SOFR".to_string()),
            current_rate: None,
            origination_date: None,
            maturity_date: Some(date(2030, 1, 1)),
            payment_frequency: Frequency::Monthly,
            repricing_frequency: Frequency::Monthly,
            next_repricing_date: None,
        })
    }

    #[test]
    fn test_composition_weighted_rate() {
        let instruments = vec![
            fixed("L1", 100.0, 0.04),
            floating("L2", 500.0),
            fixed("L3", 300.0, 0.08),
            Instrument::NonMaturityDeposit(NonMaturityDeposit {
                id: "D1".to_string(),
                kind: DepositKind::Savings,
                balance: 50.0,
                rate: 0.01,
                open_date: None,
                payment_frequency: Frequency::Monthly,
                repricing_frequency: None,
                next_repricing_date: None,
            }),
        ];
        let rows = composition(&instruments);
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].category, "Fixed");
        assert_eq!(rows[0].volume_count, 2);
        assert!((rows[0].total_amount - 400.0).abs() < 1e-9);
        assert!((rows[0].average_interest_rate.unwrap() - 0.07).abs() < 1e-12);

        assert_eq!(rows[1].category, "Floating");
        assert!(rows[1].average_interest_rate.is_none());

        assert_eq!(rows[2].instrument_type, "Deposit");
        assert_eq!(rows[2].category, "Savings");
        assert_eq!(side_counts(&instruments), (3, 1, 0));
    }

    #[test]
    fn test_ladder_rows_discount() {
        let curve = YieldCurve::base();
        let today = date(2025, 1, 15);
        let loan = fixed("L1", 1_000_000.0, 0.05);
        let mut schedule = CashflowSchedule::new("L1", RateBasis::Fixed);
        schedule.push(Cashflow::interest(today, 100.0, 0.05));
        schedule.push(Cashflow::principal(date(2026, 1, 15), 1_045.0));

        let rows = ladder_rows("Base", &loan, &[schedule], &curve, today);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].discount_factor, Some(1.0));
        assert_eq!(rows[0].pv, 100.0);
        assert_eq!(rows[1].days, 365);
        assert!((rows[1].pv - 1_000.0).abs() < 1e-9);
        assert_eq!(rows[1].instrument_type, "Loan");
    }

    fn exposure(id: &str, bucket: &str) -> BucketExposure {
        BucketExposure {
            bucket: bucket.to_string(),
            instrument_id: id.to_string(),
            instrument_type: "Loan".to_string(),
            notional: 100.0,
            position: GapSide::Asset,
        }
    }

    #[test]
    fn test_bucket_nii_splits_and_falls_back() {
        let table = BucketTable::repricing().unwrap();
        let exposures = vec![
            vec![exposure("L1", "0-3 Months")],
            vec![exposure("L2", "0-3 Months"), exposure("L2", "1-5 Years")],
            Vec::new(),
        ];
        let totals = bucket_nii(&table, &exposures, &[100.0, 50.0, -30.0]);
        let labels: Vec<&str> = table.labels().collect();
        let at = |label: &str| totals[labels.iter().position(|l| *l == label).unwrap()];

        assert_eq!(at("0-3 Months"), 125.0);
        assert_eq!(at("1-5 Years"), 25.0);
        assert_eq!(at(table.fallback()), -30.0);
        assert!((totals.iter().sum::<f64>() - 120.0).abs() < 1e-12);
    }

    #[test]
    fn test_nii_breakdown_groups() {
        let drivers = vec![
            NiiDriver {
                scenario: "Base".to_string(),
                instrument_id: "L1".to_string(),
                instrument_type: "Loan".to_string(),
                nii: 80.0,
            },
            NiiDriver {
                scenario: "Base".to_string(),
                instrument_id: "D1".to_string(),
                instrument_type: "Deposit".to_string(),
                nii: -30.0,
            },
            NiiDriver {
                scenario: "Base".to_string(),
                instrument_id: "L2".to_string(),
                instrument_type: "Loan".to_string(),
                nii: 20.0,
            },
        ];
        let buckets = vec![GapBucket {
            bucket: "0-3 Months".to_string(),
            assets: 200.0,
            liabilities: 50.0,
            gap: 150.0,
        }];
        let rows = nii_breakdown("Base", &drivers, &buckets, &[70.0]);

        assert_eq!(rows.len(), 3 + 2 + 1);
        let types: Vec<(&str, f64)> = rows
            .iter()
            .filter(|r| r.breakdown_type == BreakdownType::InstrumentType)
            .map(|r| (r.breakdown_value.as_str(), r.nii))
            .collect();
        assert_eq!(types, vec![("Loan", 100.0), ("Deposit", -30.0)]);
        assert_eq!(rows[5].breakdown_type, BreakdownType::Bucket);
        assert_eq!(rows[5].nii, 70.0);

        let positions = net_positions("Base", &buckets, &[60.0], &[70.0]);
        assert_eq!(positions[0].net_position, 150.0);
        assert_eq!(positions[0].nii_base, 60.0);
        assert_eq!(positions[0].nii_shocked, 70.0);
    }

    #[test]
    fn test_curve_points() {
        let points = curve_points("Base", &YieldCurve::base());
        assert_eq!(points.len(), 12);
        assert_eq!(points[0].tenor, "1M");
        assert!((points[11].rate - 0.052).abs() < 1e-12);
    }
}
