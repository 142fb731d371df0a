//! Repricing and maturity gap analysis
//!
//! Runs once per valuation against unshocked contractual dates. Gap per
//! bucket is assets minus liabilities, in notional terms.

use super::buckets::BucketTable;
use crate::cashflow::dates::{floating_reset_dates, roll_back_schedule};
use crate::instrument::{Instrument, InterestRateSwap, SwapDirection};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Side an exposure is counted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapSide {
    Asset,
    Liability,
}

/// One instrument's notional placed in one bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketExposure {
    pub bucket: String,
    pub instrument_id: String,
    pub instrument_type: String,
    pub notional: f64,
    pub position: GapSide,
}

/// Net position for one bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapBucket {
    pub bucket: String,
    pub assets: f64,
    pub liabilities: f64,
    /// assets - liabilities
    pub gap: f64,
}

/// Both gap tables plus the per-instrument repricing detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub repricing_gap: Vec<GapBucket>,
    pub maturity_gap: Vec<GapBucket>,
    pub repricing_exposures: Vec<BucketExposure>,
}

fn exposure(instrument: &Instrument, bucket: &str, position: GapSide) -> BucketExposure {
    BucketExposure {
        bucket: bucket.to_string(),
        instrument_id: instrument.id().to_string(),
        instrument_type: instrument.instrument_type().to_string(),
        notional: instrument.notional(),
        position,
    }
}

/// Whether the instrument still has contractual life at `today`
fn is_live(instrument: &Instrument, today: NaiveDate) -> bool {
    match instrument {
        Instrument::NonMaturityDeposit(_) => true,
        Instrument::Swap(swap) => swap.is_active(today),
        other => other.maturity_date().map_or(true, |m| m > today),
    }
}

/// (receive side, pay side) for the fixed and floating legs
fn swap_leg_sides(swap: &InterestRateSwap) -> (GapSide, GapSide) {
    match swap.direction {
        // pays fixed, receives floating
        SwapDirection::Payer => (GapSide::Liability, GapSide::Asset),
        SwapDirection::Receiver => (GapSide::Asset, GapSide::Liability),
    }
}

/// Repricing-gap exposures for one instrument, keyed by the next repricing
/// or maturity event.
///
/// A floating loan counts its full notional once in every bucket its
/// remaining resets fall into.
pub fn repricing_exposures(instrument: &Instrument, today: NaiveDate, table: &BucketTable) -> Vec<BucketExposure> {
    if !is_live(instrument, today) {
        return Vec::new();
    }
    match instrument {
        Instrument::FixedLoan(loan) => {
            vec![exposure(instrument, table.get_bucket(loan.maturity_date, today), GapSide::Asset)]
        }
        Instrument::FloatingLoan(loan) => {
            let resets = floating_reset_dates(loan, today);
            if resets.is_empty() {
                return vec![exposure(instrument, table.get_bucket(loan.maturity_date, today), GapSide::Asset)];
            }
            let mut buckets: Vec<&str> = Vec::new();
            for reset in resets {
                let bucket = table.get_bucket(Some(reset), today);
                if !buckets.contains(&bucket) {
                    buckets.push(bucket);
                }
            }
            buckets
                .into_iter()
                .map(|b| exposure(instrument, b, GapSide::Asset))
                .collect()
        }
        Instrument::TermFunding(funding) => {
            vec![exposure(instrument, table.get_bucket(funding.maturity_date, today), GapSide::Liability)]
        }
        Instrument::NonMaturityDeposit(deposit) => {
            vec![exposure(instrument, table.get_bucket(deposit.next_repricing_date, today), GapSide::Liability)]
        }
        Instrument::Swap(swap) => {
            let (fixed_side, floating_side) = swap_leg_sides(swap);
            let next_floating = swap
                .end_date
                .and_then(|end| roll_back_schedule(end, today, swap.floating_frequency.months()).first().copied());
            vec![
                exposure(instrument, table.get_bucket(swap.end_date, today), fixed_side),
                exposure(instrument, table.get_bucket(next_floating, today), floating_side),
            ]
        }
    }
}

/// Maturity-gap exposures for one instrument, keyed by final maturity.
/// Non-maturity deposits always land in the catch-all bucket.
pub fn maturity_exposures(instrument: &Instrument, today: NaiveDate, table: &BucketTable) -> Vec<BucketExposure> {
    if !is_live(instrument, today) {
        return Vec::new();
    }
    match instrument {
        Instrument::FixedLoan(_) | Instrument::FloatingLoan(_) => {
            vec![exposure(instrument, table.get_bucket(instrument.maturity_date(), today), GapSide::Asset)]
        }
        Instrument::TermFunding(funding) => {
            vec![exposure(instrument, table.get_bucket(funding.maturity_date, today), GapSide::Liability)]
        }
        Instrument::NonMaturityDeposit(_) => vec![exposure(instrument, table.fallback(), GapSide::Liability)],
        Instrument::Swap(swap) => {
            let (fixed_side, floating_side) = swap_leg_sides(swap);
            let bucket = table.get_bucket(swap.end_date, today);
            vec![exposure(instrument, bucket, fixed_side), exposure(instrument, bucket, floating_side)]
        }
    }
}

/// Sum exposures into one row per bucket, in table order
pub fn tabulate(table: &BucketTable, exposures: &[BucketExposure]) -> Vec<GapBucket> {
    table
        .labels()
        .map(|label| {
            let (mut assets, mut liabilities) = (0.0, 0.0);
            for e in exposures.iter().filter(|e| e.bucket == label) {
                match e.position {
                    GapSide::Asset => assets += e.notional,
                    GapSide::Liability => liabilities += e.notional,
                }
            }
            GapBucket {
                bucket: label.to_string(),
                assets,
                liabilities,
                gap: assets - liabilities,
            }
        })
        .collect()
}

/// Repricing and maturity gaps for a portfolio
pub fn analyze_gaps(
    instruments: &[Instrument],
    today: NaiveDate,
    repricing_table: &BucketTable,
    maturity_table: &BucketTable,
) -> GapAnalysis {
    let repricing: Vec<BucketExposure> = instruments
        .iter()
        .flat_map(|i| repricing_exposures(i, today, repricing_table))
        .collect();
    let maturity: Vec<BucketExposure> = instruments
        .iter()
        .flat_map(|i| maturity_exposures(i, today, maturity_table))
        .collect();

    GapAnalysis {
        repricing_gap: tabulate(repricing_table, &repricing),
        maturity_gap: tabulate(maturity_table, &maturity),
        repricing_exposures: repricing,
    }
}
