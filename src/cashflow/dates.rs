//! Date rolling for payment and reset schedules
//!
//! Every date is computed as an offset from its anchor (`anchor ± k * months`)
//! rather than by repeated stepping, so month-end anchors do not drift.

use crate::instrument::FloatingLoan;
use chrono::{Months, NaiveDate};

/// Signed day count from `today` to `date`
pub fn days_between(today: NaiveDate, date: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// Dates rolled back from `end` every `months` months, strictly after `after`,
/// returned in ascending order. `end` itself is the last date. Every period
/// in the span is generated, however long.
pub fn roll_back_schedule(end: NaiveDate, after: NaiveDate, months: u32) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    if months == 0 || end <= after {
        return dates;
    }
    for k in 0u32.. {
        let date = match k.checked_mul(months).and_then(|m| end.checked_sub_months(Months::new(m))) {
            Some(d) => d,
            None => break,
        };
        if date <= after {
            break;
        }
        dates.push(date);
    }
    dates.reverse();
    dates
}

/// Dates stepping forward from `first` every `months` months, keeping those on
/// or after `from` and strictly before `until`.
pub fn roll_forward_schedule(first: NaiveDate, from: NaiveDate, until: NaiveDate, months: u32) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    if months == 0 || first >= until {
        return dates;
    }
    for k in 0u32.. {
        let date = match k.checked_mul(months).and_then(|m| first.checked_add_months(Months::new(m))) {
            Some(d) => d,
            None => break,
        };
        if date >= until {
            break;
        }
        if date >= from {
            dates.push(date);
        }
    }
    dates
}

/// Remaining reset dates of a floating loan, ascending, strictly before maturity.
///
/// Steps forward from the recorded next repricing date when there is one,
/// otherwise rolls back from maturity on the repricing frequency.
pub fn floating_reset_dates(loan: &FloatingLoan, today: NaiveDate) -> Vec<NaiveDate> {
    let maturity = match loan.maturity_date {
        Some(m) if m > today => m,
        _ => return Vec::new(),
    };
    let months = loan.repricing_frequency.months();
    match loan.next_repricing_date {
        Some(next) => roll_forward_schedule(next, today, maturity, months),
        None => roll_back_schedule(maturity, today, months)
            .into_iter()
            .filter(|d| *d < maturity)
            .collect(),
    }
}
