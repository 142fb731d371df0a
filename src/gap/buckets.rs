//! Ordered time-bucket tables

use crate::cashflow::dates::days_between;
use crate::error::{EngineError, EngineResult};
use chrono::NaiveDate;

/// Bound marking the catch-all bucket
pub const SENTINEL_BOUND: i64 = -1;

/// Fallback label of the repricing table
pub const NON_SENSITIVE: &str = "Fixed Rate / Non-Sensitive";

/// Fallback label of the maturity table
pub const NON_MATURITY: &str = "Non-Maturity";

/// Ascending label -> day-count upper bound table with one catch-all entry
#[derive(Debug, Clone, PartialEq)]
pub struct BucketTable {
    /// Entries in declaration order, sentinel included
    entries: Vec<(String, i64)>,
    /// Index of the sentinel entry
    fallback: usize,
    /// Index of the largest bound
    largest: usize,
}

impl BucketTable {
    /// Build a table. Non-sentinel bounds must be non-negative and strictly
    /// ascending, and exactly one entry must carry `SENTINEL_BOUND`.
    pub fn new<S: Into<String>>(entries: Vec<(S, i64)>) -> EngineResult<Self> {
        let entries: Vec<(String, i64)> = entries.into_iter().map(|(l, b)| (l.into(), b)).collect();
        let invalid = |reason: String| EngineError::InvalidBucketTable { reason };

        let sentinels: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, (_, b))| *b == SENTINEL_BOUND)
            .map(|(i, _)| i)
            .collect();
        if sentinels.len() != 1 {
            return Err(invalid(format!("expected one catch-all bucket, found {}", sentinels.len())));
        }

        let mut largest = None;
        let mut previous: Option<i64> = None;
        for (i, (label, bound)) in entries.iter().enumerate() {
            if *bound == SENTINEL_BOUND {
                continue;
            }
            if *bound < 0 {
                return Err(invalid(format!("bucket '{}' has negative bound {}", label, bound)));
            }
            if let Some(prev) = previous {
                if *bound <= prev {
                    return Err(invalid(format!("bucket '{}' bound {} is not above {}", label, bound, prev)));
                }
            }
            previous = Some(*bound);
            largest = Some(i);
        }

        let largest = largest.ok_or_else(|| invalid("no bounded buckets".to_string()))?;
        let mut labels: Vec<&str> = entries.iter().map(|(l, _)| l.as_str()).collect();
        labels.sort_unstable();
        labels.dedup();
        if labels.len() != entries.len() {
            return Err(invalid("duplicate bucket labels".to_string()));
        }

        Ok(Self {
            fallback: sentinels[0],
            largest,
            entries,
        })
    }

    /// NII repricing-gap table
    pub fn repricing() -> EngineResult<Self> {
        Self::new(vec![
            ("0-3 Months", 90),
            ("3-6 Months", 180),
            ("6-12 Months", 365),
            ("1-5 Years", 365 * 5),
            (">5 Years", 365 * 100),
            (NON_SENSITIVE, SENTINEL_BOUND),
        ])
    }

    /// EVE maturity-gap table
    pub fn maturity() -> EngineResult<Self> {
        Self::new(vec![
            ("0-1 Year", 365),
            ("1-3 Years", 365 * 3),
            ("3-5 Years", 365 * 5),
            ("5-10 Years", 365 * 10),
            (">10 Years", 365 * 100),
            (NON_MATURITY, SENTINEL_BOUND),
        ])
    }

    /// Labels in table order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn fallback(&self) -> &str {
        &self.entries[self.fallback].0
    }

    /// Bucket for an event date. Always returns a label from the table.
    pub fn get_bucket(&self, event_date: Option<NaiveDate>, today: NaiveDate) -> &str {
        let date = match event_date {
            Some(d) => d,
            None => return self.fallback(),
        };
        let days = days_between(today, date);
        self.entries
            .iter()
            .filter(|(_, bound)| *bound != SENTINEL_BOUND)
            .find(|(_, bound)| *bound >= days)
            .map(|(label, _)| label.as_str())
            .unwrap_or(self.entries[self.largest].0.as_str())
    }
}

/// Free-function form of `BucketTable::get_bucket`
pub fn get_bucket(event_date: Option<NaiveDate>, today: NaiveDate, table: &BucketTable) -> &str {
    table.get_bucket(event_date, today)
}
