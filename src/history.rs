//! Bounded history of past valuation runs
//!
//! Owned by whoever drives the runner; the engine itself keeps no state
//! between runs.

use crate::curve::ScenarioKind;
use crate::report::ValuationReport;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of runs retained
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Headline figures of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub valuation_date: NaiveDate,
    pub base_eve: f64,
    pub up_eve: f64,
    pub down_eve: f64,
    pub base_nii: f64,
    pub up_nii: f64,
    pub down_nii: f64,
}

impl HistorySnapshot {
    /// Missing scenarios read as zero
    pub fn from_report(report: &ValuationReport) -> Self {
        let eve = |kind| report.eve(kind).unwrap_or(0.0);
        let nii = |kind| report.nii(kind).unwrap_or(0.0);
        Self {
            valuation_date: report.valuation_date,
            base_eve: eve(ScenarioKind::Base),
            up_eve: eve(ScenarioKind::ParallelUp),
            down_eve: eve(ScenarioKind::ParallelDown),
            base_nii: nii(ScenarioKind::Base),
            up_nii: nii(ScenarioKind::ParallelUp),
            down_nii: nii(ScenarioKind::ParallelDown),
        }
    }
}

/// Ring buffer of run snapshots, oldest evicted first
#[derive(Debug, Clone)]
pub struct ScenarioHistory {
    capacity: usize,
    entries: VecDeque<HistorySnapshot>,
}

impl ScenarioHistory {
    /// A capacity of zero is raised to one
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, report: &ValuationReport) {
        self.push(HistorySnapshot::from_report(report));
    }

    pub fn push(&mut self, snapshot: HistorySnapshot) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&HistorySnapshot> {
        self.entries.back()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &HistorySnapshot> {
        self.entries.iter()
    }
}

impl Default for ScenarioHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}
