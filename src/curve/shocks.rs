//! Rate scenarios and the fixed six-scenario catalog

use super::tenor::Tenor;
use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The six supervisory-style scenarios run on every valuation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioKind {
    Base,
    ParallelUp,
    ParallelDown,
    ShortUp,
    ShortDown,
    LongUp,
}

impl ScenarioKind {
    /// Catalog order
    pub const ALL: [ScenarioKind; 6] = [
        ScenarioKind::Base,
        ScenarioKind::ParallelUp,
        ScenarioKind::ParallelDown,
        ScenarioKind::ShortUp,
        ScenarioKind::ShortDown,
        ScenarioKind::LongUp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::Base => "Base",
            ScenarioKind::ParallelUp => "Parallel +200bps",
            ScenarioKind::ParallelDown => "Parallel -200bps",
            ScenarioKind::ShortUp => "Short Up +100bps",
            ScenarioKind::ShortDown => "Short Down -100bps",
            ScenarioKind::LongUp => "Long Up +100bps",
        }
    }

    /// Per-tenor shocks in basis points. Tenors not listed are unshocked.
    fn shocks(&self) -> Vec<(Tenor, f64)> {
        match self {
            ScenarioKind::Base => Vec::new(),
            ScenarioKind::ParallelUp => Tenor::ALL.iter().map(|t| (*t, 200.0)).collect(),
            ScenarioKind::ParallelDown => Tenor::ALL.iter().map(|t| (*t, -200.0)).collect(),
            ScenarioKind::ShortUp => SHORT_SHOCK.to_vec(),
            ScenarioKind::ShortDown => SHORT_SHOCK.iter().map(|(t, s)| (*t, -s)).collect(),
            ScenarioKind::LongUp => LONG_SHOCK.to_vec(),
        }
    }
}

/// +100bps at the short end, decaying linearly to zero by 2Y
const SHORT_SHOCK: [(Tenor, f64); 5] = [
    (Tenor::M1, 100.0),
    (Tenor::M3, 90.0),
    (Tenor::M6, 75.0),
    (Tenor::Y1, 50.0),
    (Tenor::Y2, 0.0),
];

/// Zero through 2Y, ramping by 25bps per point to a +100bps peak at 10Y,
/// then back down to zero at 30Y
const LONG_SHOCK: [(Tenor, f64); 12] = [
    (Tenor::M1, 0.0),
    (Tenor::M3, 0.0),
    (Tenor::M6, 0.0),
    (Tenor::Y1, 0.0),
    (Tenor::Y2, 0.0),
    (Tenor::Y3, 25.0),
    (Tenor::Y5, 50.0),
    (Tenor::Y7, 75.0),
    (Tenor::Y10, 100.0),
    (Tenor::Y15, 75.0),
    (Tenor::Y20, 50.0),
    (Tenor::Y30, 0.0),
];

/// Named set of per-tenor basis-point shocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    shocks_bps: BTreeMap<Tenor, f64>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, shocks_bps: BTreeMap<Tenor, f64>) -> Self {
        Self {
            name: name.into(),
            shocks_bps,
        }
    }

    /// Catalog scenario for the given kind
    pub fn from_kind(kind: ScenarioKind) -> Self {
        Self::new(kind.name(), kind.shocks().into_iter().collect())
    }

    /// Shock at a tenor in bps (absent = 0)
    pub fn shock_bps(&self, tenor: Tenor) -> f64 {
        self.shocks_bps.get(&tenor).copied().unwrap_or(0.0)
    }

    /// Reject non-finite shocks before they reach a curve
    pub fn validate(&self) -> EngineResult<()> {
        if self.name.trim().is_empty() {
            return Err(EngineError::InvalidScenario {
                name: self.name.clone(),
                reason: "empty name".to_string(),
            });
        }
        for (tenor, bps) in &self.shocks_bps {
            if !bps.is_finite() {
                return Err(EngineError::InvalidScenario {
                    name: self.name.clone(),
                    reason: format!("non-finite shock {} at {}", bps, tenor),
                });
            }
        }
        Ok(())
    }
}

/// The fixed catalog, paired with its kind, in run order
pub fn standard_scenarios() -> Vec<(ScenarioKind, Scenario)> {
    ScenarioKind::ALL
        .iter()
        .map(|k| (*k, Scenario::from_kind(*k)))
        .collect()
}
