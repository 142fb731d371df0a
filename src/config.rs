//! Run configuration
//!
//! Loaded from JSON; every field is optional and falls back to the defaults
//! below.

use crate::assumptions::BehavioralAssumptions;
use crate::curve::YieldCurve;
use crate::error::EngineResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default location of the sample config
pub const DEFAULT_CONFIG_PATH: &str = "data/config.json";

/// Days in the NII earnings window
pub const NII_HORIZON_DAYS: i64 = 365;

fn default_nii_horizon_days() -> i64 { NII_HORIZON_DAYS }
fn default_true() -> bool { true }

/// Configuration for a valuation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Behavioral assumptions
    #[serde(default)]
    pub assumptions: BehavioralAssumptions,

    /// NII projection window in days
    #[serde(default = "default_nii_horizon_days")]
    pub nii_horizon_days: i64,

    /// Whether to build the per-flow cash-flow ladder
    #[serde(default = "default_true")]
    pub detailed_output: bool,

    /// Fan the scenario loop out over the rayon pool
    #[serde(default)]
    pub parallel: bool,

    /// Optional base curve override, tenor label -> rate
    #[serde(default)]
    pub base_curve: Option<BTreeMap<String, f64>>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            assumptions: BehavioralAssumptions::default(),
            nii_horizon_days: NII_HORIZON_DAYS,
            detailed_output: true,
            parallel: false,
            base_curve: None,
        }
    }
}

impl RunConfig {
    /// Load config from a JSON file
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Parse config from a JSON string
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Base curve for the run: the override when given, else the built-in curve
    pub fn base_curve(&self) -> EngineResult<YieldCurve> {
        match &self.base_curve {
            Some(points) => {
                YieldCurve::from_labeled_rates(points.iter().map(|(label, rate)| (label.as_str(), *rate)))
            }
            None => Ok(YieldCurve::base()),
        }
    }
}
