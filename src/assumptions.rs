//! Behavioral assumptions for deposits and prepayments
//!
//! Values arrive already validated by the caller in production; `validate`
//! re-checks the ranges so a bad config file fails the run up front.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// Longest accepted NMD effective maturity
pub const MAX_NMD_EFFECTIVE_MATURITY_YEARS: u32 = 100;

fn default_nmd_effective_maturity_years() -> u32 { 5 }
fn default_nmd_deposit_beta() -> f64 { 0.5 }
fn default_prepayment_cpr() -> f64 { 0.0 }

/// Container for the three behavioral parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralAssumptions {
    /// Projection horizon for non-maturity deposits, in whole years (1-100)
    #[serde(default = "default_nmd_effective_maturity_years")]
    pub nmd_effective_maturity_years: u32,

    /// Share of a market rate move passed through to NMD paid rates (0-1)
    #[serde(default = "default_nmd_deposit_beta")]
    pub nmd_deposit_beta: f64,

    /// Annual constant prepayment rate for floating loans (0-1)
    #[serde(default = "default_prepayment_cpr")]
    pub prepayment_cpr: f64,
}

impl BehavioralAssumptions {
    pub fn new(nmd_effective_maturity_years: u32, nmd_deposit_beta: f64, prepayment_cpr: f64) -> Self {
        Self {
            nmd_effective_maturity_years,
            nmd_deposit_beta,
            prepayment_cpr,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        let years = self.nmd_effective_maturity_years;
        if !(1..=MAX_NMD_EFFECTIVE_MATURITY_YEARS).contains(&years) {
            return Err(EngineError::InvalidAssumption {
                name: "nmd_effective_maturity_years",
                value: years as f64,
                reason: format!("must be between 1 and {} years", MAX_NMD_EFFECTIVE_MATURITY_YEARS),
            });
        }
        check_unit_interval("nmd_deposit_beta", self.nmd_deposit_beta)?;
        check_unit_interval("prepayment_cpr", self.prepayment_cpr)?;
        Ok(())
    }
}

impl Default for BehavioralAssumptions {
    fn default() -> Self {
        Self {
            nmd_effective_maturity_years: default_nmd_effective_maturity_years(),
            nmd_deposit_beta: default_nmd_deposit_beta(),
            prepayment_cpr: default_prepayment_cpr(),
        }
    }
}

fn check_unit_interval(name: &'static str, value: f64) -> EngineResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::InvalidAssumption {
            name,
            value,
            reason: "must be between 0.0 and 1.0".to_string(),
        })
    }
}
