//! Yield curve model and the rate scenario catalog

mod tenor;
mod yield_curve;
mod shocks;

pub use tenor::Tenor;
pub use yield_curve::YieldCurve;
pub use shocks::{Scenario, ScenarioKind, standard_scenarios};
