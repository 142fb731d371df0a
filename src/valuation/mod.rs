//! Present value, duration and scenario EVE/NII

mod discount;
mod metrics;

pub use discount::{discount_factor, modified_duration, present_value, DAYS_PER_YEAR};
pub use metrics::{sensitivity_pct, swap_nii, value_instrument, InstrumentValuation, ScenarioTotals};
