//! Cash-flow generation for banking book instruments

pub mod dates;
mod schedule;
mod generator;

pub use schedule::{Cashflow, CashflowSchedule, FlowKind, ProjectionHorizon, RateBasis};
pub use generator::{CashflowGenerator, NMD_RATE_FLOOR};
