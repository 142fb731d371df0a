//! IRRBB Engine - Interest rate risk in the banking book
//!
//! This library provides:
//! - Yield curve interpolation and the six-scenario shock catalog
//! - Cash-flow generation for loans, term funding, non-maturity deposits and swaps
//! - Present value, modified duration, EVE and NII per scenario
//! - Repricing and maturity gap analysis
//! - A scenario runner assembling the full valuation report

pub mod error;
pub mod curve;
pub mod instrument;
pub mod assumptions;
pub mod config;
pub mod cashflow;
pub mod valuation;
pub mod gap;
pub mod report;
pub mod history;
pub mod scenario;

// Re-export commonly used types
pub use error::{EngineError, EngineResult};
pub use curve::{Scenario, ScenarioKind, Tenor, YieldCurve};
pub use instrument::{load_instruments, Instrument, InstrumentSnapshot};
pub use assumptions::BehavioralAssumptions;
pub use config::RunConfig;
pub use cashflow::{Cashflow, CashflowGenerator, CashflowSchedule, ProjectionHorizon};
pub use gap::{get_bucket, BucketTable};
pub use report::ValuationReport;
pub use history::ScenarioHistory;
pub use scenario::ScenarioRunner;
