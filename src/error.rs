//! Error types for the valuation engine.
//!
//! Structural problems (curve, scenario, bucket table, assumptions) are fatal to
//! a run. Instrument problems are reported per instrument and skipped.

use thiserror::Error;

/// Result alias used across the crate.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised while loading inputs or running a valuation.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A tenor label outside the 1M..30Y ladder.
    #[error("Unknown tenor label: {label}")]
    UnknownTenor {
        /// The offending label.
        label: String,
    },

    /// A curve definition that does not cover every tenor.
    #[error("Yield curve is missing tenor {label}")]
    MissingTenor {
        /// Label of the absent tenor.
        label: String,
    },

    /// A yield curve rate that is not a finite number.
    #[error("Invalid rate {rate} for tenor {label}")]
    InvalidRate {
        /// Tenor label.
        label: String,
        /// The rate supplied.
        rate: f64,
    },

    /// A scenario definition that cannot be applied.
    #[error("Invalid scenario '{name}': {reason}")]
    InvalidScenario {
        /// Scenario name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A bucket table that is not ascending or lacks exactly one sentinel.
    #[error("Invalid bucket table: {reason}")]
    InvalidBucketTable {
        /// What is wrong with it.
        reason: String,
    },

    /// A behavioral assumption outside its allowed range.
    #[error("Invalid assumption {name} = {value}: {reason}")]
    InvalidAssumption {
        /// Assumption name.
        name: &'static str,
        /// Supplied value.
        value: f64,
        /// Allowed range.
        reason: String,
    },

    /// An instrument record that cannot produce cash flows.
    #[error("Invalid instrument {id}: {reason}")]
    InvalidInstrument {
        /// Instrument identifier.
        id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An instrument without a date it needs (e.g. a CD without maturity).
    #[error("Instrument {id} is missing {field}")]
    MissingDate {
        /// Instrument identifier.
        id: String,
        /// Name of the missing date field.
        field: &'static str,
    },

    /// An unrecognised label in an input file.
    #[error("Unknown {kind}: {value}")]
    UnknownLabel {
        /// Which kind of label (instrument type, frequency, ...).
        kind: &'static str,
        /// The label that was read.
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Whether the error belongs to a single instrument (skip-and-continue)
    /// rather than to the run configuration.
    pub fn is_instrument_error(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidInstrument { .. } | EngineError::MissingDate { .. } | EngineError::UnknownLabel { .. }
        )
    }
}
