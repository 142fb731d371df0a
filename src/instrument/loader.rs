//! Load an instrument snapshot from CSV
//!
//! The instrument repository exports one row per position. The free-text
//! `Type` column is mapped to an `Instrument` variant here, once, so nothing
//! downstream dispatches on strings.

use super::data::{
    DepositKind, FixedLoan, FloatingLoan, Frequency, Instrument, InterestRateSwap,
    NonMaturityDeposit, SwapDirection, TermFunding, TermFundingKind,
};
use crate::error::{EngineError, EngineResult};
use crate::report::SkippedInstrument;
use chrono::NaiveDate;
use csv::{Reader, StringRecord};
use log::warn;
use std::path::Path;

/// Default location of the sample snapshot
pub const DEFAULT_INSTRUMENTS_PATH: &str = "data/instruments.csv";

/// Raw CSV row matching the instrument export columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "InstrumentID")]
    instrument_id: String,
    #[serde(rename = "Type")]
    instrument_type: String,
    #[serde(rename = "Notional")]
    notional: f64,
    /// Fixed rate, current floating rate, or swap fixed rate
    #[serde(rename = "Rate")]
    rate: Option<f64>,
    /// Floating spread (loans and swaps)
    #[serde(rename = "Spread")]
    spread: Option<f64>,
    #[serde(rename = "Benchmark")]
    benchmark: Option<String>,
    /// Origination / open / swap start
    #[serde(rename = "StartDate")]
    start_date: Option<NaiveDate>,
    /// Maturity / swap end
    #[serde(rename = "MaturityDate")]
    maturity_date: Option<NaiveDate>,
    /// Payment frequency, or swap fixed-leg frequency
    #[serde(rename = "PaymentFrequency")]
    payment_frequency: Option<String>,
    #[serde(rename = "RepricingFrequency")]
    repricing_frequency: Option<String>,
    #[serde(rename = "NextRepricingDate")]
    next_repricing_date: Option<NaiveDate>,
    /// Swap floating-leg frequency
    #[serde(rename = "FloatingFrequency")]
    floating_frequency: Option<String>,
}

impl CsvRow {
    fn frequency(label: &Option<String>, default: Frequency) -> EngineResult<Frequency> {
        match label.as_deref().map(str::trim) {
            None | Some("") => Ok(default),
            Some(l) => Frequency::from_label(l),
        }
    }

    fn required_rate(&self, value: Option<f64>, name: &str) -> EngineResult<f64> {
        value.ok_or_else(|| EngineError::InvalidInstrument {
            id: self.instrument_id.clone(),
            reason: format!("{} is required for {}", name, self.instrument_type),
        })
    }

    fn to_instrument(self) -> EngineResult<Instrument> {
        let instrument = match self.instrument_type.trim() {
            "Fixed Rate Loan" | "HTM Security" => Instrument::FixedLoan(FixedLoan {
                rate: self.required_rate(self.rate, "Rate")?,
                payment_frequency: Self::frequency(&self.payment_frequency, Frequency::Monthly)?,
                id: self.instrument_id,
                notional: self.notional,
                origination_date: self.start_date,
                maturity_date: self.maturity_date,
            }),
            "Floating Rate Loan" => {
                let payment_frequency = Self::frequency(&self.payment_frequency, Frequency::Monthly)?;
                Instrument::FloatingLoan(FloatingLoan {
                    spread: self.spread.unwrap_or(0.0),
                    repricing_frequency: Self::frequency(&self.repricing_frequency, payment_frequency)?,
                    payment_frequency,
                    id: self.instrument_id,
                    notional: self.notional,
                    benchmark: self.benchmark,
                    current_rate: self.rate,
                    origination_date: self.start_date,
                    maturity_date: self.maturity_date,
                    next_repricing_date: self.next_repricing_date,
                })
            }
            label @ ("CD" | "Wholesale Funding") => {
                let kind = if label == "CD" {
                    TermFundingKind::CertificateOfDeposit
                } else {
                    TermFundingKind::WholesaleFunding
                };
                Instrument::TermFunding(TermFunding {
                    rate: self.required_rate(self.rate, "Rate")?,
                    payment_frequency: Self::frequency(&self.payment_frequency, Frequency::Annually)?,
                    id: self.instrument_id,
                    kind,
                    balance: self.notional,
                    open_date: self.start_date,
                    maturity_date: self.maturity_date,
                })
            }
            label @ ("Checking" | "Savings") => {
                let kind = if label == "Checking" {
                    DepositKind::Checking
                } else {
                    DepositKind::Savings
                };
                let repricing_frequency = match self.repricing_frequency.as_deref().map(str::trim) {
                    None | Some("") => None,
                    Some(l) => Some(Frequency::from_label(l)?),
                };
                Instrument::NonMaturityDeposit(NonMaturityDeposit {
                    rate: self.rate.unwrap_or(0.0),
                    payment_frequency: Self::frequency(&self.payment_frequency, Frequency::Monthly)?,
                    id: self.instrument_id,
                    kind,
                    balance: self.notional,
                    open_date: self.start_date,
                    repricing_frequency,
                    next_repricing_date: self.next_repricing_date,
                })
            }
            label @ ("Payer Swap" | "Receiver Swap") => {
                let direction = if label == "Payer Swap" {
                    SwapDirection::Payer
                } else {
                    SwapDirection::Receiver
                };
                Instrument::Swap(InterestRateSwap {
                    fixed_rate: self.required_rate(self.rate, "Rate")?,
                    fixed_frequency: Self::frequency(&self.payment_frequency, Frequency::Annually)?,
                    floating_frequency: Self::frequency(&self.floating_frequency, Frequency::Annually)?,
                    id: self.instrument_id,
                    direction,
                    notional: self.notional,
                    floating_spread: self.spread.unwrap_or(0.0),
                    start_date: self.start_date,
                    end_date: self.maturity_date,
                })
            }
            other => {
                return Err(EngineError::UnknownLabel {
                    kind: "instrument type",
                    value: other.to_string(),
                })
            }
        };
        Ok(instrument)
    }
}

/// Instruments read from a snapshot, plus the rows that could not be read
#[derive(Debug, Clone, Default)]
pub struct InstrumentSnapshot {
    pub instruments: Vec<Instrument>,
    pub rejected: Vec<SkippedInstrument>,
}

impl InstrumentSnapshot {
    fn reject(&mut self, id: String, reason: String) {
        warn!("Rejecting snapshot row {}: {}", id, reason);
        self.rejected.push(SkippedInstrument { id, reason });
    }
}

/// Load all instruments from a CSV file.
///
/// Rows that cannot become an instrument are rejected one by one; only
/// file-level problems (missing file, bad header, broken encoding) fail the
/// load.
pub fn load_instruments<P: AsRef<Path>>(path: P) -> EngineResult<InstrumentSnapshot> {
    let reader = Reader::from_path(path)?;
    read_rows(reader)
}

/// Load instruments from any reader (e.g., string buffer, network stream)
pub fn load_instruments_from_reader<R: std::io::Read>(reader: R) -> EngineResult<InstrumentSnapshot> {
    read_rows(Reader::from_reader(reader))
}

/// Load instruments from the bundled sample snapshot
pub fn load_default_instruments() -> EngineResult<InstrumentSnapshot> {
    load_instruments(DEFAULT_INSTRUMENTS_PATH)
}

/// Identifier for a row: its InstrumentID, or its line when that is blank
fn row_id(record: &StringRecord, id_column: Option<usize>, line: u64) -> String {
    id_column
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map_or_else(|| format!("line {}", line), str::to_string)
}

fn read_rows<R: std::io::Read>(mut reader: Reader<R>) -> EngineResult<InstrumentSnapshot> {
    let headers = reader.headers()?.clone();
    let id_column = headers.iter().position(|h| h.trim() == "InstrumentID");
    let mut snapshot = InstrumentSnapshot::default();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::UnequalLengths { .. }) => {
                let line = e.position().map_or(0, |p| p.line());
                snapshot.reject(format!("line {}", line), e.to_string());
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let line = record.position().map_or(0, |p| p.line());
        let id = row_id(&record, id_column, line);
        let parsed = record
            .deserialize::<CsvRow>(Some(&headers))
            .map_err(|e| EngineError::InvalidInstrument {
                id: id.clone(),
                reason: e.to_string(),
            })
            .and_then(CsvRow::to_instrument);

        match parsed {
            Ok(instrument) => snapshot.instruments.push(instrument),
            Err(e) if e.is_instrument_error() => snapshot.reject(id, e.to_string()),
            Err(e) => return Err(e),
        }
    }
    Ok(snapshot)
}
