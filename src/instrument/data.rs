//! Instrument data structures for the banking book snapshot

use crate::curve::Tenor;
use crate::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Payment or repricing frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Monthly,
    Quarterly,
    SemiAnnually,
    Annually,
}

impl Frequency {
    /// Months between two events
    pub fn months(&self) -> u32 {
        match self {
            Frequency::Monthly => 1,
            Frequency::Quarterly => 3,
            Frequency::SemiAnnually => 6,
            Frequency::Annually => 12,
        }
    }

    /// Fraction of a year accrued per period (monthly = 1/12 ... annually = 1)
    pub fn period_fraction(&self) -> f64 {
        self.months() as f64 / 12.0
    }

    /// Curve tenor matching one repricing period
    pub fn repricing_tenor(&self) -> Tenor {
        match self {
            Frequency::Monthly => Tenor::M1,
            Frequency::Quarterly => Tenor::M3,
            Frequency::SemiAnnually => Tenor::M6,
            Frequency::Annually => Tenor::Y1,
        }
    }

    /// Parse an input-file label ("Monthly", "Quarterly", "Semi-Annually", "Annually")
    pub fn from_label(label: &str) -> EngineResult<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "monthly" | "m" => Ok(Frequency::Monthly),
            "quarterly" | "q" => Ok(Frequency::Quarterly),
            "semi-annually" | "semiannually" | "semi-annual" | "s" => Ok(Frequency::SemiAnnually),
            "annually" | "annual" | "a" => Ok(Frequency::Annually),
            _ => Err(EngineError::UnknownLabel {
                kind: "frequency",
                value: label.to_string(),
            }),
        }
    }
}

/// Which leg a swap holder pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapDirection {
    /// Pays fixed, receives floating
    Payer,
    /// Receives fixed, pays floating
    Receiver,
}

impl SwapDirection {
    /// Sign applied to fixed-leg flows (+1 = received)
    pub fn fixed_sign(&self) -> f64 {
        match self {
            SwapDirection::Payer => -1.0,
            SwapDirection::Receiver => 1.0,
        }
    }

    /// Sign applied to floating-leg flows (+1 = received)
    pub fn floating_sign(&self) -> f64 {
        -self.fixed_sign()
    }

    pub fn label(&self) -> &'static str {
        match self {
            SwapDirection::Payer => "Payer",
            SwapDirection::Receiver => "Receiver",
        }
    }
}

/// Balance sheet side used for EVE/NII aggregation and gap tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalanceSheetSide {
    Asset,
    Liability,
    Derivative,
}

/// Term funding flavours (contractual maturity, fixed rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermFundingKind {
    CertificateOfDeposit,
    WholesaleFunding,
}

/// Non-maturity deposit flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepositKind {
    Checking,
    Savings,
}

/// Fixed-rate loan or held-to-maturity asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedLoan {
    pub id: String,
    pub notional: f64,
    /// Annual contractual rate
    pub rate: f64,
    pub origination_date: Option<NaiveDate>,
    pub maturity_date: Option<NaiveDate>,
    pub payment_frequency: Frequency,
}

/// Floating-rate loan repricing off the curve plus a spread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingLoan {
    pub id: String,
    pub notional: f64,
    /// Spread over the curve rate at each reset
    pub spread: f64,
    /// Benchmark name for reporting (e.g. "SOFR", "Prime")
    pub benchmark: Option<String>,
    /// Rate fixed at the last reset, if recorded
    pub current_rate: Option<f64>,
    pub origination_date: Option<NaiveDate>,
    pub maturity_date: Option<NaiveDate>,
    pub payment_frequency: Frequency,
    pub repricing_frequency: Frequency,
    pub next_repricing_date: Option<NaiveDate>,
}

/// CD or wholesale funding: fixed-rate liability with a contractual maturity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermFunding {
    pub id: String,
    pub kind: TermFundingKind,
    pub balance: f64,
    pub rate: f64,
    pub open_date: Option<NaiveDate>,
    pub maturity_date: Option<NaiveDate>,
    pub payment_frequency: Frequency,
}

/// Checking or savings balance with no contractual maturity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonMaturityDeposit {
    pub id: String,
    pub kind: DepositKind,
    pub balance: f64,
    /// Rate currently paid
    pub rate: f64,
    pub open_date: Option<NaiveDate>,
    pub payment_frequency: Frequency,
    /// Administered repricing frequency (monthly when absent)
    pub repricing_frequency: Option<Frequency>,
    pub next_repricing_date: Option<NaiveDate>,
}

/// Plain-vanilla fixed/floating interest rate swap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestRateSwap {
    pub id: String,
    pub direction: SwapDirection,
    pub notional: f64,
    pub fixed_rate: f64,
    pub floating_spread: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub fixed_frequency: Frequency,
    pub floating_frequency: Frequency,
}

impl InterestRateSwap {
    /// Active when `start <= today < end`
    pub fn is_active(&self, today: NaiveDate) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= today && today < end,
            _ => false,
        }
    }
}

/// A banking book position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Instrument {
    FixedLoan(FixedLoan),
    FloatingLoan(FloatingLoan),
    TermFunding(TermFunding),
    NonMaturityDeposit(NonMaturityDeposit),
    Swap(InterestRateSwap),
}

impl Instrument {
    pub fn id(&self) -> &str {
        match self {
            Instrument::FixedLoan(l) => &l.id,
            Instrument::FloatingLoan(l) => &l.id,
            Instrument::TermFunding(d) => &d.id,
            Instrument::NonMaturityDeposit(d) => &d.id,
            Instrument::Swap(s) => &s.id,
        }
    }

    /// Notional or balance
    pub fn notional(&self) -> f64 {
        match self {
            Instrument::FixedLoan(l) => l.notional,
            Instrument::FloatingLoan(l) => l.notional,
            Instrument::TermFunding(d) => d.balance,
            Instrument::NonMaturityDeposit(d) => d.balance,
            Instrument::Swap(s) => s.notional,
        }
    }

    pub fn side(&self) -> BalanceSheetSide {
        match self {
            Instrument::FixedLoan(_) | Instrument::FloatingLoan(_) => BalanceSheetSide::Asset,
            Instrument::TermFunding(_) | Instrument::NonMaturityDeposit(_) => BalanceSheetSide::Liability,
            Instrument::Swap(_) => BalanceSheetSide::Derivative,
        }
    }

    /// Broad type used in driver and composition records
    pub fn instrument_type(&self) -> &'static str {
        match self {
            Instrument::FixedLoan(_) | Instrument::FloatingLoan(_) => "Loan",
            Instrument::TermFunding(f) => match f.kind {
                TermFundingKind::CertificateOfDeposit => "Deposit",
                TermFundingKind::WholesaleFunding => "Funding",
            },
            Instrument::NonMaturityDeposit(_) => "Deposit",
            Instrument::Swap(_) => "Derivative",
        }
    }

    /// Finer category within the type
    pub fn category(&self) -> &'static str {
        match self {
            Instrument::FixedLoan(_) => "Fixed",
            Instrument::FloatingLoan(_) => "Floating",
            Instrument::TermFunding(f) => match f.kind {
                TermFundingKind::CertificateOfDeposit => "CD",
                TermFundingKind::WholesaleFunding => "Wholesale",
            },
            Instrument::NonMaturityDeposit(d) => match d.kind {
                DepositKind::Checking => "Checking",
                DepositKind::Savings => "Savings",
            },
            Instrument::Swap(s) => s.direction.label(),
        }
    }

    /// Contractual rate where one is known (fixed rate, current floating rate)
    pub fn contractual_rate(&self) -> Option<f64> {
        match self {
            Instrument::FixedLoan(l) => Some(l.rate),
            Instrument::FloatingLoan(l) => l.current_rate,
            Instrument::TermFunding(d) => Some(d.rate),
            Instrument::NonMaturityDeposit(d) => Some(d.rate),
            Instrument::Swap(s) => Some(s.fixed_rate),
        }
    }

    /// Final maturity or end date (none for non-maturity deposits)
    pub fn maturity_date(&self) -> Option<NaiveDate> {
        match self {
            Instrument::FixedLoan(l) => l.maturity_date,
            Instrument::FloatingLoan(l) => l.maturity_date,
            Instrument::TermFunding(d) => d.maturity_date,
            Instrument::NonMaturityDeposit(_) => None,
            Instrument::Swap(s) => s.end_date,
        }
    }

    /// Check the record can drive cash-flow generation
    pub fn validate(&self) -> EngineResult<()> {
        let id = self.id();
        let amount = self.notional();
        if !amount.is_finite() || amount < 0.0 {
            return Err(EngineError::InvalidInstrument {
                id: id.to_string(),
                reason: format!("notional must be finite and non-negative, got {}", amount),
            });
        }

        let missing = |field| EngineError::MissingDate {
            id: id.to_string(),
            field,
        };

        match self {
            Instrument::FixedLoan(l) => {
                l.maturity_date.ok_or_else(|| missing("maturity_date"))?;
                check_rate(id, "rate", l.rate)?;
            }
            Instrument::FloatingLoan(l) => {
                l.maturity_date.ok_or_else(|| missing("maturity_date"))?;
                check_rate(id, "spread", l.spread)?;
                if let Some(rate) = l.current_rate {
                    check_rate(id, "current_rate", rate)?;
                }
            }
            Instrument::TermFunding(d) => {
                d.maturity_date.ok_or_else(|| missing("maturity_date"))?;
                check_rate(id, "rate", d.rate)?;
            }
            Instrument::NonMaturityDeposit(d) => {
                check_rate(id, "rate", d.rate)?;
            }
            Instrument::Swap(s) => {
                let start = s.start_date.ok_or_else(|| missing("start_date"))?;
                let end = s.end_date.ok_or_else(|| missing("end_date"))?;
                if end <= start {
                    return Err(EngineError::InvalidInstrument {
                        id: id.to_string(),
                        reason: format!("end date {} is not after start date {}", end, start),
                    });
                }
                check_rate(id, "fixed_rate", s.fixed_rate)?;
                check_rate(id, "floating_spread", s.floating_spread)?;
            }
        }
        Ok(())
    }
}

fn check_rate(id: &str, name: &str, value: f64) -> EngineResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::InvalidInstrument {
            id: id.to_string(),
            reason: format!("{} is not a finite number", name),
        })
    }
}
