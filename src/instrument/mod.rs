//! Instrument records and snapshot loading

mod data;
pub mod loader;

pub use data::{
    BalanceSheetSide, DepositKind, FixedLoan, FloatingLoan, Frequency, Instrument,
    InterestRateSwap, NonMaturityDeposit, SwapDirection, TermFunding, TermFundingKind,
};
pub use loader::{load_default_instruments, load_instruments, load_instruments_from_reader, InstrumentSnapshot};
