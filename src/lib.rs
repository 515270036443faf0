//! Core library for a single-user personal investment journal.
//!
//! The presentation layer (forms and charts) lives elsewhere and calls
//! into this crate for everything that is actual logic: the typed
//! transaction model, the session journal store, CSV interchange,
//! portfolio aggregation and INR display formatting.

pub mod csv_io;
pub mod currency;
pub mod models;
pub mod portfolio;
pub mod store;

pub use csv_io::ImportError;
pub use currency::{format_inr, FormatError};
pub use models::{
    InstrumentType, TradeAction, Transaction, TransactionDraft, ValidationError,
};
pub use portfolio::{
    allocation_by_type, bottom_performers, summarize, top_performers, totals,
    HoldingSummary, PortfolioTotals, TypeAllocation,
};
pub use store::JournalStore;
