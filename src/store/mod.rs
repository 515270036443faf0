//! Session journal store
//!
//! Owns the transaction list for one interactive session. The store is
//! created at session start and lives until the session ends; it grows
//! by appending validated entries and only ever shrinks through an
//! explicit clear or a wholesale replacement (CSV import). Nothing is
//! persisted; an export is the user's way of keeping the data.

use std::io::Read;

use chrono::NaiveDate;

use crate::csv_io::{self, ImportError};
use crate::models::{
    InstrumentType, TradeAction, Transaction, TransactionDraft, ValidationError,
};

/// In-memory transaction journal for a single user session.
#[derive(Debug, Default)]
pub struct JournalStore {
    transactions: Vec<Transaction>,
}

impl JournalStore {
    /// Empty journal.
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }

    /// Journal pre-seeded with the demo transactions.
    pub fn with_sample_data() -> Self {
        Self {
            transactions: sample_transactions(),
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// The first `n` transactions in entry order (dashboard preview).
    pub fn recent(&self, n: usize) -> &[Transaction] {
        &self.transactions[..n.min(self.transactions.len())]
    }

    /// Validate a draft and append the resulting transaction.
    ///
    /// On validation failure nothing is appended and the journal is
    /// unchanged.
    pub fn add(&mut self, draft: TransactionDraft) -> Result<(), ValidationError> {
        let txn = Transaction::from_draft(draft)?;
        log::info!("Journal: recorded {} {}", txn.action.as_str(), txn.symbol);
        self.transactions.push(txn);
        Ok(())
    }

    /// Revise the outcome notes of an existing entry.
    ///
    /// Returns the updated transaction, or `None` when no entry exists
    /// at `index`.
    pub fn set_outcome_notes(&mut self, index: usize, notes: impl Into<String>) -> Option<&Transaction> {
        let txn = self.transactions.get_mut(index)?;
        txn.outcome_notes = notes.into();
        Some(&*txn)
    }

    /// Apply an externally supplied price revision to an entry.
    ///
    /// Returns the updated transaction, or `None` when no entry exists
    /// at `index`.
    pub fn apply_price_update(
        &mut self,
        index: usize,
        current_price: f64,
        unrealized_pnl: f64,
    ) -> Option<&Transaction> {
        let txn = self.transactions.get_mut(index)?;
        txn.current_price = current_price;
        txn.unrealized_pnl = unrealized_pnl;
        Some(&*txn)
    }

    /// Drop every transaction (explicit user action).
    pub fn clear(&mut self) {
        log::info!("Journal: cleared {} transactions", self.transactions.len());
        self.transactions.clear();
    }

    /// Replace the journal wholesale.
    pub fn replace_all(&mut self, transactions: Vec<Transaction>) {
        log::info!(
            "Journal: replaced {} transactions with {}",
            self.transactions.len(),
            transactions.len()
        );
        self.transactions = transactions;
    }

    /// Reload the demo transactions, replacing the current journal.
    pub fn load_sample_data(&mut self) {
        self.replace_all(sample_transactions());
    }

    /// Import a journal CSV, replacing the current journal wholesale.
    ///
    /// The current journal is left untouched unless the whole file
    /// parses. Returns the number of imported transactions.
    pub fn import_csv<R: Read>(&mut self, reader: R) -> Result<usize, ImportError> {
        let transactions = csv_io::read_transactions(reader)?;
        let count = transactions.len();
        self.replace_all(transactions);
        Ok(count)
    }

    /// Export the journal as CSV text.
    pub fn export_csv(&self) -> Result<String, csv::Error> {
        csv_io::write_transactions(&self.transactions)
    }
}

/// The demo journal: two open Buy positions and one closed Sell, all in
/// INR.
pub fn sample_transactions() -> Vec<Transaction> {
    vec![
        Transaction {
            date: date(2024, 1, 15),
            instrument_type: InstrumentType::Stock,
            symbol: "TCS.NS".to_string(),
            name: "Tata Consultancy Services".to_string(),
            action: TradeAction::Buy,
            quantity: 10.0,
            price: 3500.0,
            total_value: 35000.0,
            rationale: "Strong Q3 results and digital transformation demand".to_string(),
            outcome_notes: "Stock up 8% after good quarterly results".to_string(),
            current_price: 3780.0,
            unrealized_pnl: 2800.0,
        },
        Transaction {
            date: date(2024, 2, 10),
            instrument_type: InstrumentType::MutualFund,
            symbol: "SBI-BLUECHIP".to_string(),
            name: "SBI Bluechip Fund".to_string(),
            action: TradeAction::Buy,
            quantity: 100.0,
            price: 850.0,
            total_value: 85000.0,
            rationale: "Diversified large cap exposure for long term wealth creation"
                .to_string(),
            outcome_notes: "Steady performance as expected".to_string(),
            current_price: 895.5,
            unrealized_pnl: 4550.0,
        },
        Transaction {
            date: date(2024, 3, 5),
            instrument_type: InstrumentType::Stock,
            symbol: "INFY.NS".to_string(),
            name: "Infosys Limited".to_string(),
            action: TradeAction::Sell,
            quantity: 20.0,
            price: 1450.0,
            total_value: 29000.0,
            rationale: "Booking profits after 25% gain, concerned about margin pressure"
                .to_string(),
            outcome_notes: "Good exit timing, stock consolidated afterwards".to_string(),
            current_price: 1420.0,
            unrealized_pnl: 0.0,
        },
    ]
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid sample date")
}
