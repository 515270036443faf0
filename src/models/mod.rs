use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Instrument categories available in the entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentType {
    Stock,
    #[serde(rename = "Mutual Fund")]
    MutualFund,
    #[serde(rename = "ETF")]
    Etf,
    Bond,
    #[serde(rename = "REIT")]
    Reit,
}

impl InstrumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stock => "Stock",
            Self::MutualFund => "Mutual Fund",
            Self::Etf => "ETF",
            Self::Bond => "Bond",
            Self::Reit => "REIT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Stock" => Some(Self::Stock),
            "Mutual Fund" => Some(Self::MutualFund),
            "ETF" => Some(Self::Etf),
            "Bond" => Some(Self::Bond),
            "REIT" => Some(Self::Reit),
            _ => None,
        }
    }
}

/// What a journal entry records: a purchase, a sale, or a dividend
/// credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
    Dividend,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
            Self::Dividend => "Dividend",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Buy" => Some(Self::Buy),
            "Sell" => Some(Self::Sell),
            "Dividend" => Some(Self::Dividend),
            _ => None,
        }
    }
}

/// A recorded journal entry.
///
/// Immutable once created, except for `outcome_notes` (revised when the
/// user reviews the decision) and `current_price`/`unrealized_pnl`
/// (revised by externally supplied price updates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub date: NaiveDate,
    pub instrument_type: InstrumentType,
    /// Uppercased at entry time
    pub symbol: String,
    pub name: String,
    pub action: TradeAction,
    pub quantity: f64,
    /// Per-unit price at entry time
    pub price: f64,
    /// quantity × price captured at entry time, never re-derived
    pub total_value: f64,
    pub rationale: String,
    pub outcome_notes: String,
    /// Defaults to the entry price until a price update arrives
    pub current_price: f64,
    pub unrealized_pnl: f64,
}

/// Field set submitted by the entry form, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    pub date: NaiveDate,
    pub instrument_type: InstrumentType,
    pub symbol: String,
    pub name: String,
    pub action: TradeAction,
    pub quantity: f64,
    pub price: f64,
    pub rationale: String,
    pub outcome_notes: Option<String>,
}

/// Rejection reasons for the transaction-creation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("symbol must not be empty")]
    EmptySymbol,
    #[error("investment name must not be empty")]
    EmptyName,
    #[error("quantity must be greater than zero")]
    NonPositiveQuantity,
    #[error("price must be greater than zero")]
    NonPositivePrice,
}

impl Transaction {
    /// Validate a draft and derive the stored record.
    ///
    /// The symbol is normalized to uppercase, `total_value` is captured
    /// as quantity × price, and the current price starts out equal to
    /// the entry price with zero unrealized P&L.
    pub fn from_draft(draft: TransactionDraft) -> Result<Self, ValidationError> {
        let symbol = draft.symbol.trim();
        if symbol.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !draft.quantity.is_finite() || draft.quantity <= 0.0 {
            return Err(ValidationError::NonPositiveQuantity);
        }
        if !draft.price.is_finite() || draft.price <= 0.0 {
            return Err(ValidationError::NonPositivePrice);
        }

        Ok(Self {
            date: draft.date,
            instrument_type: draft.instrument_type,
            symbol: symbol.to_uppercase(),
            name: name.to_string(),
            action: draft.action,
            quantity: draft.quantity,
            price: draft.price,
            total_value: draft.quantity * draft.price,
            rationale: draft.rationale,
            outcome_notes: draft.outcome_notes.unwrap_or_default(),
            current_price: draft.price,
            unrealized_pnl: 0.0,
        })
    }
}

/// Parse date string flexibly - handles multiple date formats
///
/// Supported formats:
/// - "YYYY-MM-DD" (e.g., "2024-01-15")
/// - "YYYY-MM-DD HH:MM:SS" (e.g., "2024-01-15 00:00:00")
/// - "YYYY-MM-DDTHH:MM:SS" (ISO8601, e.g., "2024-01-15T00:00:00")
pub fn parse_date_flexible(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}
