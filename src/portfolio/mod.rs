//! Portfolio aggregation
//!
//! Reduces the journal's transaction list into per-instrument holding
//! summaries and portfolio-level totals. Everything here is a pure
//! function over the input slice with no caching; the caller recomputes
//! on every render.
//!
//! Holdings are composed from Buy transactions only. Sell and Dividend
//! entries stay out of the grouped view but still contribute to the
//! portfolio-wide unrealized P&L sum.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::{InstrumentType, TradeAction, Transaction};

/// Aggregated position in one instrument across its Buy transactions.
///
/// The grouping key is `(symbol, name, instrument_type)`, matched
/// exactly as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingSummary {
    pub symbol: String,
    pub name: String,
    pub instrument_type: InstrumentType,
    pub total_quantity: f64,
    pub total_cost: f64,
    /// Current price of the group's most recently entered Buy
    pub latest_current_price: f64,
    /// total_cost / total_quantity, 0 for an empty position
    pub avg_cost: f64,
    /// total_quantity × latest_current_price
    pub market_value: f64,
    pub unrealized_pnl: f64,
    /// Gain/loss relative to cost, in percent, 0 when cost is 0
    pub pnl_percent: f64,
}

/// Portfolio-level dashboard figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    /// Sum of total_value over Buy transactions
    pub total_investment: f64,
    /// Sum of quantity × current_price over Buy transactions.
    /// Valued per line: each buy keeps its own price snapshot.
    pub current_value: f64,
    /// Sum of unrealized_pnl over ALL transactions
    pub total_pnl: f64,
    /// total_pnl relative to total_investment, in percent
    pub pnl_percentage: f64,
    /// The single transaction with the highest unrealized P&L,
    /// absent for an empty journal
    pub best_performer: Option<Transaction>,
}

/// Buy-side invested value grouped by instrument type (allocation
/// chart data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAllocation {
    pub instrument_type: InstrumentType,
    pub total_value: f64,
}

/// Aggregate the transaction list into holding summaries and totals.
///
/// Groups appear in first-appearance order of their key. Idempotent:
/// the same input always produces the same output.
pub fn summarize(transactions: &[Transaction]) -> (Vec<HoldingSummary>, PortfolioTotals) {
    let mut summaries: Vec<HoldingSummary> = Vec::new();

    for txn in buys(transactions) {
        let existing = summaries.iter_mut().find(|s| {
            s.symbol == txn.symbol
                && s.name == txn.name
                && s.instrument_type == txn.instrument_type
        });
        match existing {
            Some(summary) => {
                summary.total_quantity += txn.quantity;
                summary.total_cost += txn.total_value;
                summary.latest_current_price = txn.current_price;
                summary.unrealized_pnl += txn.unrealized_pnl;
            }
            None => summaries.push(HoldingSummary {
                symbol: txn.symbol.clone(),
                name: txn.name.clone(),
                instrument_type: txn.instrument_type,
                total_quantity: txn.quantity,
                total_cost: txn.total_value,
                latest_current_price: txn.current_price,
                avg_cost: 0.0,
                market_value: 0.0,
                unrealized_pnl: txn.unrealized_pnl,
                pnl_percent: 0.0,
            }),
        }
    }

    for summary in &mut summaries {
        summary.avg_cost = if summary.total_quantity > 0.0 {
            summary.total_cost / summary.total_quantity
        } else {
            0.0
        };
        summary.market_value = summary.total_quantity * summary.latest_current_price;
        summary.pnl_percent = if summary.total_cost > 0.0 {
            (summary.market_value - summary.total_cost) / summary.total_cost * 100.0
        } else {
            0.0
        };
    }

    (summaries, totals(transactions))
}

/// Compute the dashboard totals over the full transaction list.
pub fn totals(transactions: &[Transaction]) -> PortfolioTotals {
    let mut total_investment = 0.0;
    let mut current_value = 0.0;
    let mut total_pnl = 0.0;

    for txn in transactions {
        if txn.action == TradeAction::Buy {
            total_investment += txn.total_value;
            current_value += txn.quantity * txn.current_price;
        }
        total_pnl += txn.unrealized_pnl;
    }

    let pnl_percentage = if total_investment > 0.0 {
        total_pnl / total_investment * 100.0
    } else {
        0.0
    };

    // First occurrence wins on equal P&L
    let mut best_performer: Option<&Transaction> = None;
    for txn in transactions {
        let improves = match best_performer {
            Some(best) => txn.unrealized_pnl > best.unrealized_pnl,
            None => true,
        };
        if improves {
            best_performer = Some(txn);
        }
    }

    PortfolioTotals {
        total_investment,
        current_value,
        total_pnl,
        pnl_percentage,
        best_performer: best_performer.cloned(),
    }
}

/// The `n` holdings with the largest unrealized P&L, descending.
/// Ties keep the holdings' first-appearance order.
pub fn top_performers(summaries: &[HoldingSummary], n: usize) -> Vec<HoldingSummary> {
    ranked_by_pnl(summaries, n, |a, b| {
        b.unrealized_pnl
            .partial_cmp(&a.unrealized_pnl)
            .unwrap_or(Ordering::Equal)
    })
}

/// The `n` holdings with the smallest unrealized P&L, ascending.
/// Ties keep the holdings' first-appearance order.
pub fn bottom_performers(summaries: &[HoldingSummary], n: usize) -> Vec<HoldingSummary> {
    ranked_by_pnl(summaries, n, |a, b| {
        a.unrealized_pnl
            .partial_cmp(&b.unrealized_pnl)
            .unwrap_or(Ordering::Equal)
    })
}

fn ranked_by_pnl(
    summaries: &[HoldingSummary],
    n: usize,
    compare: impl Fn(&HoldingSummary, &HoldingSummary) -> Ordering,
) -> Vec<HoldingSummary> {
    let mut ranked = summaries.to_vec();
    // sort_by is stable, so equal P&L keeps input order
    ranked.sort_by(compare);
    ranked.truncate(n);
    ranked
}

/// Buy-side invested value per instrument type, in first-appearance
/// order.
pub fn allocation_by_type(transactions: &[Transaction]) -> Vec<TypeAllocation> {
    let mut allocations: Vec<TypeAllocation> = Vec::new();

    for txn in buys(transactions) {
        match allocations
            .iter_mut()
            .find(|a| a.instrument_type == txn.instrument_type)
        {
            Some(slot) => slot.total_value += txn.total_value,
            None => allocations.push(TypeAllocation {
                instrument_type: txn.instrument_type,
                total_value: txn.total_value,
            }),
        }
    }

    allocations
}

fn buys(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions
        .iter()
        .filter(|t| t.action == TradeAction::Buy)
}
