//! CSV import and export for the journal
//!
//! The interchange format is one row per transaction with the columns
//! the entry form collects. Import validates the header before touching
//! any row and converts rows all-or-nothing; export writes every stored
//! field so that an exported journal re-imports losslessly.

use csv::{ReaderBuilder, StringRecord, Trim, Writer};
use std::io::Read;
use thiserror::Error;

use crate::models::{parse_date_flexible, InstrumentType, TradeAction, Transaction};

/// Columns a journal CSV must provide, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "Date",
    "Type",
    "Symbol",
    "Name",
    "Action",
    "Quantity",
    "Price",
    "Total_Value",
    "Rationale",
];

/// Recognized optional columns; absent or empty cells fall back to the
/// entry-time defaults.
const OUTCOME_NOTES_COLUMN: &str = "Outcome_Notes";
const CURRENT_PRICE_COLUMN: &str = "Current_Price";
const UNREALIZED_PNL_COLUMN: &str = "Unrealized_PnL";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum ImportError {
    /// The uploaded table lacks part of the required column set.
    #[error("CSV must contain columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },
    /// A data row could not be converted into a transaction.
    #[error("row {line}: {message}")]
    Row { line: usize, message: String },
    /// The data could not be read as CSV at all.
    #[error(transparent)]
    Malformed(#[from] csv::Error),
}

/// Column positions resolved from the header row.
struct ColumnIndex {
    date: usize,
    instrument_type: usize,
    symbol: usize,
    name: usize,
    action: usize,
    quantity: usize,
    price: usize,
    total_value: usize,
    rationale: usize,
    outcome_notes: Option<usize>,
    current_price: Option<usize>,
    unrealized_pnl: Option<usize>,
}

impl ColumnIndex {
    /// Resolve the required and optional columns, reporting every
    /// missing required column at once. Matching is exact and
    /// case-sensitive; unknown columns are permitted and ignored.
    fn from_headers(headers: &StringRecord) -> Result<Self, ImportError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|column| position(column).is_none())
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns { columns: missing });
        }

        let required = |name: &str| {
            // verified present above
            position(name).unwrap_or_default()
        };

        Ok(Self {
            date: required("Date"),
            instrument_type: required("Type"),
            symbol: required("Symbol"),
            name: required("Name"),
            action: required("Action"),
            quantity: required("Quantity"),
            price: required("Price"),
            total_value: required("Total_Value"),
            rationale: required("Rationale"),
            outcome_notes: position(OUTCOME_NOTES_COLUMN),
            current_price: position(CURRENT_PRICE_COLUMN),
            unrealized_pnl: position(UNREALIZED_PNL_COLUMN),
        })
    }
}

/// Parse a journal CSV into transactions.
///
/// Fails without producing any rows if the header misses a required
/// column or any row is malformed, so a caller can safely replace its
/// journal with the result.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>, ImportError> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut transactions = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        // header occupies line 1
        let line = row + 2;
        let record = record?;
        transactions.push(parse_row(&columns, &record, line)?);
    }

    log::info!("CSV import: parsed {} transactions", transactions.len());
    Ok(transactions)
}

fn parse_row(
    columns: &ColumnIndex,
    record: &StringRecord,
    line: usize,
) -> Result<Transaction, ImportError> {
    let cell = |index: usize| record.get(index).unwrap_or("");
    let row_error = |message: String| ImportError::Row { line, message };

    let date_cell = cell(columns.date);
    let date = parse_date_flexible(date_cell)
        .ok_or_else(|| row_error(format!("invalid date '{date_cell}'")))?;

    let type_cell = cell(columns.instrument_type);
    let instrument_type = InstrumentType::from_str(type_cell)
        .ok_or_else(|| row_error(format!("unknown investment type '{type_cell}'")))?;

    let action_cell = cell(columns.action);
    let action = TradeAction::from_str(action_cell)
        .ok_or_else(|| row_error(format!("unknown action '{action_cell}'")))?;

    let quantity = parse_number(cell(columns.quantity))
        .ok_or_else(|| row_error(format!("invalid quantity '{}'", cell(columns.quantity))))?;
    let price = parse_number(cell(columns.price))
        .ok_or_else(|| row_error(format!("invalid price '{}'", cell(columns.price))))?;
    let total_value = parse_number(cell(columns.total_value))
        .ok_or_else(|| row_error(format!("invalid total value '{}'", cell(columns.total_value))))?;

    let current_price = match columns.current_price.map(cell) {
        Some(raw) if !raw.is_empty() => parse_number(raw)
            .ok_or_else(|| row_error(format!("invalid current price '{raw}'")))?,
        _ => price,
    };
    let unrealized_pnl = match columns.unrealized_pnl.map(cell) {
        Some(raw) if !raw.is_empty() => parse_number(raw)
            .ok_or_else(|| row_error(format!("invalid unrealized P&L '{raw}'")))?,
        _ => 0.0,
    };
    let outcome_notes = columns
        .outcome_notes
        .map(cell)
        .unwrap_or_default()
        .to_string();

    Ok(Transaction {
        date,
        instrument_type,
        symbol: cell(columns.symbol).to_string(),
        name: cell(columns.name).to_string(),
        action,
        quantity,
        price,
        total_value,
        rationale: cell(columns.rationale).to_string(),
        outcome_notes,
        current_price,
        unrealized_pnl,
    })
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Serialize the journal as CSV text.
///
/// Writes the required columns in import order followed by the
/// remaining stored fields, so the output re-imports without loss.
pub fn write_transactions(transactions: &[Transaction]) -> Result<String, csv::Error> {
    let mut writer = Writer::from_writer(Vec::new());

    writer.write_record([
        "Date",
        "Type",
        "Symbol",
        "Name",
        "Action",
        "Quantity",
        "Price",
        "Total_Value",
        "Rationale",
        OUTCOME_NOTES_COLUMN,
        CURRENT_PRICE_COLUMN,
        UNREALIZED_PNL_COLUMN,
    ])?;

    for txn in transactions {
        writer.write_record([
            txn.date.format(DATE_FORMAT).to_string(),
            txn.instrument_type.as_str().to_string(),
            txn.symbol.clone(),
            txn.name.clone(),
            txn.action.as_str().to_string(),
            txn.quantity.to_string(),
            txn.price.to_string(),
            txn.total_value.to_string(),
            txn.rationale.clone(),
            txn.outcome_notes.clone(),
            txn.current_price.to_string(),
            txn.unrealized_pnl.to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    log::info!("CSV export: wrote {} transactions", transactions.len());
    // the writer only ever receives UTF-8 strings
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE_CSV: &str = "\
Date,Type,Symbol,Name,Action,Quantity,Price,Total_Value,Rationale
2024-01-15,Stock,TCS.NS,Tata Consultancy Services,Buy,10,3500,35000,Strong Q3 results
2024-02-10,Mutual Fund,SBI-BLUECHIP,SBI Bluechip Fund,Buy,100,850,85000,Large cap exposure
";

    #[test]
    fn test_import_required_columns_only() {
        let txns = read_transactions(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(txns.len(), 2);

        let first = &txns[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(first.instrument_type, InstrumentType::Stock);
        assert_eq!(first.action, TradeAction::Buy);
        assert_eq!(first.total_value, 35000.0);
        // optional columns fall back to entry-time defaults
        assert_eq!(first.current_price, 3500.0);
        assert_eq!(first.unrealized_pnl, 0.0);
        assert_eq!(first.outcome_notes, "");
    }

    #[test]
    fn test_import_reports_every_missing_column() {
        let result = read_transactions("Date,Symbol,Name\n".as_bytes());
        match result {
            Err(ImportError::MissingColumns { columns }) => {
                assert_eq!(
                    columns,
                    vec!["Type", "Action", "Quantity", "Price", "Total_Value", "Rationale"]
                );
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_import_rejects_malformed_rows() {
        let csv = "\
Date,Type,Symbol,Name,Action,Quantity,Price,Total_Value,Rationale
2024-01-15,Stock,TCS.NS,TCS,Buy,ten,3500,35000,typo in quantity
";
        match read_transactions(csv.as_bytes()) {
            Err(ImportError::Row { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("quantity"), "unexpected message: {message}");
            }
            other => panic!("expected Row error, got {other:?}"),
        }

        let csv = "\
Date,Type,Symbol,Name,Action,Quantity,Price,Total_Value,Rationale
2024-01-15,Crypto,BTC,Bitcoin,Buy,1,100,100,unknown type
";
        assert!(matches!(
            read_transactions(csv.as_bytes()),
            Err(ImportError::Row { line: 2, .. })
        ));
    }

    #[test]
    fn test_import_ignores_unknown_columns() {
        let csv = "\
Date,Type,Symbol,Name,Action,Quantity,Price,Total_Value,Rationale,Broker
2024-01-15,Stock,TCS.NS,TCS,Buy,10,3500,35000,results,Zerodha
";
        let txns = read_transactions(csv.as_bytes()).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].symbol, "TCS.NS");
    }

    #[test]
    fn test_export_import_round_trip() {
        let original = vec![
            Transaction {
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                instrument_type: InstrumentType::Stock,
                symbol: "TCS.NS".to_string(),
                name: "Tata Consultancy Services".to_string(),
                action: TradeAction::Buy,
                quantity: 10.0,
                price: 3500.0,
                total_value: 35000.0,
                rationale: "Strong results, \"digital\" demand, margin upside".to_string(),
                outcome_notes: "Up 8% after earnings".to_string(),
                current_price: 3780.0,
                unrealized_pnl: 2800.0,
            },
            Transaction {
                date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
                instrument_type: InstrumentType::MutualFund,
                symbol: "SBI-BLUECHIP".to_string(),
                name: "SBI Bluechip Fund".to_string(),
                action: TradeAction::Sell,
                quantity: 100.0,
                price: 895.5,
                total_value: 89550.0,
                rationale: "Rebalancing".to_string(),
                outcome_notes: String::new(),
                current_price: 900.25,
                unrealized_pnl: -120.5,
            },
        ];

        let exported = write_transactions(&original).unwrap();
        let reimported = read_transactions(exported.as_bytes()).unwrap();
        assert_eq!(reimported, original);
    }

    #[test]
    fn test_export_column_order() {
        let exported = write_transactions(&[]).unwrap();
        let header = exported.lines().next().unwrap();
        assert_eq!(
            header,
            "Date,Type,Symbol,Name,Action,Quantity,Price,Total_Value,Rationale,Outcome_Notes,Current_Price,Unrealized_PnL"
        );
    }
}
