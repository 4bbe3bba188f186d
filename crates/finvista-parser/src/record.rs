//! Normalized statement records produced by the parser.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Placeholder category for rows without one
pub const DEFAULT_CATEGORY: &str = "Sin categoría";

/// One normalized ledger line, with the source line it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRecord {
    /// 1-indexed line in the source file (header is line 1)
    pub line: usize,
    /// Posted date ("Fecha contable")
    pub posted: NaiveDate,
    /// Value date ("Fecha valor"), None when unparseable
    pub value_date: Option<NaiveDate>,
    /// Description ("Concepto")
    pub description: String,
    /// Signed amount ("Importe"); positive is income, negative is expense
    pub amount: Decimal,
    /// Currency code ("Moneda")
    pub currency: String,
    /// Running balance as reported by the source ("Saldo")
    pub balance: Decimal,
    /// Extended description ("Concepto ampliado")
    pub extended_description: String,
    /// Category ("Categoria"), defaulted to [`DEFAULT_CATEGORY`]
    pub category: String,
    /// Subcategory ("Subcategoria"), may be empty
    pub subcategory: String,
    /// Source account identifier ("cuenta")
    pub account: String,
}

/// Row-level diagnostics accumulated during a parse.
///
/// Rejected rows are not errors; the counters exist for troubleshooting
/// statements that shrink unexpectedly on import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Data rows read from the file
    pub rows_read: usize,
    /// Rows dropped for a missing/empty posted date or a missing amount column
    pub rows_missing_fields: usize,
    /// Rows dropped because the posted date did not parse
    pub rows_bad_date: usize,
    /// Rows the CSV layer could not decode
    pub rows_malformed: usize,
}

impl IngestStats {
    /// Total rows excluded from the output
    pub fn rows_rejected(&self) -> usize {
        self.rows_missing_fields + self.rows_bad_date + self.rows_malformed
    }
}

/// Result of parsing a statement: the surviving records plus diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome {
    /// Records ordered descending by posted date
    pub records: Vec<StatementRecord>,
    /// Row-level diagnostics
    pub stats: IngestStats,
}
