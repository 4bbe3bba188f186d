//! Transaction model

use chrono::{Datelike, NaiveDate};
use finvista_parser::StatementRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use finvista_parser::DEFAULT_CATEGORY;

/// One normalized bank transaction. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Date the institution recorded the movement
    pub posted: NaiveDate,
    /// Date the funds became effective, when the export carried one
    pub value_date: Option<NaiveDate>,
    pub description: String,
    /// Signed amount; positive is income, negative is expense
    pub amount: Decimal,
    pub currency: String,
    /// Running account balance as reported by the source, not recomputed
    pub balance: Decimal,
    pub extended_description: String,
    pub category: String,
    pub subcategory: String,
    pub account: String,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Calendar year of the posted date
    pub fn year(&self) -> i32 {
        self.posted.year()
    }
}

impl From<StatementRecord> for Transaction {
    fn from(record: StatementRecord) -> Self {
        Self {
            posted: record.posted,
            value_date: record.value_date,
            description: record.description,
            amount: record.amount,
            currency: record.currency,
            balance: record.balance,
            extended_description: record.extended_description,
            category: record.category,
            subcategory: record.subcategory,
            account: record.account,
        }
    }
}
