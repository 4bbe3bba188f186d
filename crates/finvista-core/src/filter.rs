//! Filter criteria and the pure predicate over the transaction sequence

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::Transaction;

/// Transaction sign filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// No filtering by sign
    All,
    /// Positive amounts only
    Income,
    /// Negative amounts only
    Expense,
}

impl Default for TransactionKind {
    fn default() -> Self {
        TransactionKind::All
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(TransactionKind::All),
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(format!("Invalid transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::All => write!(f, "all"),
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

/// Active filter criteria. One instance, owned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Inclusive date range; the predicate activates only when BOTH bounds
    /// are set
    pub date_range: (Option<NaiveDate>, Option<NaiveDate>),
    /// Accounts to keep; empty means all accounts
    pub accounts: Vec<String>,
    pub kind: TransactionKind,
    /// Calendar year to keep; None means all years
    pub year: Option<i32>,
}

impl FilterCriteria {
    /// Whether a single transaction passes every active predicate
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(year) = self.year {
            if tx.year() != year {
                return false;
            }
        }

        if let (Some(start), Some(end)) = self.date_range {
            if tx.posted < start || tx.posted > end {
                return false;
            }
        }

        if !self.accounts.is_empty() && !self.accounts.contains(&tx.account) {
            return false;
        }

        match self.kind {
            TransactionKind::All => true,
            TransactionKind::Income => tx.is_income(),
            TransactionKind::Expense => tx.is_expense(),
        }
    }

    /// Merge a partial update into the criteria
    pub fn merge(&mut self, patch: FilterPatch) {
        if let Some(date_range) = patch.date_range {
            self.date_range = date_range;
        }
        if let Some(accounts) = patch.accounts {
            self.accounts = accounts;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
    }
}

/// Partial criteria update; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterPatch {
    pub date_range: Option<(Option<NaiveDate>, Option<NaiveDate>)>,
    pub accounts: Option<Vec<String>>,
    pub kind: Option<TransactionKind>,
    pub year: Option<Option<i32>>,
}

/// Apply the criteria to a sequence. Pure and order-preserving.
pub fn apply(transactions: &[Transaction], criteria: &FilterCriteria) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| criteria.matches(tx))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn tx(posted: &str, amount: &str, account: &str) -> Transaction {
        Transaction {
            posted: NaiveDate::parse_from_str(posted, "%Y-%m-%d").unwrap(),
            value_date: None,
            description: String::new(),
            amount: amount.parse().unwrap(),
            currency: "EUR".to_string(),
            balance: Decimal::ZERO,
            extended_description: String::new(),
            category: String::new(),
            subcategory: String::new(),
            account: account.to_string(),
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("2024-06-15", "1200.00", "A"),
            tx("2024-02-10", "-35.20", "A"),
            tx("2023-11-02", "-80.00", "B"),
            tx("2022-07-01", "0.00", "B"),
        ]
    }

    #[test]
    fn test_default_criteria_keeps_everything() {
        let txns = sample();
        let filtered = apply(&txns, &FilterCriteria::default());
        assert_eq!(filtered, txns);
    }

    #[test]
    fn test_year_filter() {
        let criteria = FilterCriteria {
            year: Some(2024),
            ..Default::default()
        };
        let filtered = apply(&sample(), &criteria);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|t| t.year() == 2024));
    }

    #[test]
    fn test_single_bound_date_range_is_inert() {
        let txns = sample();
        let start_only = FilterCriteria {
            date_range: (NaiveDate::from_ymd_opt(2024, 1, 1), None),
            ..Default::default()
        };
        assert_eq!(apply(&txns, &start_only), txns);

        let end_only = FilterCriteria {
            date_range: (None, NaiveDate::from_ymd_opt(2023, 1, 1)),
            ..Default::default()
        };
        assert_eq!(apply(&txns, &end_only), txns);
    }

    #[test]
    fn test_date_range_bounds_are_inclusive() {
        let criteria = FilterCriteria {
            date_range: (
                NaiveDate::from_ymd_opt(2023, 11, 2),
                NaiveDate::from_ymd_opt(2024, 2, 10),
            ),
            ..Default::default()
        };
        let filtered = apply(&sample(), &criteria);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_account_filter_empty_means_all() {
        let criteria = FilterCriteria {
            accounts: vec!["B".to_string()],
            ..Default::default()
        };
        assert_eq!(apply(&sample(), &criteria).len(), 2);

        let criteria = FilterCriteria::default();
        assert_eq!(apply(&sample(), &criteria).len(), 4);
    }

    #[test]
    fn test_kind_filter_excludes_zero_amounts() {
        let income = FilterCriteria {
            kind: TransactionKind::Income,
            ..Default::default()
        };
        assert_eq!(apply(&sample(), &income).len(), 1);

        let expense = FilterCriteria {
            kind: TransactionKind::Expense,
            ..Default::default()
        };
        assert_eq!(apply(&sample(), &expense).len(), 2);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let criteria = FilterCriteria {
            year: Some(2024),
            kind: TransactionKind::Expense,
            ..Default::default()
        };
        let once = apply(&sample(), &criteria);
        let twice = apply(&once, &criteria);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_narrowing_never_grows_the_subset() {
        let txns = sample();
        let loose = FilterCriteria {
            date_range: (
                NaiveDate::from_ymd_opt(2022, 1, 1),
                NaiveDate::from_ymd_opt(2024, 12, 31),
            ),
            ..Default::default()
        };
        let tight = FilterCriteria {
            date_range: (
                NaiveDate::from_ymd_opt(2023, 1, 1),
                NaiveDate::from_ymd_opt(2024, 12, 31),
            ),
            ..Default::default()
        };
        assert!(apply(&txns, &tight).len() <= apply(&txns, &loose).len());
    }

    #[test]
    fn test_order_is_preserved() {
        let criteria = FilterCriteria {
            accounts: vec!["A".to_string(), "B".to_string()],
            ..Default::default()
        };
        let filtered = apply(&sample(), &criteria);
        let dates: Vec<NaiveDate> = filtered.iter().map(|t| t.posted).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_patch_merge_touches_only_set_fields() {
        let mut criteria = FilterCriteria {
            year: Some(2024),
            kind: TransactionKind::Income,
            ..Default::default()
        };
        criteria.merge(FilterPatch {
            kind: Some(TransactionKind::Expense),
            ..Default::default()
        });
        assert_eq!(criteria.kind, TransactionKind::Expense);
        assert_eq!(criteria.year, Some(2024));

        criteria.merge(FilterPatch {
            year: Some(None),
            ..Default::default()
        });
        assert_eq!(criteria.year, None);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("income".parse::<TransactionKind>().unwrap(), TransactionKind::Income);
        assert_eq!("EXPENSE".parse::<TransactionKind>().unwrap(), TransactionKind::Expense);
        assert!("ingresos".parse::<TransactionKind>().is_err());
    }
}
