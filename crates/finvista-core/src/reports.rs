//! Aggregate reports computed from the transaction sequence
//!
//! Every function here is a pure, read-only computation over a slice of
//! transactions. Which slice to pass (filtered subset or canonical
//! sequence) is fixed by each report's purpose; the store's getters pick
//! the right one. Truncation windows are parameters, never constants, and
//! whatever was cut is reported back as metadata instead of silently
//! dropped.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::model::{Transaction, DEFAULT_CATEGORY};
use crate::time::{month_end, month_label, month_start, months_between};

/// Subcategory label substituted for rows without one
pub const GENERAL_SUBCATEGORY: &str = "General";

// ==================== Report Structures ====================

/// Headline numbers for the filtered subset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    /// Sum over accounts of each account's most recent reported balance
    pub final_balance: Decimal,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    /// `(income - expenses) / income`, as a percentage; 0 when there is no
    /// income
    pub savings_rate: f64,
}

/// Latest reported balance of one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account: String,
    pub balance: Decimal,
}

/// How much of a month series survived the display window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesWindow {
    pub total_months: usize,
    pub shown_months: usize,
    pub truncated: bool,
}

impl SeriesWindow {
    fn new(total_months: usize, shown_months: usize) -> Self {
        Self {
            total_months,
            shown_months,
            truncated: shown_months < total_months,
        }
    }
}

/// Account-summed balance as of one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBalancePoint {
    pub month: String,
    pub balance: Decimal,
}

/// Balance evolution series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBalanceReport {
    pub points: Vec<MonthlyBalancePoint>,
    pub window: SeriesWindow,
}

/// Income, expenses, and savings of one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFlow {
    pub month: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub savings: Decimal,
}

/// Monthly income/expense/savings series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFlowReport {
    pub rows: Vec<MonthlyFlow>,
    pub window: SeriesWindow,
}

/// Expense total of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

/// Expense total of one category plus its share of all grouped expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub total: Decimal,
    /// Share of the full grouped total, computed before any truncation
    pub percentage: f64,
}

/// Category distribution for the filtered subset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryDistribution {
    pub entries: Vec<CategoryShare>,
    pub total_expenses: Decimal,
}

/// Per-category expense totals of one calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearCategoryRow {
    pub year: i32,
    pub totals: BTreeMap<String, Decimal>,
}

/// Year-by-category breakdown over the canonical sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryByYearReport {
    /// Every category present, ordered by overall total; feeds the picker
    pub categories: Vec<CategoryTotal>,
    /// Years ascending, each restricted to the shown categories
    pub years: Vec<YearCategoryRow>,
}

/// Monthly expense points of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySeries {
    pub category: String,
    pub points: Vec<Decimal>,
}

/// Month-by-category expense trend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTrendReport {
    pub months: Vec<String>,
    pub series: Vec<CategorySeries>,
    pub window: SeriesWindow,
}

/// Expense total of one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyExpense {
    pub day: NaiveDate,
    pub total: Decimal,
}

/// Daily expense totals, clipped to a recent-years window when the span is
/// too wide
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyExpenseReport {
    pub days: Vec<DailyExpense>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub clipped: bool,
}

/// Expense total of one subcategory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcategorySlice {
    pub name: String,
    pub total: Decimal,
}

/// Category node with its subcategory slices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub name: String,
    pub total: Decimal,
    pub children: Vec<SubcategorySlice>,
}

/// Twelve month-of-year expense totals of one calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSeries {
    pub year: i32,
    /// January first, always twelve entries
    pub months: Vec<Decimal>,
}

// ==================== Computations ====================

/// Round to whole currency units, half away from zero
fn round_unit(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Category for grouping, falling back to the sentinel
fn category_of(tx: &Transaction) -> &str {
    if tx.category.is_empty() {
        DEFAULT_CATEGORY
    } else {
        &tx.category
    }
}

/// Per-account latest reported balance, in first-seen account order.
/// Single pass; a strictly later posted date replaces the held entry, so
/// the first row seen wins among equal dates.
fn latest_balance_by_account(transactions: &[Transaction]) -> Vec<(String, Decimal)> {
    let mut order: Vec<&str> = Vec::new();
    let mut best: HashMap<&str, (NaiveDate, Decimal)> = HashMap::new();

    for tx in transactions {
        let current = best.get(tx.account.as_str()).copied();
        match current {
            Some((date, _)) if tx.posted <= date => {}
            Some(_) => {
                best.insert(&tx.account, (tx.posted, tx.balance));
            }
            None => {
                order.push(&tx.account);
                best.insert(&tx.account, (tx.posted, tx.balance));
            }
        }
    }

    order
        .into_iter()
        .map(|account| (account.to_string(), best[account].1))
        .collect()
}

/// KPI set over the filtered subset
pub fn kpi_summary(transactions: &[Transaction]) -> KpiSummary {
    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;
    for tx in transactions {
        if tx.is_income() {
            income += tx.amount;
        } else if tx.is_expense() {
            expenses += tx.amount.abs();
        }
    }

    let final_balance = latest_balance_by_account(transactions)
        .into_iter()
        .map(|(_, balance)| balance)
        .sum();

    let savings_rate = if income > Decimal::ZERO {
        ((income - expenses) / income).to_f64().unwrap_or(0.0) * 100.0
    } else {
        0.0
    };

    KpiSummary {
        final_balance,
        total_income: income,
        total_expenses: expenses,
        savings_rate,
    }
}

/// Latest reported balance per account, in first-seen order
pub fn account_balances(transactions: &[Transaction]) -> Vec<AccountBalance> {
    latest_balance_by_account(transactions)
        .into_iter()
        .map(|(account, balance)| AccountBalance { account, balance })
        .collect()
}

/// Month-by-month account-summed balance. Per account and month, the
/// balance of the earliest transaction inside the month; when a month has
/// none, the balance of the latest transaction before the month start is
/// carried forward.
pub fn monthly_balance(transactions: &[Transaction], cap: usize) -> MonthlyBalanceReport {
    if transactions.is_empty() {
        return MonthlyBalanceReport::default();
    }

    let mut asc: Vec<&Transaction> = transactions.iter().collect();
    asc.sort_by(|a, b| a.posted.cmp(&b.posted));

    let months = months_between(asc[0].posted, asc[asc.len() - 1].posted);
    let total_months = months.len();
    let shown = if total_months > cap {
        &months[total_months - cap..]
    } else {
        &months[..]
    };

    let mut series: HashMap<&str, Vec<(NaiveDate, Decimal)>> = HashMap::new();
    for tx in &asc {
        series
            .entry(tx.account.as_str())
            .or_default()
            .push((tx.posted, tx.balance));
    }

    let points = shown
        .iter()
        .map(|month| {
            let start = *month;
            let end = month_end(start);
            let mut total = Decimal::ZERO;
            for entries in series.values() {
                let next = entries.partition_point(|(date, _)| *date < start);
                if next < entries.len() && entries[next].0 <= end {
                    total += entries[next].1;
                } else if next > 0 {
                    total += entries[next - 1].1;
                }
            }
            MonthlyBalancePoint {
                month: month_label(start),
                balance: round_unit(total),
            }
        })
        .collect();

    MonthlyBalanceReport {
        points,
        window: SeriesWindow::new(total_months, shown.len()),
    }
}

/// Month-by-month income, expenses, and savings
pub fn monthly_flows(transactions: &[Transaction], cap: usize) -> MonthlyFlowReport {
    if transactions.is_empty() {
        return MonthlyFlowReport::default();
    }

    let first = transactions.iter().map(|t| t.posted).min().unwrap_or_default();
    let last = transactions.iter().map(|t| t.posted).max().unwrap_or_default();
    let months = months_between(first, last);
    let total_months = months.len();
    let shown = if total_months > cap {
        &months[total_months - cap..]
    } else {
        &months[..]
    };

    let mut by_month: HashMap<NaiveDate, (Decimal, Decimal)> = HashMap::new();
    for tx in transactions {
        let entry = by_month
            .entry(month_start(tx.posted))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        if tx.is_income() {
            entry.0 += tx.amount;
        } else if tx.is_expense() {
            entry.1 += tx.amount.abs();
        }
    }

    let rows = shown
        .iter()
        .map(|month| {
            let (income, expenses) = by_month.get(month).copied().unwrap_or_default();
            MonthlyFlow {
                month: month_label(*month),
                income: round_unit(income),
                expenses: round_unit(expenses),
                savings: round_unit(income - expenses),
            }
        })
        .collect();

    MonthlyFlowReport {
        rows,
        window: SeriesWindow::new(total_months, shown.len()),
    }
}

fn expense_totals_by_category(transactions: &[Transaction]) -> HashMap<&str, Decimal> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for tx in transactions.iter().filter(|t| t.is_expense()) {
        *totals.entry(category_of(tx)).or_insert(Decimal::ZERO) += tx.amount.abs();
    }
    totals
}

fn sort_totals(entries: &mut Vec<CategoryTotal>) {
    entries.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
}

/// Top expense categories, descending by total
pub fn category_totals(transactions: &[Transaction], top: usize) -> Vec<CategoryTotal> {
    let mut entries: Vec<CategoryTotal> = expense_totals_by_category(transactions)
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total: round_unit(total),
        })
        .collect();
    sort_totals(&mut entries);
    entries.truncate(top);
    entries
}

/// Expense distribution with each category's share of the grouped total.
/// Percentages are computed against the full total, then the list is
/// truncated for display.
pub fn category_distribution(transactions: &[Transaction], top: usize) -> CategoryDistribution {
    let totals = expense_totals_by_category(transactions);
    let grand: Decimal = totals.values().copied().sum();

    let mut entries: Vec<CategoryShare> = totals
        .into_iter()
        .map(|(category, total)| {
            let percentage = if grand > Decimal::ZERO {
                (total / grand).to_f64().unwrap_or(0.0) * 100.0
            } else {
                0.0
            };
            CategoryShare {
                category: category.to_string(),
                total: round_unit(total),
                percentage,
            }
        })
        .collect();
    entries.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    entries.truncate(top);

    CategoryDistribution {
        entries,
        total_expenses: round_unit(grand),
    }
}

/// Year-by-category expense breakdown. Runs over the canonical sequence so
/// the year comparison stays independent of the active filter. `selected`
/// names the categories to keep; when empty the top `default_top` by
/// overall total are used.
pub fn category_by_year(
    transactions: &[Transaction],
    selected: &[String],
    default_top: usize,
) -> CategoryByYearReport {
    let mut by_year: BTreeMap<i32, HashMap<String, Decimal>> = BTreeMap::new();
    let mut overall: HashMap<String, Decimal> = HashMap::new();

    for tx in transactions.iter().filter(|t| t.is_expense()) {
        let category = category_of(tx).to_string();
        let amount = tx.amount.abs();
        *by_year
            .entry(tx.year())
            .or_default()
            .entry(category.clone())
            .or_insert(Decimal::ZERO) += amount;
        *overall.entry(category).or_insert(Decimal::ZERO) += amount;
    }

    let mut categories: Vec<CategoryTotal> = overall
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category,
            total: round_unit(total),
        })
        .collect();
    sort_totals(&mut categories);

    let shown: Vec<String> = if selected.is_empty() {
        categories
            .iter()
            .take(default_top)
            .map(|c| c.category.clone())
            .collect()
    } else {
        selected.to_vec()
    };

    let years = by_year
        .into_iter()
        .map(|(year, totals)| YearCategoryRow {
            year,
            totals: shown
                .iter()
                .map(|category| {
                    let total = totals.get(category).copied().unwrap_or(Decimal::ZERO);
                    (category.clone(), round_unit(total))
                })
                .collect(),
        })
        .collect();

    CategoryByYearReport { categories, years }
}

/// Month-by-category expense trend over the filtered subset
pub fn category_trend(
    transactions: &[Transaction],
    selected: &[String],
    default_top: usize,
    cap: usize,
) -> CategoryTrendReport {
    let expenses: Vec<&Transaction> = transactions.iter().filter(|t| t.is_expense()).collect();
    if expenses.is_empty() {
        return CategoryTrendReport::default();
    }

    let first = expenses.iter().map(|t| t.posted).min().unwrap_or_default();
    let last = expenses.iter().map(|t| t.posted).max().unwrap_or_default();
    let months = months_between(first, last);
    let total_months = months.len();
    let shown = if total_months > cap {
        &months[total_months - cap..]
    } else {
        &months[..]
    };

    let mut overall: HashMap<&str, Decimal> = HashMap::new();
    let mut by_month: HashMap<NaiveDate, HashMap<&str, Decimal>> = HashMap::new();
    for tx in &expenses {
        let category = category_of(tx);
        let amount = tx.amount.abs();
        *overall.entry(category).or_insert(Decimal::ZERO) += amount;
        *by_month
            .entry(month_start(tx.posted))
            .or_default()
            .entry(category)
            .or_insert(Decimal::ZERO) += amount;
    }

    let shown_categories: Vec<String> = if selected.is_empty() {
        let mut ranking: Vec<(&str, Decimal)> = overall.into_iter().collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranking
            .into_iter()
            .take(default_top)
            .map(|(category, _)| category.to_string())
            .collect()
    } else {
        selected.to_vec()
    };

    let series = shown_categories
        .into_iter()
        .map(|category| {
            let points = shown
                .iter()
                .map(|month| {
                    let total = by_month
                        .get(month)
                        .and_then(|totals| totals.get(category.as_str()))
                        .copied()
                        .unwrap_or(Decimal::ZERO);
                    round_unit(total)
                })
                .collect();
            CategorySeries { category, points }
        })
        .collect();

    CategoryTrendReport {
        months: shown.iter().map(|m| month_label(*m)).collect(),
        series,
        window: SeriesWindow::new(total_months, shown.len()),
    }
}

/// Per-day expense totals. When the span exceeds `window_years` calendar
/// years, the range is clipped to January 1st of the earliest year still
/// inside the window and the report says so.
pub fn daily_expenses(transactions: &[Transaction], window_years: i32) -> DailyExpenseReport {
    let expenses: Vec<&Transaction> = transactions.iter().filter(|t| t.is_expense()).collect();
    if expenses.is_empty() {
        return DailyExpenseReport::default();
    }

    let min = expenses.iter().map(|t| t.posted).min().unwrap_or_default();
    let max = expenses.iter().map(|t| t.posted).max().unwrap_or_default();

    let (from, clipped) = if max.year() - min.year() > window_years {
        let start = NaiveDate::from_ymd_opt(max.year() - (window_years - 1), 1, 1).unwrap_or(min);
        (start, true)
    } else {
        (min, false)
    };

    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for tx in expenses
        .iter()
        .filter(|t| t.posted >= from && t.posted <= max)
    {
        *by_day.entry(tx.posted).or_insert(Decimal::ZERO) += tx.amount.abs();
    }

    DailyExpenseReport {
        days: by_day
            .into_iter()
            .map(|(day, total)| DailyExpense {
                day,
                total: round_unit(total),
            })
            .collect(),
        from: Some(from),
        to: Some(max),
        clipped,
    }
}

/// Category → subcategory expense breakdown. Empty subcategories are shown
/// as [`GENERAL_SUBCATEGORY`].
pub fn subcategory_breakdown(transactions: &[Transaction], top: usize) -> Vec<CategoryNode> {
    let mut grouped: HashMap<&str, (Decimal, HashMap<&str, Decimal>)> = HashMap::new();

    for tx in transactions.iter().filter(|t| t.is_expense()) {
        let category = category_of(tx);
        let subcategory = if tx.subcategory.is_empty() {
            GENERAL_SUBCATEGORY
        } else {
            &tx.subcategory
        };
        let amount = tx.amount.abs();
        let entry = grouped
            .entry(category)
            .or_insert((Decimal::ZERO, HashMap::new()));
        entry.0 += amount;
        *entry.1.entry(subcategory).or_insert(Decimal::ZERO) += amount;
    }

    let mut nodes: Vec<CategoryNode> = grouped
        .into_iter()
        .map(|(name, (total, subtotals))| {
            let mut children: Vec<SubcategorySlice> = subtotals
                .into_iter()
                .map(|(sub, value)| SubcategorySlice {
                    name: sub.to_string(),
                    total: round_unit(value),
                })
                .collect();
            children.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
            CategoryNode {
                name: name.to_string(),
                total: round_unit(total),
                children,
            }
        })
        .collect();
    nodes.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    nodes.truncate(top);
    nodes
}

/// Month-of-year expense totals for every year in the canonical sequence,
/// years ascending
pub fn yearly_comparison(transactions: &[Transaction]) -> Vec<YearSeries> {
    let mut by_year: BTreeMap<i32, [Decimal; 12]> = BTreeMap::new();
    for tx in transactions.iter().filter(|t| t.is_expense()) {
        let months = by_year.entry(tx.year()).or_insert([Decimal::ZERO; 12]);
        months[tx.posted.month0() as usize] += tx.amount.abs();
    }

    by_year
        .into_iter()
        .map(|(year, months)| YearSeries {
            year,
            months: months.iter().map(|m| round_unit(*m)).collect(),
        })
        .collect()
}

// ==================== Tests ====================
