//! Single authoritative holder of the transaction sequence and the active
//! filter criteria
//!
//! Every mutator recomputes the filtered view synchronously before
//! returning, so readers always observe an up-to-date subset.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use finvista_parser::{ParseOutcome, StatementParser};

use crate::error::CoreError;
use crate::filter::{self, FilterCriteria, FilterPatch, TransactionKind};
use crate::model::Transaction;
use crate::reports::{
    self, AccountBalance, CategoryByYearReport, CategoryDistribution, CategoryNode,
    CategoryTotal, CategoryTrendReport, DailyExpenseReport, KpiSummary, MonthlyBalanceReport,
    MonthlyFlowReport, YearSeries,
};

#[derive(Debug, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    filtered: Vec<Transaction>,
    criteria: FilterCriteria,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the canonical sequence wholesale.
    ///
    /// Loading a new statement clears the year filter so a stale year from
    /// the previous statement cannot hide every row of the new one; the
    /// remaining criteria are kept.
    pub fn load(&mut self, mut transactions: Vec<Transaction>) {
        transactions.sort_by(|a, b| b.posted.cmp(&a.posted));
        self.transactions = transactions;
        self.criteria.year = None;
        self.recompute();
    }

    /// Parse raw statement text and adopt the result
    pub fn load_text(&mut self, content: &str) -> Result<usize, CoreError> {
        let outcome = StatementParser::parse(content)?;
        self.ingest(outcome)
    }

    /// Adopt a parse outcome. An outcome with zero valid records is a
    /// user-facing error and leaves the current state untouched.
    pub fn ingest(&mut self, outcome: ParseOutcome) -> Result<usize, CoreError> {
        if outcome.records.is_empty() {
            return Err(CoreError::EmptyStatement);
        }

        let stats = outcome.stats;
        let transactions: Vec<Transaction> = outcome
            .records
            .into_iter()
            .map(Transaction::from)
            .collect();
        let count = transactions.len();
        self.load(transactions);

        log::info!(
            "loaded {} transactions ({} of {} rows rejected)",
            count,
            stats.rows_rejected(),
            stats.rows_read
        );
        Ok(count)
    }

    /// Merge a partial criteria update and recompute
    pub fn set_filter(&mut self, patch: FilterPatch) {
        self.criteria.merge(patch);
        self.recompute();
    }

    pub fn set_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.criteria.date_range = (start, end);
        self.recompute();
    }

    pub fn set_accounts(&mut self, accounts: Vec<String>) {
        self.criteria.accounts = accounts;
        self.recompute();
    }

    pub fn set_kind(&mut self, kind: TransactionKind) {
        self.criteria.kind = kind;
        self.recompute();
    }

    pub fn set_year(&mut self, year: Option<i32>) {
        self.criteria.year = year;
        self.recompute();
    }

    /// Reset the criteria to defaults, keeping the loaded data
    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.recompute();
    }

    /// Drop everything: data, filtered view, and criteria
    pub fn reset(&mut self) {
        self.transactions.clear();
        self.filtered.clear();
        self.criteria = FilterCriteria::default();
    }

    fn recompute(&mut self) {
        self.filtered = filter::apply(&self.transactions, &self.criteria);
    }

    // ==================== Accessors ====================

    /// The canonical sequence, most recent first
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The filtered subset under the active criteria
    pub fn filtered(&self) -> &[Transaction] {
        &self.filtered
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Distinct non-empty account identifiers, in first-seen order
    pub fn unique_accounts(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.transactions
            .iter()
            .filter(|t| !t.account.is_empty())
            .filter(|t| seen.insert(t.account.clone()))
            .map(|t| t.account.clone())
            .collect()
    }

    /// Distinct posted-date years in the canonical sequence, most recent
    /// first. Independent of the active filter.
    pub fn available_years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.transactions.iter().map(|t| t.year()).collect();
        years.into_iter().rev().collect()
    }

    // ==================== Aggregate Getters ====================

    pub fn kpis(&self) -> KpiSummary {
        reports::kpi_summary(&self.filtered)
    }

    pub fn account_balances(&self) -> Vec<AccountBalance> {
        reports::account_balances(&self.filtered)
    }

    pub fn monthly_balance(&self, cap: usize) -> MonthlyBalanceReport {
        reports::monthly_balance(&self.filtered, cap)
    }

    pub fn monthly_flows(&self, cap: usize) -> MonthlyFlowReport {
        reports::monthly_flows(&self.filtered, cap)
    }

    pub fn category_totals(&self, top: usize) -> Vec<CategoryTotal> {
        reports::category_totals(&self.filtered, top)
    }

    pub fn category_distribution(&self, top: usize) -> CategoryDistribution {
        reports::category_distribution(&self.filtered, top)
    }

    /// Year comparison runs over the canonical sequence so it stays
    /// independent of the active filter
    pub fn category_by_year(&self, selected: &[String], default_top: usize) -> CategoryByYearReport {
        reports::category_by_year(&self.transactions, selected, default_top)
    }

    pub fn category_trend(
        &self,
        selected: &[String],
        default_top: usize,
        cap: usize,
    ) -> CategoryTrendReport {
        reports::category_trend(&self.filtered, selected, default_top, cap)
    }

    pub fn daily_expenses(&self, window_years: i32) -> DailyExpenseReport {
        reports::daily_expenses(&self.filtered, window_years)
    }

    pub fn subcategory_breakdown(&self, top: usize) -> Vec<CategoryNode> {
        reports::subcategory_breakdown(&self.filtered, top)
    }

    pub fn yearly_comparison(&self) -> Vec<YearSeries> {
        reports::yearly_comparison(&self.transactions)
    }
}
