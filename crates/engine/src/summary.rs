//! Financial summary aggregate.
//!
//! Built on every request from the transactions of a period plus the ones
//! before it (for the carry-over balance). Never persisted.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Entity as _, ResultEngine, Transaction, TransactionKind,
    money::{checked_add, checked_sub},
};

/// Lightweight view of a transaction inside a daily bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub id: Uuid,
    pub kind: String,
    pub date: DateTime<Utc>,
    pub description: String,
    pub amount_minor: i64,
}

impl From<&Transaction> for SummaryEntry {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id(),
            kind: tx.kind().as_str().to_string(),
            date: tx.date(),
            description: tx.description().to_string(),
            amount_minor: tx.amount_minor(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub income_minor: i64,
    pub expense_minor: i64,
    pub net_minor: i64,
    pub transactions: Vec<SummaryEntry>,
}

impl DailySummary {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            income_minor: 0,
            expense_minor: 0,
            net_minor: 0,
            transactions: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FinancialSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub carry_over_minor: i64,
    pub total_income_minor: i64,
    pub total_expense_minor: i64,
    pub final_balance_minor: i64,
    /// One bucket per day with at least one transaction, ascending.
    pub days: Vec<DailySummary>,
}

/// Income and expense totals of a slice of transactions.
fn totals(transactions: &[Transaction]) -> ResultEngine<(i64, i64)> {
    let mut income = 0i64;
    let mut expense = 0i64;
    for tx in transactions {
        match tx.kind() {
            TransactionKind::Income => income = checked_add(income, tx.amount_minor())?,
            TransactionKind::Expense => expense = checked_add(expense, tx.amount_minor())?,
        }
    }
    Ok((income, expense))
}

/// Aggregate already fetched rows.
///
/// `in_range` are the rows of `[start, end]`, `before` the rows preceding
/// `start`. Deleted rows are skipped even if the caller passes them. Fails
/// with [`EngineError::AmountOverflow`] when a total does not fit in `i64`.
///
/// [`EngineError::AmountOverflow`]: crate::EngineError::AmountOverflow
pub fn summarize(
    start: NaiveDate,
    end: NaiveDate,
    in_range: &[Transaction],
    before: &[Transaction],
) -> ResultEngine<FinancialSummary> {
    let in_range: Vec<Transaction> = in_range.iter().filter(|t| !t.is_deleted()).cloned().collect();
    let before: Vec<Transaction> = before.iter().filter(|t| !t.is_deleted()).cloned().collect();

    let (before_income, before_expense) = totals(&before)?;
    let carry_over_minor = checked_sub(before_income, before_expense)?;
    let (total_income_minor, total_expense_minor) = totals(&in_range)?;

    let mut days: BTreeMap<NaiveDate, DailySummary> = BTreeMap::new();
    for tx in &in_range {
        let date = tx.date().date_naive();
        let day = days.entry(date).or_insert_with(|| DailySummary::empty(date));
        match tx.kind() {
            TransactionKind::Income => {
                day.income_minor = checked_add(day.income_minor, tx.amount_minor())?;
            }
            TransactionKind::Expense => {
                day.expense_minor = checked_add(day.expense_minor, tx.amount_minor())?;
            }
        }
        day.net_minor = checked_sub(day.income_minor, day.expense_minor)?;
        day.transactions.push(SummaryEntry::from(tx));
    }

    let final_balance_minor = checked_sub(
        checked_add(carry_over_minor, total_income_minor)?,
        total_expense_minor,
    )?;

    Ok(FinancialSummary {
        start,
        end,
        carry_over_minor,
        total_income_minor,
        total_expense_minor,
        final_balance_minor,
        days: days.into_values().collect(),
    })
}
