use chrono::{NaiveDate, Utc};
use fieldbook_core::{NewExpense, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

use crate::matcher::MatchState;
use crate::workset::WorkingSet;

/// Durable sink for confirmed expenses. The acting user is passed in
/// explicitly; there is no ambient session context.
pub trait ExpenseStore {
    type Error: fmt::Display;

    fn insert_expense(
        &self,
        user: UserId,
        expense: &NewExpense,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReport {
    pub saved: usize,
    pub failed: usize,
}

impl SaveReport {
    /// Nothing was eligible — a valid outcome, distinct from failure.
    pub fn nothing_to_save(&self) -> bool {
        self.saved == 0 && self.failed == 0
    }
}

impl fmt::Display for SaveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nothing_to_save() {
            write!(f, "Nothing to save")
        } else if self.failed == 0 {
            write!(f, "Saved {} expenses", self.saved)
        } else {
            write!(
                f,
                "Saved {} expenses, failed to save {}",
                self.saved, self.failed
            )
        }
    }
}

/// Best-effort parse of a raw statement date. Split on `/` or `-`; a
/// 4-digit first segment reads as year-month-day, anything else as
/// month-day-year.
pub fn parse_statement_date(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.trim().split(['/', '-']).collect();
    if parts.len() != 3 {
        return None;
    }

    if parts[0].len() == 4 {
        let year: i32 = parts[0].parse().ok()?;
        let month: u32 = parts[1].parse().ok()?;
        let day: u32 = parts[2].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    } else {
        let month: u32 = parts[0].parse().ok()?;
        let day: u32 = parts[1].parse().ok()?;
        let year: i32 = parts[2].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Persist every categorized, not-yet-saved row as a reconciled expense.
///
/// Rows are written independently: one failed insert is logged, counted,
/// and skipped — the loop keeps going. A row that saves is flagged in
/// place, which is what makes a repeat invocation write nothing.
/// An unparseable statement date falls back to today rather than failing
/// the row.
pub async fn save_reconciled<S: ExpenseStore>(
    set: &mut WorkingSet,
    user: UserId,
    store: &S,
) -> SaveReport {
    let mut report = SaveReport::default();

    for m in set.transactions_mut() {
        let MatchState::Categorized { category_id, .. } = &m.state else {
            continue;
        };
        if m.saved {
            continue;
        }

        let expense_date = parse_statement_date(&m.txn.date)
            .unwrap_or_else(|| Utc::now().date_naive());

        let expense = NewExpense {
            amount: m.txn.amount,
            description: m.txn.description.clone(),
            expense_date,
            vendor: None,
            category_id: *category_id,
            bank_statement_ref: m.txn.id.to_string(),
            is_reconciled: true,
        };

        match store.insert_expense(user, &expense).await {
            Ok(()) => {
                m.saved = true;
                report.saved += 1;
            }
            Err(e) => {
                tracing::warn!("failed to save expense for statement row {}: {e}", m.txn.id);
                report.failed += 1;
            }
        }
    }

    report
}
