use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::CategoryId;
use super::money::Money;

/// Write request for one persisted expense. Emitted by the reconciliation
/// persister; `bank_statement_ref` points back at the originating statement
/// row so a saved expense can be traced to its source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub amount: Money,
    pub description: String,
    pub expense_date: NaiveDate,
    pub vendor: Option<String>,
    pub category_id: CategoryId,
    pub bank_statement_ref: String,
    pub is_reconciled: bool,
}
