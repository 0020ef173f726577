use fieldbook_core::{CategoryId, ExpenseCategory, Invoice, InvoiceId, Receipt, ReceiptId};
use serde::{Deserialize, Serialize};

use crate::matcher::{Confidence, MatchState, MatchedTransaction};
use crate::statement::{Direction, TxnId};

/// Target of a manual match, chosen by the reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ManualTarget {
    Invoice(InvoiceId),
    Receipt(ReceiptId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub matched: usize,
    pub unmatched: usize,
    pub categorized: usize,
    pub saved: usize,
}

/// The ordered working set for one reconciliation session. Every resolver
/// operation targets exactly one row by id and leaves the rest untouched;
/// bad ids and precondition violations are no-ops that return `false`.
/// Rows already saved are never mutated again.
#[derive(Debug, Clone)]
pub struct WorkingSet {
    txns: Vec<MatchedTransaction>,
}

impl WorkingSet {
    pub fn new(txns: Vec<MatchedTransaction>) -> Self {
        Self { txns }
    }

    pub fn transactions(&self) -> &[MatchedTransaction] {
        &self.txns
    }

    pub(crate) fn transactions_mut(&mut self) -> &mut [MatchedTransaction] {
        &mut self.txns
    }

    pub fn len(&self) -> usize {
        self.txns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txns.is_empty()
    }

    fn get_unsaved_mut(&mut self, id: TxnId) -> Option<&mut MatchedTransaction> {
        self.txns.iter_mut().find(|m| m.txn.id == id && !m.saved)
    }

    /// Override (or supply) a match by hand. Manual selection is always
    /// treated as certain.
    pub fn manual_match(
        &mut self,
        id: TxnId,
        target: ManualTarget,
        invoices: &[Invoice],
        receipts: &[Receipt],
    ) -> bool {
        let state = match target {
            ManualTarget::Invoice(invoice_id) => {
                match invoices.iter().find(|i| i.id == invoice_id) {
                    Some(invoice) => MatchState::Invoice {
                        id: invoice.id,
                        label: format!("Invoice #{}", invoice.number),
                    },
                    None => return false,
                }
            }
            ManualTarget::Receipt(receipt_id) => {
                match receipts.iter().find(|r| r.id == receipt_id) {
                    Some(receipt) => MatchState::Receipt {
                        id: receipt.id,
                        label: receipt.description.clone(),
                    },
                    None => return false,
                }
            }
        };

        match self.get_unsaved_mut(id) {
            Some(m) => {
                m.state = state;
                m.confidence = Confidence::High;
                true
            }
            None => false,
        }
    }

    /// Assign an expense category instead of a match. Only debits can be
    /// categorized — credits are expected to map to invoices.
    pub fn categorize(
        &mut self,
        id: TxnId,
        category_id: CategoryId,
        categories: &[ExpenseCategory],
    ) -> bool {
        let Some(category) = categories.iter().find(|c| c.id == category_id) else {
            return false;
        };
        let name = category.name.clone();

        match self.get_unsaved_mut(id) {
            Some(m) if m.txn.direction == Direction::Debit => {
                m.state = MatchState::Categorized {
                    category_id,
                    name,
                };
                m.confidence = Confidence::High;
                true
            }
            _ => false,
        }
    }

    /// Drop a row from the working set entirely. It no longer appears in
    /// counts and can never be saved. Saved rows cannot be ignored.
    pub fn ignore(&mut self, id: TxnId) -> bool {
        let before = self.txns.len();
        self.txns.retain(|m| m.txn.id != id || m.saved);
        self.txns.len() < before
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for m in &self.txns {
            match &m.state {
                MatchState::Unmatched => summary.unmatched += 1,
                MatchState::Invoice { .. } | MatchState::Receipt { .. } => summary.matched += 1,
                MatchState::Categorized { .. } => summary.categorized += 1,
            }
            if m.saved {
                summary.saved += 1;
            }
        }
        summary
    }
}
