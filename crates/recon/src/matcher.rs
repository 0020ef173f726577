use fieldbook_core::{CategoryId, Invoice, InvoiceId, Receipt, ReceiptId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::statement::{Direction, ParsedTransaction};

/// Coarse certainty of a match. Auto-matching assigns `High`, `Medium`, or
/// `None`; manual resolution always assigns `High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    None,
}

/// What a statement row resolved to. The variant carries everything that
/// resolution implies, so a categorized row without a category (or a matched
/// row without a target) cannot be constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "match_type", rename_all = "lowercase")]
pub enum MatchState {
    Unmatched,
    Invoice { id: InvoiceId, label: String },
    Receipt { id: ReceiptId, label: String },
    Categorized { category_id: CategoryId, name: String },
}

impl MatchState {
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchState::Invoice { .. } | MatchState::Receipt { .. })
    }

    pub fn is_categorized(&self) -> bool {
        matches!(self, MatchState::Categorized { .. })
    }

    pub fn label(&self) -> Option<String> {
        match self {
            MatchState::Unmatched => None,
            MatchState::Invoice { label, .. } | MatchState::Receipt { label, .. } => {
                Some(label.clone())
            }
            MatchState::Categorized { name, .. } => Some(format!("Expense: {name}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedTransaction {
    pub txn: ParsedTransaction,
    pub state: MatchState,
    pub confidence: Confidence,
    pub saved: bool,
}

pub struct Matcher {
    /// Band half-width as a fraction of the candidate's own amount.
    pub tolerance: Decimal,
    /// Differences below this count as an effectively exact hit.
    pub exact_threshold: Decimal,
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            tolerance: Decimal::new(5, 2),
            exact_threshold: Decimal::ONE,
        }
    }
}

impl Matcher {
    /// Match every parsed row, preserving input order. Credits search paid
    /// invoices, debits search receipts; the first candidate inside the
    /// tolerance band wins, in the order the candidate list was given.
    /// An unmatched row is a normal outcome, not an error.
    pub fn match_all(
        &self,
        txns: &[ParsedTransaction],
        invoices: &[Invoice],
        receipts: &[Receipt],
    ) -> Vec<MatchedTransaction> {
        txns.iter()
            .map(|txn| self.match_one(txn, invoices, receipts))
            .collect()
    }

    pub fn match_one(
        &self,
        txn: &ParsedTransaction,
        invoices: &[Invoice],
        receipts: &[Receipt],
    ) -> MatchedTransaction {
        let hit = match txn.direction {
            Direction::Credit => invoices
                .iter()
                .filter(|invoice| invoice.is_paid())
                .find_map(|invoice| {
                    self.in_band(invoice.total().to_decimal(), txn.amount.to_decimal())
                        .map(|confidence| {
                            (
                                MatchState::Invoice {
                                    id: invoice.id,
                                    label: format!("Invoice #{}", invoice.number),
                                },
                                confidence,
                            )
                        })
                }),
            Direction::Debit => receipts.iter().find_map(|receipt| {
                self.in_band(receipt.amount.to_decimal(), txn.amount.to_decimal())
                    .map(|confidence| {
                        (
                            MatchState::Receipt {
                                id: receipt.id,
                                label: receipt.description.clone(),
                            },
                            confidence,
                        )
                    })
            }),
        };

        match hit {
            Some((state, confidence)) => MatchedTransaction {
                txn: txn.clone(),
                state,
                confidence,
                saved: false,
            },
            None => MatchedTransaction {
                txn: txn.clone(),
                state: MatchState::Unmatched,
                confidence: Confidence::None,
                saved: false,
            },
        }
    }

    /// The candidate's own amount anchors the band:
    /// `|candidate − amount| ≤ candidate × tolerance`.
    fn in_band(&self, candidate: Decimal, amount: Decimal) -> Option<Confidence> {
        let diff = (candidate - amount).abs();
        if diff > candidate * self.tolerance {
            return None;
        }
        Some(if diff < self.exact_threshold {
            Confidence::High
        } else {
            Confidence::Medium
        })
    }
}
