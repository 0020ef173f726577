//! Bank-statement reconciliation: parse an uploaded statement, auto-match
//! rows against paid invoices and receipts, resolve the rest by hand, and
//! persist confirmed rows as reconciled expenses exactly once.

pub mod matcher;
pub mod persist;
pub mod statement;
pub mod workset;

pub use matcher::{Confidence, MatchState, MatchedTransaction, Matcher};
pub use persist::{save_reconciled, ExpenseStore, SaveReport};
pub use statement::{parse_statement, Direction, ParsedTransaction, StatementError, TxnId};
pub use workset::{ManualTarget, Summary, WorkingSet};
