use serde::{Deserialize, Serialize};

use super::ids::ReceiptId;
use super::money::Money;

/// A recorded purchase (receipt photo, logged expense, etc.). Receipts are
/// matching candidates for money leaving the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub id: ReceiptId,
    pub amount: Money,
    pub description: String,
    pub project_title: Option<String>,
}
