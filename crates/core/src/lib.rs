pub mod category;
pub mod expense;
pub mod ids;
pub mod invoice;
pub mod money;
pub mod receipt;

pub use category::{ExpenseCategory, DEFAULT_CATEGORIES};
pub use expense::NewExpense;
pub use ids::{CategoryId, InvoiceId, ReceiptId, UserId};
pub use invoice::{Invoice, InvoiceItem, InvoiceStatus};
pub use money::Money;
pub use receipt::Receipt;
