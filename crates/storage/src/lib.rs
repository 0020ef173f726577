pub mod db;
pub mod queries;

pub use db::{create_db, create_db_in_memory, seed_default_categories, DbPool};
pub use queries::{
    get_categories, get_expenses_for_user, get_paid_invoices, get_receipts, insert_expense,
    insert_invoice, insert_receipt, ExpenseRecord, SqliteExpenseStore,
};
