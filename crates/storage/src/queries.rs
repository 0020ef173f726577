use chrono::NaiveDate;
use fieldbook_core::{
    CategoryId, ExpenseCategory, Invoice, InvoiceId, InvoiceItem, InvoiceStatus, Money, NewExpense,
    Receipt, ReceiptId, UserId,
};
use fieldbook_recon::ExpenseStore;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::Row;
use std::str::FromStr;

use crate::db::DbPool;

pub async fn get_paid_invoices(pool: &DbPool) -> Result<Vec<Invoice>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, String)>(
        "SELECT id, number, status FROM invoices WHERE status = 'paid' ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let mut invoices = Vec::with_capacity(rows.len());
    for (id, number, status) in rows {
        invoices.push(Invoice {
            id: InvoiceId(id),
            number,
            status: status.parse().unwrap_or(InvoiceStatus::Draft),
            items: get_invoice_items(pool, id).await?,
        });
    }

    Ok(invoices)
}

async fn get_invoice_items(pool: &DbPool, invoice_id: i64) -> Result<Vec<InvoiceItem>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, String, i64)>(
        "SELECT description, quantity, unit_price_cents FROM invoice_items WHERE invoice_id = ? ORDER BY id",
    )
    .bind(invoice_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(description, quantity, unit_price_cents)| InvoiceItem {
            description,
            quantity: Decimal::from_str(&quantity).unwrap_or(Decimal::ZERO),
            unit_price: Money::from_cents(unit_price_cents),
        })
        .collect())
}

pub async fn insert_invoice(
    pool: &DbPool,
    number: &str,
    status: InvoiceStatus,
    items: &[InvoiceItem],
) -> Result<InvoiceId, sqlx::Error> {
    let row = sqlx::query("INSERT INTO invoices (number, status) VALUES (?, ?) RETURNING id")
        .bind(number)
        .bind(status.to_string())
        .fetch_one(pool)
        .await?;
    let id: i64 = row.get("id");

    for item in items {
        sqlx::query(
            "INSERT INTO invoice_items (invoice_id, description, quantity, unit_price_cents) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&item.description)
        .bind(item.quantity.to_string())
        .bind(item.unit_price.to_cents())
        .execute(pool)
        .await?;
    }

    Ok(InvoiceId(id))
}

pub async fn get_receipts(pool: &DbPool) -> Result<Vec<Receipt>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, i64, String, Option<String>)>(
        "SELECT id, amount_cents, description, project_title FROM receipts ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, amount_cents, description, project_title)| Receipt {
            id: ReceiptId(id),
            amount: Money::from_cents(amount_cents),
            description,
            project_title,
        })
        .collect())
}

pub async fn insert_receipt(
    pool: &DbPool,
    amount: Money,
    description: &str,
    project_title: Option<&str>,
) -> Result<ReceiptId, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO receipts (amount_cents, description, project_title) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(amount.to_cents())
    .bind(description)
    .bind(project_title)
    .fetch_one(pool)
    .await?;

    Ok(ReceiptId(row.get("id")))
}

pub async fn get_categories(pool: &DbPool) -> Result<Vec<ExpenseCategory>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, Option<String>)>(
        "SELECT id, name, irs_code FROM expense_categories ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, irs_code)| ExpenseCategory {
            id: CategoryId(id),
            name,
            irs_code,
        })
        .collect())
}

/// A persisted expense as read back from storage.
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub user_id: UserId,
    pub amount: Money,
    pub description: String,
    pub expense_date: NaiveDate,
    pub vendor: Option<String>,
    pub category_id: CategoryId,
    pub bank_statement_ref: Option<String>,
    pub is_reconciled: bool,
}

pub async fn insert_expense(
    pool: &DbPool,
    user: UserId,
    expense: &NewExpense,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO expenses
            (user_id, amount_cents, description, expense_date, vendor, category_id, bank_statement_ref, is_reconciled)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(user.0)
    .bind(expense.amount.to_cents())
    .bind(&expense.description)
    .bind(expense.expense_date.to_string())
    .bind(&expense.vendor)
    .bind(expense.category_id.0)
    .bind(&expense.bank_statement_ref)
    .bind(expense.is_reconciled)
    .fetch_one(pool)
    .await?;

    Ok(row.get("id"))
}

pub async fn get_expenses_for_user(
    pool: &DbPool,
    user: UserId,
) -> Result<Vec<ExpenseRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<
        _,
        (
            i64,
            i64,
            i64,
            String,
            NaiveDate,
            Option<String>,
            i64,
            Option<String>,
            i64,
        ),
    >(
        r#"
        SELECT id, user_id, amount_cents, description, expense_date, vendor, category_id, bank_statement_ref, is_reconciled
        FROM expenses WHERE user_id = ? ORDER BY expense_date DESC, id DESC
        "#,
    )
    .bind(user.0)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ExpenseRecord {
            id: r.0,
            user_id: UserId(r.1),
            amount: Money::from_cents(r.2),
            description: r.3,
            expense_date: r.4,
            vendor: r.5,
            category_id: CategoryId(r.6),
            bank_statement_ref: r.7,
            is_reconciled: r.8 != 0,
        })
        .collect())
}

/// `ExpenseStore` backed by the SQLite pool. The pool is reference-counted,
/// so cloning this is cheap.
#[derive(Clone)]
pub struct SqliteExpenseStore {
    pool: DbPool,
}

impl SqliteExpenseStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ExpenseStore for SqliteExpenseStore {
    type Error = sqlx::Error;

    async fn insert_expense(&self, user: UserId, expense: &NewExpense) -> Result<(), sqlx::Error> {
        insert_expense(&self.pool, user, expense).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldbook_core::DEFAULT_CATEGORIES;

    use crate::db::{create_db_in_memory, seed_default_categories};

    fn item(description: &str, quantity: &str, unit_price_cents: i64) -> InvoiceItem {
        InvoiceItem {
            description: description.to_string(),
            quantity: Decimal::from_str(quantity).unwrap(),
            unit_price: Money::from_cents(unit_price_cents),
        }
    }

    fn expense(description: &str, cents: i64, category: CategoryId) -> NewExpense {
        NewExpense {
            amount: Money::from_cents(cents),
            description: description.to_string(),
            expense_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            vendor: None,
            category_id: category,
            bank_statement_ref: "3".to_string(),
            is_reconciled: true,
        }
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let pool = create_db_in_memory().await.unwrap();
        seed_default_categories(&pool).await.unwrap();
        seed_default_categories(&pool).await.unwrap();

        let categories = get_categories(&pool).await.unwrap();
        assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());
        assert!(categories.iter().any(|c| c.name == "Materials & Supplies"));
    }

    #[tokio::test]
    async fn paid_invoices_only_with_items() {
        let pool = create_db_in_memory().await.unwrap();
        insert_invoice(
            &pool,
            "1042",
            InvoiceStatus::Paid,
            &[item("framing", "2", 15000), item("trim", "1", 20000)],
        )
        .await
        .unwrap();
        insert_invoice(&pool, "1043", InvoiceStatus::Sent, &[item("deck", "1", 90000)])
            .await
            .unwrap();

        let invoices = get_paid_invoices(&pool).await.unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].number, "1042");
        assert_eq!(invoices[0].total(), Money::from_cents(50000));
    }

    #[tokio::test]
    async fn receipts_round_trip() {
        let pool = create_db_in_memory().await.unwrap();
        let id = insert_receipt(&pool, Money::from_cents(4599), "Office Depot", Some("Shed job"))
            .await
            .unwrap();

        let receipts = get_receipts(&pool).await.unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].id, id);
        assert_eq!(receipts[0].amount, Money::from_cents(4599));
        assert_eq!(receipts[0].project_title.as_deref(), Some("Shed job"));
    }

    #[tokio::test]
    async fn expenses_are_scoped_by_user() {
        let pool = create_db_in_memory().await.unwrap();
        seed_default_categories(&pool).await.unwrap();
        let category = get_categories(&pool).await.unwrap()[0].id;

        insert_expense(&pool, UserId(1), &expense("lumber", 4599, category))
            .await
            .unwrap();
        insert_expense(&pool, UserId(2), &expense("paint", 1200, category))
            .await
            .unwrap();

        let mine = get_expenses_for_user(&pool, UserId(1)).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].description, "lumber");
        assert_eq!(mine[0].amount, Money::from_cents(4599));
        assert_eq!(mine[0].bank_statement_ref.as_deref(), Some("3"));
        assert!(mine[0].is_reconciled);
        assert_eq!(
            mine[0].expense_date,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[tokio::test]
    async fn expense_store_impl_writes_through() {
        let pool = create_db_in_memory().await.unwrap();
        seed_default_categories(&pool).await.unwrap();
        let category = get_categories(&pool).await.unwrap()[0].id;

        let store = SqliteExpenseStore::new(pool.clone());
        store
            .insert_expense(UserId(1), &expense("nails", 899, category))
            .await
            .unwrap();

        let saved = get_expenses_for_user(&pool, UserId(1)).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].description, "nails");
    }
}
