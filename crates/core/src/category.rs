use serde::{Deserialize, Serialize};

use super::ids::CategoryId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub id: CategoryId,
    pub name: String,
    /// IRS Schedule C line reference. Opaque here — carried through to
    /// reports and exports.
    pub irs_code: Option<String>,
}

/// Built-in categories seeded on first run. `(name, irs_code)`.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Advertising & Marketing", "line_8"),
    ("Bank Fees", "line_17"),
    ("Business Meals (50% deductible)", "line_24b"),
    ("Education & Training", "line_27"),
    ("Equipment", "line_15"),
    ("Home Office", "line_30"),
    ("Insurance", "line_14"),
    ("Internet & Phone", "line_18"),
    ("Legal & Professional", "line_17"),
    ("Materials & Supplies", "line_22"),
    ("Mileage", "line_24a"),
    ("Office Supplies", "line_18"),
    ("Software & Subscriptions", "line_18"),
    ("Subcontractors", "line_11"),
    ("Travel", "line_24a"),
    ("Utilities", "line_18"),
    ("Vehicle Expenses", "line_24a"),
    ("Miscellaneous", "line_27"),
];
