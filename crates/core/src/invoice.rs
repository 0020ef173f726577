use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::InvoiceId;
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "draft"),
            InvoiceStatus::Sent => write!(f, "sent"),
            InvoiceStatus::Paid => write!(f, "paid"),
            InvoiceStatus::Overdue => write!(f, "overdue"),
        }
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            other => Err(format!("Unknown invoice status: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub number: String,
    pub status: InvoiceStatus,
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    /// Invoice total is derived from line items, rounded to cents.
    pub fn total(&self) -> Money {
        let sum = self
            .items
            .iter()
            .map(|item| item.quantity * item.unit_price.to_decimal())
            .sum::<Decimal>();
        Money::from_decimal(sum)
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: &str, unit_price_cents: i64) -> InvoiceItem {
        InvoiceItem {
            description: "work".to_string(),
            quantity: Decimal::from_str(quantity).unwrap(),
            unit_price: Money::from_cents(unit_price_cents),
        }
    }

    #[test]
    fn total_sums_line_items() {
        let invoice = Invoice {
            id: InvoiceId(1),
            number: "1042".to_string(),
            status: InvoiceStatus::Paid,
            items: vec![item("2", 15000), item("1", 20000)],
        };
        assert_eq!(invoice.total(), Money::from_cents(50000));
    }

    #[test]
    fn total_handles_fractional_quantity() {
        let invoice = Invoice {
            id: InvoiceId(2),
            number: "1043".to_string(),
            status: InvoiceStatus::Sent,
            items: vec![item("1.5", 10000)],
        };
        assert_eq!(invoice.total(), Money::from_cents(15000));
    }

    #[test]
    fn total_of_empty_invoice_is_zero() {
        let invoice = Invoice {
            id: InvoiceId(3),
            number: "1044".to_string(),
            status: InvoiceStatus::Draft,
            items: vec![],
        };
        assert!(invoice.total().is_zero());
    }

    #[test]
    fn status_string_round_trip() {
        for status in [
            InvoiceStatus::Draft,
            InvoiceStatus::Sent,
            InvoiceStatus::Paid,
            InvoiceStatus::Overdue,
        ] {
            assert_eq!(status.to_string().parse::<InvoiceStatus>().unwrap(), status);
        }
        assert!("void".parse::<InvoiceStatus>().is_err());
    }
}
