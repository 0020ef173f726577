use fieldbook_core::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Row id synthesized from the row's position in the upload. Stable only
/// within one reconciliation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxnId(pub usize);

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money in — candidate for an invoice match.
    Credit,
    /// Money out — candidate for a receipt match or an expense category.
    Debit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub id: TxnId,
    /// Raw date field exactly as it appeared in the statement. Normalized
    /// only at save time.
    pub date: String,
    pub description: String,
    /// Always positive; the sign lives in `direction`.
    pub amount: Money,
    pub direction: Direction,
}

#[derive(Error, Debug)]
pub enum StatementError {
    #[error("Statement contained no usable transactions")]
    NoTransactions,
}

/// Parse the raw text of an uploaded statement.
///
/// The first line is treated as a header when it mentions `date`, `amount`,
/// or `description` (case-insensitive). Fields are split on bare commas with
/// surrounding double quotes stripped — quoted fields containing commas are
/// not supported. Rows whose amount is missing, unparseable, or non-positive
/// are dropped. An upload that yields no rows at all is rejected whole.
pub fn parse_statement(content: &str) -> Result<Vec<ParsedTransaction>, StatementError> {
    let mut lines = content.lines().filter(|l| !l.trim().is_empty()).peekable();

    if lines.peek().is_some_and(|first| is_header(first)) {
        lines.next();
    }

    let transactions: Vec<ParsedTransaction> = lines
        .enumerate()
        .filter_map(|(index, line)| parse_row(index, line))
        .collect();

    if transactions.is_empty() {
        return Err(StatementError::NoTransactions);
    }

    Ok(transactions)
}

fn is_header(line: &str) -> bool {
    let lower = line.to_lowercase();
    ["date", "amount", "description"]
        .iter()
        .any(|token| lower.contains(token))
}

fn parse_row(index: usize, line: &str) -> Option<ParsedTransaction> {
    let fields: Vec<String> = line.split(',').map(clean_field).collect();

    let date = fields.first().cloned().unwrap_or_default();
    let description = fields.get(1).cloned().unwrap_or_default();

    let (amount, direction) = if fields.len() >= 4 {
        // Separate debit / credit columns; a positive credit wins.
        let credit = parse_amount(&fields[3]);
        match credit {
            Some(c) if c.is_positive() => (c, Direction::Credit),
            _ => (parse_amount(&fields[2])?, Direction::Debit),
        }
    } else if fields.len() == 3 {
        // Single signed amount column.
        let signed = parse_amount(&fields[2])?;
        if signed.is_positive() {
            (signed, Direction::Credit)
        } else {
            (signed.abs(), Direction::Debit)
        }
    } else {
        return None;
    };

    if !amount.is_positive() {
        return None;
    }

    Some(ParsedTransaction {
        id: TxnId(index),
        date,
        description,
        amount,
        direction,
    })
}

fn clean_field(raw: &str) -> String {
    let s = raw.trim();
    let s = s.strip_prefix('"').unwrap_or(s);
    let s = s.strip_suffix('"').unwrap_or(s);
    s.to_string()
}

/// Parse the leading decimal prefix of a field: optional sign, digits, an
/// optional point fraction. No currency symbols, no thousands separators.
fn parse_amount(field: &str) -> Option<Money> {
    let s = field.trim();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let bytes = s.as_bytes();
    let mut end = 0;
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    let number = s[..end].trim_end_matches('.');
    let number = if number.starts_with('.') {
        format!("0{number}")
    } else {
        number.to_string()
    };

    let mut dec = Decimal::from_str(&number).ok()?;
    if negative {
        dec = -dec;
    }
    Some(Money::from_decimal(dec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_column_debit() {
        let txs = parse_statement("01/15/2024,Office Depot,-45.99").unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].date, "01/15/2024");
        assert_eq!(txs[0].description, "Office Depot");
        assert_eq!(txs[0].amount, Money::from_cents(4599));
        assert_eq!(txs[0].direction, Direction::Debit);
    }

    #[test]
    fn signed_column_credit() {
        let txs = parse_statement("01/20/2024,Client payment,1500.00").unwrap();
        assert_eq!(txs[0].direction, Direction::Credit);
        assert_eq!(txs[0].amount, Money::from_cents(150000));
    }

    #[test]
    fn header_line_is_skipped() {
        let txs =
            parse_statement("Date,Description,Amount\n01/15/2024,Office Depot,-45.99").unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].id, TxnId(0));
    }

    #[test]
    fn no_header_when_first_line_is_data() {
        let txs = parse_statement("01/15/2024,Lowes,-12.00\n01/16/2024,Deposit,300.00").unwrap();
        assert_eq!(txs.len(), 2);
    }

    #[test]
    fn separate_debit_credit_columns() {
        let input = "01/15/2024,Hardware store,45.99,\n01/16/2024,Invoice payment,,500.00";
        let txs = parse_statement(input).unwrap();
        assert_eq!(txs[0].direction, Direction::Debit);
        assert_eq!(txs[0].amount, Money::from_cents(4599));
        assert_eq!(txs[1].direction, Direction::Credit);
        assert_eq!(txs[1].amount, Money::from_cents(50000));
    }

    #[test]
    fn quoted_fields_are_unwrapped() {
        let txs = parse_statement("\"01/15/2024\",\"Office Depot\",\"-45.99\"").unwrap();
        assert_eq!(txs[0].description, "Office Depot");
        assert_eq!(txs[0].amount, Money::from_cents(4599));
    }

    // Pins the documented limitation: a quoted field containing a comma
    // splits into two fields, shifting the amount into the wrong column.
    #[test]
    fn embedded_comma_shifts_columns_and_drops_the_row() {
        let input = "01/15/2024,\"Depot, Inc\",-45.99\n01/16/2024,Lowes,-12.00";
        let txs = parse_statement(input).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].description, "Lowes");
    }

    #[test]
    fn zero_amount_rows_are_dropped() {
        let input = "01/15/2024,Zero,0.00\n01/16/2024,Real,-10.00";
        let txs = parse_statement(input).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].description, "Real");
    }

    #[test]
    fn unparseable_amount_rows_are_dropped() {
        let input = "01/15/2024,Garbage,not-a-number\n01/16/2024,Real,25.00";
        let txs = parse_statement(input).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].description, "Real");
    }

    #[test]
    fn short_rows_are_dropped() {
        let input = "01/15/2024,Description only\n01/16/2024,Real,25.00";
        let txs = parse_statement(input).unwrap();
        assert_eq!(txs.len(), 1);
    }

    #[test]
    fn ids_follow_row_position() {
        let input = "01/15/2024,Zero,0.00\n01/16/2024,Real,-10.00";
        let txs = parse_statement(input).unwrap();
        // The dropped first row still consumed index 0.
        assert_eq!(txs[0].id, TxnId(1));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            parse_statement(""),
            Err(StatementError::NoTransactions)
        ));
        assert!(matches!(
            parse_statement("Date,Description,Amount\n"),
            Err(StatementError::NoTransactions)
        ));
    }

    #[test]
    fn all_rows_filtered_is_rejected() {
        assert!(matches!(
            parse_statement("01/15/2024,Zero,0.00"),
            Err(StatementError::NoTransactions)
        ));
    }

    #[test]
    fn parsing_is_deterministic() {
        let input = "Date,Description,Amount\n01/15/2024,Office Depot,-45.99\n01/16/2024,Deposit,300.00";
        let first = parse_statement(input).unwrap();
        let second = parse_statement(input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn amount_prefix_parsing() {
        assert_eq!(parse_amount("45.99"), Some(Money::from_cents(4599)));
        assert_eq!(parse_amount("-45.99"), Some(Money::from_cents(-4599)));
        assert_eq!(parse_amount(" 100 "), Some(Money::from_cents(10000)));
        assert_eq!(parse_amount(".5"), Some(Money::from_cents(50)));
        assert_eq!(parse_amount("5."), Some(Money::from_cents(500)));
        // Longest-prefix semantics: a thousands separator ends the number.
        assert_eq!(parse_amount("5,000"), Some(Money::from_cents(500)));
        assert_eq!(parse_amount("$45.99"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
    }
}
