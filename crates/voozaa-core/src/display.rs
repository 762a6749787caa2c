//! Display formatting for amounts and dates
//!
//! Amounts use German grouping (`3.500,00 €`). Dates follow the configured
//! pattern, in which `YYYY`, `MM` and `DD` are replaced by the zero-padded
//! year, month and day.

use chrono::{Datelike, NaiveDate};

/// Format an amount with two decimals, German separators and a currency sign
pub fn format_money(amount: f64, currency: &str) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{},{:02} {}", sign, whole, cents % 100, currency_symbol(currency))
}

/// Format a date using a `DD`/`MM`/`YYYY` pattern, e.g. `DD.MM.YYYY`
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    pattern
        .replace("YYYY", &format!("{:04}", date.year()))
        .replace("MM", &format!("{:02}", date.month()))
        .replace("DD", &format!("{:02}", date.day()))
}

fn currency_symbol(code: &str) -> String {
    match code.trim().to_uppercase().as_str() {
        "EUR" | "" => "€".to_string(),
        "USD" => "$".to_string(),
        "GBP" => "£".to_string(),
        other => other.to_string(),
    }
}

fn group_thousands(mut n: u64) -> String {
    let mut groups = Vec::new();
    loop {
        if n < 1000 {
            groups.push(n.to_string());
            break;
        }
        groups.push(format!("{:03}", n % 1000));
        n /= 1000;
    }
    groups.reverse();
    groups.join(".")
}
