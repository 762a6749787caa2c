//! Comma-separated exports of leads and customers
//!
//! Rows are separated by `\n` and fields by `,`. A field containing a comma,
//! a double quote or a newline is wrapped in double quotes with inner quotes
//! doubled; every other field is written verbatim. [`parse_rows`] reads this
//! format back.

use chrono::{DateTime, Utc};

use crate::error::ParseError;
use crate::state::TrackerState;

/// Column headers of the lead export, in order
pub const LEAD_HEADERS: [&str; 12] = [
    "ID",
    "Name",
    "Unternehmen",
    "E-Mail",
    "Telefon",
    "Stage",
    "Quelle",
    "Standort",
    "Erstellt",
    "Aktualisiert",
    "Wert",
    "Notizen",
];

/// Column headers of the customer export, in order
pub const CUSTOMER_HEADERS: [&str; 11] = [
    "ID",
    "Kunde",
    "Kontakt",
    "E-Mail",
    "Telefon",
    "Status",
    "Tags",
    "Standort",
    "MRR",
    "Startdatum",
    "Notizen",
];

/// Separator used when several tags share one field
pub const TAG_SEPARATOR: &str = " | ";

/// Quote a field if it contains a separator or a quote
pub fn escape_field(value: &str) -> String {
    if value.contains('"') || value.contains(',') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Export all leads, in store order
pub fn leads_csv(state: &TrackerState) -> String {
    let rows = state.leads.iter().map(|lead| {
        vec![
            lead.id.clone(),
            lead.name.clone(),
            lead.company.clone(),
            lead.email.clone(),
            lead.phone.clone(),
            lead.stage.clone(),
            lead.source.clone(),
            location_column(state, lead.location_id.as_deref()),
            iso_date(&lead.created_at),
            iso_date(&lead.updated_at),
            lead.value.to_string(),
            lead.notes.clone(),
        ]
    });
    to_csv(&LEAD_HEADERS, rows)
}

/// Export all customers, in store order
pub fn customers_csv(state: &TrackerState) -> String {
    let rows = state.customers.iter().map(|customer| {
        vec![
            customer.id.clone(),
            customer.name.clone(),
            customer.contact.clone(),
            customer.email.clone(),
            customer.phone.clone(),
            customer.status.label().to_string(),
            customer.tags.join(TAG_SEPARATOR),
            location_column(state, customer.location_id.as_deref()),
            customer.mrr.to_string(),
            customer
                .start_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            customer.notes.clone(),
        ]
    });
    to_csv(&CUSTOMER_HEADERS, rows)
}

/// Split exported text back into rows of unescaped fields
///
/// The first row is the header row. Empty input yields no rows.
pub fn parse_rows(text: &str) -> Result<Vec<Vec<String>>, ParseError> {
    let mut rows = Vec::new();
    if text.is_empty() {
        return Ok(rows);
    }

    let mut row = Vec::new();
    let mut field = String::new();
    let mut line = 1;
    let mut chars = text.chars().peekable();

    loop {
        // Start of a field
        if chars.peek() == Some(&'"') {
            chars.next();
            let opened_on = line;
            loop {
                match chars.next() {
                    Some('"') if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    Some('"') => break,
                    Some(c) => {
                        if c == '\n' {
                            line += 1;
                        }
                        field.push(c);
                    }
                    None => return Err(ParseError::UnterminatedQuote { line: opened_on }),
                }
            }
            match chars.peek() {
                None | Some(',') | Some('\n') => {}
                Some(&found) => return Err(ParseError::TrailingAfterQuote { line, found }),
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c == ',' || c == '\n' {
                    break;
                }
                field.push(c);
                chars.next();
            }
        }

        row.push(std::mem::take(&mut field));
        match chars.next() {
            Some(',') => {}
            Some(_) => {
                // Row separator
                rows.push(std::mem::take(&mut row));
                line += 1;
            }
            None => {
                rows.push(row);
                return Ok(rows);
            }
        }
    }
}

fn to_csv<I>(headers: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut lines = vec![headers
        .iter()
        .map(|h| escape_field(h))
        .collect::<Vec<_>>()
        .join(",")];
    lines.extend(rows.into_iter().map(|row| {
        row.iter()
            .map(|field| escape_field(field))
            .collect::<Vec<_>>()
            .join(",")
    }));
    lines.join("\n")
}

fn location_column(state: &TrackerState, id: Option<&str>) -> String {
    state.location_name(id).unwrap_or_default().to_string()
}

fn iso_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}
