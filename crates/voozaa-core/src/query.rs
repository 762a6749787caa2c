//! Query engine
//!
//! Derives read-only, ordered views over the lead and customer collections:
//! free-text search, categorical filters and a scoped sort order. All
//! functions are pure over a borrowed [`TrackerState`] and return references
//! into it, so a view can never contain a record the snapshot does not hold.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::collate::natural_cmp;
use crate::models::{Customer, CustomerStatus, Lead};
use crate::state::TrackerState;

/// A categorical filter; `All` disables it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Filter<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(expected) => expected == value,
        }
    }
}

impl<T> From<Option<T>> for Filter<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Filter::All, Filter::Only)
    }
}

/// Location filter: `Only(None)` selects records without a location
pub type LocationFilter = Filter<Option<String>>;

/// Search and filters for the lead list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadQuery {
    pub search: String,
    pub stage: Filter<String>,
    pub location: LocationFilter,
}

impl LeadQuery {
    pub fn matches(&self, lead: &Lead) -> bool {
        self.stage.matches(&lead.stage)
            && self.location.matches(&lead.location_id)
            && text_matches(
                &self.search,
                [
                    lead.name.as_str(),
                    lead.company.as_str(),
                    lead.email.as_str(),
                    lead.phone.as_str(),
                    lead.source.as_str(),
                    lead.notes.as_str(),
                ],
            )
    }
}

/// Search and filters for the customer list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerQuery {
    pub search: String,
    pub status: Filter<CustomerStatus>,
    pub location: LocationFilter,
}

impl CustomerQuery {
    pub fn matches(&self, customer: &Customer) -> bool {
        let tags = customer.tags.join(" ");
        self.status.matches(&customer.status)
            && self.location.matches(&customer.location_id)
            && text_matches(
                &self.search,
                [
                    customer.name.as_str(),
                    customer.contact.as_str(),
                    customer.email.as_str(),
                    customer.phone.as_str(),
                    tags.as_str(),
                    customer.notes.as_str(),
                ],
            )
    }
}

/// Case-insensitive substring match; a blank query matches everything
fn text_matches<'a>(query: &str, fields: impl IntoIterator<Item = &'a str>) -> bool {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }
    fields.into_iter().any(|f| f.to_lowercase().contains(&q))
}

// ==================== Sorting ====================

/// Sortable lead columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadField {
    Name,
    Company,
    Email,
    Phone,
    Stage,
    Source,
    Location,
    CreatedAt,
    UpdatedAt,
    Value,
    Notes,
}

/// Sortable customer columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerField {
    Name,
    Contact,
    Email,
    Phone,
    Status,
    Tags,
    Location,
    Mrr,
    StartDate,
    Notes,
}

/// Which collection a sort applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortScope {
    Leads,
    Customers,
}

/// A column, tied to the collection it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Lead(LeadField),
    Customer(CustomerField),
}

impl SortField {
    pub fn scope(&self) -> SortScope {
        match self {
            SortField::Lead(_) => SortScope::Leads,
            SortField::Customer(_) => SortScope::Customers,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Active sort order
///
/// Applies only to the collection named by its field's scope; the other
/// collection keeps its natural order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    /// Most recently updated leads first
    fn default() -> Self {
        Self {
            field: SortField::Lead(LeadField::UpdatedAt),
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn scope(&self) -> SortScope {
        self.field.scope()
    }

    /// Select a column: the active column flips direction, any other starts ascending
    pub fn toggle(self, field: SortField) -> Self {
        if self.field == field {
            Self {
                field,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                field,
                direction: SortDirection::Asc,
            }
        }
    }
}

/// A value extracted from a record for ordering
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    fn as_text(&self) -> String {
        match self {
            SortValue::Number(n) => n.to_string(),
            SortValue::Text(s) => s.clone(),
        }
    }
}

/// Numeric when both sides are numbers, natural text order otherwise
pub fn compare_values(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Number(x), SortValue::Number(y)) => x.total_cmp(y),
        _ => natural_cmp(&a.as_text(), &b.as_text()),
    }
}

fn timestamp_text(ts: &DateTime<Utc>) -> SortValue {
    SortValue::Text(ts.to_rfc3339_opts(SecondsFormat::Nanos, true))
}

fn location_text(state: &TrackerState, id: Option<&str>) -> SortValue {
    SortValue::Text(state.location_name(id).unwrap_or_default().to_string())
}

/// Value of a lead column
pub fn lead_value(state: &TrackerState, lead: &Lead, field: LeadField) -> SortValue {
    match field {
        LeadField::Name => SortValue::Text(lead.name.clone()),
        LeadField::Company => SortValue::Text(lead.company.clone()),
        LeadField::Email => SortValue::Text(lead.email.clone()),
        LeadField::Phone => SortValue::Text(lead.phone.clone()),
        LeadField::Stage => SortValue::Text(lead.stage.clone()),
        LeadField::Source => SortValue::Text(lead.source.clone()),
        LeadField::Location => location_text(state, lead.location_id.as_deref()),
        LeadField::CreatedAt => timestamp_text(&lead.created_at),
        LeadField::UpdatedAt => timestamp_text(&lead.updated_at),
        LeadField::Value => SortValue::Number(lead.value),
        LeadField::Notes => SortValue::Text(lead.notes.clone()),
    }
}

/// Value of a customer column
pub fn customer_value(state: &TrackerState, customer: &Customer, field: CustomerField) -> SortValue {
    match field {
        CustomerField::Name => SortValue::Text(customer.name.clone()),
        CustomerField::Contact => SortValue::Text(customer.contact.clone()),
        CustomerField::Email => SortValue::Text(customer.email.clone()),
        CustomerField::Phone => SortValue::Text(customer.phone.clone()),
        CustomerField::Status => SortValue::Text(customer.status.label().to_string()),
        CustomerField::Tags => SortValue::Text(customer.tags.join(" ")),
        CustomerField::Location => location_text(state, customer.location_id.as_deref()),
        CustomerField::Mrr => SortValue::Number(customer.mrr),
        CustomerField::StartDate => SortValue::Text(
            customer
                .start_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ),
        CustomerField::Notes => SortValue::Text(customer.notes.clone()),
    }
}

fn directed(ord: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

/// Stable in-place sort of lead rows; no-op when the sort targets customers
pub fn sort_leads(state: &TrackerState, rows: &mut [&Lead], sort: &SortSpec) {
    let SortField::Lead(field) = sort.field else {
        return;
    };
    rows.sort_by(|a, b| {
        directed(
            compare_values(&lead_value(state, a, field), &lead_value(state, b, field)),
            sort.direction,
        )
    });
}

/// Stable in-place sort of customer rows; no-op when the sort targets leads
pub fn sort_customers(state: &TrackerState, rows: &mut [&Customer], sort: &SortSpec) {
    let SortField::Customer(field) = sort.field else {
        return;
    };
    rows.sort_by(|a, b| {
        directed(
            compare_values(
                &customer_value(state, a, field),
                &customer_value(state, b, field),
            ),
            sort.direction,
        )
    });
}

/// Filtered, sorted view of the leads
pub fn leads<'a>(state: &'a TrackerState, query: &LeadQuery, sort: &SortSpec) -> Vec<&'a Lead> {
    let mut rows: Vec<&Lead> = state.leads.iter().filter(|l| query.matches(l)).collect();
    sort_leads(state, &mut rows, sort);
    rows
}

/// Filtered, sorted view of the customers
pub fn customers<'a>(
    state: &'a TrackerState,
    query: &CustomerQuery,
    sort: &SortSpec,
) -> Vec<&'a Customer> {
    let mut rows: Vec<&Customer> = state
        .customers
        .iter()
        .filter(|c| query.matches(c))
        .collect();
    sort_customers(state, &mut rows, sort);
    rows
}

// ==================== Parsing ====================

impl FromStr for LeadField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim().to_lowercase().replace(['_', '-'], "").as_str() {
            "name" => LeadField::Name,
            "company" => LeadField::Company,
            "email" => LeadField::Email,
            "phone" => LeadField::Phone,
            "stage" => LeadField::Stage,
            "source" => LeadField::Source,
            "location" => LeadField::Location,
            "createdat" | "created" => LeadField::CreatedAt,
            "updatedat" | "updated" => LeadField::UpdatedAt,
            "value" => LeadField::Value,
            "notes" => LeadField::Notes,
            _ => return Err(format!("Unknown lead field '{}'", s)),
        };
        Ok(field)
    }
}

impl FromStr for CustomerField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim().to_lowercase().replace(['_', '-'], "").as_str() {
            "name" => CustomerField::Name,
            "contact" => CustomerField::Contact,
            "email" => CustomerField::Email,
            "phone" => CustomerField::Phone,
            "status" => CustomerField::Status,
            "tags" => CustomerField::Tags,
            "location" => CustomerField::Location,
            "mrr" => CustomerField::Mrr,
            "startdate" | "start" => CustomerField::StartDate,
            "notes" => CustomerField::Notes,
            _ => return Err(format!("Unknown customer field '{}'", s)),
        };
        Ok(field)
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("Unknown sort direction '{}'. Use asc or desc.", s)),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}
