//! Data models for VooZaa Tracker
//!
//! Defines the record types (Location, Lead, Customer), the configuration
//! records (Settings, Profile, UiState), the activity log entry, and the
//! input/patch types accepted by the store.
//!
//! Field names serialize in camelCase so snapshots stay compatible with
//! backups written by earlier versions of the tracker. Defaults for missing
//! fields are resolved here, once, at decode time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Generate a fresh opaque identifier, e.g. `lead_3f2a...`
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

/// A named site used to segment leads and customers
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub region: String,
    pub address: String,
}

/// A prospective sales opportunity moving through the stage pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Lead {
    /// Unique identifier
    pub id: String,
    /// Contact person
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    /// One of the configured lead stages
    pub stage: String,
    /// Where the lead came from (website, referral, ...)
    pub source: String,
    /// Weak reference to a location
    pub location_id: Option<String>,
    /// When this lead was created (never changes afterwards)
    #[serde(deserialize_with = "de::timestamp")]
    pub created_at: DateTime<Utc>,
    /// When this lead was last modified
    #[serde(deserialize_with = "de::timestamp")]
    pub updated_at: DateTime<Utc>,
    /// Expected deal value
    #[serde(deserialize_with = "de::amount")]
    pub value: f64,
    pub notes: String,
}

impl Lead {
    /// Create a new lead in the given stage with a fresh ID
    pub fn new(name: impl Into<String>, stage: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id("lead"),
            name: name.into(),
            stage: stage.into(),
            created_at: now,
            updated_at: now,
            ..Default::default()
        }
    }

    /// Refresh `updated_at`, never moving it backwards
    pub fn touch(&mut self) {
        self.updated_at = self.updated_at.max(Utc::now());
    }

    /// Build an input pre-filled with this lead's editable fields
    pub fn to_input(&self) -> LeadInput {
        LeadInput {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            company: self.company.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            stage: Some(self.stage.clone()),
            source: self.source.clone(),
            location_id: self.location_id.clone(),
            value: self.value,
            notes: self.notes.clone(),
        }
    }
}

/// Lifecycle status of a customer account
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CustomerStatus {
    #[default]
    #[serde(rename = "Aktiv")]
    Active,
    #[serde(rename = "Pausiert")]
    Paused,
    #[serde(rename = "Kündigung")]
    Cancelling,
}

impl CustomerStatus {
    /// All statuses, in display order
    pub const ALL: [CustomerStatus; 3] = [
        CustomerStatus::Active,
        CustomerStatus::Paused,
        CustomerStatus::Cancelling,
    ];

    /// The label stored in snapshots and shown to users
    pub fn label(&self) -> &'static str {
        match self {
            CustomerStatus::Active => "Aktiv",
            CustomerStatus::Paused => "Pausiert",
            CustomerStatus::Cancelling => "Kündigung",
        }
    }
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CustomerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aktiv" | "active" => Ok(CustomerStatus::Active),
            "pausiert" | "paused" => Ok(CustomerStatus::Paused),
            "kündigung" | "kuendigung" | "cancelling" => Ok(CustomerStatus::Cancelling),
            other => Err(format!(
                "Unknown status '{}'. Valid: Aktiv, Pausiert, Kündigung",
                other
            )),
        }
    }
}

/// A contracted account with recurring revenue
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    pub id: String,
    /// Account name
    pub name: String,
    /// Contact person
    pub contact: String,
    pub email: String,
    pub phone: String,
    /// Weak reference to a location
    pub location_id: Option<String>,
    pub status: CustomerStatus,
    /// Tags from the configured vocabulary, no duplicates
    pub tags: Vec<String>,
    /// Monthly recurring revenue
    #[serde(deserialize_with = "de::amount")]
    pub mrr: f64,
    #[serde(deserialize_with = "de::optional_date")]
    pub start_date: Option<NaiveDate>,
    pub notes: String,
}

impl Customer {
    /// Build an input pre-filled with this customer's editable fields
    pub fn to_input(&self) -> CustomerInput {
        CustomerInput {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            contact: self.contact.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            location_id: self.location_id.clone(),
            status: self.status,
            tags: self.tags.clone(),
            mrr: self.mrr,
            start_date: self.start_date,
            notes: self.notes.clone(),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// ISO currency code used for display
    pub currency: String,
    /// Date display pattern using DD, MM and YYYY tokens
    pub date_format: String,
    /// Ask before deleting records
    pub allow_delete_confirm: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "EUR".to_string(),
            date_format: "DD.MM.YYYY".to_string(),
            allow_delete_confirm: true,
        }
    }
}

/// Organisation and user names shown in the header
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub org_name: String,
    pub user_name: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            org_name: "VooZaa Tracking".to_string(),
            user_name: "Admin".to_string(),
        }
    }
}

/// Top-level views of the tracker
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Overview,
    Leads,
    Customers,
    Analytics,
    Locations,
    Settings,
}

impl Tab {
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Leads => "leads",
            Tab::Customers => "customers",
            Tab::Analytics => "analytics",
            Tab::Locations => "locations",
            Tab::Settings => "settings",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overview" => Ok(Tab::Overview),
            "leads" => Ok(Tab::Leads),
            "customers" => Ok(Tab::Customers),
            "analytics" => Ok(Tab::Analytics),
            "locations" => Ok(Tab::Locations),
            "settings" => Ok(Tab::Settings),
            other => Err(format!("Unknown tab '{}'", other)),
        }
    }
}

/// Transient view state of the session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UiState {
    pub active_tab: Tab,
    pub sidebar_open: bool,
    pub compact_mode: bool,
    pub show_help: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_tab: Tab::Overview,
            sidebar_open: true,
            compact_mode: false,
            show_help: false,
        }
    }
}

impl UiState {
    /// Overlay the fields present in `patch`
    pub fn merged(&self, patch: &UiPatch) -> Self {
        Self {
            active_tab: patch.active_tab.unwrap_or(self.active_tab),
            sidebar_open: patch.sidebar_open.unwrap_or(self.sidebar_open),
            compact_mode: patch.compact_mode.unwrap_or(self.compact_mode),
            show_help: patch.show_help.unwrap_or(self.show_help),
        }
    }
}

/// Kind of record an activity entry refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Lead,
    Customer,
    Location,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Lead => "Lead",
            EntityKind::Customer => "Customer",
            EntityKind::Location => "Location",
        }
    }
}

/// What happened to the record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Created,
    Updated,
    Deleted,
}

/// One entry of the activity log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    #[serde(deserialize_with = "de::timestamp")]
    pub at: DateTime<Utc>,
    pub action: ActivityAction,
    pub entity: EntityKind,
    pub entity_id: String,
    /// Record name at the time of the change
    #[serde(default)]
    pub label: String,
}

impl Activity {
    pub fn new(
        action: ActivityAction,
        entity: EntityKind,
        entity_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id("act"),
            at: Utc::now(),
            action,
            entity,
            entity_id: entity_id.into(),
            label: label.into(),
        }
    }
}

// ==================== Inputs ====================

/// Fields submitted to create or update a lead
///
/// `id` selects the record to update; a missing or unknown id inserts.
/// `stage: None` picks the first configured stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadInput {
    pub id: Option<String>,
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub stage: Option<String>,
    pub source: String,
    pub location_id: Option<String>,
    pub value: f64,
    pub notes: String,
}

impl LeadInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Trim text fields and drop blank ids
    pub(crate) fn normalized(mut self) -> Self {
        self.id = non_blank(self.id);
        self.name = self.name.trim().to_string();
        self.company = self.company.trim().to_string();
        self.email = self.email.trim().to_string();
        self.phone = self.phone.trim().to_string();
        self.stage = non_blank(self.stage);
        self.source = self.source.trim().to_string();
        self.location_id = non_blank(self.location_id);
        self.notes = self.notes.trim().to_string();
        self
    }
}

/// Fields submitted to create or update a customer
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerInput {
    pub id: Option<String>,
    pub name: String,
    pub contact: String,
    pub email: String,
    pub phone: String,
    pub location_id: Option<String>,
    pub status: CustomerStatus,
    pub tags: Vec<String>,
    pub mrr: f64,
    /// Defaults to today when `None`
    pub start_date: Option<NaiveDate>,
    pub notes: String,
}

impl Default for CustomerInput {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            contact: String::new(),
            email: String::new(),
            phone: String::new(),
            location_id: None,
            status: CustomerStatus::Active,
            tags: Vec::new(),
            mrr: 0.0,
            start_date: None,
            notes: String::new(),
        }
    }
}

impl CustomerInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Trim text fields, drop blank ids and collapse duplicate tags
    pub(crate) fn normalized(mut self) -> Self {
        self.id = non_blank(self.id);
        self.name = self.name.trim().to_string();
        self.contact = self.contact.trim().to_string();
        self.email = self.email.trim().to_string();
        self.phone = self.phone.trim().to_string();
        self.location_id = non_blank(self.location_id);
        self.tags = dedup_tags(self.tags.iter().map(|t| t.trim().to_string()));
        self.notes = self.notes.trim().to_string();
        self
    }
}

/// Fields submitted to create or update a location
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationInput {
    pub id: Option<String>,
    pub name: String,
    pub region: String,
    pub address: String,
}

impl LocationInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub(crate) fn normalized(mut self) -> Self {
        self.id = non_blank(self.id);
        self.name = self.name.trim().to_string();
        self.region = self.region.trim().to_string();
        self.address = self.address.trim().to_string();
        self
    }
}

impl From<&Location> for LocationInput {
    fn from(location: &Location) -> Self {
        Self {
            id: Some(location.id.clone()),
            name: location.name.clone(),
            region: location.region.clone(),
            address: location.address.clone(),
        }
    }
}

// ==================== Patches ====================

/// Partial profile update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub org_name: Option<String>,
    pub user_name: Option<String>,
}

/// Partial settings update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub currency: Option<String>,
    pub date_format: Option<String>,
    pub allow_delete_confirm: Option<bool>,
}

/// Partial UI state, as found in imported snapshots
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UiPatch {
    pub active_tab: Option<Tab>,
    pub sidebar_open: Option<bool>,
    pub compact_mode: Option<bool>,
    pub show_help: Option<bool>,
}

/// Collapse duplicate and blank tags, keeping first occurrence order
pub(crate) fn dedup_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Lenient deserializers for fields older snapshots stored loosely
mod de {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    /// Accepts a number, a numeric string, or null (0)
    ///
    /// The amount must be finite and non-negative.
    pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let value = match Option::<RawAmount>::deserialize(deserializer)? {
            None => return Ok(0.0),
            Some(RawAmount::Number(n)) => n,
            Some(RawAmount::Text(s)) if s.trim().is_empty() => return Ok(0.0),
            Some(RawAmount::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("invalid amount '{}'", s)))?,
        };
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(D::Error::custom(format!(
                "invalid amount {} (must be a non-negative number)",
                value
            )))
        }
    }

    /// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC)
    pub fn timestamp<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw)))
    }

    /// Accepts `YYYY-MM-DD`, an RFC 3339 timestamp, an empty string, or null
    pub fn optional_date<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_timestamp(&s)
                .map(|ts| Some(ts.date_naive()))
                .ok_or_else(|| D::Error::custom(format!("invalid date '{}'", s))),
        }
    }

    fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }
}
