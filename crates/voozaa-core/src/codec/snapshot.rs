//! Whole-state JSON snapshots
//!
//! The snapshot format is the camelCase JSON document the tracker has always
//! written to storage and to backup files. Decoding is lenient about missing
//! keys (they take their defaults) but strict about the top-level shape.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ParseError;
use crate::integrity;
use crate::models::{Activity, Customer, Lead, Location, Profile, Settings, UiPatch};
use crate::state::TrackerState;

/// Encode the complete state as pretty-printed JSON
pub fn serialize(state: &TrackerState) -> String {
    // Every field has an infallible JSON encoding
    serde_json::to_string_pretty(state).unwrap_or_else(|_| String::from("{}"))
}

/// Decode a complete state
///
/// Missing keys take their defaults. The result is normalized: blank IDs are
/// replaced and references to missing locations are cleared.
pub fn deserialize(text: &str) -> Result<TrackerState, ParseError> {
    let value = parse_object(text)?;
    let mut state: TrackerState = serde_json::from_value(value)?;
    integrity::normalize(&mut state);
    Ok(state)
}

/// Top-level keys of an imported snapshot
///
/// A key that is absent (or `null`) leaves the current value alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPatch {
    pub profile: Option<Profile>,
    pub ui: Option<UiPatch>,
    pub settings: Option<Settings>,
    pub lead_stages: Option<Vec<String>>,
    pub customer_tags: Option<Vec<String>>,
    pub locations: Option<Vec<Location>>,
    pub leads: Option<Vec<Lead>>,
    pub customers: Option<Vec<Customer>>,
    pub activities: Option<Vec<Activity>>,
}

impl SnapshotPatch {
    /// Parse import text into a patch without applying it
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let value = parse_object(text)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Names of the top-level keys this patch carries, in snapshot order
    pub fn keys(&self) -> Vec<&'static str> {
        let present = [
            ("profile", self.profile.is_some()),
            ("ui", self.ui.is_some()),
            ("settings", self.settings.is_some()),
            ("leadStages", self.lead_stages.is_some()),
            ("customerTags", self.customer_tags.is_some()),
            ("locations", self.locations.is_some()),
            ("leads", self.leads.is_some()),
            ("customers", self.customers.is_some()),
            ("activities", self.activities.is_some()),
        ];
        present
            .into_iter()
            .filter(|(_, is_set)| *is_set)
            .map(|(key, _)| key)
            .collect()
    }

    /// Build the next state from `current`
    ///
    /// Present keys replace the current value wholesale, except `ui`, whose
    /// fields are merged one by one over the current UI state.
    pub fn apply(self, current: &TrackerState) -> TrackerState {
        let mut next = current.clone();
        if let Some(profile) = self.profile {
            next.profile = profile;
        }
        if let Some(ui) = self.ui {
            next.ui = current.ui.merged(&ui);
        }
        if let Some(settings) = self.settings {
            next.settings = settings;
        }
        if let Some(stages) = self.lead_stages {
            next.lead_stages = stages;
        }
        if let Some(tags) = self.customer_tags {
            next.customer_tags = tags;
        }
        if let Some(locations) = self.locations {
            next.locations = locations;
        }
        if let Some(leads) = self.leads {
            next.leads = leads;
        }
        if let Some(customers) = self.customers {
            next.customers = customers;
        }
        if let Some(activities) = self.activities {
            next.activities = activities;
        }
        integrity::normalize(&mut next);
        next
    }
}

/// Merge an imported snapshot over `current`
pub fn apply_import(current: &TrackerState, text: &str) -> Result<TrackerState, ParseError> {
    Ok(SnapshotPatch::parse(text)?.apply(current))
}

fn parse_object(text: &str) -> Result<Value, ParseError> {
    let value: Value = serde_json::from_str(text)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ParseError::NotAnObject {
            found: json_kind(&value),
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
