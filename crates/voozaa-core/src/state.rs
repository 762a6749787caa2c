//! Tracker state
//!
//! [`TrackerState`] is the complete, immutable snapshot of everything the
//! tracker knows: the three record collections, configuration records and
//! vocabularies. Mutations never modify a snapshot in place; each one is a
//! pure function from the previous snapshot to the next, so readers holding
//! an older snapshot never observe a half-applied change.

use chrono::{NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::integrity;
use crate::models::{
    new_id, Activity, ActivityAction, Customer, CustomerInput, CustomerStatus, EntityKind, Lead,
    LeadInput, Location, LocationInput, Profile, ProfilePatch, Settings, SettingsPatch, UiState,
};

/// Terminal stage for won deals
pub const WON_STAGE: &str = "Gewonnen";

/// Terminal stage for lost deals
pub const LOST_STAGE: &str = "Verloren";

/// Maximum number of activity entries kept
pub const ACTIVITY_LIMIT: usize = 200;

/// Default lead pipeline, in order
pub fn default_lead_stages() -> Vec<String> {
    [
        "Neu",
        "Kontaktiert",
        "Qualifiziert",
        "Angebot gesendet",
        "Verhandlung",
        WON_STAGE,
        LOST_STAGE,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Default customer tag vocabulary
pub fn default_customer_tags() -> Vec<String> {
    ["VIP", "Bestandskunde", "Neukunde", "Upsell", "Churn-Risiko"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Complete state of the tracker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerState {
    pub profile: Profile,
    pub ui: UiState,
    pub settings: Settings,
    pub lead_stages: Vec<String>,
    pub customer_tags: Vec<String>,
    pub locations: Vec<Location>,
    pub leads: Vec<Lead>,
    pub customers: Vec<Customer>,
    /// Newest first
    pub activities: Vec<Activity>,
}

impl Default for TrackerState {
    /// Default configuration with empty collections
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            ui: UiState::default(),
            settings: Settings::default(),
            lead_stages: default_lead_stages(),
            customer_tags: default_customer_tags(),
            locations: Vec::new(),
            leads: Vec::new(),
            customers: Vec::new(),
            activities: Vec::new(),
        }
    }
}

impl TrackerState {
    /// The built-in default store, including the sample records
    pub fn seeded() -> Self {
        let date = |y, m, d| {
            Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
                .single()
                .unwrap_or_default()
        };

        let locations = vec![
            Location {
                id: "loc_1".to_string(),
                name: "Berlin".to_string(),
                region: "DE".to_string(),
                address: "Berlin, Deutschland".to_string(),
            },
            Location {
                id: "loc_2".to_string(),
                name: "Hamburg".to_string(),
                region: "DE".to_string(),
                address: "Hamburg, Deutschland".to_string(),
            },
        ];

        let leads = vec![
            Lead {
                id: "lead_1".to_string(),
                name: "Max Mustermann".to_string(),
                company: "Muster GmbH".to_string(),
                email: "max@example.com".to_string(),
                phone: "+49 30 123456".to_string(),
                stage: "Neu".to_string(),
                source: "Website".to_string(),
                location_id: Some("loc_1".to_string()),
                created_at: date(2026, 1, 12),
                updated_at: date(2026, 1, 12),
                value: 3500.0,
                notes: "Interessiert an Tracking-Lösung für 3 Standorte.".to_string(),
            },
            Lead {
                id: "lead_2".to_string(),
                name: "Erika Musterfrau".to_string(),
                company: "Example AG".to_string(),
                email: "erika@example.com".to_string(),
                phone: "+49 40 654321".to_string(),
                stage: "Angebot gesendet".to_string(),
                source: "Referral".to_string(),
                location_id: Some("loc_2".to_string()),
                created_at: date(2026, 1, 18),
                updated_at: date(2026, 1, 28),
                value: 7800.0,
                notes: "Wartet auf Budget-Freigabe; Follow-up nächste Woche.".to_string(),
            },
        ];

        let customers = vec![Customer {
            id: "cust_1".to_string(),
            name: "ACME Logistics".to_string(),
            contact: "Jonas Becker".to_string(),
            email: "jonas@acme-logistics.com".to_string(),
            phone: "+49 30 987654".to_string(),
            location_id: Some("loc_1".to_string()),
            status: CustomerStatus::Active,
            tags: vec!["VIP".to_string(), "Bestandskunde".to_string()],
            mrr: 1250.0,
            start_date: NaiveDate::from_ymd_opt(2025, 10, 1),
            notes: "Key account; monthly QBR.".to_string(),
        }];

        Self {
            locations,
            leads,
            customers,
            ..Self::default()
        }
    }

    // ==================== Lookups ====================

    pub fn lead(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == id)
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    /// Name of the location a record points at, if any
    pub fn location_name(&self, id: Option<&str>) -> Option<&str> {
        id.and_then(|id| self.location(id)).map(|l| l.name.as_str())
    }

    // ==================== Leads ====================

    /// Insert or update a lead, returning the next snapshot and the lead ID
    pub fn with_lead_upserted(&self, input: LeadInput) -> Result<(Self, String), ValidationError> {
        let input = input.normalized();
        if input.name.is_empty() {
            return Err(ValidationError::BlankName { entity: "Lead" });
        }
        let stage = match input.stage {
            Some(stage) => stage,
            None => self
                .lead_stages
                .first()
                .cloned()
                .ok_or_else(|| ValidationError::UnknownStage(String::new()))?,
        };
        if !self.lead_stages.contains(&stage) {
            return Err(ValidationError::UnknownStage(stage));
        }
        check_amount("value", input.value)?;
        self.check_location(input.location_id.as_deref())?;

        let mut next = self.clone();
        let existing = input
            .id
            .as_deref()
            .and_then(|id| next.leads.iter_mut().find(|l| l.id == id));

        let (id, action) = match existing {
            Some(lead) => {
                lead.name = input.name.clone();
                lead.company = input.company;
                lead.email = input.email;
                lead.phone = input.phone;
                lead.stage = stage;
                lead.source = input.source;
                lead.location_id = input.location_id;
                lead.value = input.value;
                lead.notes = input.notes;
                lead.touch();
                (lead.id.clone(), ActivityAction::Updated)
            }
            None => {
                let mut lead = Lead::new(input.name.clone(), stage);
                if let Some(id) = input.id {
                    lead.id = id;
                }
                lead.company = input.company;
                lead.email = input.email;
                lead.phone = input.phone;
                lead.source = input.source;
                lead.location_id = input.location_id;
                lead.value = input.value;
                lead.notes = input.notes;
                let id = lead.id.clone();
                next.leads.insert(0, lead);
                (id, ActivityAction::Created)
            }
        };

        next.record(action, EntityKind::Lead, &id, &input.name);
        Ok((next, id))
    }

    /// Remove a lead; `None` if no lead has that ID
    pub fn without_lead(&self, id: &str) -> Option<Self> {
        let lead = self.lead(id)?;
        let mut next = self.clone();
        next.leads.retain(|l| l.id != id);
        next.record(ActivityAction::Deleted, EntityKind::Lead, id, &lead.name);
        Some(next)
    }

    // ==================== Customers ====================

    /// Insert or update a customer, returning the next snapshot and the customer ID
    pub fn with_customer_upserted(
        &self,
        input: CustomerInput,
    ) -> Result<(Self, String), ValidationError> {
        let input = input.normalized();
        if input.name.is_empty() {
            return Err(ValidationError::BlankName { entity: "Customer" });
        }
        if let Some(tag) = input.tags.iter().find(|t| !self.customer_tags.contains(t)) {
            return Err(ValidationError::UnknownTag(tag.clone()));
        }
        check_amount("mrr", input.mrr)?;
        self.check_location(input.location_id.as_deref())?;

        let mut next = self.clone();
        let existing = input
            .id
            .as_deref()
            .and_then(|id| next.customers.iter_mut().find(|c| c.id == id));

        let (id, action) = match existing {
            Some(customer) => {
                customer.name = input.name.clone();
                customer.contact = input.contact;
                customer.email = input.email;
                customer.phone = input.phone;
                customer.location_id = input.location_id;
                customer.status = input.status;
                customer.tags = input.tags;
                customer.mrr = input.mrr;
                customer.start_date = input.start_date.or(customer.start_date);
                customer.notes = input.notes;
                (customer.id.clone(), ActivityAction::Updated)
            }
            None => {
                let customer = Customer {
                    id: input.id.unwrap_or_else(|| new_id("cust")),
                    name: input.name.clone(),
                    contact: input.contact,
                    email: input.email,
                    phone: input.phone,
                    location_id: input.location_id,
                    status: input.status,
                    tags: input.tags,
                    mrr: input.mrr,
                    start_date: Some(input.start_date.unwrap_or_else(|| Utc::now().date_naive())),
                    notes: input.notes,
                };
                let id = customer.id.clone();
                next.customers.insert(0, customer);
                (id, ActivityAction::Created)
            }
        };

        next.record(action, EntityKind::Customer, &id, &input.name);
        Ok((next, id))
    }

    /// Remove a customer; `None` if no customer has that ID
    pub fn without_customer(&self, id: &str) -> Option<Self> {
        let customer = self.customer(id)?;
        let mut next = self.clone();
        next.customers.retain(|c| c.id != id);
        next.record(
            ActivityAction::Deleted,
            EntityKind::Customer,
            id,
            &customer.name,
        );
        Some(next)
    }

    // ==================== Locations ====================

    /// Insert or update a location, returning the next snapshot and the location ID
    pub fn with_location_upserted(
        &self,
        input: LocationInput,
    ) -> Result<(Self, String), ValidationError> {
        let input = input.normalized();
        if input.name.is_empty() {
            return Err(ValidationError::BlankName { entity: "Location" });
        }

        let mut next = self.clone();
        let existing = input
            .id
            .as_deref()
            .and_then(|id| next.locations.iter_mut().find(|l| l.id == id));

        let (id, action) = match existing {
            Some(location) => {
                location.name = input.name.clone();
                location.region = input.region;
                location.address = input.address;
                (location.id.clone(), ActivityAction::Updated)
            }
            None => {
                let location = Location {
                    id: input.id.unwrap_or_else(|| new_id("loc")),
                    name: input.name.clone(),
                    region: input.region,
                    address: input.address,
                };
                let id = location.id.clone();
                next.locations.insert(0, location);
                (id, ActivityAction::Created)
            }
        };

        next.record(action, EntityKind::Location, &id, &input.name);
        Ok((next, id))
    }

    /// Remove a location and detach every lead and customer pointing at it
    pub fn without_location(&self, id: &str) -> Option<Self> {
        let location = self.location(id)?;
        let mut next = self.clone();
        next.locations.retain(|l| l.id != id);
        integrity::on_location_deleted(&mut next, id);
        next.record(
            ActivityAction::Deleted,
            EntityKind::Location,
            id,
            &location.name,
        );
        Some(next)
    }

    // ==================== Configuration ====================

    pub fn with_profile(&self, patch: ProfilePatch) -> Self {
        let mut next = self.clone();
        if let Some(org_name) = patch.org_name {
            next.profile.org_name = org_name.trim().to_string();
        }
        if let Some(user_name) = patch.user_name {
            next.profile.user_name = user_name.trim().to_string();
        }
        next
    }

    pub fn with_settings(&self, patch: SettingsPatch) -> Self {
        let mut next = self.clone();
        if let Some(currency) = patch.currency {
            next.settings.currency = currency.trim().to_uppercase();
        }
        if let Some(date_format) = patch.date_format {
            next.settings.date_format = date_format.trim().to_string();
        }
        if let Some(confirm) = patch.allow_delete_confirm {
            next.settings.allow_delete_confirm = confirm;
        }
        next
    }

    pub fn with_ui(&self, ui: UiState) -> Self {
        Self {
            ui,
            ..self.clone()
        }
    }

    /// Stage names counted as closed (won or lost)
    pub fn is_terminal_stage(stage: &str) -> bool {
        stage == WON_STAGE || stage == LOST_STAGE
    }

    // ==================== Helpers ====================

    fn check_location(&self, id: Option<&str>) -> Result<(), ValidationError> {
        match id {
            Some(id) if self.location(id).is_none() => {
                Err(ValidationError::UnknownLocation(id.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn record(&mut self, action: ActivityAction, entity: EntityKind, id: &str, label: &str) {
        self.activities
            .insert(0, Activity::new(action, entity, id, label));
        self.activities.truncate(ACTIVITY_LIMIT);
    }
}

fn check_amount(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidAmount { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> TrackerState {
        TrackerState::default()
    }

    #[test]
    fn test_seeded_state() {
        let state = TrackerState::seeded();
        assert_eq!(state.locations.len(), 2);
        assert_eq!(state.leads.len(), 2);
        assert_eq!(state.customers.len(), 1);
        assert_eq!(state.lead_stages.len(), 7);
        assert_eq!(state.customer_tags.len(), 5);
        assert!(integrity::check(&state).is_ok());
    }

    #[test]
    fn test_insert_lead_assigns_id_and_timestamps() {
        let (state, id) = empty()
            .with_lead_upserted(LeadInput::new("Max Mustermann"))
            .unwrap();
        let lead = state.lead(&id).unwrap();
        assert!(id.starts_with("lead_"));
        assert_eq!(lead.stage, "Neu");
        assert_eq!(lead.created_at, lead.updated_at);
    }

    #[test]
    fn test_insert_places_new_lead_first() {
        let state = TrackerState::seeded();
        let (next, id) = state.with_lead_upserted(LeadInput::new("Neu Lead")).unwrap();
        assert_eq!(next.leads[0].id, id);
        assert_eq!(next.leads.len(), 3);
        // Previous snapshot untouched
        assert_eq!(state.leads.len(), 2);
    }

    #[test]
    fn test_insert_honors_unknown_caller_id() {
        let input = LeadInput {
            id: Some("lead_custom".to_string()),
            ..LeadInput::new("Max")
        };
        let (state, id) = empty().with_lead_upserted(input.clone()).unwrap();
        assert_eq!(id, "lead_custom");

        // Retrying the same create updates instead of duplicating
        let (state, id2) = state.with_lead_upserted(input).unwrap();
        assert_eq!(id2, "lead_custom");
        assert_eq!(state.leads.len(), 1);
    }

    #[test]
    fn test_update_lead_preserves_created_at() {
        let (state, id) = empty().with_lead_upserted(LeadInput::new("Max")).unwrap();
        let created = state.lead(&id).unwrap().created_at;
        let before = state.lead(&id).unwrap().updated_at;

        std::thread::sleep(std::time::Duration::from_millis(5));
        let mut input = state.lead(&id).unwrap().to_input();
        input.stage = Some("Kontaktiert".to_string());
        let (state, same) = state.with_lead_upserted(input).unwrap();

        let lead = state.lead(&same).unwrap();
        assert_eq!(same, id);
        assert_eq!(state.leads.len(), 1);
        assert_eq!(lead.created_at, created);
        assert!(lead.updated_at > before);
        assert_eq!(lead.stage, "Kontaktiert");
    }

    #[test]
    fn test_lead_validation() {
        let state = TrackerState::seeded();

        let err = state.with_lead_upserted(LeadInput::new("   ")).unwrap_err();
        assert_eq!(err, ValidationError::BlankName { entity: "Lead" });

        let input = LeadInput {
            stage: Some("Archiviert".to_string()),
            ..LeadInput::new("Max")
        };
        assert_eq!(
            state.with_lead_upserted(input).unwrap_err(),
            ValidationError::UnknownStage("Archiviert".to_string())
        );

        let input = LeadInput {
            value: -1.0,
            ..LeadInput::new("Max")
        };
        assert!(matches!(
            state.with_lead_upserted(input).unwrap_err(),
            ValidationError::InvalidAmount { field: "value", .. }
        ));

        let input = LeadInput {
            location_id: Some("loc_missing".to_string()),
            ..LeadInput::new("Max")
        };
        assert_eq!(
            state.with_lead_upserted(input).unwrap_err(),
            ValidationError::UnknownLocation("loc_missing".to_string())
        );
    }

    #[test]
    fn test_lead_without_stages_rejected() {
        let state = TrackerState {
            lead_stages: Vec::new(),
            ..empty()
        };
        assert!(state.with_lead_upserted(LeadInput::new("Max")).is_err());
    }

    #[test]
    fn test_customer_upsert_and_tags() {
        let input = CustomerInput {
            tags: vec!["VIP".into(), "VIP".into()],
            mrr: 99.0,
            ..CustomerInput::new("ACME")
        };
        let (state, id) = empty().with_customer_upserted(input).unwrap();
        let customer = state.customer(&id).unwrap();
        assert!(id.starts_with("cust_"));
        assert_eq!(customer.tags, vec!["VIP"]);
        assert!(customer.start_date.is_some());

        let input = CustomerInput {
            tags: vec!["Unbekannt".into()],
            ..CustomerInput::new("ACME")
        };
        assert_eq!(
            state.with_customer_upserted(input).unwrap_err(),
            ValidationError::UnknownTag("Unbekannt".to_string())
        );
    }

    #[test]
    fn test_customer_update_keeps_start_date_when_unset() {
        let state = TrackerState::seeded();
        let mut input = state.customer("cust_1").unwrap().to_input();
        input.start_date = None;
        input.status = CustomerStatus::Paused;
        let (next, _) = state.with_customer_upserted(input).unwrap();
        let customer = next.customer("cust_1").unwrap();
        assert_eq!(customer.status, CustomerStatus::Paused);
        assert_eq!(customer.start_date, NaiveDate::from_ymd_opt(2025, 10, 1));
    }

    #[test]
    fn test_location_upsert_and_blank_name() {
        let (state, id) = empty()
            .with_location_upserted(LocationInput::new("München"))
            .unwrap();
        assert!(id.starts_with("loc_"));
        assert_eq!(state.location(&id).unwrap().name, "München");

        assert!(state.with_location_upserted(LocationInput::new("")).is_err());
    }

    #[test]
    fn test_delete_missing_returns_none() {
        let state = TrackerState::seeded();
        assert!(state.without_lead("nope").is_none());
        assert!(state.without_customer("nope").is_none());
        assert!(state.without_location("nope").is_none());
    }

    #[test]
    fn test_delete_location_detaches_references() {
        let state = TrackerState::seeded();
        let next = state.without_location("loc_1").unwrap();
        assert!(next.location("loc_1").is_none());
        assert!(next.lead("lead_1").unwrap().location_id.is_none());
        assert!(next.customer("cust_1").unwrap().location_id.is_none());
        // Other references untouched
        assert_eq!(
            next.lead("lead_2").unwrap().location_id.as_deref(),
            Some("loc_2")
        );
    }

    #[test]
    fn test_activity_log_records_and_caps() {
        let mut state = empty();
        for i in 0..(ACTIVITY_LIMIT + 5) {
            state = state
                .with_lead_upserted(LeadInput::new(format!("Lead {}", i)))
                .unwrap()
                .0;
        }
        assert_eq!(state.activities.len(), ACTIVITY_LIMIT);
        let newest = &state.activities[0];
        assert_eq!(newest.action, ActivityAction::Created);
        assert_eq!(newest.entity, EntityKind::Lead);
        assert_eq!(newest.label, format!("Lead {}", ACTIVITY_LIMIT + 4));
    }

    #[test]
    fn test_settings_and_profile_patches() {
        let state = empty()
            .with_settings(SettingsPatch {
                currency: Some(" usd ".to_string()),
                ..Default::default()
            })
            .with_profile(ProfilePatch {
                user_name: Some("Jonas".to_string()),
                ..Default::default()
            });
        assert_eq!(state.settings.currency, "USD");
        assert_eq!(state.settings.date_format, "DD.MM.YYYY");
        assert_eq!(state.profile.user_name, "Jonas");
        assert_eq!(state.profile.org_name, "VooZaa Tracking");
    }

    #[test]
    fn test_terminal_stages() {
        assert!(TrackerState::is_terminal_stage("Gewonnen"));
        assert!(TrackerState::is_terminal_stage("Verloren"));
        assert!(!TrackerState::is_terminal_stage("Neu"));
    }
}
