//! Reference integrity
//!
//! Leads and customers point at locations through weak references. A
//! reference must never outlive its location: deleting a location clears
//! the reference on every dependent record instead of cascading the delete.

use std::collections::HashSet;

use crate::error::IntegrityViolation;
use crate::models::{dedup_tags, new_id};
use crate::state::TrackerState;

/// Clear every reference to the deleted location `id`
///
/// Runs on the snapshot that is being built for the deletion, so the
/// removal and the cleanup become visible together.
pub fn on_location_deleted(state: &mut TrackerState, id: &str) {
    let mut detached = 0usize;
    for lead in state
        .leads
        .iter_mut()
        .filter(|l| l.location_id.as_deref() == Some(id))
    {
        lead.location_id = None;
        detached += 1;
    }
    for customer in state
        .customers
        .iter_mut()
        .filter(|c| c.location_id.as_deref() == Some(id))
    {
        customer.location_id = None;
        detached += 1;
    }
    tracing::debug!(location = id, detached, "Detached location references");
}

/// Clear references to locations that are not in the snapshot
///
/// Returns the number of references cleared.
pub fn detach_dangling(state: &mut TrackerState) -> usize {
    let known: HashSet<String> = state.locations.iter().map(|l| l.id.clone()).collect();
    let dangling = |loc: &Option<String>| matches!(loc, Some(id) if !known.contains(id));

    let mut cleared = 0;
    for lead in state.leads.iter_mut().filter(|l| dangling(&l.location_id)) {
        lead.location_id = None;
        cleared += 1;
    }
    for customer in state
        .customers
        .iter_mut()
        .filter(|c| dangling(&c.location_id))
    {
        customer.location_id = None;
        cleared += 1;
    }
    cleared
}

/// Bring a decoded snapshot into a valid shape
///
/// Blank and repeated IDs get fresh ones. Stages and tags outside the
/// configured vocabulary are repaired. Negative or non-finite amounts become
/// zero. Blank or dangling location references are cleared.
pub fn normalize(state: &mut TrackerState) {
    let reassigned = reassign_ids(state.locations.iter_mut().map(|l| &mut l.id), "loc")
        + reassign_ids(state.leads.iter_mut().map(|l| &mut l.id), "lead")
        + reassign_ids(state.customers.iter_mut().map(|c| &mut c.id), "cust");
    if reassigned > 0 {
        tracing::warn!(reassigned, "Assigned fresh IDs to records with blank or repeated IDs");
    }

    let first_stage = state.lead_stages.first().cloned();
    for lead in state.leads.iter_mut() {
        if lead.location_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            lead.location_id = None;
        }
        if let Some(first) = &first_stage {
            if !state.lead_stages.contains(&lead.stage) {
                tracing::debug!(lead = %lead.id, stage = %lead.stage, "Unknown stage; moved to first stage");
                lead.stage = first.clone();
            }
        }
        lead.value = repair_amount(lead.value);
    }
    for customer in state.customers.iter_mut() {
        if customer
            .location_id
            .as_deref()
            .is_some_and(|id| id.trim().is_empty())
        {
            customer.location_id = None;
        }
        let tags = dedup_tags(std::mem::take(&mut customer.tags));
        customer.tags = tags
            .into_iter()
            .filter(|t| state.customer_tags.contains(t))
            .collect();
        customer.mrr = repair_amount(customer.mrr);
    }

    let cleared = detach_dangling(state);
    if cleared > 0 {
        tracing::warn!(cleared, "Cleared references to missing locations");
    }
}

/// Give every blank or already-seen ID a fresh one; the first holder keeps it
fn reassign_ids<'a>(ids: impl Iterator<Item = &'a mut String>, prefix: &str) -> usize {
    let mut seen = HashSet::new();
    let mut reassigned = 0;
    for id in ids {
        if id.trim().is_empty() || !seen.insert(id.clone()) {
            *id = new_id(prefix);
            seen.insert(id.clone());
            reassigned += 1;
        }
    }
    reassigned
}

fn repair_amount(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// Verify that no record references a missing location
pub fn check(state: &TrackerState) -> Result<(), IntegrityViolation> {
    let known: HashSet<&str> = state.locations.iter().map(|l| l.id.as_str()).collect();

    for lead in &state.leads {
        if let Some(loc) = lead.location_id.as_deref().filter(|id| !known.contains(id)) {
            return Err(IntegrityViolation {
                entity: "Lead",
                id: lead.id.clone(),
                location_id: loc.to_string(),
            });
        }
    }
    for customer in &state.customers {
        if let Some(loc) = customer
            .location_id
            .as_deref()
            .filter(|id| !known.contains(id))
        {
            return Err(IntegrityViolation {
                entity: "Customer",
                id: customer.id.clone(),
                location_id: loc.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, Lead};

    #[test]
    fn test_on_location_deleted_only_touches_references() {
        let mut state = TrackerState::seeded();
        let before_lead = state.lead("lead_1").unwrap().clone();

        state.locations.retain(|l| l.id != "loc_1");
        on_location_deleted(&mut state, "loc_1");

        let after_lead = state.lead("lead_1").unwrap();
        assert!(after_lead.location_id.is_none());
        assert_eq!(
            Lead {
                location_id: None,
                ..before_lead
            },
            *after_lead
        );
        assert!(check(&state).is_ok());
    }

    #[test]
    fn test_check_reports_dangling_reference() {
        let mut state = TrackerState::seeded();
        state.locations.clear();
        let err = check(&state).unwrap_err();
        assert_eq!(err.entity, "Lead");
        assert_eq!(err.location_id, "loc_1");
    }

    #[test]
    fn test_detach_dangling() {
        let mut state = TrackerState::seeded();
        state.locations.retain(|l| l.id == "loc_2");
        let cleared = detach_dangling(&mut state);
        assert_eq!(cleared, 2); // lead_1 and cust_1
        assert!(check(&state).is_ok());
        assert_eq!(
            state.lead("lead_2").unwrap().location_id.as_deref(),
            Some("loc_2")
        );
    }

    #[test]
    fn test_normalize_fills_ids_and_blanks() {
        let mut state = TrackerState::default();
        state.leads.push(Lead {
            location_id: Some(String::new()),
            ..Default::default()
        });
        state.customers.push(Customer {
            tags: vec!["VIP".into(), "VIP".into()],
            location_id: Some("loc_gone".into()),
            ..Default::default()
        });

        normalize(&mut state);

        assert!(state.leads[0].id.starts_with("lead_"));
        assert!(state.leads[0].location_id.is_none());
        assert!(state.customers[0].id.starts_with("cust_"));
        assert_eq!(state.customers[0].tags, vec!["VIP"]);
        assert!(state.customers[0].location_id.is_none());
    }

    #[test]
    fn test_normalize_reassigns_repeated_ids() {
        let mut state = TrackerState::default();
        for name in ["One", "Two"] {
            state.leads.push(Lead {
                id: "dup".into(),
                name: name.into(),
                stage: "Neu".into(),
                ..Default::default()
            });
        }

        normalize(&mut state);

        assert_eq!(state.leads[0].id, "dup");
        assert_eq!(state.leads[0].name, "One");
        assert!(state.leads[1].id.starts_with("lead_"));
        assert_eq!(state.lead("dup").unwrap().name, "One");
    }

    #[test]
    fn test_normalize_repairs_vocabulary_and_amounts() {
        let mut state = TrackerState::default();
        state.leads.push(Lead {
            id: "l".into(),
            stage: "Archiv".into(),
            value: -500.0,
            ..Default::default()
        });
        state.customers.push(Customer {
            id: "c".into(),
            tags: vec!["VIP".into(), "Gold".into()],
            mrr: f64::NAN,
            ..Default::default()
        });

        normalize(&mut state);

        assert_eq!(state.leads[0].stage, "Neu");
        assert_eq!(state.leads[0].value, 0.0);
        assert_eq!(state.customers[0].tags, vec!["VIP"]);
        assert_eq!(state.customers[0].mrr, 0.0);
    }
}
