//! Lead command handlers

use anyhow::{anyhow, Context, Result};
use clap::Args;

use voozaa_core::query::{self, LeadField};
use voozaa_core::{Filter, LeadInput, LeadQuery, SortDirection, SortField, SortSpec, Store};

use super::{confirm_delete, location_filter, resolve_location, warn_if_unsaved};
use crate::output::Output;

/// Editable lead fields; omitted flags keep the current value on edit
#[derive(Args, Debug, Default)]
pub struct LeadFields {
    /// Company name
    #[arg(short, long)]
    pub company: Option<String>,
    #[arg(short, long)]
    pub email: Option<String>,
    #[arg(short, long)]
    pub phone: Option<String>,
    /// Pipeline stage (defaults to the first stage on add)
    #[arg(short, long)]
    pub stage: Option<String>,
    /// Where the lead came from
    #[arg(long)]
    pub source: Option<String>,
    /// Location ID or name ("none" to clear)
    #[arg(short, long)]
    pub location: Option<String>,
    /// Expected deal value
    #[arg(short, long)]
    pub value: Option<f64>,
    #[arg(short, long)]
    pub notes: Option<String>,
}

impl LeadFields {
    fn apply(self, store: &Store, input: &mut LeadInput) -> Result<()> {
        if let Some(company) = self.company {
            input.company = company;
        }
        if let Some(email) = self.email {
            input.email = email;
        }
        if let Some(phone) = self.phone {
            input.phone = phone;
        }
        if let Some(stage) = self.stage {
            input.stage = Some(stage);
        }
        if let Some(source) = self.source {
            input.source = source;
        }
        if let Some(location) = self.location {
            input.location_id = resolve_location(store.state(), &location)?;
        }
        if let Some(value) = self.value {
            input.value = value;
        }
        if let Some(notes) = self.notes {
            input.notes = notes;
        }
        Ok(())
    }
}

/// Create a new lead
pub fn add(store: &mut Store, name: String, id: Option<String>, fields: LeadFields, output: &Output) -> Result<()> {
    let mut input = LeadInput {
        id,
        ..LeadInput::new(name)
    };
    fields.apply(store, &mut input)?;

    let id = store.upsert_lead(input).context("Failed to save lead")?;
    warn_if_unsaved(store, output);

    output.success(&format!("Saved lead: {}", id));
    if let Some(lead) = store.lead(&id) {
        output.print_lead(store.state(), lead);
    }
    Ok(())
}

/// Update an existing lead
pub fn edit(store: &mut Store, id: String, name: Option<String>, fields: LeadFields, output: &Output) -> Result<()> {
    let mut input = store
        .lead(&id)
        .ok_or_else(|| anyhow!("Lead not found: {}", id))?
        .to_input();
    if let Some(name) = name {
        input.name = name;
    }
    fields.apply(store, &mut input)?;

    store.upsert_lead(input).context("Failed to update lead")?;
    warn_if_unsaved(store, output);

    output.success(&format!("Updated lead: {}", id));
    if let Some(lead) = store.lead(&id) {
        output.print_lead(store.state(), lead);
    }
    Ok(())
}

/// List leads with optional search, filters and sort
pub fn list(
    store: &Store,
    search: Option<String>,
    stage: Option<String>,
    location: Option<String>,
    sort: Option<String>,
    direction: Option<SortDirection>,
    output: &Output,
) -> Result<()> {
    let state = store.snapshot();
    let query = LeadQuery {
        search: search.unwrap_or_default(),
        stage: Filter::from(stage),
        location: location_filter(&state, location.as_deref())?,
    };
    let sort = sort_spec(sort.as_deref(), direction)?;

    let rows = query::leads(&state, &query, &sort);
    output.print_leads(&state, &rows);
    Ok(())
}

/// Show a single lead
pub fn show(store: &Store, id: String, output: &Output) -> Result<()> {
    let lead = store
        .lead(&id)
        .ok_or_else(|| anyhow!("Lead not found: {}", id))?;
    output.print_lead(store.state(), lead);
    Ok(())
}

/// Delete a lead
pub fn delete(store: &mut Store, id: String, yes: bool, output: &Output) -> Result<()> {
    let name = store
        .lead(&id)
        .map(|l| l.name.clone())
        .ok_or_else(|| anyhow!("Lead not found: {}", id))?;

    if !confirm_delete(store, &format!("lead '{}'", name), yes, output)? {
        output.message("Cancelled.");
        return Ok(());
    }

    store.delete_lead(&id);
    warn_if_unsaved(store, output);
    output.success(&format!("Deleted lead: {}", id));
    Ok(())
}

/// Sort order from `--sort` and `--dir`
///
/// Without `--sort`, leads come most recently updated first.
fn sort_spec(field: Option<&str>, direction: Option<SortDirection>) -> Result<SortSpec> {
    let Some(field) = field else {
        let mut spec = SortSpec::default();
        if let Some(direction) = direction {
            spec.direction = direction;
        }
        return Ok(spec);
    };
    let field: LeadField = field.parse().map_err(|e: String| anyhow!(e))?;
    Ok(SortSpec::new(
        SortField::Lead(field),
        direction.unwrap_or_default(),
    ))
}
