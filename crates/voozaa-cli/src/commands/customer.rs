//! Customer command handlers

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::Args;

use voozaa_core::query::{self, CustomerField};
use voozaa_core::{
    CustomerInput, CustomerQuery, CustomerStatus, Filter, SortDirection, SortField, SortSpec,
    Store,
};

use super::{confirm_delete, location_filter, resolve_location, warn_if_unsaved};
use crate::output::Output;

/// Editable customer fields; omitted flags keep the current value on edit
#[derive(Args, Debug, Default)]
pub struct CustomerFields {
    /// Contact person
    #[arg(short, long)]
    pub contact: Option<String>,
    #[arg(short, long)]
    pub email: Option<String>,
    #[arg(short, long)]
    pub phone: Option<String>,
    /// Aktiv, Pausiert or Kündigung
    #[arg(short, long)]
    pub status: Option<CustomerStatus>,
    /// Tag from the configured vocabulary (repeatable; replaces all tags)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,
    /// Remove all tags
    #[arg(long, conflicts_with = "tags")]
    pub clear_tags: bool,
    /// Location ID or name ("none" to clear)
    #[arg(short, long)]
    pub location: Option<String>,
    /// Monthly recurring revenue
    #[arg(short, long)]
    pub mrr: Option<f64>,
    /// Contract start (YYYY-MM-DD, defaults to today on add)
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(short, long)]
    pub notes: Option<String>,
}

impl CustomerFields {
    fn apply(self, store: &Store, input: &mut CustomerInput) -> Result<()> {
        if let Some(contact) = self.contact {
            input.contact = contact;
        }
        if let Some(email) = self.email {
            input.email = email;
        }
        if let Some(phone) = self.phone {
            input.phone = phone;
        }
        if let Some(status) = self.status {
            input.status = status;
        }
        if self.clear_tags {
            input.tags.clear();
        } else if !self.tags.is_empty() {
            input.tags = self.tags;
        }
        if let Some(location) = self.location {
            input.location_id = resolve_location(store.state(), &location)?;
        }
        if let Some(mrr) = self.mrr {
            input.mrr = mrr;
        }
        if let Some(start) = self.start {
            input.start_date = Some(start);
        }
        if let Some(notes) = self.notes {
            input.notes = notes;
        }
        Ok(())
    }
}

/// Create a new customer
pub fn add(
    store: &mut Store,
    name: String,
    id: Option<String>,
    fields: CustomerFields,
    output: &Output,
) -> Result<()> {
    let mut input = CustomerInput {
        id,
        ..CustomerInput::new(name)
    };
    fields.apply(store, &mut input)?;

    let id = store
        .upsert_customer(input)
        .context("Failed to save customer")?;
    warn_if_unsaved(store, output);

    output.success(&format!("Saved customer: {}", id));
    if let Some(customer) = store.customer(&id) {
        output.print_customer(store.state(), customer);
    }
    Ok(())
}

/// Update an existing customer
pub fn edit(
    store: &mut Store,
    id: String,
    name: Option<String>,
    fields: CustomerFields,
    output: &Output,
) -> Result<()> {
    let mut input = store
        .customer(&id)
        .ok_or_else(|| anyhow!("Customer not found: {}", id))?
        .to_input();
    if let Some(name) = name {
        input.name = name;
    }
    fields.apply(store, &mut input)?;

    store
        .upsert_customer(input)
        .context("Failed to update customer")?;
    warn_if_unsaved(store, output);

    output.success(&format!("Updated customer: {}", id));
    if let Some(customer) = store.customer(&id) {
        output.print_customer(store.state(), customer);
    }
    Ok(())
}

/// List customers with optional search, filters and sort
pub fn list(
    store: &Store,
    search: Option<String>,
    status: Option<CustomerStatus>,
    location: Option<String>,
    sort: Option<String>,
    direction: Option<SortDirection>,
    output: &Output,
) -> Result<()> {
    let state = store.snapshot();
    let query = CustomerQuery {
        search: search.unwrap_or_default(),
        status: Filter::from(status),
        location: location_filter(&state, location.as_deref())?,
    };

    // The default sort targets leads, so without --sort customers keep their stored order
    let sort = match sort {
        Some(field) => {
            let field: CustomerField = field.parse().map_err(|e: String| anyhow!(e))?;
            SortSpec::new(SortField::Customer(field), direction.unwrap_or_default())
        }
        None => SortSpec::default(),
    };

    let rows = query::customers(&state, &query, &sort);
    output.print_customers(&state, &rows);
    Ok(())
}

/// Show a single customer
pub fn show(store: &Store, id: String, output: &Output) -> Result<()> {
    let customer = store
        .customer(&id)
        .ok_or_else(|| anyhow!("Customer not found: {}", id))?;
    output.print_customer(store.state(), customer);
    Ok(())
}

/// Delete a customer
pub fn delete(store: &mut Store, id: String, yes: bool, output: &Output) -> Result<()> {
    let name = store
        .customer(&id)
        .map(|c| c.name.clone())
        .ok_or_else(|| anyhow!("Customer not found: {}", id))?;

    if !confirm_delete(store, &format!("customer '{}'", name), yes, output)? {
        output.message("Cancelled.");
        return Ok(());
    }

    store.delete_customer(&id);
    warn_if_unsaved(store, output);
    output.success(&format!("Deleted customer: {}", id));
    Ok(())
}
