//! Location command handlers

use anyhow::{anyhow, Context, Result};

use voozaa_core::{LocationInput, Store};

use super::{confirm_delete, warn_if_unsaved};
use crate::output::Output;

/// Create a new location
pub fn add(
    store: &mut Store,
    name: String,
    region: Option<String>,
    address: Option<String>,
    output: &Output,
) -> Result<()> {
    let input = LocationInput {
        region: region.unwrap_or_default(),
        address: address.unwrap_or_default(),
        ..LocationInput::new(name)
    };
    let id = store
        .upsert_location(input)
        .context("Failed to save location")?;
    warn_if_unsaved(store, output);

    if output.is_quiet() {
        println!("{}", id);
    } else {
        output.success(&format!("Saved location: {}", id));
    }
    Ok(())
}

/// Update an existing location
pub fn edit(
    store: &mut Store,
    id: String,
    name: Option<String>,
    region: Option<String>,
    address: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut input = LocationInput::from(
        store
            .location(&id)
            .ok_or_else(|| anyhow!("Location not found: {}", id))?,
    );
    if let Some(name) = name {
        input.name = name;
    }
    if let Some(region) = region {
        input.region = region;
    }
    if let Some(address) = address {
        input.address = address;
    }

    store
        .upsert_location(input)
        .context("Failed to update location")?;
    warn_if_unsaved(store, output);
    output.success(&format!("Updated location: {}", id));
    Ok(())
}

/// List all locations
pub fn list(store: &Store, output: &Output) -> Result<()> {
    output.print_locations(store.state());
    Ok(())
}

/// Delete a location; leads and customers there keep existing without one
pub fn delete(store: &mut Store, id: String, yes: bool, output: &Output) -> Result<()> {
    let state = store.snapshot();
    let location = state
        .location(&id)
        .ok_or_else(|| anyhow!("Location not found: {}", id))?;

    let detached = state
        .leads
        .iter()
        .filter(|l| l.location_id.as_deref() == Some(id.as_str()))
        .count()
        + state
            .customers
            .iter()
            .filter(|c| c.location_id.as_deref() == Some(id.as_str()))
            .count();

    let what = format!(
        "location '{}' ({} record(s) will lose their location)",
        location.name, detached
    );
    if !confirm_delete(store, &what, yes, output)? {
        output.message("Cancelled.");
        return Ok(());
    }

    store.delete_location(&id);
    warn_if_unsaved(store, output);
    output.success(&format!(
        "Deleted location: {} ({} record(s) detached)",
        id, detached
    ));
    Ok(())
}
