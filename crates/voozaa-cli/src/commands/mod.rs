//! Command handlers

pub mod config;
pub mod customer;
pub mod lead;
pub mod location;
pub mod settings;
pub mod stats;
pub mod transfer;

use anyhow::{bail, Result};

use voozaa_core::query::LocationFilter;
use voozaa_core::{Filter, Store, TrackerState};

use crate::output::Output;
use crate::prompt::confirm;

/// Tell the user when the last change only lives in memory
pub fn warn_if_unsaved(store: &Store, output: &Output) {
    if let Some(err) = store.last_save_error() {
        output.warn(&format!("Change not saved: {}", err));
        if let Some(hint) = err.recovery_suggestion() {
            output.warn(hint);
        }
    }
}

/// Resolve a location given by ID or by name (case-insensitive)
///
/// An empty string or `none` means "no location".
pub fn resolve_location(state: &TrackerState, arg: &str) -> Result<Option<String>> {
    let arg = arg.trim();
    if arg.is_empty() || arg.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    if let Some(location) = state.location(arg) {
        return Ok(Some(location.id.clone()));
    }
    let matches: Vec<_> = state
        .locations
        .iter()
        .filter(|l| l.name.to_lowercase() == arg.to_lowercase())
        .collect();
    match matches.as_slice() {
        [only] => Ok(Some(only.id.clone())),
        [] => bail!("Location not found: {}", arg),
        _ => bail!("Location name '{}' is ambiguous; use its ID", arg),
    }
}

/// Build a location filter from an optional `--location` argument
pub fn location_filter(state: &TrackerState, arg: Option<&str>) -> Result<LocationFilter> {
    match arg {
        None => Ok(Filter::All),
        Some(arg) => Ok(Filter::Only(resolve_location(state, arg)?)),
    }
}

/// Ask before deleting, unless skipped or disabled in settings
pub fn confirm_delete(store: &Store, what: &str, yes: bool, output: &Output) -> Result<bool> {
    if yes || !store.state().settings.allow_delete_confirm || !output.should_prompt() {
        return Ok(true);
    }
    confirm(&format!("Delete {}?", what))
}
