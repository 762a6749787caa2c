//! Settings, profile and view state handlers

use anyhow::Result;

use voozaa_core::{ProfilePatch, SettingsPatch, Store, Tab};

use super::warn_if_unsaved;
use crate::output::{Output, OutputFormat};
use crate::prompt::confirm;

/// Show profile, settings and view state
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let state = store.state();
    match output.format {
        OutputFormat::Json => output.json(&serde_json::json!({
            "profile": state.profile,
            "settings": state.settings,
            "ui": state.ui,
        })),
        OutputFormat::Quiet => println!("{}", state.settings.currency),
        OutputFormat::Human => {
            println!("Profile:");
            println!("  org:             {}", state.profile.org_name);
            println!("  user:            {}", state.profile.user_name);
            println!();
            println!("Settings:");
            println!("  currency:        {}", state.settings.currency);
            println!("  date format:     {}", state.settings.date_format);
            println!(
                "  confirm deletes: {}",
                state.settings.allow_delete_confirm
            );
            println!();
            println!("View:");
            println!("  tab:             {}", state.ui.active_tab);
            println!("  sidebar:         {}", on_off(state.ui.sidebar_open));
            println!("  compact:         {}", on_off(state.ui.compact_mode));
            println!("  help:            {}", on_off(state.ui.show_help));
        }
    }
    Ok(())
}

/// Update settings; omitted values are kept
pub fn set(store: &mut Store, patch: SettingsPatch, output: &Output) -> Result<()> {
    store.update_settings(patch);
    warn_if_unsaved(store, output);
    output.success("Settings updated");
    Ok(())
}

/// Update the organisation or user name
pub fn set_profile(store: &mut Store, patch: ProfilePatch, output: &Output) -> Result<()> {
    store.update_profile(patch);
    warn_if_unsaved(store, output);
    output.success("Profile updated");
    Ok(())
}

/// Show or switch the active tab
pub fn tab(store: &mut Store, tab: Option<Tab>, output: &Output) -> Result<()> {
    match tab {
        Some(tab) => {
            store.set_active_tab(tab);
            warn_if_unsaved(store, output);
            output.success(&format!("Active tab: {}", tab));
        }
        None => match output.format {
            OutputFormat::Json => output.json(&store.state().ui.active_tab),
            _ => println!("{}", store.state().ui.active_tab),
        },
    }
    Ok(())
}

pub fn toggle_sidebar(store: &mut Store, output: &Output) -> Result<()> {
    let open = store.toggle_sidebar();
    warn_if_unsaved(store, output);
    output.success(&format!("Sidebar {}", if open { "open" } else { "closed" }));
    Ok(())
}

pub fn toggle_compact(store: &mut Store, output: &Output) -> Result<()> {
    let compact = store.toggle_compact();
    warn_if_unsaved(store, output);
    output.success(&format!("Compact mode {}", on_off(compact)));
    Ok(())
}

pub fn set_help(store: &mut Store, show: bool, output: &Output) -> Result<()> {
    store.set_show_help(show);
    warn_if_unsaved(store, output);
    output.success(&format!("Help {}", on_off(show)));
    Ok(())
}

/// Replace all data with the built-in defaults
pub fn reset(store: &mut Store, yes: bool, output: &Output) -> Result<()> {
    if !yes
        && output.should_prompt()
        && !confirm("Reset all leads, customers, locations and settings to defaults?")?
    {
        output.message("Cancelled.");
        return Ok(());
    }

    store.reset_to_defaults();
    warn_if_unsaved(store, output);
    output.success("Reset to defaults");
    Ok(())
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voozaa_core::MemoryBlobStore;

    fn quiet_store() -> (Store, Output) {
        let store = Store::with_gateway(
            Box::new(MemoryBlobStore::new()),
            "voozaa_test",
            true,
        );
        (store, Output::new(OutputFormat::Quiet))
    }

    #[test]
    fn test_reset_without_prompt_in_quiet_mode() {
        let (mut store, output) = quiet_store();
        store.delete_location("loc_1");
        reset(&mut store, false, &output).unwrap();
        assert!(store.location("loc_1").is_some());
    }

    #[test]
    fn test_settings_set_keeps_omitted_values() {
        let (mut store, output) = quiet_store();
        let patch = SettingsPatch {
            currency: Some("usd".to_string()),
            ..SettingsPatch::default()
        };
        set(&mut store, patch, &output).unwrap();
        assert_eq!(store.state().settings.currency, "USD");
        assert_eq!(store.state().settings.date_format, "DD.MM.YYYY");
    }

    #[test]
    fn test_on_off() {
        assert_eq!(on_off(true), "on");
        assert_eq!(on_off(false), "off");
    }
}
