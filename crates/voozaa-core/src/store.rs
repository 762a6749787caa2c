//! Record store controller
//!
//! The `Store` owns the current [`TrackerState`] snapshot and the blob store
//! it is persisted to. Every successful mutation:
//!
//! 1. Builds the next snapshot from the current one (pure, see `state.rs`)
//! 2. Swaps it in as the current snapshot
//! 3. Serializes the whole state and hands it to the blob store
//!
//! A failed save is logged and remembered but never undoes the mutation;
//! the in-memory snapshot stays authoritative.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open()?;  // Loads stored state or starts from defaults
//!
//! let id = store.upsert_lead(LeadInput::new("Max Mustermann"))?;
//! let snapshot = store.snapshot();  // Arc<TrackerState>, never changes
//! ```

use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::codec::{self, SnapshotPatch};
use crate::config::Config;
use crate::error::TrackerError;
use crate::integrity;
use crate::models::{
    Customer, CustomerInput, Lead, LeadInput, Location, LocationInput, ProfilePatch,
    SettingsPatch, Tab,
};
use crate::state::TrackerState;
use crate::storage::{BlobStore, StorageError, StorageResult};

/// Outcome of a successful import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Top-level snapshot keys the import replaced (or merged, for `ui`)
    pub replaced_keys: Vec<String>,
    pub leads: usize,
    pub customers: usize,
    pub locations: usize,
}

/// Controller for the tracker state
pub struct Store {
    /// Current snapshot
    state: Arc<TrackerState>,
    /// Where snapshots are persisted
    gateway: Box<dyn BlobStore>,
    /// Key the snapshot is stored under
    key: String,
    /// Whether the built-in default includes the sample records
    seed_sample_data: bool,
    /// Error of the most recent save, if it failed
    last_save_error: Option<StorageError>,
}

impl Store {
    /// Open the store using the default configuration
    ///
    /// Loads the stored state. A missing or unreadable snapshot is replaced
    /// by the built-in default.
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config)
    }

    /// Open the store with a specific configuration
    pub fn open_with_config(config: Config) -> Result<Self> {
        let gateway = config.blob_store();
        gateway
            .path_for(&config.storage_key)
            .context("Invalid storage configuration")?;

        Ok(Self::with_gateway(
            Box::new(gateway),
            &config.storage_key,
            config.seed_sample_data,
        ))
    }

    /// Open the store on top of any blob store
    pub fn with_gateway(gateway: Box<dyn BlobStore>, key: &str, seed_sample_data: bool) -> Self {
        let state = load_state(gateway.as_ref(), key, seed_sample_data);
        Self {
            state: Arc::new(state),
            gateway,
            key: key.to_string(),
            seed_sample_data,
            last_save_error: None,
        }
    }

    // ==================== Reads ====================

    /// Shared handle to the current snapshot
    ///
    /// The snapshot never changes; later mutations produce new snapshots.
    pub fn snapshot(&self) -> Arc<TrackerState> {
        Arc::clone(&self.state)
    }

    /// Borrow the current snapshot
    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn lead(&self, id: &str) -> Option<&Lead> {
        self.state.lead(id)
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.state.customer(id)
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.state.location(id)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Error of the most recent save, if it failed
    pub fn last_save_error(&self) -> Option<&StorageError> {
        self.last_save_error.as_ref()
    }

    // ==================== Leads ====================

    /// Create or update a lead, returning its ID
    pub fn upsert_lead(&mut self, input: LeadInput) -> Result<String, TrackerError> {
        let (next, id) = self.state.with_lead_upserted(input)?;
        tracing::debug!(id = %id, "Upserted lead");
        self.commit(next);
        Ok(id)
    }

    /// Delete a lead; returns `false` if no lead has that ID
    pub fn delete_lead(&mut self, id: &str) -> bool {
        match self.state.without_lead(id) {
            Some(next) => {
                tracing::debug!(id, "Deleted lead");
                self.commit(next);
                true
            }
            None => false,
        }
    }

    // ==================== Customers ====================

    /// Create or update a customer, returning its ID
    pub fn upsert_customer(&mut self, input: CustomerInput) -> Result<String, TrackerError> {
        let (next, id) = self.state.with_customer_upserted(input)?;
        tracing::debug!(id = %id, "Upserted customer");
        self.commit(next);
        Ok(id)
    }

    /// Delete a customer; returns `false` if no customer has that ID
    pub fn delete_customer(&mut self, id: &str) -> bool {
        match self.state.without_customer(id) {
            Some(next) => {
                tracing::debug!(id, "Deleted customer");
                self.commit(next);
                true
            }
            None => false,
        }
    }

    // ==================== Locations ====================

    /// Create or update a location, returning its ID
    pub fn upsert_location(&mut self, input: LocationInput) -> Result<String, TrackerError> {
        let (next, id) = self.state.with_location_upserted(input)?;
        tracing::debug!(id = %id, "Upserted location");
        self.commit(next);
        Ok(id)
    }

    /// Delete a location and detach every lead and customer pointing at it
    ///
    /// Returns `false` if no location has that ID.
    pub fn delete_location(&mut self, id: &str) -> bool {
        match self.state.without_location(id) {
            Some(next) => {
                tracing::debug!(id, "Deleted location");
                self.commit(next);
                true
            }
            None => false,
        }
    }

    // ==================== Configuration ====================

    pub fn update_profile(&mut self, patch: ProfilePatch) {
        let next = self.state.with_profile(patch);
        self.commit(next);
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        let next = self.state.with_settings(patch);
        self.commit(next);
    }

    pub fn set_active_tab(&mut self, tab: Tab) {
        let mut ui = self.state.ui.clone();
        ui.active_tab = tab;
        let next = self.state.with_ui(ui);
        self.commit(next);
    }

    /// Flip the sidebar, returning whether it is now open
    pub fn toggle_sidebar(&mut self) -> bool {
        let mut ui = self.state.ui.clone();
        ui.sidebar_open = !ui.sidebar_open;
        let open = ui.sidebar_open;
        let next = self.state.with_ui(ui);
        self.commit(next);
        open
    }

    /// Flip compact mode, returning whether it is now on
    pub fn toggle_compact(&mut self) -> bool {
        let mut ui = self.state.ui.clone();
        ui.compact_mode = !ui.compact_mode;
        let compact = ui.compact_mode;
        let next = self.state.with_ui(ui);
        self.commit(next);
        compact
    }

    pub fn set_show_help(&mut self, show: bool) {
        let mut ui = self.state.ui.clone();
        ui.show_help = show;
        let next = self.state.with_ui(ui);
        self.commit(next);
    }

    /// Replace everything with the built-in default store
    pub fn reset_to_defaults(&mut self) {
        tracing::info!(seeded = self.seed_sample_data, "Resetting tracker to defaults");
        self.commit(default_state(self.seed_sample_data));
    }

    // ==================== Import ====================

    /// Merge an imported snapshot over the current state
    ///
    /// Keys present in the import replace the current values; `ui` is merged
    /// field by field. On failure nothing changes.
    pub fn import_text(&mut self, text: &str) -> Result<ImportReport, TrackerError> {
        let patch = SnapshotPatch::parse(text)?;
        let replaced_keys: Vec<String> = patch.keys().into_iter().map(String::from).collect();
        let next = patch.apply(&self.state);

        let report = ImportReport {
            replaced_keys,
            leads: next.leads.len(),
            customers: next.customers.len(),
            locations: next.locations.len(),
        };
        tracing::info!(keys = ?report.replaced_keys, "Imported snapshot");
        self.commit(next);
        Ok(report)
    }

    /// Read `reader` to the end and import its contents
    pub fn import_from_reader(&mut self, mut reader: impl Read) -> Result<ImportReport, TrackerError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.import_text(&text)
    }

    // ==================== Persistence ====================

    /// Write the current snapshot again
    ///
    /// Useful after a failed save once the backend is available again.
    pub fn save(&mut self) -> StorageResult<()> {
        let text = codec::serialize(&self.state);
        self.gateway.save(&self.key, &text)?;
        self.last_save_error = None;
        Ok(())
    }

    /// Install `next` as the current snapshot and persist it
    fn commit(&mut self, next: TrackerState) {
        debug_assert!(
            integrity::check(&next).is_ok(),
            "commit would break location references: {:?}",
            integrity::check(&next)
        );
        self.state = Arc::new(next);

        let text = codec::serialize(&self.state);
        match self.gateway.save(&self.key, &text) {
            Ok(()) => self.last_save_error = None,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to save tracker state; changes kept in memory");
                self.last_save_error = Some(e);
            }
        }
    }
}

fn default_state(seed_sample_data: bool) -> TrackerState {
    if seed_sample_data {
        TrackerState::seeded()
    } else {
        TrackerState::default()
    }
}

/// Load the stored snapshot, degrading to the default on any failure
fn load_state(gateway: &dyn BlobStore, key: &str, seed_sample_data: bool) -> TrackerState {
    match gateway.load(key) {
        Ok(Some(text)) => match codec::deserialize(&text) {
            Ok(state) => {
                tracing::info!(
                    key,
                    leads = state.leads.len(),
                    customers = state.customers.len(),
                    locations = state.locations.len(),
                    "Loaded tracker state"
                );
                state
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Stored state is unreadable; starting from defaults");
                default_state(seed_sample_data)
            }
        },
        Ok(None) => {
            tracing::info!(key, "No stored state; starting from defaults");
            default_state(seed_sample_data)
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to load stored state; starting from defaults");
            default_state(seed_sample_data)
        }
    }
}
