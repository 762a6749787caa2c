//! VooZaa Tracker Core Library
//!
//! This crate provides the state engine behind VooZaa Tracker, a
//! single-user tracker for sales leads, customers and the locations they
//! belong to.
//!
//! # Architecture
//!
//! - **TrackerState**: immutable snapshot of everything the tracker knows
//! - **Store**: owns the current snapshot, applies mutations and persists
//!   every new snapshot through a [`BlobStore`]
//!
//! Filtered lists, sort orders and statistics are pure functions over a
//! snapshot and are recomputed on demand.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open()?;
//!
//! // Add a lead
//! let id = store.upsert_lead(LeadInput::new("Max Mustermann"))?;
//!
//! // Derived views
//! let state = store.snapshot();
//! let open = query::leads(&state, &LeadQuery::default(), &SortSpec::default());
//! let stats = stats::compute_stats(&state);
//! ```
//!
//! # Modules
//!
//! - `store`: Store controller (main entry point)
//! - `state`: The snapshot type and its pure mutations
//! - `models`: Records, inputs and patches
//! - `integrity`: Location reference cleanup
//! - `query`: Search, filters and sort orders
//! - `stats`: Summary figures and breakdowns
//! - `codec`: JSON snapshots and CSV exports
//! - `storage`: Blob store gateway
//! - `export`: File-ready export artifacts
//! - `display`: Money and date formatting
//! - `config`: Application configuration

pub mod codec;
pub mod collate;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod integrity;
pub mod models;
pub mod query;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;

pub use config::Config;
pub use error::{IntegrityViolation, ParseError, TrackerError, ValidationError};
pub use export::{ArtifactKind, ArtifactSink, DirectorySink, ExportArtifact};
pub use models::{
    Customer, CustomerInput, CustomerStatus, Lead, LeadInput, Location, LocationInput,
    ProfilePatch, SettingsPatch, Tab,
};
pub use query::{CustomerQuery, Filter, LeadQuery, SortDirection, SortField, SortSpec};
pub use state::TrackerState;
pub use stats::Stats;
pub use storage::{BlobStore, FileBlobStore, MemoryBlobStore, StorageError};
pub use store::{ImportReport, Store};
