//! Export artifacts
//!
//! An [`ExportArtifact`] is a named piece of text ready to be handed to the
//! user: a JSON backup of the whole state or a CSV export of one collection.
//! Where the artifact ends up is decided by an [`ArtifactSink`].

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::codec;
use crate::state::TrackerState;
use crate::storage::file::atomic_write;
use crate::storage::StorageResult;

/// What an artifact contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Complete state as JSON
    Backup,
    /// Leads as CSV
    Leads,
    /// Customers as CSV
    Customers,
}

impl ArtifactKind {
    pub fn file_name(&self, date: NaiveDate) -> String {
        let date = date.format("%Y-%m-%d");
        match self {
            ArtifactKind::Backup => format!("voozaa_tracker_backup_{}.json", date),
            ArtifactKind::Leads => format!("voozaa_leads_{}.csv", date),
            ArtifactKind::Customers => format!("voozaa_customers_{}.csv", date),
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ArtifactKind::Backup => "application/json",
            ArtifactKind::Leads | ArtifactKind::Customers => "text/csv",
        }
    }
}

/// A file-ready export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportArtifact {
    pub kind: ArtifactKind,
    pub filename: String,
    pub content: String,
}

impl ExportArtifact {
    /// Build the artifact of `kind` dated today (local time)
    pub fn build(kind: ArtifactKind, state: &TrackerState) -> Self {
        Self::build_dated(kind, state, Local::now().date_naive())
    }

    /// Build the artifact of `kind` with an explicit date in its file name
    pub fn build_dated(kind: ArtifactKind, state: &TrackerState, date: NaiveDate) -> Self {
        let content = match kind {
            ArtifactKind::Backup => codec::serialize(state),
            ArtifactKind::Leads => codec::leads_csv(state),
            ArtifactKind::Customers => codec::customers_csv(state),
        };
        Self {
            kind,
            filename: kind.file_name(date),
            content,
        }
    }

    pub fn backup(state: &TrackerState) -> Self {
        Self::build(ArtifactKind::Backup, state)
    }

    pub fn leads(state: &TrackerState) -> Self {
        Self::build(ArtifactKind::Leads, state)
    }

    pub fn customers(state: &TrackerState) -> Self {
        Self::build(ArtifactKind::Customers, state)
    }
}

/// Destination for export artifacts
pub trait ArtifactSink {
    /// Deliver the artifact, returning where it went
    fn deliver(&mut self, artifact: &ExportArtifact) -> StorageResult<PathBuf>;
}

/// Writes artifacts as files into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn deliver(&mut self, artifact: &ExportArtifact) -> StorageResult<PathBuf> {
        let path = self.dir.join(&artifact.filename);
        atomic_write(&path, artifact.content.as_bytes())?;
        tracing::info!(path = %path.display(), kind = ?artifact.kind, "Wrote export");
        Ok(path)
    }
}
