//! Export and import handlers

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;

use voozaa_core::{ArtifactKind, ArtifactSink, DirectorySink, ExportArtifact, Store};

use super::warn_if_unsaved;
use crate::output::{Output, OutputFormat};

/// What to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportTarget {
    /// Complete state as a JSON backup
    Backup,
    /// Leads as CSV
    Leads,
    /// Customers as CSV
    Customers,
}

impl From<ExportTarget> for ArtifactKind {
    fn from(target: ExportTarget) -> Self {
        match target {
            ExportTarget::Backup => ArtifactKind::Backup,
            ExportTarget::Leads => ArtifactKind::Leads,
            ExportTarget::Customers => ArtifactKind::Customers,
        }
    }
}

/// Export a backup or CSV file
///
/// Writes into `out` under the dated default file name, or prints the
/// content when `stdout` is set.
pub fn export(
    store: &Store,
    target: ExportTarget,
    out: PathBuf,
    stdout: bool,
    output: &Output,
) -> Result<()> {
    let artifact = ExportArtifact::build(target.into(), store.state());

    if stdout {
        print!("{}", artifact.content);
        return Ok(());
    }

    let mut sink = DirectorySink::new(out);
    let path = sink
        .deliver(&artifact)
        .with_context(|| format!("Failed to write {}", artifact.filename))?;

    match output.format {
        OutputFormat::Json => output.json(&serde_json::json!({
            "kind": artifact.kind,
            "path": path,
            "mediaType": artifact.kind.media_type(),
        })),
        OutputFormat::Quiet => println!("{}", path.display()),
        OutputFormat::Human => output.success(&format!("Exported to {}", path.display())),
    }
    Ok(())
}

/// Import a JSON backup over the current state
///
/// `-` reads from stdin.
pub fn import(store: &mut Store, file: PathBuf, output: &Output) -> Result<()> {
    let report = if file.as_os_str() == "-" {
        store
            .import_from_reader(io::stdin().lock())
            .context("Import failed")?
    } else {
        let reader = File::open(&file)
            .with_context(|| format!("Failed to open {}", file.display()))?;
        store
            .import_from_reader(BufReader::new(reader))
            .with_context(|| format!("Failed to import {}", file.display()))?
    };
    warn_if_unsaved(store, output);

    match output.format {
        OutputFormat::Json => output.json(&report),
        OutputFormat::Quiet => {}
        OutputFormat::Human => {
            if report.replaced_keys.is_empty() {
                output.success("Imported (no known keys, nothing changed)");
            } else {
                output.success(&format!("Imported: {}", report.replaced_keys.join(", ")));
            }
            println!(
                "Now {} lead(s), {} customer(s), {} location(s)",
                report.leads, report.customers, report.locations
            );
        }
    }
    Ok(())
}
