//! Overview figures

use anyhow::Result;

use voozaa_core::stats::{compute_stats, leads_by_stage, mrr_by_status};
use voozaa_core::Store;

use crate::output::Output;

/// Print totals, pipeline figures and the per-stage and per-status breakdowns
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let state = store.snapshot();
    let stats = compute_stats(&state);
    let by_stage = leads_by_stage(&state);
    let by_status = mrr_by_status(&state);

    output.print_stats(&state, &stats, &by_stage, &by_status);
    Ok(())
}
