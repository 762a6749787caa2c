//! Aggregation engine
//!
//! Summary figures and breakdowns computed from a snapshot.

use serde::Serialize;

use crate::models::CustomerStatus;
use crate::state::{TrackerState, LOST_STAGE, WON_STAGE};

/// Headline numbers for the overview
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub leads: usize,
    pub customers: usize,
    /// Sum of monthly recurring revenue across all customers
    pub mrr: f64,
    /// Value of leads in neither terminal stage
    pub pipeline: f64,
    pub won: f64,
    pub lost: f64,
}

/// Lead count for one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageCount {
    pub stage: String,
    pub count: usize,
}

/// Recurring revenue for one customer status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRevenue {
    pub status: CustomerStatus,
    pub mrr: f64,
}

pub fn compute_stats(state: &TrackerState) -> Stats {
    let value_in = |pred: &dyn Fn(&str) -> bool| -> f64 {
        state
            .leads
            .iter()
            .filter(|l| pred(&l.stage))
            .map(|l| l.value)
            .sum()
    };

    Stats {
        leads: state.leads.len(),
        customers: state.customers.len(),
        mrr: state.customers.iter().map(|c| c.mrr).sum(),
        pipeline: value_in(&|stage| !TrackerState::is_terminal_stage(stage)),
        won: value_in(&|stage| stage == WON_STAGE),
        lost: value_in(&|stage| stage == LOST_STAGE),
    }
}

/// Lead counts per stage
///
/// Every configured stage appears, in configured order, even with zero
/// leads. Stages found on leads but missing from the configuration are
/// appended in first-seen order, so the counts always add up to the number
/// of leads.
pub fn leads_by_stage(state: &TrackerState) -> Vec<StageCount> {
    let mut counts: Vec<StageCount> = state
        .lead_stages
        .iter()
        .map(|stage| StageCount {
            stage: stage.clone(),
            count: 0,
        })
        .collect();

    for lead in &state.leads {
        match counts.iter_mut().find(|c| c.stage == lead.stage) {
            Some(entry) => entry.count += 1,
            None => counts.push(StageCount {
                stage: lead.stage.clone(),
                count: 1,
            }),
        }
    }
    counts
}

/// Recurring revenue per customer status, all statuses included
pub fn mrr_by_status(state: &TrackerState) -> Vec<StatusRevenue> {
    CustomerStatus::ALL
        .iter()
        .map(|&status| StatusRevenue {
            status,
            mrr: state
                .customers
                .iter()
                .filter(|c| c.status == status)
                .map(|c| c.mrr)
                .sum(),
        })
        .collect()
}
