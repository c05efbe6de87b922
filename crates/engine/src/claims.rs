use std::collections::HashSet;

use crate::config::{EngineConfig, FilterState};
use crate::model::{ClaimsReport, WorkOrderRecord};

/// Substring that marks an OT type as a claim, matched case-insensitively.
pub const CLAIM_TYPE_MARKER: &str = "reclamo";

/// Select claim records: the configured claims client, an OT type
/// containing the claim marker, then the user filter on top. The
/// internal-client exclusion does not apply here.
pub fn select<'a>(
    config: &EngineConfig,
    records: &'a [WorkOrderRecord],
    state: &FilterState,
) -> Vec<&'a WorkOrderRecord> {
    records
        .iter()
        .filter(|r| r.client_code == config.clients.claims)
        .filter(|r| r.ot_type.to_lowercase().contains(CLAIM_TYPE_MARKER))
        .filter(|r| state.matches(r))
        .collect()
}

/// Summarize a claims selection: raw rows, distinct OT ids, amount sum.
pub fn summarize(matches: &[&WorkOrderRecord]) -> ClaimsReport {
    let distinct: HashSet<&str> = matches.iter().map(|r| r.ot_id.as_str()).collect();
    ClaimsReport {
        rows: matches.len(),
        distinct_ots: distinct.len(),
        total_amount: matches.iter().map(|r| r.amount).sum(),
    }
}
