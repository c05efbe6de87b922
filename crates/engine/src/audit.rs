use std::collections::BTreeMap;

use crate::model::{AuditReport, Reconciled};

/// Assemble the audit report: ingestion/reconciliation counters echoed
/// verbatim, plus the internal-client breakdown scanned from the
/// all-records view.
pub fn build(total_rows: usize, empty_rows: usize, recon: &Reconciled) -> AuditReport {
    let mut internal_by_code: BTreeMap<String, usize> = BTreeMap::new();
    for record in recon.all.iter().filter(|r| r.is_internal) {
        *internal_by_code.entry(record.client_code.clone()).or_insert(0) += 1;
    }

    AuditReport {
        total_rows,
        empty_rows,
        duplicates_removed: recon.duplicates_removed,
        removals: recon.removals.clone(),
        internal_clients: internal_by_code.values().sum(),
        internal_by_code,
    }
}
