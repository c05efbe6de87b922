use std::collections::HashMap;

use crate::model::{Reconciled, WorkOrderRecord};

/// Outcome of pitting a duplicate against the current survivor for its OT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    /// External record displaces an internal survivor.
    ExternalReplacesInternal,
    /// Internal duplicate loses to an external survivor.
    InternalIgnored,
    /// Same internal/external side; the one with a delivery date wins.
    DeliveredReplacesUndelivered,
    /// No rule applies; the earliest record stands.
    FirstKept,
}

impl Resolution {
    fn replaces(self) -> bool {
        matches!(
            self,
            Self::ExternalReplacesInternal | Self::DeliveredReplacesUndelivered
        )
    }

    fn describe(self, ot_id: &str) -> String {
        match self {
            Self::ExternalReplacesInternal => {
                format!("OT {ot_id}: internal record replaced by external duplicate")
            }
            Self::InternalIgnored => {
                format!("OT {ot_id}: internal duplicate ignored (external record kept)")
            }
            Self::DeliveredReplacesUndelivered => {
                format!("OT {ot_id}: undelivered record replaced by duplicate with delivery date")
            }
            Self::FirstKept => format!("OT {ot_id}: duplicate ignored (first record kept)"),
        }
    }
}

/// Tie-break between the surviving record and a later duplicate, strictly in
/// rule order: external beats internal, then presence of a delivery date,
/// then first-seen. Reschedule date, billing date and amount are not
/// signals.
fn resolve(incumbent: &WorkOrderRecord, challenger: &WorkOrderRecord) -> Resolution {
    if incumbent.is_internal && !challenger.is_internal {
        Resolution::ExternalReplacesInternal
    } else if !incumbent.is_internal && challenger.is_internal {
        Resolution::InternalIgnored
    } else if incumbent.delivered.is_none() && challenger.delivered.is_some() {
        Resolution::DeliveredReplacesUndelivered
    } else {
        Resolution::FirstKept
    }
}

/// Fold ingested records, in source order, into the all-records view and the
/// one-survivor-per-OT view.
///
/// The fold is strictly sequential: the tie-break is order-dependent, so a
/// parallel rendition would have to preserve this reduction order.
pub fn reconcile(records: Vec<WorkOrderRecord>) -> Reconciled {
    let mut unique: Vec<WorkOrderRecord> = Vec::new();
    let mut slot_by_id: HashMap<String, usize> = HashMap::new();
    let mut removals = Vec::new();
    let mut duplicates_removed = 0;

    for record in &records {
        match slot_by_id.get(&record.ot_id) {
            None => {
                slot_by_id.insert(record.ot_id.clone(), unique.len());
                unique.push(record.clone());
            }
            Some(&slot) => {
                duplicates_removed += 1;
                let resolution = resolve(&unique[slot], record);
                removals.push(resolution.describe(&record.ot_id));
                if resolution.replaces() {
                    unique[slot] = record.clone();
                }
            }
        }
    }

    Reconciled {
        all: records,
        unique,
        duplicates_removed,
        removals,
    }
}
