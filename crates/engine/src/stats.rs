use std::collections::HashMap;

use crate::classify::classify;
use crate::model::{DeliveryStatus, GlobalStats, WorkOrderRecord, WorkshopStats};

#[derive(Debug)]
struct Tally {
    name: String,
    total: usize,
    on_time: usize,
    late: usize,
    pending: usize,
    amount: f64,
}

impl Tally {
    fn new(name: String) -> Self {
        Self {
            name,
            total: 0,
            on_time: 0,
            late: 0,
            pending: 0,
            amount: 0.0,
        }
    }

    fn add(&mut self, status: DeliveryStatus, amount: f64) {
        self.total += 1;
        self.amount += amount;
        match status {
            DeliveryStatus::OnTime => self.on_time += 1,
            DeliveryStatus::Late => self.late += 1,
            DeliveryStatus::Pending => self.pending += 1,
        }
    }
}

/// Compute global and per-workshop statistics over a filtered view.
///
/// Single pass; workshop groups keep first-appearance order, then sort
/// descending by total count (stable, so ties stay in appearance order).
pub fn compute(records: &[&WorkOrderRecord]) -> GlobalStats {
    let mut global = Tally::new(String::new());
    let mut groups: Vec<Tally> = Vec::new();
    let mut slot_by_workshop: HashMap<String, usize> = HashMap::new();

    for record in records {
        let status = classify(record);
        global.add(status, record.amount);

        let slot = *slot_by_workshop
            .entry(record.workshop.clone())
            .or_insert_with(|| {
                groups.push(Tally::new(record.workshop.clone()));
                groups.len() - 1
            });
        groups[slot].add(status, record.amount);
    }

    let mut workshops: Vec<WorkshopStats> = groups
        .into_iter()
        .map(|t| WorkshopStats {
            compliance_rate: compliance_rate(t.on_time, t.total),
            name: t.name,
            total_ots: t.total,
            on_time: t.on_time,
            late: t.late,
            pending: t.pending,
            total_amount: t.amount,
        })
        .collect();
    workshops.sort_by(|a, b| b.total_ots.cmp(&a.total_ots));

    GlobalStats {
        total_ots: global.total,
        on_time: global.on_time,
        late: global.late,
        pending: global.pending,
        average_compliance: compliance_rate(global.on_time, global.total),
        total_amount: global.amount,
        workshops,
    }
}

/// on_time / total × 100, two decimals. 0 for an empty set.
fn compliance_rate(on_time: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(on_time as f64 / total as f64 * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
