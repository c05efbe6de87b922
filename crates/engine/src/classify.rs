use crate::model::{DeliveryStatus, WorkOrderRecord};

/// Classify a record's delivery against its target date.
///
/// The target is the reschedule date when present, else the first promise.
/// Comparison is at day granularity: the model stores dates only, so
/// time-of-day is already stripped at ingestion.
pub fn classify(record: &WorkOrderRecord) -> DeliveryStatus {
    let target = record.rescheduled.or(record.promised);
    match (target, record.delivered) {
        (None, _) => DeliveryStatus::Pending,
        (Some(_), None) => DeliveryStatus::Pending,
        (Some(target), Some(delivered)) if delivered <= target => DeliveryStatus::OnTime,
        _ => DeliveryStatus::Late,
    }
}
