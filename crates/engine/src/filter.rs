use chrono::Datelike;

use crate::config::FilterState;
use crate::model::WorkOrderRecord;

impl FilterState {
    /// Evaluate every configured criterion against one record, AND
    /// semantics. A year criterion excludes records without a billing
    /// date; the month criterion only applies alongside a year.
    pub fn matches(&self, record: &WorkOrderRecord) -> bool {
        if let Some(year) = self.year {
            let Some(billed) = record.billed else {
                return false;
            };
            if billed.year() != year {
                return false;
            }
            if let Some(month) = self.month {
                if billed.month() != month {
                    return false;
                }
            }
        }

        if let Some(workshop) = &self.workshop {
            if record.workshop != *workshop {
                return false;
            }
        }

        for (field, required) in &self.custom {
            if record.extra.get(field) != Some(required) {
                return false;
            }
        }

        true
    }
}

/// Build a compliance/financial view: the unconditional internal-client
/// exclusion runs ahead of the user-adjustable filter state.
pub fn apply<'a>(state: &FilterState, records: &'a [WorkOrderRecord]) -> Vec<&'a WorkOrderRecord> {
    records
        .iter()
        .filter(|r| !r.is_internal)
        .filter(|r| state.matches(r))
        .collect()
}
