use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A loosely-typed spreadsheet cell as handed in by a decoding collaborator.
///
/// CSV exports only produce `Text`/`Empty`; XLSX decoders may hand `Number`
/// (including date serials) or `Date` through the same seam.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

/// One raw row, keyed by source column header.
pub type RawRow = HashMap<String, CellValue>;

// ---------------------------------------------------------------------------
// Canonical record
// ---------------------------------------------------------------------------

/// A normalized work-order row. Immutable once built by the ingester.
#[derive(Debug, Clone, Serialize)]
pub struct WorkOrderRecord {
    /// OT number. Non-empty by construction; rows without one never
    /// become records.
    pub ot_id: String,
    pub invoice: Option<String>,
    pub folio: Option<String>,
    pub workshop: String,
    /// First promised delivery date.
    pub promised: Option<NaiveDate>,
    /// Reschedule date. Takes precedence over `promised` as the
    /// classification target when present.
    pub rescheduled: Option<NaiveDate>,
    pub delivered: Option<NaiveDate>,
    pub billed: Option<NaiveDate>,
    pub client_code: String,
    /// Membership in the configured internal-client code set.
    pub is_internal: bool,
    /// 0.0 when the source cell was blank or unparsable.
    pub amount: f64,
    pub ot_type: String,
    /// Stringified values of the configured additional filter fields,
    /// "N/A" where blank.
    pub extra: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    OnTime,
    Late,
    Pending,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OnTime => write!(f, "on_time"),
            Self::Late => write!(f, "late"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Two views over the same universe of ingested records.
///
/// `all` keeps one entry per ingested row (the billing unit of truth: one OT
/// can carry several invoice lines). `unique` keeps exactly one survivor per
/// distinct OT id (the compliance unit of truth); it is a subset of `all` by
/// identity.
#[derive(Debug, Clone, Serialize)]
pub struct Reconciled {
    pub all: Vec<WorkOrderRecord>,
    pub unique: Vec<WorkOrderRecord>,
    /// One per repeated occurrence of an id, regardless of which side lost.
    pub duplicates_removed: usize,
    /// Human-readable removal reasons, one per losing row, in source order.
    pub removals: Vec<String>,
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub total_rows: usize,
    /// Rows with no OT id, excluded from both views entirely.
    pub empty_rows: usize,
    pub duplicates_removed: usize,
    pub removals: Vec<String>,
    pub internal_clients: usize,
    pub internal_by_code: BTreeMap<String, usize>,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct WorkshopStats {
    pub name: String,
    pub total_ots: usize,
    pub on_time: usize,
    pub late: usize,
    pub pending: usize,
    /// on_time / total × 100, two decimals. 0 when the group is empty.
    pub compliance_rate: f64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlobalStats {
    pub total_ots: usize,
    pub on_time: usize,
    pub late: usize,
    pub pending: usize,
    pub average_compliance: f64,
    pub total_amount: f64,
    /// Sorted descending by `total_ots`; ties keep first-appearance order.
    pub workshops: Vec<WorkshopStats>,
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ClaimsReport {
    /// Raw matching-row count over the financial view.
    pub rows: usize,
    /// Cardinality of the set of OT ids among the matches.
    pub distinct_ots: usize,
    pub total_amount: f64,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

/// Everything the presentation/export side consumes from one run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub audit: AuditReport,
    /// KPIs over the deduplicated view, internals excluded, filter applied.
    pub compliance: GlobalStats,
    /// KPIs over the full view, internals excluded, filter applied.
    pub financial: GlobalStats,
    pub claims: ClaimsReport,
    /// The unfiltered record views, ready for tabular rendering or
    /// re-export.
    pub records: Reconciled,
}
