//! `otlens-engine` — Work-order reconciliation and KPI engine.
//!
//! Pure engine crate: receives pre-decoded rows, returns reconciled views,
//! delivery classifications, and per-workshop/global statistics. No CLI or
//! UI dependencies.

pub mod audit;
pub mod claims;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod stats;

pub use config::{ColumnMapping, EngineConfig, FilterState};
pub use engine::{load_csv_rows, run};
pub use error::EngineError;
pub use model::{
    AuditReport, CellValue, ClaimsReport, DeliveryStatus, GlobalStats, RawRow, Reconciled,
    Report, WorkOrderRecord, WorkshopStats,
};
