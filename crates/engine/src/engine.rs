use crate::config::{ColumnMapping, EngineConfig, FilterState};
use crate::error::EngineError;
use crate::ingest::{ingest_rows, Ingested};
use crate::model::{CellValue, RawRow, Report, ReportMeta};
use crate::reconcile::reconcile;
use crate::{audit, claims, filter, stats};

/// Run the full pipeline: ingest, reconcile, then compliance and financial
/// KPIs over the filtered views plus the claims selection and audit trail.
///
/// Never fails: unparsable cells degrade the affected record, a missing OT
/// id drops only its own row, and processing one row never blocks the next.
pub fn run(config: &EngineConfig, rows: &[RawRow], state: &FilterState) -> Report {
    let Ingested {
        records,
        total_rows,
        empty_rows,
    } = ingest_rows(config, rows);
    let recon = reconcile(records);

    let compliance = stats::compute(&filter::apply(state, &recon.unique));
    let financial = stats::compute(&filter::apply(state, &recon.all));
    let claims = claims::summarize(&claims::select(config, &recon.all, state));
    let audit = audit::build(total_rows, empty_rows, &recon);

    Report {
        meta: ReportMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        audit,
        compliance,
        financial,
        claims,
        records: recon,
    }
}

/// Load CSV text into raw rows, keeping only the mapped columns.
///
/// Every mapped column (required, optional-but-configured, and extra
/// filter fields) must appear in the header row; this is the validation
/// the engine itself assumes has already happened. Cells come out as
/// `Text`/`Empty`; type sniffing is the normalizers' job.
pub fn load_csv_rows(csv_data: &str, mapping: &ColumnMapping) -> Result<Vec<RawRow>, EngineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| EngineError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, EngineError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| EngineError::MissingColumn { column: name.into() })
    };

    let mut mapped: Vec<(String, usize)> = Vec::new();
    for name in mapping.mapped_columns() {
        mapped.push((name.to_string(), idx(name)?));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| EngineError::Io(e.to_string()))?;
        let mut row = RawRow::with_capacity(mapped.len());
        for (name, i) in &mapped {
            let raw = record.get(*i).unwrap_or("");
            let cell = if raw.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(raw.to_string())
            };
            row.insert(name.clone(), cell);
        }
        rows.push(row);
    }

    Ok(rows)
}
