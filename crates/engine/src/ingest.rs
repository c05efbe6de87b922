use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::model::{CellValue, RawRow, WorkOrderRecord};
use crate::normalize::{normalize_amount, normalize_date, normalize_opt_text, normalize_text};

/// Ingestion outcome: the canonical records plus the skip accounting the
/// audit report echoes.
#[derive(Debug)]
pub struct Ingested {
    pub records: Vec<WorkOrderRecord>,
    pub total_rows: usize,
    pub empty_rows: usize,
}

/// Map raw rows into canonical records per the column mapping.
///
/// Rows whose OT cell is blank after trimming are counted in `empty_rows`
/// and produce no record. Everything else degrades per-field: bad dates
/// become `None`, bad amounts 0, blank text the documented fallback.
pub fn ingest_rows(config: &EngineConfig, rows: &[RawRow]) -> Ingested {
    let columns = &config.columns;
    let mut records = Vec::with_capacity(rows.len());
    let mut empty_rows = 0;

    for row in rows {
        let ot_id = normalize_text(cell(row, &columns.ot), "");
        if ot_id.is_empty() {
            empty_rows += 1;
            continue;
        }

        let client_code = normalize_text(cell(row, &columns.client), "");
        let is_internal = config.clients.internal.iter().any(|c| *c == client_code);

        let mut extra = HashMap::with_capacity(columns.extra.len());
        for field in &columns.extra {
            extra.insert(field.clone(), normalize_text(cell(row, field), "N/A"));
        }

        records.push(WorkOrderRecord {
            ot_id,
            invoice: opt_cell(row, &columns.invoice).and_then(normalize_opt_text),
            folio: opt_cell(row, &columns.folio).and_then(normalize_opt_text),
            workshop: normalize_text(cell(row, &columns.workshop), &config.unassigned_workshop),
            promised: normalize_date(cell(row, &columns.promised)),
            rescheduled: opt_cell(row, &columns.promised_alt).and_then(normalize_date),
            delivered: normalize_date(cell(row, &columns.delivered)),
            billed: opt_cell(row, &columns.billed).and_then(normalize_date),
            client_code,
            is_internal,
            amount: opt_cell(row, &columns.amount).map(normalize_amount).unwrap_or(0.0),
            ot_type: opt_cell(row, &columns.ot_type)
                .map(|c| normalize_text(c, "N/A"))
                .unwrap_or_else(|| "N/A".to_string()),
            extra,
        });
    }

    Ingested {
        records,
        total_rows: rows.len(),
        empty_rows,
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

fn cell<'a>(row: &'a RawRow, field: &str) -> &'a CellValue {
    row.get(field).unwrap_or(&EMPTY_CELL)
}

fn opt_cell<'a>(row: &'a RawRow, field: &Option<String>) -> Option<&'a CellValue> {
    field.as_deref().map(|f| cell(row, f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use chrono::NaiveDate;

    fn config() -> EngineConfig {
        EngineConfig::from_toml(
            r#"
name = "test"
file = "ots.csv"
[columns]
ot           = "OT"
client       = "Cliente"
workshop     = "Taller"
promised     = "Promesa"
promised_alt = "Reprogramada"
delivered    = "Entrega"
billed       = "Factura"
amount       = "Monto"
ot_type      = "Tipo"
invoice      = "NoFactura"
folio        = "Folio"
extra        = ["Zona"]
[clients]
internal = ["900"]
claims = "350"
"#,
        )
        .unwrap()
    }

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| {
                let cell = if v.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(v.to_string())
                };
                (k.to_string(), cell)
            })
            .collect()
    }

    #[test]
    fn blank_ot_counts_as_empty_row() {
        let rows = vec![
            row(&[("OT", "  "), ("Cliente", "101")]),
            row(&[("OT", "4711"), ("Cliente", "101")]),
        ];
        let ingested = ingest_rows(&config(), &rows);
        assert_eq!(ingested.total_rows, 2);
        assert_eq!(ingested.empty_rows, 1);
        assert_eq!(ingested.records.len(), 1);
        assert_eq!(ingested.records[0].ot_id, "4711");
    }

    #[test]
    fn full_row_maps_every_field() {
        let rows = vec![row(&[
            ("OT", "4711"),
            ("Cliente", "101"),
            ("Taller", "Taller Norte"),
            ("Promesa", "10/3/2024"),
            ("Reprogramada", "12/3/2024"),
            ("Entrega", "11/3/2024"),
            ("Factura", "2024-03-20"),
            ("Monto", "$1,500.00"),
            ("Tipo", "Normal"),
            ("NoFactura", "F-88"),
            ("Folio", "FL-3"),
            ("Zona", "Norte"),
        ])];
        let ingested = ingest_rows(&config(), &rows);
        let r = &ingested.records[0];
        assert_eq!(r.workshop, "Taller Norte");
        assert_eq!(r.promised, NaiveDate::from_ymd_opt(2024, 3, 10));
        assert_eq!(r.rescheduled, NaiveDate::from_ymd_opt(2024, 3, 12));
        assert_eq!(r.delivered, NaiveDate::from_ymd_opt(2024, 3, 11));
        assert_eq!(r.billed, NaiveDate::from_ymd_opt(2024, 3, 20));
        assert_eq!(r.amount, 1500.0);
        assert_eq!(r.ot_type, "Normal");
        assert_eq!(r.invoice.as_deref(), Some("F-88"));
        assert_eq!(r.folio.as_deref(), Some("FL-3"));
        assert_eq!(r.extra.get("Zona").map(String::as_str), Some("Norte"));
        assert!(!r.is_internal);
    }

    #[test]
    fn blank_cells_degrade_to_defaults() {
        let rows = vec![row(&[("OT", "4712"), ("Cliente", "101")])];
        let ingested = ingest_rows(&config(), &rows);
        let r = &ingested.records[0];
        assert_eq!(r.workshop, crate::config::DEFAULT_UNASSIGNED_WORKSHOP);
        assert_eq!(r.promised, None);
        assert_eq!(r.delivered, None);
        assert_eq!(r.amount, 0.0);
        assert_eq!(r.ot_type, "N/A");
        assert_eq!(r.invoice, None);
        assert_eq!(r.extra.get("Zona").map(String::as_str), Some("N/A"));
    }

    #[test]
    fn internal_client_flagged() {
        let rows = vec![
            row(&[("OT", "1"), ("Cliente", "900")]),
            row(&[("OT", "2"), ("Cliente", "101")]),
        ];
        let ingested = ingest_rows(&config(), &rows);
        assert!(ingested.records[0].is_internal);
        assert!(!ingested.records[1].is_internal);
    }

    #[test]
    fn numeric_ot_cell_becomes_integer_text() {
        let mut raw = row(&[("Cliente", "101")]);
        raw.insert("OT".into(), CellValue::Number(48213.0));
        let ingested = ingest_rows(&config(), &[raw]);
        assert_eq!(ingested.records[0].ot_id, "48213");
    }
}
