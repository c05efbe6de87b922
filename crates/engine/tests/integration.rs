use std::path::PathBuf;

use otlens_engine::config::{EngineConfig, FilterState};
use otlens_engine::engine::{load_csv_rows, run};
use otlens_engine::model::Report;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_and_run(state: &FilterState) -> Report {
    let dir = fixtures_dir();
    let config_toml = std::fs::read_to_string(dir.join("close.toml")).unwrap();
    let config = EngineConfig::from_toml(&config_toml).unwrap();

    let csv_data = std::fs::read_to_string(dir.join(&config.file))
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", config.file));
    let rows = load_csv_rows(&csv_data, &config.columns).unwrap();

    run(&config, &rows, state)
}

// -------------------------------------------------------------------------
// Unfiltered run
// -------------------------------------------------------------------------

#[test]
fn audit_counts() {
    let report = load_and_run(&FilterState::default());

    assert_eq!(report.audit.total_rows, 11);
    assert_eq!(report.audit.empty_rows, 1);
    assert_eq!(report.audit.duplicates_removed, 3);
    assert_eq!(report.audit.removals.len(), 3);

    assert_eq!(report.audit.internal_clients, 2);
    assert_eq!(report.audit.internal_by_code.get("900"), Some(&1));
    assert_eq!(report.audit.internal_by_code.get("910"), Some(&1));
}

#[test]
fn compliance_view_dedupes_and_excludes_internals() {
    let report = load_and_run(&FilterState::default());
    let c = &report.compliance;

    // 7 unique OTs, minus the surviving internal 48203.
    assert_eq!(c.total_ots, 6);
    assert_eq!(c.on_time, 3);
    assert_eq!(c.late, 1);
    assert_eq!(c.pending, 2);
    assert_eq!(c.average_compliance, 50.00);
}

#[test]
fn financial_view_keeps_every_external_row() {
    let report = load_and_run(&FilterState::default());
    let f = &report.financial;

    assert_eq!(f.total_ots, 8);
    assert_eq!(f.on_time, 4);
    assert_eq!(f.late, 2);
    assert_eq!(f.pending, 2);
    assert_eq!(f.total_amount, 4735.50);
}

#[test]
fn workshops_ranked_by_volume() {
    let report = load_and_run(&FilterState::default());
    let names: Vec<&str> = report
        .compliance
        .workshops
        .iter()
        .map(|w| w.name.as_str())
        .collect();

    // Norte leads with 3; the three single-OT groups keep first-appearance
    // order, blank workshop folded into the unassigned label.
    assert_eq!(names, vec!["Taller Norte", "Taller Sur", "Taller Centro", "Sin taller"]);
    assert_eq!(report.compliance.workshops[0].total_ots, 3);
}

#[test]
fn internal_survivor_replaced_by_external_duplicate() {
    let report = load_and_run(&FilterState::default());

    // 48205 arrives internal first, external second; the external line
    // must be the compliance survivor.
    let in_compliance = report
        .compliance
        .workshops
        .iter()
        .map(|w| w.total_ots)
        .sum::<usize>();
    assert_eq!(in_compliance, report.compliance.total_ots);
    assert!(report
        .audit
        .removals
        .iter()
        .any(|r| r.contains("48205") && r.contains("replaced by external")));
}

#[test]
fn claims_summary() {
    let report = load_and_run(&FilterState::default());

    assert_eq!(report.claims.rows, 2);
    assert_eq!(report.claims.distinct_ots, 1);
    assert_eq!(report.claims.total_amount, 575.0);
}

// -------------------------------------------------------------------------
// Filtered runs
// -------------------------------------------------------------------------

#[test]
fn march_billing_filter() {
    let state = FilterState {
        year: Some(2024),
        month: Some(3),
        ..FilterState::default()
    };
    let report = load_and_run(&state);
    let c = &report.compliance;

    // Only OTs billed in March 2024 remain; records without a billing
    // date drop out entirely.
    assert_eq!(c.total_ots, 3);
    assert_eq!(c.on_time, 2);
    assert_eq!(c.late, 1);
    assert_eq!(c.average_compliance, 66.67);
}

#[test]
fn workshop_filter() {
    let state = FilterState {
        workshop: Some("Taller Norte".into()),
        ..FilterState::default()
    };
    let report = load_and_run(&state);

    assert_eq!(report.compliance.total_ots, 3);
    assert_eq!(report.compliance.workshops.len(), 1);
    assert_eq!(report.compliance.workshops[0].name, "Taller Norte");
}

#[test]
fn custom_field_filter() {
    let mut state = FilterState::default();
    state.custom.insert("Zona".into(), "Norte".into());
    let report = load_and_run(&state);

    assert_eq!(report.compliance.total_ots, 3);
    // The claims selection honors the same filter: the claim rows are
    // Zona = Sur.
    assert_eq!(report.claims.rows, 0);
}

#[test]
fn filters_never_resurface_internals() {
    // An internal-client record stays out of compliance and financial
    // outputs under any filter state, while the audit still counts it.
    let state = FilterState {
        workshop: Some("Taller Sur".into()),
        ..FilterState::default()
    };
    let report = load_and_run(&state);

    assert!(report.compliance.total_ots > 0);
    assert_eq!(report.audit.internal_clients, 2);
    for w in &report.compliance.workshops {
        assert_eq!(w.name, "Taller Sur");
    }
}

// -------------------------------------------------------------------------
// Structural invariants
// -------------------------------------------------------------------------

#[test]
fn unique_never_exceeds_all() {
    let dir = fixtures_dir();
    let config_toml = std::fs::read_to_string(dir.join("close.toml")).unwrap();
    let config = EngineConfig::from_toml(&config_toml).unwrap();
    let csv_data = std::fs::read_to_string(dir.join(&config.file)).unwrap();
    let rows = load_csv_rows(&csv_data, &config.columns).unwrap();

    let ingested = otlens_engine::ingest::ingest_rows(&config, &rows);
    let recon = otlens_engine::reconcile::reconcile(ingested.records);

    assert!(recon.unique.len() <= recon.all.len());

    // Ids with more than one occurrence account exactly for the
    // duplicates counter.
    let mut counts = std::collections::HashMap::new();
    for r in &recon.all {
        *counts.entry(r.ot_id.as_str()).or_insert(0usize) += 1;
    }
    let repeats: usize = counts.values().filter(|c| **c > 1).map(|c| c - 1).sum();
    assert_eq!(repeats, recon.duplicates_removed);
}

#[test]
fn report_is_presentation_ready_json() {
    let report = load_and_run(&FilterState::default());

    assert_eq!(report.records.all.len(), 10);
    assert_eq!(report.records.unique.len(), 7);

    let json = serde_json::to_string_pretty(&report).unwrap();
    assert!(json.contains("\"average_compliance\": 50.0"));
    assert!(json.contains("\"duplicates_removed\": 3"));
    assert!(json.contains("Sin taller"));
}
