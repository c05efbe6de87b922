use std::collections::HashMap;

use serde::Deserialize;

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Environment defaults
// ---------------------------------------------------------------------------

/// Client codes billed as in-house work. Environment-specific; override via
/// `[clients] internal = [...]`.
pub const DEFAULT_INTERNAL_CLIENTS: &[&str] = &["102", "103", "900"];

/// The client code claim OTs are booked under. Override via
/// `[clients] claims = "..."`.
pub const DEFAULT_CLAIMS_CLIENT: &str = "350";

/// Label given to records whose workshop cell is blank.
pub const DEFAULT_UNASSIGNED_WORKSHOP: &str = "Sin taller";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub name: String,
    /// Source CSV, resolved relative to the config file by the caller.
    pub file: String,
    pub columns: ColumnMapping,
    #[serde(default)]
    pub clients: ClientConfig,
    #[serde(default = "default_unassigned_workshop")]
    pub unassigned_workshop: String,
    /// Preset filter state; CLI flags override individual criteria.
    #[serde(default)]
    pub filter: FilterState,
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Names of the source columns each record field is read from.
///
/// The five required roles must be present for the config to deserialize at
/// all; whether the named columns actually exist in the source headers is
/// checked by the loader, not by the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    pub ot: String,
    pub client: String,
    pub workshop: String,
    pub promised: String,
    pub delivered: String,
    #[serde(default)]
    pub folio: Option<String>,
    /// Reschedule date column, if the export carries one.
    #[serde(default)]
    pub promised_alt: Option<String>,
    #[serde(default)]
    pub billed: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub ot_type: Option<String>,
    #[serde(default)]
    pub invoice: Option<String>,
    /// Ordered additional filter fields, carried through as record
    /// `extra` values.
    #[serde(default)]
    pub extra: Vec<String>,
}

impl ColumnMapping {
    /// Every source column this mapping reads, required roles first.
    pub fn mapped_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = vec![
            &self.ot,
            &self.client,
            &self.workshop,
            &self.promised,
            &self.delivered,
        ];
        for optional in [
            &self.folio,
            &self.promised_alt,
            &self.billed,
            &self.amount,
            &self.ot_type,
            &self.invoice,
        ] {
            if let Some(name) = optional {
                columns.push(name);
            }
        }
        for field in &self.extra {
            columns.push(field);
        }
        columns
    }
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_internal_clients")]
    pub internal: Vec<String>,
    #[serde(default = "default_claims_client")]
    pub claims: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            internal: default_internal_clients(),
            claims: default_claims_client(),
        }
    }
}

fn default_internal_clients() -> Vec<String> {
    DEFAULT_INTERNAL_CLIENTS.iter().map(|c| c.to_string()).collect()
}

fn default_claims_client() -> String {
    DEFAULT_CLAIMS_CLIENT.to_string()
}

fn default_unassigned_workshop() -> String {
    DEFAULT_UNASSIGNED_WORKSHOP.to_string()
}

// ---------------------------------------------------------------------------
// Filter state
// ---------------------------------------------------------------------------

/// User-adjustable filter criteria. Absence of a criterion means match-all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterState {
    /// Billing year.
    pub year: Option<i32>,
    /// Billing month, only meaningful alongside `year`.
    pub month: Option<u32>,
    pub workshop: Option<String>,
    /// Exact-match requirements on record `extra` fields.
    #[serde(default)]
    pub custom: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl EngineConfig {
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let config: EngineConfig =
            toml::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let required = [
            ("ot", &self.columns.ot),
            ("client", &self.columns.client),
            ("workshop", &self.columns.workshop),
            ("promised", &self.columns.promised),
            ("delivered", &self.columns.delivered),
        ];
        for (role, column) in required {
            if column.trim().is_empty() {
                return Err(EngineError::ConfigValidation(format!(
                    "column role '{role}' is blank"
                )));
            }
        }

        for (i, field) in self.columns.extra.iter().enumerate() {
            if field.trim().is_empty() {
                return Err(EngineError::ConfigValidation(
                    "extra filter field name is blank".into(),
                ));
            }
            if self.columns.extra[..i].contains(field) {
                return Err(EngineError::ConfigValidation(format!(
                    "duplicate extra filter field '{field}'"
                )));
            }
        }

        if self.clients.claims.trim().is_empty() {
            return Err(EngineError::ConfigValidation(
                "claims client code is blank".into(),
            ));
        }

        if let Some(month) = self.filter.month {
            if !(1..=12).contains(&month) {
                return Err(EngineError::ConfigValidation(format!(
                    "filter month must be 1-12, got {month}"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
