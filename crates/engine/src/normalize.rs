//! Cell normalizers: unreliable free-form spreadsheet values in, canonical
//! typed values out. Failures degrade to `None`/defaults, never to errors.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

use crate::model::CellValue;

// Spreadsheet serials count days since 1899-12-30; the Unix epoch sits at
// serial 25569. Serial 1 through 9999-12-31 is the accepted range.
const MIN_SERIAL: f64 = 1.0;
const MAX_SERIAL: f64 = 2_958_465.0;

fn serial_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Convert a spreadsheet date serial to a date, day granularity.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(MIN_SERIAL..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    serial_epoch()?.checked_add_days(Days::new(serial.trunc() as u64))
}

/// Days since 1899-12-30, the inverse of `serial_to_date`.
pub fn date_to_serial(date: NaiveDate) -> i64 {
    serial_epoch().map(|epoch| (date - epoch).num_days()).unwrap_or(0)
}

/// Normalize any cell into a date, or `None` when the value does not hold
/// one. Typed dates pass through; numbers are treated as serials; text runs
/// the parse ladder in `parse_date_text`.
pub fn normalize_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Number(n) => serial_to_date(*n),
        CellValue::Text(s) => parse_date_text(s.trim()),
        CellValue::Empty => None,
    }
}

/// Text-to-date ladder: serial digits, `D/M/YYYY` (day first, per the
/// exports' Latin American convention), `YYYY/M/D`, then generic ISO
/// forms. `/` and `-` separate interchangeably.
fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }

    if s.chars().all(|c| c.is_ascii_digit()) {
        return serial_to_date(s.parse::<f64>().ok()?);
    }

    let parts: Vec<&str> = s.split(['/', '-']).collect();
    if parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
    {
        if parts[0].len() <= 2 && parts[1].len() <= 2 && parts[2].len() == 4 {
            return NaiveDate::from_ymd_opt(
                parts[2].parse().ok()?,
                parts[1].parse().ok()?,
                parts[0].parse().ok()?,
            );
        }
        if parts[0].len() == 4 {
            return NaiveDate::from_ymd_opt(
                parts[0].parse().ok()?,
                parts[1].parse().ok()?,
                parts[2].parse().ok()?,
            );
        }
    }

    generic_parse(s)
}

fn generic_parse(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }
    None
}

/// Normalize any cell into an amount. Numbers pass through; text keeps only
/// digits, `.` and `-` before parsing. Everything else is 0.
pub fn normalize_amount(cell: &CellValue) -> f64 {
    match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse().unwrap_or(0.0)
        }
        CellValue::Date(_) | CellValue::Empty => 0.0,
    }
}

/// Normalize any cell into trimmed text, with `fallback` for blanks.
pub fn normalize_text(cell: &CellValue, fallback: &str) -> String {
    match cell {
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                fallback.to_string()
            } else {
                trimmed.to_string()
            }
        }
        CellValue::Number(n) => format_number(*n),
        CellValue::Date(d) => d.to_string(),
        CellValue::Empty => fallback.to_string(),
    }
}

/// Like `normalize_text` but blank means absent.
pub fn normalize_opt_text(cell: &CellValue) -> Option<String> {
    let text = normalize_text(cell, "");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

// Whole-valued numbers print without the trailing ".0" a float Display
// would add; identifiers read from numeric columns depend on this.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
