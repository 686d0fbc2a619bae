//! Best-effort numeric extraction from raw table cells.
//!
//! Cells are free text typed by the user. Anything that does not read as a
//! finite number is treated as absent, never as zero and never as an error.

use crate::store::RawRow;

/// Parse a raw cell into a finite number
///
/// Accepts surrounding whitespace and a comma decimal separator (`"82,5"`).
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let value = match trimmed.parse::<f64>() {
        Ok(v) => v,
        Err(_) => trimmed.replace(',', ".").parse::<f64>().ok()?,
    };

    value.is_finite().then_some(value)
}

/// Parse a session or day key
///
/// Spreadsheet exports often write integer keys as `12.0`; those are accepted.
pub fn parse_key(raw: &str) -> Option<u32> {
    let value = parse_numeric(raw)?;
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return None;
    }
    Some(value as u32)
}

/// Numeric value of `column` in `row`, if present and parseable
pub fn field(row: &RawRow, column: &str) -> Option<f64> {
    let raw = row.get(column)?;
    let value = parse_numeric(raw);
    if value.is_none() {
        tracing::debug!("Ignoring non-numeric value {:?} in column '{}'", raw, column);
    }
    value
}
