//! Key Builder
//!
//! Maps table names and primary-key values onto state-store keys.
//!
//! ## Key Layout
//! ```text
//! ┌─────────┬──────────────┬────────────┬──────────────┬──────────┬─────
//! │ Tag (1) │ TableLen (4) │ Table      │ PartLen (4)  │ Part     │ ...
//! └─────────┴──────────────┴────────────┴──────────────┴──────────┴─────
//! ```
//! Lengths are big-endian u32. Schema and sequence keys stop after the table
//! name; row keys carry one part per key column. Because every component is
//! length-prefixed, no table's keys can be a prefix of another table's keys.

use crate::error::{LedgerError, Result};

/// Namespace tag for rows
pub const ROW_TAG: u8 = 0x01;

/// Namespace tag for schema registrations
pub const SCHEMA_TAG: u8 = 0x02;

/// Namespace tag for per-table id counters
pub const SEQUENCE_TAG: u8 = 0x03;

/// Separator in the string form of a composite key
pub const COMPOSITE_SEPARATOR: char = ':';

const ESCAPE: char = '\\';

/// Prefix shared by every row key of `table`
pub fn table_prefix(table: &str) -> Vec<u8> {
    scoped(ROW_TAG, table, 0)
}

/// Storage key of the row identified by `parts`
pub fn row_key<S: AsRef<str>>(table: &str, parts: &[S]) -> Vec<u8> {
    let extra: usize = parts.iter().map(|p| 4 + p.as_ref().len()).sum();
    let mut key = scoped(ROW_TAG, table, extra);
    for part in parts {
        push_component(&mut key, part.as_ref());
    }
    key
}

/// Storage key of a table's schema registration
pub fn schema_key(table: &str) -> Vec<u8> {
    scoped(SCHEMA_TAG, table, 0)
}

/// Storage key of a table's id counter
pub fn sequence_key(table: &str) -> Vec<u8> {
    scoped(SEQUENCE_TAG, table, 0)
}

/// Split a row key back into its table name and key parts
pub fn decode_row_key(key: &[u8]) -> Result<(String, Vec<String>)> {
    match key.first() {
        Some(&ROW_TAG) => {}
        Some(tag) => {
            return Err(LedgerError::Serialization(format!(
                "not a row key: tag 0x{:02x}",
                tag
            )))
        }
        None => return Err(LedgerError::Serialization("empty row key".to_string())),
    }

    let mut cursor = &key[1..];
    let table = read_component(&mut cursor)?;
    let mut parts = Vec::new();
    while !cursor.is_empty() {
        parts.push(read_component(&mut cursor)?);
    }
    Ok((table, parts))
}

/// String form of a multi-column key
///
/// Separators and escapes inside parts are backslash-escaped so
/// `split_composite` recovers the exact parts.
pub fn compose_key<S: AsRef<str>>(parts: &[S]) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(COMPOSITE_SEPARATOR);
        }
        for c in part.as_ref().chars() {
            if c == COMPOSITE_SEPARATOR || c == ESCAPE {
                out.push(ESCAPE);
            }
            out.push(c);
        }
    }
    out
}

/// Inverse of `compose_key`
pub fn split_composite(key: &str) -> Vec<String> {
    let mut parts = vec![String::new()];
    let mut chars = key.chars();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => {
                if let Some(next) = chars.next() {
                    push_char(&mut parts, next);
                }
            }
            COMPOSITE_SEPARATOR => parts.push(String::new()),
            _ => push_char(&mut parts, c),
        }
    }
    parts
}

// =============================================================================
// Private Helpers
// =============================================================================

fn scoped(tag: u8, table: &str, extra: usize) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 4 + table.len() + extra);
    key.push(tag);
    push_component(&mut key, table);
    key
}

fn push_component(key: &mut Vec<u8>, component: &str) {
    key.extend_from_slice(&(component.len() as u32).to_be_bytes());
    key.extend_from_slice(component.as_bytes());
}

fn read_component(cursor: &mut &[u8]) -> Result<String> {
    if cursor.len() < 4 {
        return Err(LedgerError::Serialization(
            "row key: missing component length".to_string(),
        ));
    }
    let len = u32::from_be_bytes([cursor[0], cursor[1], cursor[2], cursor[3]]) as usize;
    if cursor.len() < 4 + len {
        return Err(LedgerError::Serialization(format!(
            "row key: component of {} bytes truncated to {}",
            len,
            cursor.len() - 4
        )));
    }

    let component = std::str::from_utf8(&cursor[4..4 + len])
        .map_err(|e| LedgerError::Serialization(format!("row key: {}", e)))?
        .to_string();
    *cursor = &cursor[4 + len..];
    Ok(component)
}

fn push_char(parts: &mut [String], c: char) {
    if let Some(last) = parts.last_mut() {
        last.push(c);
    }
}
