//! Row Codec
//!
//! Encoding of rows and schemas into state-store values, and of query
//! listings into the payload returned to callers.
//!
//! ## Stored Value Format
//! ```text
//! ┌────────────┬──────────────────────────────┐
//! │ Format (1) │ bincode body                 │
//! └────────────┴──────────────────────────────┘
//! ```
//! Fields are opaque text: no trimming, no coercion.

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use super::TableSchema;

/// Format byte for stored rows
pub const ROW_FORMAT: u8 = 1;

/// Format byte for stored schemas
pub const SCHEMA_FORMAT: u8 = 1;

/// Encode an ordered field list
pub fn encode_row(fields: &[String]) -> Result<Vec<u8>> {
    encode(ROW_FORMAT, fields)
}

/// Decode an ordered field list
pub fn decode_row(bytes: &[u8]) -> Result<Vec<String>> {
    decode(ROW_FORMAT, "row", bytes)
}

pub fn encode_schema(schema: &TableSchema) -> Result<Vec<u8>> {
    encode(SCHEMA_FORMAT, schema)
}

pub fn decode_schema(bytes: &[u8]) -> Result<TableSchema> {
    decode(SCHEMA_FORMAT, "schema", bytes)
}

// =============================================================================
// Listing Payload
// =============================================================================

/// Rows returned by a listing query, serialized as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Listing {
    /// Value of `column` in row `index`
    pub fn value(&self, index: usize, column: &str) -> Option<&str> {
        let pos = self.columns.iter().position(|c| c == column)?;
        self.rows.get(index)?.get(pos).map(String::as_str)
    }
}

pub fn encode_listing(listing: &Listing) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(listing)?)
}

pub fn decode_listing(bytes: &[u8]) -> Result<Listing> {
    Ok(serde_json::from_slice(bytes)?)
}

// =============================================================================
// Private Helpers
// =============================================================================

fn encode<T: Serialize + ?Sized>(format: u8, value: &T) -> Result<Vec<u8>> {
    let mut bytes = vec![format];
    bincode::serialize_into(&mut bytes, value)?;
    Ok(bytes)
}

fn decode<T: for<'de> Deserialize<'de>>(format: u8, what: &str, bytes: &[u8]) -> Result<T> {
    match bytes.split_first() {
        Some((&found, body)) if found == format => Ok(bincode::deserialize(body)?),
        Some((&found, _)) => Err(LedgerError::Serialization(format!(
            "{}: unsupported format 0x{:02x}",
            what, found
        ))),
        None => Err(LedgerError::Serialization(format!("{}: empty value", what))),
    }
}
