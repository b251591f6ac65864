//! Tests for the Row Codec
//!
//! These tests verify:
//! - Field lists keep order, count and exact text
//! - Unknown formats and garbage are rejected
//! - Schemas and JSON listings decode to what was stored

use slsledger::table::codec::{
    decode_listing, decode_row, decode_schema, encode_listing, encode_row, encode_schema, ROW_FORMAT,
};
use slsledger::table::{KeyPolicy, Listing, TableSchema};
use slsledger::LedgerError;

fn fields(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// =============================================================================
// Row Encoding
// =============================================================================

#[test]
fn test_row_keeps_field_order() {
    let row = fields(&["3", "1", "Bank of Paper", "250000", "4.75", "36", "Pending"]);

    assert_eq!(decode_row(&encode_row(&row).unwrap()).unwrap(), row);
}

#[test]
fn test_row_text_is_opaque() {
    // Separators, whitespace and empty strings must survive untouched
    let row = fields(&["", "  padded  ", "a,b;c:d", "line\nbreak", "\"quoted\"", "Zürich €"]);

    let decoded = decode_row(&encode_row(&row).unwrap()).unwrap();

    assert_eq!(decoded, row);
    assert_eq!(decoded.len(), 6);
}

#[test]
fn test_empty_row() {
    let decoded = decode_row(&encode_row(&[]).unwrap()).unwrap();

    assert!(decoded.is_empty());
}

#[test]
fn test_row_value_starts_with_format_byte() {
    let bytes = encode_row(&fields(&["1"])).unwrap();

    assert_eq!(bytes[0], ROW_FORMAT);
}

#[test]
fn test_unknown_format_rejected() {
    let mut bytes = encode_row(&fields(&["1", "x"])).unwrap();
    bytes[0] = 0x7F;

    assert!(matches!(decode_row(&bytes), Err(LedgerError::Serialization(_))));
}

#[test]
fn test_empty_value_rejected() {
    assert!(matches!(decode_row(&[]), Err(LedgerError::Serialization(_))));
}

#[test]
fn test_truncated_row_rejected() {
    let bytes = encode_row(&fields(&["a long enough field", "another"])).unwrap();

    assert!(decode_row(&bytes[..bytes.len() - 4]).is_err());
}

// =============================================================================
// Schema Encoding
// =============================================================================

#[test]
fn test_schema_with_composite_key() {
    let schema = TableSchema::new("Shares", &["LoanID", "BankID", "Amount"])
        .with_key(KeyPolicy::Composite(vec![0, 1]));

    assert_eq!(decode_schema(&encode_schema(&schema).unwrap()).unwrap(), schema);
}

// =============================================================================
// Listing Payload
// =============================================================================

#[test]
fn test_listing_is_json() {
    let listing = Listing {
        table: "Accounts".to_string(),
        columns: fields(&["AccountID", "ParticipantKey", "Amount"]),
        rows: vec![fields(&["1", "1", "10000"]), fields(&["2", "2", "50000"])],
    };

    let bytes = encode_listing(&listing).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["table"], "Accounts");
    assert_eq!(json["rows"][1][2], "50000");
    assert_eq!(decode_listing(&bytes).unwrap(), listing);
}

#[test]
fn test_listing_value_lookup() {
    let listing = Listing {
        table: "Loans".to_string(),
        columns: fields(&["LoanID", "Status"]),
        rows: vec![fields(&["1", "Open"])],
    };

    assert_eq!(listing.value(0, "Status"), Some("Open"));
    assert_eq!(listing.value(0, "Missing"), None);
    assert_eq!(listing.value(1, "Status"), None);
}
