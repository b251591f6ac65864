//! Tests for WAL Reader
//!
//! These tests verify:
//! - Sequential reads and the entry iterator
//! - Torn tails end the stream quietly
//! - Checksum failures surface as errors

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use slsledger::wal::{Operation, WalEntry, WalReader, HEADER_SIZE};
use slsledger::LedgerError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("wal.log");
    (temp_dir, wal_path)
}

fn write_frames(path: &Path, entries: &[WalEntry]) -> Vec<usize> {
    let mut file = File::create(path).unwrap();
    let mut sizes = Vec::new();
    for entry in entries {
        let bytes = entry.serialize().unwrap();
        sizes.push(bytes.len());
        file.write_all(&bytes).unwrap();
    }
    file.sync_all().unwrap();
    sizes
}

fn append_raw(path: &Path, bytes: &[u8]) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(bytes).unwrap();
}

fn put(lsn: u64, key: &str, value: &str) -> WalEntry {
    WalEntry::new(
        lsn,
        Operation::Put {
            key: key.as_bytes().to_vec(),
            value: value.as_bytes().to_vec(),
        },
    )
}

fn ledger_log() -> Vec<WalEntry> {
    vec![
        put(1, "schema/Loans", "v1"),
        put(2, "seq/Loans", "1"),
        put(3, "row/Loans/1", "pending"),
        WalEntry::new(4, Operation::Delete { key: b"row/Loans/1".to_vec() }),
    ]
}

// =============================================================================
// Sequential Reads
// =============================================================================

#[test]
fn test_empty_file_has_no_entries() {
    let (_temp, wal_path) = setup_temp_wal();
    File::create(&wal_path).unwrap();

    let mut reader = WalReader::open(&wal_path).unwrap();

    assert!(reader.next_entry().unwrap().is_none());
    assert_eq!(reader.position(), 0);
}

#[test]
fn test_reads_entries_in_log_order() {
    let (_temp, wal_path) = setup_temp_wal();
    let entries = ledger_log();
    write_frames(&wal_path, &entries);

    let mut reader = WalReader::open(&wal_path).unwrap();
    for original in &entries {
        let entry = reader.next_entry().unwrap().unwrap();
        assert_eq!(&entry, original);
    }
    assert!(reader.next_entry().unwrap().is_none());
}

#[test]
fn test_position_tracks_frame_boundaries() {
    let (_temp, wal_path) = setup_temp_wal();
    let sizes = write_frames(&wal_path, &ledger_log()[..2]);

    let mut reader = WalReader::open(&wal_path).unwrap();
    reader.next_entry().unwrap();
    assert_eq!(reader.position(), sizes[0] as u64);
    reader.next_entry().unwrap();
    assert_eq!(reader.position(), (sizes[0] + sizes[1]) as u64);
}

#[test]
fn test_iterator_collects_all_entries() {
    let (_temp, wal_path) = setup_temp_wal();
    write_frames(&wal_path, &ledger_log());

    let lsns: Vec<u64> = WalReader::open(&wal_path)
        .unwrap()
        .entries()
        .map(|e| e.unwrap().lsn)
        .collect();

    assert_eq!(lsns, vec![1, 2, 3, 4]);
}

// =============================================================================
// Torn Tails
// =============================================================================

#[test]
fn test_partial_header_ends_stream() {
    let (_temp, wal_path) = setup_temp_wal();
    write_frames(&wal_path, &ledger_log()[..2]);
    append_raw(&wal_path, &[0xAB; HEADER_SIZE / 2]);

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert!(reader.next_entry().unwrap().is_some());
    assert!(reader.next_entry().unwrap().is_some());
    assert!(reader.next_entry().unwrap().is_none());
}

#[test]
fn test_partial_body_ends_stream() {
    let (_temp, wal_path) = setup_temp_wal();
    write_frames(&wal_path, &ledger_log()[..1]);

    let torn = put(2, "row/Loans/2", "a value long enough to tear").serialize().unwrap();
    append_raw(&wal_path, &torn[..torn.len() - 5]);

    let entries: Vec<_> = WalReader::open(&wal_path).unwrap().entries().collect();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_ok());
}

#[test]
fn test_oversized_length_treated_as_torn() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut header = [0u8; HEADER_SIZE];
    header[0] = 1;
    header[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
    std::fs::write(&wal_path, header).unwrap();

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert!(reader.next_entry().unwrap().is_none());
}

// =============================================================================
// Corruption
// =============================================================================

#[test]
fn test_corrupt_frame_is_an_error() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut bytes = put(1, "row/Accounts/1", "10000").serialize().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    std::fs::write(&wal_path, &bytes).unwrap();

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert!(matches!(reader.next_entry(), Err(LedgerError::WalCorruption(_))));
}

#[test]
fn test_iterator_stops_after_error() {
    let (_temp, wal_path) = setup_temp_wal();
    let entries = ledger_log();
    write_frames(&wal_path, &entries[..1]);

    let mut bad = entries[1].serialize().unwrap();
    bad[HEADER_SIZE] ^= 0xFF;
    append_raw(&wal_path, &bad);
    append_raw(&wal_path, &entries[2].serialize().unwrap());

    let results: Vec<_> = WalReader::open(&wal_path).unwrap().entries().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}
