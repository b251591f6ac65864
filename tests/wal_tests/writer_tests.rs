//! Tests for WAL Writer
//!
//! These tests verify:
//! - LSN assignment, including after reopening an existing log
//! - Sync strategies (EveryWrite, EveryNEntries)
//! - Truncation and snapshot rewrite
//! - A failed append leaves numbering untouched

use std::path::PathBuf;

use slsledger::config::WalSyncStrategy;
use slsledger::wal::{Operation, WalReader, WalWriter};
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

fn put(key: &str, value: &str) -> Operation {
    Operation::Put {
        key: key.as_bytes().to_vec(),
        value: value.as_bytes().to_vec(),
    }
}

fn read_back(path: &PathBuf) -> Vec<(u64, Operation)> {
    WalReader::open(path)
        .unwrap()
        .entries()
        .map(|e| {
            let e = e.unwrap();
            (e.lsn, e.operation)
        })
        .collect()
}

// =============================================================================
// LSN Tests
// =============================================================================

#[test]
fn test_lsns_start_at_one_and_increase() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    assert_eq!(writer.current_lsn(), 1);
    assert_eq!(writer.append(put("seq/Loans", "1")).unwrap(), 1);
    assert_eq!(writer.append(put("row/Loans/1", "a")).unwrap(), 2);
    assert_eq!(writer.current_lsn(), 3);
}

#[test]
fn test_reopen_continues_numbering() {
    let (_temp, wal_path) = setup_temp_wal();
    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(put("a", "1")).unwrap();
        writer.append(put("b", "2")).unwrap();
    }

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    assert_eq!(writer.current_lsn(), 3);
    assert_eq!(writer.append(Operation::Delete { key: b"a".to_vec() }).unwrap(), 3);

    let lsns: Vec<u64> = read_back(&wal_path).into_iter().map(|(lsn, _)| lsn).collect();
    assert_eq!(lsns, vec![1, 2, 3]);
}

#[test]
fn test_written_operations_read_back_in_order() {
    let (_temp, wal_path) = setup_temp_wal();
    let ops = vec![
        put("schema/Accounts", "cols"),
        put("row/Accounts/1", "10000"),
        Operation::Delete { key: b"row/Accounts/1".to_vec() },
    ];

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    for op in &ops {
        writer.append(op.clone()).unwrap();
    }

    let read: Vec<Operation> = read_back(&wal_path).into_iter().map(|(_, op)| op).collect();
    assert_eq!(read, ops);
}

// =============================================================================
// Sync Strategy Tests
// =============================================================================

#[test]
fn test_every_write_leaves_nothing_uncommitted() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    for i in 0..5 {
        writer.append(put(&format!("k{}", i), "v")).unwrap();
        assert_eq!(writer.uncommitted_count(), 0);
    }
}

#[test]
fn test_every_n_entries_batches_syncs() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer =
        WalWriter::open(&wal_path, WalSyncStrategy::EveryNEntries { count: 3 }).unwrap();

    writer.append(put("a", "1")).unwrap();
    writer.append(put("b", "2")).unwrap();
    assert_eq!(writer.uncommitted_count(), 2);

    writer.append(put("c", "3")).unwrap();
    assert_eq!(writer.uncommitted_count(), 0);

    writer.append(put("d", "4")).unwrap();
    writer.sync().unwrap();
    assert_eq!(writer.uncommitted_count(), 0);
}

// =============================================================================
// Truncate / Rewrite Tests
// =============================================================================

#[test]
fn test_truncate_empties_log_and_resets_lsn() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    writer.append(put("a", "1")).unwrap();
    writer.append(put("b", "2")).unwrap();

    writer.truncate().unwrap();
    assert_eq!(writer.current_lsn(), 1);
    assert_eq!(std::fs::metadata(&wal_path).unwrap().len(), 0);

    assert_eq!(writer.append(put("c", "3")).unwrap(), 1);
    assert_eq!(read_back(&wal_path), vec![(1, put("c", "3"))]);
}

#[test]
fn test_rewrite_replaces_log_with_snapshot() {
    let (temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    for i in 0..10 {
        writer.append(put("seq/Loans", &i.to_string())).unwrap();
    }

    assert_eq!(writer.appended_since_rewrite(), 10);

    let written = writer.rewrite(vec![put("seq/Loans", "9")]).unwrap();
    assert_eq!(written, 1);
    assert_eq!(writer.current_lsn(), 2);
    assert_eq!(writer.appended_since_rewrite(), 0);
    assert!(!temp.path().join("wal.compact").exists());

    writer.append(put("row/Loans/10", "x")).unwrap();
    assert_eq!(writer.appended_since_rewrite(), 1);
    assert_eq!(
        read_back(&wal_path),
        vec![(1, put("seq/Loans", "9")), (2, put("row/Loans/10", "x"))]
    );
}

#[cfg(target_os = "linux")]
#[test]
fn test_failed_append_keeps_lsn() {
    // Every write to /dev/full fails with ENOSPC
    let path = PathBuf::from("/dev/full");
    let mut writer = WalWriter::open(&path, WalSyncStrategy::EveryWrite).unwrap();

    let err = writer.append(put("a", "1")).unwrap_err();

    assert!(matches!(err, LedgerError::WalWrite(_)));
    assert_eq!(writer.current_lsn(), 1);
    assert_eq!(writer.uncommitted_count(), 0);
}

#[test]
fn test_append_after_reopen_follows_last_frame() {
    let (_temp, wal_path) = setup_temp_wal();
    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(put("a", "1")).unwrap();
        writer.rewrite(vec![put("a", "1"), put("b", "2")]).unwrap();
        writer.append(put("c", "3")).unwrap();
    }

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    writer.append(put("d", "4")).unwrap();

    assert_eq!(
        read_back(&wal_path),
        vec![
            (1, put("a", "1")),
            (2, put("b", "2")),
            (3, put("c", "3")),
            (4, put("d", "4")),
        ]
    );
}

#[test]
fn test_path_accessor() {
    let (_temp, wal_path) = setup_temp_wal();
    let writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    assert_eq!(writer.path(), wal_path.as_path());
}
