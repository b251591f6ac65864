//! Engine Module
//!
//! The durable state store under the ledger tables.
//!
//! ## Responsibilities
//! - Coordinate WAL and MemTable
//! - Serialize writes; reads see every completed write
//! - Crash recovery on startup
//! - Compact the WAL once it grows past the configured threshold

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::memtable::MemTable;
use crate::state::StateStore;
use crate::wal::{Operation, RecoveryResult, WalRecovery, WalWriter};

/// The durable state engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (put/delete/compact): serialized by the WAL mutex, which is
///   held across log append and memtable apply so log order equals apply order
/// - **Reads** (get/scan): MemTable read lock only
///
/// A write is applied to the MemTable before `put`/`delete` returns.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Path of the write-ahead log
    wal_path: PathBuf,

    /// Write-ahead log for durability (exclusive access needed)
    wal: Mutex<WalWriter>,

    /// Complete live state (internal RwLock)
    memtable: MemTable,

    /// What replay found on open
    recovery: RecoveryResult,
}

impl Engine {
    const WAL_FILENAME: &'static str = "wal.log";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Open/create data directory
    /// 2. Recover and replay the WAL if it exists
    /// 3. Reopen the WAL for appends
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        let wal_path = config.data_dir.join(Self::WAL_FILENAME);

        let memtable = MemTable::new();
        let recovery = if wal_path.exists() {
            let (entries, result) = WalRecovery::recover(&wal_path)?;

            for entry in entries {
                match entry.operation {
                    Operation::Put { key, value } => {
                        memtable.put(key, value);
                    }
                    Operation::Delete { key } => {
                        memtable.delete(&key);
                    }
                }
            }

            tracing::info!(
                recovered = result.entries_recovered,
                corrupted = result.entries_corrupted,
                last_lsn = result.last_lsn,
                live_keys = memtable.entry_count(),
                "WAL recovery complete"
            );
            result
        } else {
            RecoveryResult::default()
        };

        let wal = WalWriter::open(&wal_path, config.wal_sync_strategy)?;

        Ok(Self {
            config,
            wal_path,
            wal: Mutex::new(wal),
            memtable,
            recovery,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Get a value by key
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.memtable.get(key))
    }

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Acquire the WAL
    /// 2. Append (durability)
    /// 3. Apply to MemTable
    /// 4. Compact if the log is past its threshold
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut wal = self.wal.lock();

        wal.append(Operation::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        })?;
        self.memtable.put(key.to_vec(), value.to_vec());

        self.maybe_compact(&mut wal)
    }

    /// Delete a key
    ///
    /// Deleting an absent key writes nothing.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        let mut wal = self.wal.lock();

        if !self.memtable.contains(key) {
            return Ok(());
        }

        wal.append(Operation::Delete { key: key.to_vec() })?;
        self.memtable.delete(key);

        self.maybe_compact(&mut wal)
    }

    /// All live entries under `prefix`, in key order
    pub fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(self.memtable.scan_prefix(prefix))
    }

    /// Rewrite the WAL as one `Put` per live key
    pub fn compact(&self) -> Result<()> {
        let mut wal = self.wal.lock();
        self.compact_locked(&mut wal)
    }

    /// Close the engine gracefully, syncing the WAL
    pub fn close(self) -> Result<()> {
        self.wal.lock().sync()
    }

    /// The triggering write is already durable, so a failed compaction is
    /// logged and retried on a later write instead of failing that write.
    fn maybe_compact(&self, wal: &mut WalWriter) -> Result<()> {
        let threshold = self.config.wal_compact_threshold;
        if threshold > 0 && wal.appended_since_rewrite() >= threshold {
            if let Err(e) = self.compact_locked(wal) {
                tracing::warn!(error = %e, "WAL compaction failed");
            }
        }
        Ok(())
    }

    fn compact_locked(&self, wal: &mut WalWriter) -> Result<()> {
        let before = wal.current_lsn() - 1;
        let live = self
            .memtable
            .entries()
            .into_iter()
            .map(|(key, value)| Operation::Put { key, value });
        let after = wal.rewrite(live)?;

        tracing::debug!(before, after, "Compacted WAL");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the WAL path
    pub fn wal_path(&self) -> &Path {
        &self.wal_path
    }

    /// Number of live keys
    pub fn entry_count(&self) -> usize {
        self.memtable.entry_count()
    }

    /// Number of entries currently in the WAL
    pub fn wal_entry_count(&self) -> u64 {
        self.wal.lock().current_lsn() - 1
    }

    /// Statistics from the replay performed by `open`
    pub fn recovery_result(&self) -> &RecoveryResult {
        &self.recovery
    }
}

impl StateStore for Engine {
    fn get_state(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.get(key)
    }

    fn put_state(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.put(key, value)
    }

    fn delete_state(&self, key: &[u8]) -> Result<()> {
        self.delete(key)
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        Engine::scan_prefix(self, prefix)
    }
}
