//! WAL Writer
//!
//! Handles appending entries to the WAL file.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::WalSyncStrategy;
use crate::error::{LedgerError, Result};
use super::{Operation, WalEntry, WalReader};

/// Writes entries to the WAL file
pub struct WalWriter {
    path: PathBuf,
    file: File,
    /// Length of the file after the last complete frame
    end: u64,
    /// LSN assigned to the next appended entry
    next_lsn: u64,
    sync_strategy: WalSyncStrategy,
    /// Entries written since the last fsync
    uncommitted: usize,
    /// Entries the log held after its last rewrite
    rewritten: u64,
}

impl WalWriter {
    /// Open or create a WAL file
    ///
    /// An existing log is scanned so numbering continues after its last
    /// valid entry.
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let end = file.metadata()?.len();
        let next_lsn = last_valid_lsn(path)? + 1;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            end,
            next_lsn,
            sync_strategy,
            uncommitted: 0,
            rewritten: 0,
        })
    }

    /// Append an operation to the WAL, returning its LSN
    ///
    /// A failed write cuts the file back to where the frame started, so a
    /// later append never lands behind a torn frame.
    pub fn append(&mut self, operation: Operation) -> Result<u64> {
        let lsn = self.next_lsn;
        let bytes = WalEntry::new(lsn, operation).serialize()?;

        if let Err(e) = self.file.write_all(&bytes) {
            if let Err(rollback) = self.file.set_len(self.end) {
                tracing::warn!(lsn, end = self.end, error = %rollback, "WAL rollback failed");
            }
            return Err(LedgerError::WalWrite(format!("append lsn={}: {}", lsn, e)));
        }
        self.end += bytes.len() as u64;
        self.next_lsn += 1;
        self.uncommitted += 1;

        let due = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.uncommitted >= count,
        };
        if due {
            self.sync()?;
        }

        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        self.uncommitted = 0;
        Ok(())
    }

    /// Discard every entry; numbering restarts at 1
    pub fn truncate(&mut self) -> Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.sync_all()?;
        self.end = 0;
        self.next_lsn = 1;
        self.uncommitted = 0;
        self.rewritten = 0;
        Ok(())
    }

    /// Replace the log with `operations`, renumbered from 1
    ///
    /// The new log is written beside the old one and renamed over it, so a
    /// crash leaves either the old or the new file intact.
    pub fn rewrite<I>(&mut self, operations: I) -> Result<u64>
    where
        I: IntoIterator<Item = Operation>,
    {
        let tmp_path = self.path.with_extension("compact");
        let mut lsn = 0;
        let mut end = 0;
        {
            let mut tmp = File::create(&tmp_path)?;
            for operation in operations {
                lsn += 1;
                let bytes = WalEntry::new(lsn, operation).serialize()?;
                tmp.write_all(&bytes)?;
                end += bytes.len() as u64;
            }
            tmp.sync_all()?;
        }

        fs::rename(&tmp_path, &self.path)?;
        self.file = OpenOptions::new().append(true).open(&self.path)?;
        self.end = end;
        self.next_lsn = lsn + 1;
        self.uncommitted = 0;
        self.rewritten = lsn;
        Ok(lsn)
    }

    /// Get the LSN the next append will receive
    pub fn current_lsn(&self) -> u64 {
        self.next_lsn
    }

    /// Entries appended since the last rewrite (or since open)
    pub fn appended_since_rewrite(&self) -> u64 {
        self.next_lsn - 1 - self.rewritten
    }

    /// Entries appended but not yet fsynced
    pub fn uncommitted_count(&self) -> usize {
        self.uncommitted
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn last_valid_lsn(path: &Path) -> Result<u64> {
    let mut reader = WalReader::open(path)?;
    let mut last = 0;
    // Corruption stops the scan; recovery is responsible for cleaning it up
    while let Ok(Some(entry)) = reader.next_entry() {
        last = entry.lsn;
    }
    Ok(last)
}
