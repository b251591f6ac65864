//! MemTable implementation
//!
//! BTreeMap-based memtable with RwLock for concurrency.

use std::collections::BTreeMap;
use std::ops::Bound;

use parking_lot::RwLock;

use crate::error::Result;
use crate::state::StateStore;

/// Ordered in-memory key-value state
///
/// Also serves as a standalone `StateStore` for tests and for callers that
/// don't need durability.
#[derive(Default)]
pub struct MemTable {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    /// Sum of key and value lengths
    size: usize,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by key (read lock)
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.inner.read().data.get(key).cloned()
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &[u8]) -> bool {
        self.inner.read().data.contains_key(key)
    }

    /// Put a key-value pair (write lock), returns the new size
    pub fn put(&self, key: Vec<u8>, value: Vec<u8>) -> usize {
        let mut inner = self.inner.write();
        let added = key.len() + value.len();
        if let Some(old) = inner.data.insert(key.clone(), value) {
            inner.size -= key.len() + old.len();
        }
        inner.size += added;
        inner.size
    }

    /// Remove a key (write lock), returns the removed value
    pub fn delete(&self, key: &[u8]) -> Option<Vec<u8>> {
        let mut inner = self.inner.write();
        let removed = inner.data.remove(key);
        if let Some(old) = &removed {
            inner.size -= key.len() + old.len();
        }
        removed
    }

    /// All entries whose key starts with `prefix`, in key order
    pub fn scan_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        let inner = self.inner.read();
        inner
            .data
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Snapshot of every entry in key order
    pub fn entries(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        let inner = self.inner.read();
        inner
            .data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Get approximate size in bytes
    pub fn size(&self) -> usize {
        self.inner.read().size
    }

    /// Get entry count
    pub fn entry_count(&self) -> usize {
        self.inner.read().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().data.is_empty()
    }

    /// Clear all entries
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.data.clear();
        inner.size = 0;
    }
}

impl StateStore for MemTable {
    fn get_state(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.get(key))
    }

    fn put_state(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.put(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete_state(&self, key: &[u8]) -> Result<()> {
        self.delete(key);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(MemTable::scan_prefix(self, prefix))
    }
}
