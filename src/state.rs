//! State store seam
//!
//! The table layer talks to the host key-value store only through this
//! trait. Writes must be visible to the very next read on the same store.

use std::sync::Arc;

use crate::error::Result;

/// Byte-oriented key-value store underneath the tables
pub trait StateStore {
    /// Read a key; `Ok(None)` when absent
    fn get_state(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Write a key, replacing any previous value
    fn put_state(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove a key; removing an absent key is not an error
    fn delete_state(&self, key: &[u8]) -> Result<()>;

    /// All entries whose key starts with `prefix`, in store iteration order
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;
}

impl<T: StateStore + ?Sized> StateStore for &T {
    fn get_state(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        (**self).get_state(key)
    }

    fn put_state(&self, key: &[u8], value: &[u8]) -> Result<()> {
        (**self).put_state(key, value)
    }

    fn delete_state(&self, key: &[u8]) -> Result<()> {
        (**self).delete_state(key)
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        (**self).scan_prefix(prefix)
    }
}

impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    fn get_state(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        (**self).get_state(key)
    }

    fn put_state(&self, key: &[u8], value: &[u8]) -> Result<()> {
        (**self).put_state(key, value)
    }

    fn delete_state(&self, key: &[u8]) -> Result<()> {
        (**self).delete_state(key)
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        (**self).scan_prefix(prefix)
    }
}
