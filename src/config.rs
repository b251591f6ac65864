//! Configuration for slsledger
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a ledger instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     └── wal.log          (write-ahead log, the only durable state)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync WAL
    pub wal_sync_strategy: WalSyncStrategy,

    /// Number of entries appended since the last rewrite after which the
    /// engine rewrites the WAL as one `Put` per live key. 0 disables
    /// automatic compaction.
    pub wal_compact_threshold: u64,

    // -------------------------------------------------------------------------
    // Authorization Configuration
    // -------------------------------------------------------------------------
    /// When false the authorization gate allows every caller
    pub check_permissions: bool,

    /// Identity attribute compared against a row's owning bank
    pub identity_attribute: String,

    // -------------------------------------------------------------------------
    // Ledger Configuration
    // -------------------------------------------------------------------------
    /// Check that rows referenced by a new row exist before inserting it
    pub enforce_references: bool,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy)]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./slsledger_data"),
            wal_sync_strategy: WalSyncStrategy::EveryWrite,
            wal_compact_threshold: 10_000,
            check_permissions: true,
            identity_attribute: "bankId".to_string(),
            enforce_references: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Set the automatic WAL compaction threshold (0 disables)
    pub fn wal_compact_threshold(mut self, entries: u64) -> Self {
        self.config.wal_compact_threshold = entries;
        self
    }

    /// Enable or disable the authorization gate
    pub fn check_permissions(mut self, enabled: bool) -> Self {
        self.config.check_permissions = enabled;
        self
    }

    /// Set the identity attribute used for row ownership checks
    pub fn identity_attribute(mut self, name: impl Into<String>) -> Self {
        self.config.identity_attribute = name.into();
        self
    }

    /// Enable or disable referenced-row checks on insert
    pub fn enforce_references(mut self, enabled: bool) -> Self {
        self.config.enforce_references = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
