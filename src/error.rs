//! Error types for slsledger
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using LedgerError
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Unified error type for ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    // -------------------------------------------------------------------------
    // Table Errors
    // -------------------------------------------------------------------------
    #[error("Schema error in {op} on table '{table}': {reason}")]
    Schema {
        op: &'static str,
        table: String,
        reason: String,
    },

    #[error("Incorrect number of arguments in {op} on table '{table}': expected {expected}, got {actual}")]
    Arity {
        op: &'static str,
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate key in {op} on table '{table}': row '{key}' already exists")]
    DuplicateKey {
        op: &'static str,
        table: String,
        key: String,
    },

    #[error("Not found in {op} on table '{table}': no row with key '{key}'")]
    NotFound {
        op: &'static str,
        table: String,
        key: String,
    },

    // -------------------------------------------------------------------------
    // Authorization Errors
    // -------------------------------------------------------------------------
    #[error("Authorization denied: {0}")]
    Auth(String),

    // -------------------------------------------------------------------------
    // Dispatch Errors
    // -------------------------------------------------------------------------
    #[error("Received unknown function invocation: {0}")]
    UnknownCommand(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    #[error("WAL write failed: {0}")]
    WalWrite(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    pub(crate) fn schema(op: &'static str, table: &str, reason: impl Into<String>) -> Self {
        Self::Schema {
            op,
            table: table.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(op: &'static str, table: &str, key: &str) -> Self {
        Self::NotFound {
            op,
            table: table.to_string(),
            key: key.to_string(),
        }
    }

    /// True for errors that mean "the row or table is not there"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<bincode::Error> for LedgerError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
