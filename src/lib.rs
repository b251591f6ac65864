//! # slsledger
//!
//! Table storage for a syndicated-loan ledger:
//! - Row codec and table-namespaced keys over a flat key-value store
//! - Generic table operations (create, insert, get, update, delete, count, filter)
//! - Ownership-based authorization for mutations
//! - A durable state engine with a write-ahead log and crash recovery
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Ledger (dispatch)                          │
//! │          invoke / query by function name + args              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Entity      │─────────▶│ Auth Gate   │
//!   │ Handler     │          │ (identity)  │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │ Table Store │  codec + keys
//!   └──────┬──────┘
//!          │ StateStore
//!          ▼
//!   ┌─────────────────────────────┐
//!   │           Engine            │
//!   │   WAL (append) + MemTable   │
//!   └─────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod state;

pub mod wal;
pub mod memtable;
pub mod engine;

pub mod table;
pub mod auth;
pub mod ledger;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LedgerError, Result};
pub use config::Config;
pub use state::StateStore;
pub use engine::Engine;
pub use memtable::MemTable;
pub use table::{ColumnFilter, KeyPolicy, Listing, TableSchema, TableStore};
pub use auth::{AuthGate, IdentityProvider, StaticIdentity};
pub use ledger::Ledger;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of slsledger
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
