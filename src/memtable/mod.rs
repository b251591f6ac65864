//! MemTable Module
//!
//! In-memory ordered state for the ledger.
//!
//! ## Responsibilities
//! - Fast reads and writes in memory
//! - Single-writer/multi-reader access pattern
//! - Ordered prefix scans (a table's rows share a key prefix)
//! - Size tracking for diagnostics
//!
//! ## Data Structure Choice
//! BTreeMap wrapped in RwLock:
//! - Ordered keys make a table scan a contiguous range
//! - A delete removes the key outright; there is no lower level to shadow

mod table;

pub use table::MemTable;
