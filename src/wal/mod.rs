//! Write-Ahead Log (WAL) Module
//!
//! The ledger's only durable file. Every state write is framed, checksummed
//! and appended here before it reaches the in-memory state; opening the ledger
//! replays the file from the start.
//!
//! ## Frame Layout
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────────────────────────┐
//! │ lsn u64  │ crc u32  │ len u32  │ bincode(operation, ts)       │
//! │ LE       │ LE       │ LE       │ len bytes                    │
//! └──────────┴──────────┴──────────┴──────────────────────────────┘
//! ```
//! The CRC covers the LSN and the data. A frame that is short or fails its
//! checksum ends the valid log; recovery cuts the file back to the last good
//! frame. Compaction replaces the file with one `Put` per live key.

mod entry;
mod reader;
mod recovery;
mod writer;

pub use entry::{Operation, WalEntry, HEADER_SIZE};
pub use reader::{WalIterator, WalReader};
pub use recovery::{RecoveryResult, WalRecovery};
pub use writer::WalWriter;
