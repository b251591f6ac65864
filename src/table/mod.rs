//! Table Module
//!
//! Relational-looking tables mapped onto a key-value state store.
//!
//! ## Layout in the state store
//! ```text
//! [0x02][len][Table]                     → schema (bincode)
//! [0x03][len][Table]                     → last assigned id (u64 BE)
//! [0x01][len][Table][len][key part] ...  → row (bincode field list)
//! ```
//!
//! ## Components
//! - `key`: state keys for rows, schemas and id counters
//! - `codec`: row/schema values and the JSON listing payload
//! - `schema`: column lists and key policies
//! - `store`: create / insert / get / update / delete / count / filter

pub mod codec;
pub mod key;
mod schema;
mod store;

pub use codec::Listing;
pub use schema::{KeyPolicy, TableSchema};
pub use store::{ColumnFilter, TableStore};
