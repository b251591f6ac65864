//! Table Store
//!
//! CRUD over named, schema-typed row collections on top of a `StateStore`.
//!
//! Nothing is cached: every operation reads the schema and rows from the
//! state store, so a write is visible to the next call and counts are always
//! recomputed.

use crate::error::{LedgerError, Result};
use crate::state::StateStore;
use super::codec::{self, Listing};
use super::key;
use super::schema::{KeyPolicy, TableSchema};

/// Equality filter on one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnFilter<'a> {
    pub column: &'a str,
    pub value: &'a str,
}

impl<'a> ColumnFilter<'a> {
    pub fn new(column: &'a str, value: &'a str) -> Self {
        Self { column, value }
    }
}

/// Table operations over a state store
pub struct TableStore<S> {
    state: S,
}

impl<S: StateStore> TableStore<S> {
    pub fn new(state: S) -> Self {
        Self { state }
    }

    /// The underlying state store
    pub fn state(&self) -> &S {
        &self.state
    }

    // =========================================================================
    // Schema
    // =========================================================================

    /// Register a table keyed by its first column
    pub fn create_table<C: AsRef<str>>(&self, name: &str, columns: &[C]) -> Result<()> {
        self.create_table_with(TableSchema::new(name, columns))
    }

    /// Register a table schema
    ///
    /// Re-registering a table replaces its schema and leaves its rows and id
    /// counter alone. Rows stored under a narrower schema read back with
    /// empty strings in the columns they lack.
    pub fn create_table_with(&self, schema: TableSchema) -> Result<()> {
        schema.validate()?;
        self.state
            .put_state(&key::schema_key(&schema.name), &codec::encode_schema(&schema)?)?;

        tracing::debug!(
            table = %schema.name,
            columns = schema.columns.len(),
            key = ?schema.key,
            "Registered table"
        );
        Ok(())
    }

    /// Registered schema of `table`
    pub fn schema(&self, table: &str) -> Result<TableSchema> {
        self.load_schema("schema", table)
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        Ok(self.state.get_state(&key::schema_key(table))?.is_some())
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Insert a row, returning its key
    ///
    /// `values` holds every column for `Supplied` and `Composite` tables and
    /// every column but the id for `Sequence` tables, whose assigned id is
    /// returned.
    pub fn insert_row(&self, table: &str, values: &[String]) -> Result<String> {
        let op = "insert_row";
        let schema = self.load_schema(op, table)?;

        let expected = schema.input_arity();
        if values.len() != expected {
            return Err(LedgerError::Arity {
                op,
                table: table.to_string(),
                expected,
                actual: values.len(),
            });
        }

        let (row, next_id) = match schema.key {
            KeyPolicy::Sequence => {
                let id = self.current_sequence(table)? + 1;
                let mut row = Vec::with_capacity(schema.columns.len());
                row.push(id.to_string());
                row.extend_from_slice(values);
                (row, Some(id))
            }
            KeyPolicy::Supplied | KeyPolicy::Composite(_) => (values.to_vec(), None),
        };

        let row_key = key::row_key(table, &schema.key_parts(&row));
        let key_string = schema.key_string(&row);
        if self.state.get_state(&row_key)?.is_some() {
            return Err(LedgerError::DuplicateKey {
                op,
                table: table.to_string(),
                key: key_string,
            });
        }

        let encoded = codec::encode_row(&row)?;
        // Counter first: a crash between the two writes leaves a gap, never a reused id
        if let Some(id) = next_id {
            self.state
                .put_state(&key::sequence_key(table), &id.to_be_bytes())?;
        }
        self.state.put_state(&row_key, &encoded)?;

        tracing::debug!(table, key = %key_string, "Inserted row");
        Ok(key_string)
    }

    /// Full row addressed by `key`
    pub fn get_row(&self, table: &str, key: &str) -> Result<Vec<String>> {
        let op = "get_row";
        let schema = self.load_schema(op, table)?;
        self.load_row(op, &schema, key)
    }

    /// One field of the row addressed by `key`
    pub fn get_column_value(&self, table: &str, key: &str, column: &str) -> Result<String> {
        let op = "get_column_value";
        let schema = self.load_schema(op, table)?;
        let index = schema.require_column(op, column)?;

        let mut row = self.load_row(op, &schema, key)?;
        Ok(row.swap_remove(index))
    }

    /// Replace one field of the row addressed by `key`
    ///
    /// Key columns cannot be updated: the row is stored under its key.
    pub fn update_field(&self, table: &str, key: &str, column: &str, value: &str) -> Result<()> {
        let op = "update_field";
        let schema = self.load_schema(op, table)?;
        let index = schema.require_column(op, column)?;
        if schema.is_key_column(index) {
            return Err(LedgerError::schema(
                op,
                table,
                format!("column '{}' is part of the key", column),
            ));
        }

        let mut row = self.load_row(op, &schema, key)?;
        row[index] = value.to_string();

        self.state
            .put_state(&key::row_key(table, &schema.parse_key(key)), &codec::encode_row(&row)?)?;

        tracing::debug!(table, key, column, "Updated field");
        Ok(())
    }

    /// Remove the row addressed by `key`; an absent row is `NotFound`
    pub fn delete_row(&self, table: &str, key: &str) -> Result<()> {
        let op = "delete_row";
        let schema = self.load_schema(op, table)?;

        let row_key = key::row_key(table, &schema.parse_key(key));
        if self.state.get_state(&row_key)?.is_none() {
            return Err(LedgerError::not_found(op, table, key));
        }
        self.state.delete_state(&row_key)?;

        tracing::debug!(table, key, "Deleted row");
        Ok(())
    }

    /// Remove every row matching `filter` (every row when `None`)
    ///
    /// Each removal is its own state write. Returns the number removed.
    pub fn delete_rows_by_column_value(
        &self,
        table: &str,
        filter: Option<ColumnFilter<'_>>,
    ) -> Result<usize> {
        let op = "delete_rows_by_column_value";
        let schema = self.load_schema(op, table)?;
        let matcher = Matcher::new(op, &schema, filter)?;

        let mut removed = 0;
        for (row_key, value) in self.state.scan_prefix(&key::table_prefix(table))? {
            let row = codec::decode_row(&value)?;
            if matcher.matches(&row) {
                self.state.delete_state(&row_key)?;
                removed += 1;
            }
        }

        tracing::debug!(table, removed, "Deleted rows by column value");
        Ok(removed)
    }

    /// Number of rows currently stored
    pub fn count_rows(&self, table: &str) -> Result<usize> {
        self.load_schema("count_rows", table)?;
        Ok(self.state.scan_prefix(&key::table_prefix(table))?.len())
    }

    /// Rows matching `filter` (all rows when `None`), in store order
    pub fn rows(&self, table: &str, filter: Option<ColumnFilter<'_>>) -> Result<Vec<Vec<String>>> {
        let schema = self.load_schema("rows", table)?;
        self.collect_rows("rows", &schema, filter)
    }

    /// Rows matching `filter` as a single JSON listing payload
    pub fn filter_rows(&self, table: &str, filter: Option<ColumnFilter<'_>>) -> Result<Vec<u8>> {
        let op = "filter_rows";
        let schema = self.load_schema(op, table)?;
        let rows = self.collect_rows(op, &schema, filter)?;

        codec::encode_listing(&Listing {
            table: schema.name,
            columns: schema.columns,
            rows,
        })
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn load_schema(&self, op: &'static str, table: &str) -> Result<TableSchema> {
        match self.state.get_state(&key::schema_key(table))? {
            Some(bytes) => codec::decode_schema(&bytes),
            None => Err(LedgerError::schema(op, table, "table does not exist")),
        }
    }

    fn load_row(&self, op: &'static str, schema: &TableSchema, key: &str) -> Result<Vec<String>> {
        let row_key = key::row_key(&schema.name, &schema.parse_key(key));
        match self.state.get_state(&row_key)? {
            Some(bytes) => Ok(fit_row(schema, codec::decode_row(&bytes)?)),
            None => Err(LedgerError::not_found(op, &schema.name, key)),
        }
    }

    fn collect_rows(
        &self,
        op: &'static str,
        schema: &TableSchema,
        filter: Option<ColumnFilter<'_>>,
    ) -> Result<Vec<Vec<String>>> {
        let matcher = Matcher::new(op, schema, filter)?;
        let mut rows = Vec::new();
        for (_, value) in self.state.scan_prefix(&key::table_prefix(&schema.name))? {
            let row = fit_row(schema, codec::decode_row(&value)?);
            if matcher.matches(&row) {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    fn current_sequence(&self, table: &str) -> Result<u64> {
        match self.state.get_state(&key::sequence_key(table))? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    LedgerError::Serialization(format!(
                        "sequence for '{}' has {} bytes, expected 8",
                        table,
                        bytes.len()
                    ))
                })?;
                Ok(u64::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }
}

/// Pad a row written under an earlier, narrower schema to the current width
fn fit_row(schema: &TableSchema, mut row: Vec<String>) -> Vec<String> {
    if row.len() < schema.columns.len() {
        row.resize(schema.columns.len(), String::new());
    }
    row
}

/// Resolved column filter
struct Matcher<'a> {
    target: Option<(usize, &'a str)>,
}

impl<'a> Matcher<'a> {
    fn new(op: &'static str, schema: &TableSchema, filter: Option<ColumnFilter<'a>>) -> Result<Self> {
        let target = match filter {
            Some(f) => Some((schema.require_column(op, f.column)?, f.value)),
            None => None,
        };
        Ok(Self { target })
    }

    fn matches(&self, row: &[String]) -> bool {
        match self.target {
            Some((index, value)) => row.get(index).map(String::as_str) == Some(value),
            None => true,
        }
    }
}
