//! Table schemas
//!
//! A schema is a table name, its ordered column list and the rule that
//! derives each row's key.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use super::key;

/// How a row's key is derived
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyPolicy {
    /// The first column is the key and callers supply it
    Supplied,

    /// The first column is a numeric id assigned on insert from a per-table
    /// counter. Callers supply every other column. Ids start at 1 and are
    /// never reused.
    Sequence,

    /// The key is composed from the listed column positions, in that order
    Composite(Vec<usize>),
}

/// Registered shape of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<String>,
    pub key: KeyPolicy,
}

impl TableSchema {
    /// Schema keyed by its first column, supplied by callers
    pub fn new<S: AsRef<str>>(name: impl Into<String>, columns: &[S]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            key: KeyPolicy::Supplied,
        }
    }

    pub fn with_key(mut self, key: KeyPolicy) -> Self {
        self.key = key;
        self
    }

    /// Reject empty or duplicated column lists and out-of-range key columns
    pub fn validate(&self) -> Result<()> {
        let op = "create_table";
        if self.name.is_empty() {
            return Err(LedgerError::schema(op, &self.name, "table name is empty"));
        }
        if self.columns.is_empty() {
            return Err(LedgerError::schema(op, &self.name, "column list is empty"));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.as_str()) {
                return Err(LedgerError::schema(
                    op,
                    &self.name,
                    format!("duplicate column '{}'", column),
                ));
            }
        }

        if let KeyPolicy::Composite(positions) = &self.key {
            if positions.is_empty() {
                return Err(LedgerError::schema(op, &self.name, "composite key has no columns"));
            }
            let mut used = HashSet::new();
            for &pos in positions {
                if pos >= self.columns.len() || !used.insert(pos) {
                    return Err(LedgerError::schema(
                        op,
                        &self.name,
                        format!("invalid composite key column position {}", pos),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Position of `column`, if the table has it
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Position of `column` or a schema error naming the operation
    pub fn require_column(&self, op: &'static str, column: &str) -> Result<usize> {
        self.column_index(column).ok_or_else(|| {
            LedgerError::schema(op, &self.name, format!("unknown column '{}'", column))
        })
    }

    /// Number of values a caller passes to insert a row
    pub fn input_arity(&self) -> usize {
        match self.key {
            KeyPolicy::Sequence => self.columns.len() - 1,
            KeyPolicy::Supplied | KeyPolicy::Composite(_) => self.columns.len(),
        }
    }

    /// Positions of the key columns
    pub fn key_positions(&self) -> Vec<usize> {
        match &self.key {
            KeyPolicy::Supplied | KeyPolicy::Sequence => vec![0],
            KeyPolicy::Composite(positions) => positions.clone(),
        }
    }

    /// Whether `column` takes part in the key
    pub fn is_key_column(&self, index: usize) -> bool {
        self.key_positions().contains(&index)
    }

    /// The key parts of a full row
    pub fn key_parts<'r>(&self, row: &'r [String]) -> Vec<&'r str> {
        self.key_positions()
            .into_iter()
            .map(|pos| row[pos].as_str())
            .collect()
    }

    /// String form of a full row's key, as callers address it
    pub fn key_string(&self, row: &[String]) -> String {
        match &self.key {
            KeyPolicy::Composite(_) => key::compose_key(&self.key_parts(row)),
            KeyPolicy::Supplied | KeyPolicy::Sequence => row[0].clone(),
        }
    }

    /// Key parts addressed by a caller-supplied key string
    pub fn parse_key(&self, key: &str) -> Vec<String> {
        match &self.key {
            KeyPolicy::Composite(_) => key::split_composite(key),
            KeyPolicy::Supplied | KeyPolicy::Sequence => vec![key.to_string()],
        }
    }
}
