//! Generic entity handler
//!
//! Validates arguments, resolves row ownership and referenced rows, runs the
//! authorization gate, and delegates to the Table Store. Every registry table
//! goes through the same code.

use crate::auth::{AuthGate, IdentityProvider};
use crate::error::{LedgerError, Result};
use crate::state::StateStore;
use crate::table::{ColumnFilter, TableStore};
use super::registry::{EntityDescriptor, Owner, Update};

/// Handler bound to one caller
pub struct EntityHandler<'a, S> {
    pub(crate) store: &'a TableStore<S>,
    pub(crate) gate: &'a AuthGate,
    pub(crate) identity: &'a dyn IdentityProvider,
    pub(crate) enforce_references: bool,
}

impl<'a, S: StateStore> EntityHandler<'a, S> {
    /// `add<Entity>`: insert a row from every column but the id
    ///
    /// Returns the assigned id.
    pub fn add(&self, entity: &EntityDescriptor, args: &[String]) -> Result<String> {
        expect_arity("add", entity.table, entity.columns.len() - 1, args)?;

        if self.enforce_references {
            for reference in entity.references {
                let value = input_value(entity, args, reference.column)?;
                if let Err(e) = self.store.get_row(reference.table, value) {
                    tracing::debug!(
                        table = entity.table,
                        column = reference.column,
                        referenced = reference.table,
                        key = value,
                        "Referenced row missing"
                    );
                    return Err(e);
                }
            }
        }

        if self.gate.is_enabled() {
            self.authorize(entity, |column| input_value(entity, args, column).map(str::to_string))?;
        }

        let id = self.store.insert_row(entity.table, args)?;
        tracing::info!(table = entity.table, id = %id, "Added {}", entity.entity);
        Ok(id)
    }

    /// `update<Entity><Suffix>`: args are `[key, value]`
    pub fn update(&self, entity: &EntityDescriptor, update: &Update, args: &[String]) -> Result<()> {
        expect_arity("update", entity.table, 2, args)?;
        self.update_field(entity, &args[0], update.column, &args[1])
    }

    /// Update one field of an owned row after checking its owner
    pub fn update_field(
        &self,
        entity: &EntityDescriptor,
        key: &str,
        column: &str,
        value: &str,
    ) -> Result<()> {
        if self.gate.is_enabled() {
            self.authorize(entity, |col| self.store.get_column_value(entity.table, key, col))?;
        }
        self.store.update_field(entity.table, key, column, value)
    }

    /// Delete one owned row after checking its owner
    pub fn delete_row(&self, entity: &EntityDescriptor, key: &str) -> Result<()> {
        if self.gate.is_enabled() {
            self.authorize(entity, |col| self.store.get_column_value(entity.table, key, col))?;
        }
        self.store.delete_row(entity.table, key)
    }

    /// Delete every row matching `filter`
    ///
    /// Owners of all matching rows are checked before anything is removed.
    pub fn delete_rows(&self, entity: &EntityDescriptor, filter: Option<ColumnFilter<'_>>) -> Result<usize> {
        if !self.gate.is_enabled() || entity.owner == Owner::Public {
            return self.store.delete_rows_by_column_value(entity.table, filter);
        }

        let rows = self.store.rows(entity.table, filter)?;
        for row in &rows {
            self.authorize(entity, |column| row_value(entity, row, column))?;
        }
        for row in &rows {
            self.store.delete_row(entity.table, &row[0])?;
        }
        Ok(rows.len())
    }

    /// `get<Table>Quantity`
    pub fn quantity(&self, entity: &EntityDescriptor) -> Result<usize> {
        self.store.count_rows(entity.table)
    }

    /// `get<Table>List` / `get<Table>By<Suffix>`
    pub fn list(&self, entity: &EntityDescriptor, filter: Option<ColumnFilter<'_>>) -> Result<Vec<u8>> {
        self.store.filter_rows(entity.table, filter)
    }

    /// Check the caller against the entity's owner rule
    ///
    /// `column_value` reads a column of the row being written (from the add
    /// arguments or from the stored row).
    fn authorize<F>(&self, entity: &EntityDescriptor, column_value: F) -> Result<()>
    where
        F: Fn(&str) -> Result<String>,
    {
        match entity.owner {
            Owner::Public => Ok(()),
            Owner::Column(column) => {
                let owner = column_value(column)?;
                self.gate.check_row_permissions(self.identity, &owner)
            }
            Owner::Via {
                column,
                table,
                owner_column,
            } => {
                let related = column_value(column)?;
                let owner = self.store.get_column_value(table, &related, owner_column)?;
                self.gate.check_row_permissions(self.identity, &owner)
            }
            Owner::Attribute { name, value } => self.gate.check_attribute(self.identity, name, value),
        }
    }
}

pub(crate) fn expect_arity(op: &'static str, table: &str, expected: usize, args: &[String]) -> Result<()> {
    if args.len() != expected {
        return Err(LedgerError::Arity {
            op,
            table: table.to_string(),
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

fn row_value(entity: &EntityDescriptor, row: &[String], column: &str) -> Result<String> {
    entity
        .columns
        .iter()
        .position(|c| *c == column)
        .and_then(|i| row.get(i))
        .cloned()
        .ok_or_else(|| LedgerError::schema("delete", entity.table, format!("unknown column '{}'", column)))
}

fn input_value<'v>(entity: &EntityDescriptor, args: &'v [String], column: &str) -> Result<&'v str> {
    entity
        .input_index(column)
        .and_then(|i| args.get(i))
        .map(String::as_str)
        .ok_or_else(|| LedgerError::schema("add", entity.table, format!("unknown column '{}'", column)))
}
