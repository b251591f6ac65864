//! Command definitions
//!
//! Resolves a function name from the dispatch surface into a command.

use crate::error::{LedgerError, Result};
use super::registry::{EntityDescriptor, Filter, Update, REGISTRY};

/// Whether a command may change state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Invoke,
    Query,
}

/// A resolved command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Create every table and seed initial data
    Init,

    /// `add<Entity>`
    Add(&'static EntityDescriptor),

    /// `update<Entity><Suffix>`
    Update(&'static EntityDescriptor, &'static Update),

    /// `get<Table>Quantity`
    Quantity(&'static EntityDescriptor),

    /// `get<Table>List`
    List(&'static EntityDescriptor),

    /// `get<Table>By<Suffix>`
    ListBy(&'static EntityDescriptor, &'static Filter),

    // Raw table operations: the table is the first argument
    UpdateTableField,
    DeleteRow,
    DeleteRowsByColumnValue,
    CountTableRows,
    FilterTableByValue,
    GetTableColValueByKey,
}

impl Command {
    /// Look up `function` among the built-in and registry-generated names
    pub fn resolve(function: &str) -> Result<Self> {
        let raw = match function {
            "init" => Some(Command::Init),
            "updateTableField" => Some(Command::UpdateTableField),
            "deleteRow" => Some(Command::DeleteRow),
            "deleteRowsByColumnValue" => Some(Command::DeleteRowsByColumnValue),
            "countTableRows" => Some(Command::CountTableRows),
            "filterTableByValue" => Some(Command::FilterTableByValue),
            "getTableColValueByKey" => Some(Command::GetTableColValueByKey),
            _ => None,
        };
        if let Some(command) = raw {
            return Ok(command);
        }

        REGISTRY
            .iter()
            .find_map(|entity| Self::resolve_entity(entity, function))
            .ok_or_else(|| LedgerError::UnknownCommand(function.to_string()))
    }

    /// Get the command kind
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Init
            | Command::Add(_)
            | Command::Update(..)
            | Command::UpdateTableField
            | Command::DeleteRow
            | Command::DeleteRowsByColumnValue => CommandKind::Invoke,
            Command::Quantity(_)
            | Command::List(_)
            | Command::ListBy(..)
            | Command::CountTableRows
            | Command::FilterTableByValue
            | Command::GetTableColValueByKey => CommandKind::Query,
        }
    }

    fn resolve_entity(entity: &'static EntityDescriptor, function: &str) -> Option<Self> {
        if function == entity.add_command() {
            return Some(Command::Add(entity));
        }
        if function == entity.quantity_command() {
            return Some(Command::Quantity(entity));
        }
        if function == entity.list_command() {
            return Some(Command::List(entity));
        }
        if let Some(update) = entity.updates.iter().find(|u| function == entity.update_command(u)) {
            return Some(Command::Update(entity, update));
        }
        entity
            .filters
            .iter()
            .find(|f| function == entity.filter_command(f))
            .map(|filter| Command::ListBy(entity, filter))
    }
}
