//! Ledger Module
//!
//! The dispatch surface of the loan-syndication ledger: a command name and a
//! flat argument vector in, a byte payload out.
//!
//! ## Commands
//! - invoke: `init`, `add<Entity>`, `update<Entity><Suffix>`,
//!   `updateTableField`, `deleteRow`, `deleteRowsByColumnValue`
//! - query: `get<Table>Quantity`, `get<Table>List`, `get<Table>By<Suffix>`,
//!   `countTableRows`, `filterTableByValue`, `getTableColValueByKey`
//!
//! Counts are returned as decimal text, listings as the JSON `Listing`
//! payload, single values as their text.

mod command;
mod handler;
pub mod registry;

use crate::auth::{AuthGate, IdentityProvider};
use crate::config::Config;
use crate::engine::Engine;
use crate::error::{LedgerError, Result};
use crate::state::StateStore;
use crate::table::{ColumnFilter, TableStore};

pub use command::{Command, CommandKind};
pub use handler::EntityHandler;
use handler::expect_arity;
use registry::{ACCOUNTS, PARTICIPANTS, REGISTRY};

/// Participants seeded by `init`: name, type
const SEED_PARTICIPANTS: &[(&str, &str)] = &[
    ("Bank of Associates & Companies LTD", "Bank"),
    ("Connected Colaborators Bank", "Bank"),
    ("Bank of Paper, Wilson & Bluemine LTD", "Bank"),
    ("Bill Gates", "Borrower"),
    ("Peter Froystad", "Borrower"),
    ("John Smith", "Lawyer"),
];

/// Accounts seeded by `init`: participant key, amount
const SEED_ACCOUNTS: &[(&str, &str)] = &[("1", "10000"), ("2", "50000"), ("3", "30000")];

/// Loan-syndication ledger over a state store
pub struct Ledger<S> {
    store: TableStore<S>,
    gate: AuthGate,
    enforce_references: bool,
}

impl Ledger<Engine> {
    /// Open a durable ledger in `config.data_dir`
    pub fn open(config: Config) -> Result<Self> {
        let engine = Engine::open(config.clone())?;
        Ok(Self::new(engine, &config))
    }
}

impl<S: StateStore> Ledger<S> {
    pub fn new(state: S, config: &Config) -> Self {
        Self {
            store: TableStore::new(state),
            gate: AuthGate::from_config(config),
            enforce_references: config.enforce_references,
        }
    }

    /// The underlying table store
    pub fn store(&self) -> &TableStore<S> {
        &self.store
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    /// Register every table and seed initial data into an empty ledger
    ///
    /// Safe to call again: schemas are re-registered, seeding is skipped
    /// once participants exist.
    pub fn init(&self) -> Result<()> {
        for entity in REGISTRY {
            self.store.create_table_with(entity.schema())?;
        }

        if self.store.count_rows(PARTICIPANTS)? == 0 {
            for (name, kind) in SEED_PARTICIPANTS {
                self.store
                    .insert_row(PARTICIPANTS, &[name.to_string(), kind.to_string()])?;
            }
            for (participant, amount) in SEED_ACCOUNTS {
                self.store
                    .insert_row(ACCOUNTS, &[participant.to_string(), amount.to_string()])?;
            }
            tracing::info!(
                participants = SEED_PARTICIPANTS.len(),
                accounts = SEED_ACCOUNTS.len(),
                "Seeded initial data"
            );
        }

        tracing::info!(tables = REGISTRY.len(), "Ledger initialized");
        Ok(())
    }

    /// Run a state-changing command
    ///
    /// `add<Entity>` returns the new row's id and `deleteRowsByColumnValue`
    /// the number of rows removed; other commands return nothing.
    pub fn invoke(
        &self,
        identity: &dyn IdentityProvider,
        function: &str,
        args: &[String],
    ) -> Result<Option<Vec<u8>>> {
        tracing::debug!(function, args = args.len(), "invoke");
        let command = Command::resolve(function)?;
        if command.kind() != CommandKind::Invoke {
            return Err(LedgerError::UnknownCommand(format!("{} (is a query)", function)));
        }
        self.execute(identity, command, args)
    }

    /// Run a read-only command
    pub fn query(
        &self,
        identity: &dyn IdentityProvider,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>> {
        tracing::debug!(function, args = args.len(), "query");
        let command = Command::resolve(function)?;
        if command.kind() != CommandKind::Query {
            return Err(LedgerError::UnknownCommand(format!("{} (is an invoke)", function)));
        }
        Ok(self.execute(identity, command, args)?.unwrap_or_default())
    }

    /// Execute a resolved command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(
        &self,
        identity: &dyn IdentityProvider,
        command: Command,
        args: &[String],
    ) -> Result<Option<Vec<u8>>> {
        let handler = self.handler(identity);

        match command {
            Command::Init => {
                self.init()?;
                Ok(None)
            }
            Command::Add(entity) => Ok(Some(handler.add(entity, args)?.into_bytes())),
            Command::Update(entity, update) => {
                handler.update(entity, update, args)?;
                Ok(None)
            }
            Command::Quantity(entity) => Ok(Some(count_payload(handler.quantity(entity)?))),
            Command::List(entity) => Ok(Some(handler.list(entity, None)?)),
            Command::ListBy(entity, filter) => {
                expect_arity("filter", entity.table, 1, args)?;
                let filter = ColumnFilter::new(filter.column, &args[0]);
                Ok(Some(handler.list(entity, Some(filter))?))
            }
            Command::UpdateTableField => {
                expect_arity("updateTableField", table_arg(args), 4, args)?;
                let (table, key, column, value) = (&args[0], &args[1], &args[2], &args[3]);
                match registry::find(table) {
                    Some(entity) => handler.update_field(entity, key, column, value)?,
                    None => self.store.update_field(table, key, column, value)?,
                }
                Ok(None)
            }
            Command::DeleteRow => {
                expect_arity("deleteRow", table_arg(args), 2, args)?;
                let (table, key) = (&args[0], &args[1]);
                match registry::find(table) {
                    Some(entity) => handler.delete_row(entity, key)?,
                    None => self.store.delete_row(table, key)?,
                }
                Ok(None)
            }
            Command::DeleteRowsByColumnValue => {
                let filter = table_filter("deleteRowsByColumnValue", args)?;
                let removed = match registry::find(&args[0]) {
                    Some(entity) => handler.delete_rows(entity, filter)?,
                    None => self.store.delete_rows_by_column_value(&args[0], filter)?,
                };
                Ok(Some(count_payload(removed)))
            }
            Command::CountTableRows => {
                expect_arity("countTableRows", table_arg(args), 1, args)?;
                Ok(Some(count_payload(self.store.count_rows(&args[0])?)))
            }
            Command::FilterTableByValue => {
                let filter = table_filter("filterTableByValue", args)?;
                Ok(Some(self.store.filter_rows(&args[0], filter)?))
            }
            Command::GetTableColValueByKey => {
                expect_arity("getTableColValueByKey", table_arg(args), 3, args)?;
                let value = self.store.get_column_value(&args[0], &args[1], &args[2])?;
                Ok(Some(value.into_bytes()))
            }
        }
    }

    fn handler<'a>(&'a self, identity: &'a dyn IdentityProvider) -> EntityHandler<'a, S> {
        EntityHandler {
            store: &self.store,
            gate: &self.gate,
            identity,
            enforce_references: self.enforce_references,
        }
    }
}

fn count_payload(count: usize) -> Vec<u8> {
    count.to_string().into_bytes()
}

/// Table named by a raw command's first argument, for error messages
fn table_arg(args: &[String]) -> &str {
    args.first().map(String::as_str).unwrap_or("")
}

/// `[table]` or `[table, column, value]`
fn table_filter<'a>(op: &'static str, args: &'a [String]) -> Result<Option<ColumnFilter<'a>>> {
    match args.len() {
        1 => Ok(None),
        3 => Ok(Some(ColumnFilter::new(&args[1], &args[2]))),
        n => Err(LedgerError::Arity {
            op,
            table: table_arg(args).to_string(),
            expected: if n < 3 { 1 } else { 3 },
            actual: n,
        }),
    }
}
