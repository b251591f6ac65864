//! slsledger CLI
//!
//! Runs ledger commands against a local data directory.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use slsledger::auth::{Attribute, StaticIdentity};
use slsledger::wal::WalRecovery;
use slsledger::{Config, Engine, Ledger};
use tracing_subscriber::{fmt, EnvFilter};

/// slsledger CLI
#[derive(Parser, Debug)]
#[command(name = "slsledger-cli")]
#[command(about = "Loan-syndication ledger over a local table store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./slsledger_data")]
    data_dir: String,

    /// Allow every caller (skip ownership checks)
    #[arg(long)]
    no_permissions: bool,

    /// Identity attribute compared against row owners
    #[arg(long, default_value = "bankId")]
    identity_attribute: String,

    /// Caller attribute as name=value (repeatable)
    #[arg(short, long = "attr", value_name = "NAME=VALUE")]
    attrs: Vec<Attribute>,

    /// WAL entries before automatic compaction (0 disables)
    #[arg(long, default_value = "10000")]
    compact_threshold: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create every table and seed initial data
    Init,

    /// Run a state-changing command
    Invoke {
        /// Function name, e.g. addLoanRequest
        function: String,

        /// Positional arguments
        args: Vec<String>,
    },

    /// Run a read-only command
    Query {
        /// Function name, e.g. getLoansList
        function: String,

        /// Positional arguments
        args: Vec<String>,
    },

    /// Rewrite the WAL as a snapshot of live state
    Compact,

    /// Check the WAL without modifying it
    Verify,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,slsledger=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> slsledger::Result<()> {
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .check_permissions(!args.no_permissions)
        .identity_attribute(&args.identity_attribute)
        .wal_compact_threshold(args.compact_threshold)
        .build();

    tracing::debug!(data_dir = %config.data_dir.display(), "slsledger v{}", slsledger::VERSION);
    let identity: StaticIdentity = args.attrs.into_iter().collect();

    match args.command {
        Commands::Verify => {
            let result = WalRecovery::verify(&config.data_dir.join("wal.log"))?;
            println!(
                "entries={} corrupted={} last_lsn={} truncated_tail={}",
                result.entries_recovered, result.entries_corrupted, result.last_lsn, result.was_truncated
            );
        }
        Commands::Init => Ledger::open(config)?.init()?,
        Commands::Invoke { function, args } => {
            let ledger = Ledger::open(config)?;
            if let Some(payload) = ledger.invoke(&identity, &function, &args)? {
                println!("{}", String::from_utf8_lossy(&payload));
            }
        }
        Commands::Query { function, args } => {
            let payload = Ledger::open(config)?.query(&identity, &function, &args)?;
            println!("{}", String::from_utf8_lossy(&payload));
        }
        Commands::Compact => {
            let engine = Engine::open(config)?;
            engine.compact()?;
            tracing::info!(entries = engine.wal_entry_count(), "WAL compacted");
        }
    }

    Ok(())
}
