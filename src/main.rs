//! Marketplace Ledger CLI
//!
//! Replays a command script of listings and purchases through the ledger.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- script.csv > products.csv
//! cargo run -- --strategy concurrent --batch-size 500 --workers 4 script.csv > products.csv
//! cargo run -- --overpayment retain --orders orders.csv --accounts accounts.csv script.csv
//! RUST_LOG=info cargo run -- script.csv
//! ```
//!
//! The final products are written to stdout. Logs go to stderr, filtered by
//! `RUST_LOG` (default `warn`).
//!
//! # Exit Codes
//!
//! - 0: Success, even if some commands were rejected
//! - 1: Fatal error (input not readable, output not writable, etc.)

use marketplace_ledger::cli::{self, CliArgs, StrategyType};
use marketplace_ledger::core::LedgerSnapshot;
use marketplace_ledger::io::{write_accounts_csv, write_orders_csv, write_products_csv};
use marketplace_ledger::strategy;
use marketplace_ledger::types::LedgerError;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = cli::parse_args();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), LedgerError> {
    let batch_config = match args.strategy {
        StrategyType::Concurrent => Some(args.to_batch_config()),
        StrategyType::Sync => None,
    };
    let strategy =
        strategy::create_strategy(args.strategy, args.to_ledger_config(), batch_config);

    let snapshot = strategy.process(&args.input_file)?;
    write_outputs(&snapshot, args)
}

fn write_outputs(snapshot: &LedgerSnapshot, args: &CliArgs) -> Result<(), LedgerError> {
    let mut stdout = io::stdout().lock();
    write_products_csv(&snapshot.products, &mut stdout)?;

    if let Some(path) = &args.orders_file {
        let mut output = create_output(path)?;
        write_orders_csv(&snapshot.orders, &mut output)?;
    }
    if let Some(path) = &args.accounts_file {
        let mut output = create_output(path)?;
        write_accounts_csv(&snapshot.accounts, &mut output)?;
    }

    Ok(())
}

fn create_output(path: &Path) -> Result<BufWriter<File>, LedgerError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| {
            LedgerError::io(format!("Failed to create file '{}': {}", path.display(), e))
        })
}
