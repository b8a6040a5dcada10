use crate::core::{LedgerConfig, OverpaymentPolicy};
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Replay a marketplace command script through the ledger
#[derive(Parser, Debug)]
#[command(name = "marketplace-ledger")]
#[command(
    about = "Replay marketplace listings and purchases through the ledger",
    long_about = None
)]
pub struct CliArgs {
    /// Input CSV file path containing ledger commands
    #[arg(value_name = "INPUT", help = "Path to the command script CSV")]
    pub input_file: PathBuf,

    /// Processing strategy to use
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Processing strategy: 'sync' for a single writer or 'concurrent' for batched parallel replay"
    )]
    pub strategy: StrategyType,

    /// Number of commands per batch (concurrent mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of commands per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of runtime worker threads (concurrent mode only)
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Number of worker threads (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// Who keeps value paid above the listed price
    #[arg(
        long = "overpayment",
        value_name = "POLICY",
        value_enum,
        default_value_t = OverpaymentPolicy::Refund,
        help = "Overpayment policy: 'refund' returns the excess to the buyer, 'retain' credits it to the seller"
    )]
    pub overpayment: OverpaymentPolicy,

    /// Optional path for the orders CSV
    #[arg(
        long = "orders",
        value_name = "PATH",
        help = "Also write orders to this CSV file"
    )]
    pub orders_file: Option<PathBuf>,

    /// Optional path for the settlement accounts CSV
    #[arg(
        long = "accounts",
        value_name = "PATH",
        help = "Also write settlement accounts to this CSV file"
    )]
    pub accounts_file: Option<PathBuf>,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Concurrent,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values fall back to the defaults; zero values fall back with a
    /// warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.workers.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.workers.unwrap_or(default.workers),
            )
        } else {
            BatchConfig::default()
        }
    }

    pub fn to_ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            overpayment: self.overpayment,
        }
    }
}
