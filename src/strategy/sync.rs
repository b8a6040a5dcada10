//! Synchronous processing strategy
//!
//! This module provides a single-threaded implementation of the
//! ProcessingStrategy trait. It streams rows from `SyncReader` into a `Ledger`
//! one at a time, so memory use is bounded by the ledger itself, not by the
//! script length.

use crate::core::{Ledger, LedgerConfig, LedgerSnapshot, Marketplace};
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use crate::types::LedgerError;
use std::path::Path;
use tracing::{debug, warn};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use marketplace_ledger::core::LedgerConfig;
/// use marketplace_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
///
/// let strategy = SyncProcessingStrategy::new(LedgerConfig::default());
/// let snapshot = strategy.process(Path::new("script.csv")).expect("Processing failed");
/// println!("{} products listed", snapshot.products.len());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncProcessingStrategy {
    ledger_config: LedgerConfig,
}

impl SyncProcessingStrategy {
    pub fn new(ledger_config: LedgerConfig) -> Self {
        Self { ledger_config }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Replay the script through a single-writer ledger
    ///
    /// Fatal errors (file not found) are returned immediately. Malformed rows
    /// are logged with `warn!` and rejected operations are logged by the
    /// ledger; processing continues with the next row in both cases.
    fn process(&self, input_path: &Path) -> Result<LedgerSnapshot, LedgerError> {
        let mut ledger = Ledger::with_config(self.ledger_config);
        let reader = SyncReader::new(input_path)?;
        debug!(
            script = %input_path.display(),
            overpayment = ?ledger.config().overpayment,
            "replaying script"
        );

        for result in reader {
            match result {
                Ok(command) => {
                    // Failures are logged by apply and leave the ledger unchanged
                    let _ = ledger.apply(command);
                }
                Err(e) => warn!(reason = %e, "skipping malformed row"),
            }
        }

        Ok(ledger.snapshot())
    }
}
