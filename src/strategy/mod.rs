//! Processing strategy module for command script replay
//!
//! This module defines the Strategy pattern for complete replay pipelines,
//! covering both CSV parsing and ledger application. This allows different
//! implementations (synchronous, concurrent batch) to be selected at runtime.

use crate::cli::StrategyType;
use crate::core::{LedgerConfig, LedgerSnapshot};
use crate::types::LedgerError;
use std::path::Path;

pub mod concurrent;
pub mod sync;

pub use concurrent::{BatchConfig, ConcurrentProcessingStrategy};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete replay pipelines
///
/// Each strategy reads commands from a script, applies them to a fresh ledger
/// and hands back the final ledger state.
pub trait ProcessingStrategy: Send + Sync {
    /// Replay a command script
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the command script CSV
    ///
    /// # Returns
    ///
    /// * `Ok(LedgerSnapshot)` - Final ledger state, even if some commands failed
    /// * `Err(LedgerError::FileNotFound)` - The script does not exist
    /// * `Err(LedgerError::IoError)` - The script or the runtime could not be set up
    ///
    /// Malformed rows and rejected operations are logged and skipped; they
    /// never cause this method to return an error.
    fn process(&self, input_path: &Path) -> Result<LedgerSnapshot, LedgerError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create
/// * `ledger_config` - Behaviour settings for the replayed ledger
/// * `batch_config` - Optional batching configuration (ignored for sync)
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    ledger_config: LedgerConfig,
    batch_config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(ledger_config)),
        StrategyType::Concurrent => Box::new(ConcurrentProcessingStrategy::new(
            ledger_config,
            batch_config.unwrap_or_default(),
        )),
    }
}
