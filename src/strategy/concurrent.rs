//! Concurrent batch processing strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. The script is read in batches and each batch is
//! applied to a shared `ConcurrentLedger` before the next one is read.
//!
//! # Architecture
//!
//! ```text
//! ConcurrentProcessingStrategy
//!     ├── BatchConfig (batch_size, workers)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (listing runs + product partitioning)
//!     └── ConcurrentLedger (thread-safe ledger)
//! ```
//!
//! # Ordering
//!
//! - Batches are processed sequentially
//! - Listings keep input order, so product ids match the sync strategy
//! - Purchases of one product keep input order, so the same buyer wins
//! - Order ids of purchases of different products in one run may interleave

use crate::core::concurrent::{BatchProcessor, ConcurrentLedger};
use crate::core::{LedgerConfig, LedgerSnapshot};
use crate::io::async_reader::AsyncReader;
use crate::strategy::ProcessingStrategy;
use crate::types::LedgerError;
use std::path::Path;
use std::sync::Arc;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::{debug, warn};

/// Configuration for batch processing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of commands per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            workers: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, workers: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let workers = if workers == 0 {
            warn!(
                workers,
                default = default.workers,
                "invalid worker count, using default"
            );
            default.workers
        } else {
            workers
        };

        Self {
            batch_size,
            workers,
        }
    }
}

/// Concurrent batch processing strategy
///
/// # Thread Safety
///
/// The strategy is Send + Sync; every call to `process` builds its own tokio
/// runtime and its own ledger.
#[derive(Debug, Clone)]
pub struct ConcurrentProcessingStrategy {
    ledger_config: LedgerConfig,
    config: BatchConfig,
}

impl ConcurrentProcessingStrategy {
    /// Create a new ConcurrentProcessingStrategy
    ///
    /// # Arguments
    ///
    /// * `ledger_config` - Behaviour settings for the replayed ledger
    /// * `config` - BatchConfig with batch_size and workers
    pub fn new(ledger_config: LedgerConfig, config: BatchConfig) -> Self {
        Self {
            ledger_config,
            config,
        }
    }
}

impl ProcessingStrategy for ConcurrentProcessingStrategy {
    /// Replay the script through a shared concurrent ledger
    ///
    /// 1. Creates a tokio multi-threaded runtime with `workers` threads
    /// 2. Reads commands in batches with AsyncReader
    /// 3. Applies each batch through the BatchProcessor and waits for it
    /// 4. Returns the final ledger state
    fn process(&self, input_path: &Path) -> Result<LedgerSnapshot, LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.workers)
            .build()
            .map_err(|e| LedgerError::io(format!("Failed to create tokio runtime: {}", e)))?;

        runtime.block_on(async {
            let ledger = Arc::new(ConcurrentLedger::with_config(self.ledger_config));
            let processor = BatchProcessor::new(Arc::clone(&ledger));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| LedgerError::open_failed(input_path, e))?;
            let mut reader = AsyncReader::new(file.compat());
            debug!(
                script = %input_path.display(),
                overpayment = ?ledger.config().overpayment,
                batch_size = self.config.batch_size,
                workers = self.config.workers,
                "replaying script"
            );

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                // Wait for the batch so later batches see its listings
                let results = processor.process_batch(batch).await;
                let failed = results.iter().filter(|r| r.result.is_err()).count();
                debug!(commands = results.len(), failed, "batch applied");
            }

            Ok(ledger.snapshot())
        })
    }
}
