//! Batch processing with product-based partitioning
//!
//! This module provides the `BatchProcessor` struct, which runs batches of ledger
//! commands against a shared `ConcurrentLedger` while preserving the ordering
//! that matters.
//!
//! # Design
//!
//! A batch is cut into runs of consecutive commands of the same kind:
//!
//! ```text
//! list list buy buy buy list buy
//! [Listings ] [Purchases  ] [L] [P]
//! ```
//!
//! Runs execute one after another, so a purchase always sees every listing
//! that precedes it in the input. Listings inside a run execute sequentially to
//! keep product ids in input order. Purchases inside a run are partitioned by
//! product id; each partition runs in its own tokio task, in input order.
//!
//! # Thread Safety
//!
//! The processor is cloneable and shares the ledger through `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use super::ConcurrentLedger;
use crate::core::traits::CommandOutcome;
use crate::types::{LedgerCommand, LedgerError, ProductId};

/// Result of applying a single command
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The command that was applied
    pub command: LedgerCommand,

    /// The outcome of applying it
    pub result: Result<CommandOutcome, LedgerError>,
}

/// Maximal run of consecutive commands of one kind
#[derive(Debug, Clone, PartialEq)]
pub enum CommandRun {
    Listings(Vec<LedgerCommand>),
    Purchases(Vec<LedgerCommand>),
}

/// Batch processor with product-based partitioning
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    /// Shared ledger
    ledger: Arc<ConcurrentLedger>,
}

impl BatchProcessor {
    /// Create a new BatchProcessor
    ///
    /// # Arguments
    ///
    /// * `ledger` - Arc-wrapped ConcurrentLedger the commands are applied to
    pub fn new(ledger: Arc<ConcurrentLedger>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Arc<ConcurrentLedger> {
        &self.ledger
    }

    /// Split a batch into runs of consecutive listings or purchases
    ///
    /// # Guarantees
    ///
    /// - Each command appears in exactly one run
    /// - Runs and the commands inside them keep input order
    /// - Adjacent runs are of different kinds
    pub fn segment(batch: Vec<LedgerCommand>) -> Vec<CommandRun> {
        let mut runs: Vec<CommandRun> = Vec::new();

        for command in batch {
            let is_listing = matches!(command, LedgerCommand::List { .. });
            match runs.last_mut() {
                Some(CommandRun::Listings(run)) if is_listing => run.push(command),
                Some(CommandRun::Purchases(run)) if !is_listing => run.push(command),
                _ if is_listing => runs.push(CommandRun::Listings(vec![command])),
                _ => runs.push(CommandRun::Purchases(vec![command])),
            }
        }

        runs
    }

    /// Partition purchases by product id
    ///
    /// # Returns
    ///
    /// A HashMap of product id to the purchases of that product, in input order.
    /// Listings are never passed here; any that are end up under product 0.
    pub fn partition_by_product(
        commands: Vec<LedgerCommand>,
    ) -> HashMap<ProductId, Vec<LedgerCommand>> {
        let mut product_batches: HashMap<ProductId, Vec<LedgerCommand>> = HashMap::new();

        for command in commands {
            let product = match &command {
                LedgerCommand::Buy { product, .. } => *product,
                LedgerCommand::List { .. } => 0,
            };
            product_batches.entry(product).or_default().push(command);
        }

        product_batches
    }

    /// Apply commands one after another
    ///
    /// Failures are captured in the results and do not stop processing.
    pub fn process_sequential(&self, commands: Vec<LedgerCommand>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(commands.len());

        for command in commands {
            let result = self.ledger.apply(command.clone());
            results.push(ProcessingResult { command, result });
        }

        results
    }

    /// Apply the purchases of a single product in order
    pub async fn process_product_commands(
        &self,
        commands: Vec<LedgerCommand>,
    ) -> Vec<ProcessingResult> {
        self.process_sequential(commands)
    }

    /// Process a batch of commands
    ///
    /// # Returns
    ///
    /// The outcome of every command. Results of a purchase run may be in a
    /// different order than the input due to concurrent processing.
    ///
    /// # Guarantees
    ///
    /// - Listings are applied in input order
    /// - Purchases of the same product are applied in input order
    /// - A command never runs before a command of the other kind preceding it
    /// - All commands are applied, even if some fail
    pub async fn process_batch(&self, batch: Vec<LedgerCommand>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(batch.len());

        for run in Self::segment(batch) {
            match run {
                CommandRun::Listings(commands) => {
                    results.extend(self.process_sequential(commands));
                }
                CommandRun::Purchases(commands) => {
                    results.extend(self.process_purchases(commands).await);
                }
            }
        }

        results
    }

    async fn process_purchases(&self, commands: Vec<LedgerCommand>) -> Vec<ProcessingResult> {
        let mut tasks = Vec::new();
        for (_product, purchases) in Self::partition_by_product(commands) {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_product_commands(purchases).await
            }));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(product_results) => results.extend(product_results),
                Err(e) => warn!(error = %e, "purchase task failed"),
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ErrorKind, Identity};
    use rust_decimal::Decimal;

    fn list(caller: &str, title: &str, price: Decimal) -> LedgerCommand {
        LedgerCommand::List {
            caller: Identity::from(caller),
            title: title.to_string(),
            description: "Description".to_string(),
            price,
        }
    }

    fn buy(caller: &str, product: ProductId, paid: Decimal) -> LedgerCommand {
        LedgerCommand::Buy {
            caller: Identity::from(caller),
            product,
            paid,
        }
    }

    fn processor() -> BatchProcessor {
        BatchProcessor::new(Arc::new(ConcurrentLedger::new()))
    }

    #[test]
    fn test_processor_is_cloneable() {
        let ledger = Arc::new(ConcurrentLedger::new());
        let processor = BatchProcessor::new(Arc::clone(&ledger));

        let _clone = processor.clone();

        assert_eq!(Arc::strong_count(&ledger), 3);
    }

    #[test]
    fn test_segment_empty_batch() {
        assert!(BatchProcessor::segment(vec![]).is_empty());
    }

    #[test]
    fn test_segment_groups_consecutive_kinds() {
        let batch = vec![
            list("s", "a", Decimal::ONE),
            list("s", "b", Decimal::ONE),
            buy("b", 1, Decimal::ONE),
            buy("b", 2, Decimal::ONE),
            list("s", "c", Decimal::ONE),
            buy("b", 3, Decimal::ONE),
        ];

        let runs = BatchProcessor::segment(batch.clone());

        assert_eq!(
            runs,
            vec![
                CommandRun::Listings(batch[0..2].to_vec()),
                CommandRun::Purchases(batch[2..4].to_vec()),
                CommandRun::Listings(batch[4..5].to_vec()),
                CommandRun::Purchases(batch[5..6].to_vec()),
            ]
        );
    }

    #[test]
    fn test_partition_by_product_keeps_order() {
        let batch = vec![
            buy("x", 1, Decimal::ONE),
            buy("y", 2, Decimal::ONE),
            buy("z", 1, Decimal::TWO),
        ];

        let partitioned = BatchProcessor::partition_by_product(batch.clone());

        assert_eq!(partitioned.len(), 2);
        assert_eq!(partitioned[&1], vec![batch[0].clone(), batch[2].clone()]);
        assert_eq!(partitioned[&2], vec![batch[1].clone()]);
    }

    #[tokio::test]
    async fn test_process_batch_lists_before_buying() {
        let processor = processor();
        let batch = vec![
            buy("early", 1, Decimal::TWO),
            list("seller", "Lamp", Decimal::ONE),
            list("seller", "Chair", Decimal::TWO),
            buy("bob", 1, Decimal::TWO),
            buy("carol", 2, Decimal::TWO),
        ];

        let results = processor.process_batch(batch).await;

        assert_eq!(results.len(), 5);
        assert_eq!(
            results[0].result.as_ref().unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(results[1].result, Ok(CommandOutcome::Listed(1)));
        assert_eq!(results[2].result, Ok(CommandOutcome::Listed(2)));

        let ledger = processor.ledger();
        assert_eq!(ledger.get_order_count(), 2);
        assert_eq!(
            ledger.get_product(1).unwrap().buyer,
            Some(Identity::from("bob"))
        );
        assert_eq!(
            ledger.get_product(2).unwrap().buyer,
            Some(Identity::from("carol"))
        );
    }

    #[tokio::test]
    async fn test_first_buyer_in_input_order_wins() {
        let processor = processor();
        processor
            .process_batch(vec![list("seller", "Lamp", Decimal::ONE)])
            .await;

        let results = processor
            .process_batch(vec![
                buy("first", 1, Decimal::ONE),
                buy("second", 1, Decimal::ONE),
                buy("third", 1, Decimal::ONE),
            ])
            .await;

        let sold: Vec<&ProcessingResult> =
            results.iter().filter(|r| r.result.is_err()).collect();
        assert_eq!(sold.len(), 2);
        assert!(sold
            .iter()
            .all(|r| r.result.as_ref().unwrap_err().kind() == ErrorKind::AlreadySold));
        assert_eq!(
            processor.ledger().get_product(1).unwrap().buyer,
            Some(Identity::from("first"))
        );
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_processing() {
        let processor = processor();

        let results = processor
            .process_batch(vec![
                list("seller", "", Decimal::ONE),
                list("seller", "Lamp", Decimal::ONE),
                buy("bob", 1, Decimal::ZERO),
                buy("bob", 1, Decimal::ONE),
            ])
            .await;

        assert_eq!(results.len(), 4);
        assert_eq!(results.iter().filter(|r| r.result.is_ok()).count(), 2);
        assert_eq!(processor.ledger().get_order_count(), 1);
    }
}
