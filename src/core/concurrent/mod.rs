//! Thread-safe implementations of the ledger components
//!
//! - **ConcurrentLedger**: the marketplace ledger behind `&self`, using DashMap
//!   for product and order storage
//! - **BatchProcessor**: applies batches of commands, running purchases of
//!   different products in parallel tokio tasks

pub mod batch_processor;
pub mod ledger;

pub use batch_processor::{BatchProcessor, CommandRun, ProcessingResult};
pub use ledger::ConcurrentLedger;
