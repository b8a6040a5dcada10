//! Core business logic module
//!
//! This module contains the marketplace ledger components:
//! - `traits` - The operation set shared by both ledgers
//! - `ledger` - Single-writer ledger orchestration
//! - `catalog` - Product storage
//! - `order_book` - Order storage
//! - `settlement` - Per-identity value accounts and the overpayment policy
//! - `concurrent` - Thread-safe ledger and batch processing

pub mod catalog;
pub mod concurrent;
pub mod ledger;
pub mod order_book;
pub mod settlement;
pub mod traits;

pub use catalog::ProductCatalog;
pub use concurrent::{BatchProcessor, ConcurrentLedger};
pub use ledger::{Ledger, LedgerConfig};
pub use order_book::OrderBook;
pub use settlement::{OverpaymentPolicy, Settlement, SettlementBook};
pub use traits::{CommandOutcome, LedgerSnapshot, Marketplace};
