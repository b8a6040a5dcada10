//! Marketplace Ledger Library
//! # Overview
//!
//! This library provides the transactional core of a marketplace: sellers list
//! products, buyers purchase them, and every purchase produces an immutable
//! order. It ships a single-writer ledger, a thread-safe ledger and a CSV replay
//! pipeline with a sync and a concurrent strategy.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Product, Order, Account, Identity, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::traits`] - The `Marketplace` operation set
//!   - [`core::ledger`] - Single-writer ledger orchestration
//!   - [`core::concurrent`] - Thread-safe ledger and batch processing
//!   - [`core::settlement`] - Settlement accounts and overpayment policy
//! - [`io`] - Command script parsing and CSV output
//! - [`strategy`] - Pluggable replay pipelines
//!
//! # Operations
//!
//! - **list_product**: validate and store a product, the caller becomes its seller
//! - **buy_product**: sell a listed product exactly once, creating an order
//! - **get_product_count** / **get_order_count**: latest assigned ids
//! - **get_product** / **get_order**: lookups that fail with `NotFound` out of range
//!
//! A failed operation never changes the ledger.

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{
    CommandOutcome, ConcurrentLedger, Ledger, LedgerConfig, LedgerSnapshot, Marketplace,
    OverpaymentPolicy,
};
pub use io::{write_accounts_csv, write_orders_csv, write_products_csv};
pub use types::{
    Account, ErrorKind, Identity, LedgerCommand, LedgerError, Order, OrderId, Product, ProductId,
    Timestamp,
};
