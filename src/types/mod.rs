//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `identity`: Opaque caller identity
//! - `product`: Listed products and their lifecycle
//! - `order`: Completed purchase records
//! - `account`: Per-identity settlement accounts
//! - `command`: Mutating calls replayed against the ledger
//! - `error`: Error types for the marketplace ledger

pub mod account;
pub mod command;
pub mod error;
pub mod identity;
pub mod order;
pub mod product;

pub use account::Account;
pub use command::{LedgerCommand, OperationType};
pub use error::{EntityKind, ErrorKind, LedgerError};
pub use identity::Identity;
pub use order::{Order, OrderId, Timestamp};
pub use product::{Product, ProductId};
