//! Ledger command types
//!
//! A command is one call made by the orchestration layer: a listing or a
//! purchase, carrying the caller identity supplied by the environment.

use super::identity::Identity;
use super::product::ProductId;
use rust_decimal::Decimal;
use std::fmt;

/// Mutating operations the ledger accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    /// Put a new product up for sale
    List,

    /// Purchase an existing product
    Buy,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationType::List => f.write_str("list"),
            OperationType::Buy => f.write_str("buy"),
        }
    }
}

/// One mutating call against the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCommand {
    /// List a product; `caller` becomes the seller
    List {
        caller: Identity,
        title: String,
        description: String,
        price: Decimal,
    },

    /// Buy a product; `caller` becomes the buyer and `paid` is the attached value
    Buy {
        caller: Identity,
        product: ProductId,
        paid: Decimal,
    },
}

impl LedgerCommand {
    pub fn op(&self) -> OperationType {
        match self {
            LedgerCommand::List { .. } => OperationType::List,
            LedgerCommand::Buy { .. } => OperationType::Buy,
        }
    }

    pub fn caller(&self) -> &Identity {
        match self {
            LedgerCommand::List { caller, .. } | LedgerCommand::Buy { caller, .. } => caller,
        }
    }

    /// Value carried by the command: the price of a listing, the payment of a purchase
    pub fn amount(&self) -> Decimal {
        match self {
            LedgerCommand::List { price, .. } => *price,
            LedgerCommand::Buy { paid, .. } => *paid,
        }
    }
}
