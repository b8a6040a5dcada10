//! Error types for the marketplace ledger
//!
//! This module defines all error types that can occur while replaying commands
//! against the ledger. Every precondition violation has its own variant so
//! callers can tell failures apart.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **Input Errors**: Malformed CSV rows and command fields
//! - **Ledger Errors**: Invalid listings, unknown ids, double sales, underpayment
//! - **Arithmetic Errors**: Overflow in id allocation or settlement
//!
//! No ledger error is fatal: a failed operation leaves the ledger unchanged.

use super::identity::Identity;
use super::product::ProductId;
use rust_decimal::Decimal;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Collection an id lookup was made against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Product,
    Order,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Product => f.write_str("Product"),
            EntityKind::Order => f.write_str("Order"),
        }
    }
}

/// Flat classification of [`LedgerError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Parse,
    InvalidInput,
    NotFound,
    AlreadySold,
    InsufficientPayment,
    ArithmeticOverflow,
}

/// Main error type for the marketplace ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// File not found at the specified path
    ///
    /// Fatal for a pipeline run: nothing can be replayed.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// The malformed row is skipped and replay continues.
    #[error(
        "CSV parse error{}: {message}",
        line.map(|l| format!(" at line {}", l)).unwrap_or_default()
    )]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// A CSV row could not be turned into a ledger command
    #[error("Invalid command: {message}")]
    InvalidCommand {
        /// What is wrong with the row
        message: String,
    },

    /// Listing parameters rejected
    #[error("Invalid {field}: {reason}")]
    InvalidInput {
        /// Offending field
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// Reference to a product or order id that does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Collection that was searched
        entity: EntityKind,
        /// Requested id
        id: u64,
    },

    /// Purchase attempted on a product that has already been sold
    ///
    /// No order is created and no value moves.
    #[error("Product {product} is already sold")]
    AlreadySold {
        /// Product id
        product: ProductId,
    },

    /// Attached value is below the listed price
    #[error("Insufficient payment for product {product}: price {price}, paid {paid}")]
    InsufficientPayment {
        /// Product id
        product: ProductId,
        /// Listed price
        price: Decimal,
        /// Attached value
        paid: Decimal,
    },

    /// Arithmetic overflow would occur
    ///
    /// The operation is rejected before anything is mutated.
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
    },
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to LedgerError
impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an error for an input file that could not be opened
    ///
    /// A missing file becomes `FileNotFound`, anything else `IoError`.
    pub fn open_failed(path: &Path, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            LedgerError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            LedgerError::IoError {
                message: format!("Failed to open '{}': {}", path.display(), error),
            }
        }
    }

    /// Create an IoError
    pub fn io(message: impl Into<String>) -> Self {
        LedgerError::IoError {
            message: message.into(),
        }
    }

    /// Attach a script line to a row-level error
    ///
    /// Command conversion failures become `ParseError`s at `line`; parse errors
    /// without a position get it filled in. Other errors are returned as is.
    pub fn at_line(self, line: u64) -> Self {
        match self {
            LedgerError::InvalidCommand { message } => LedgerError::ParseError {
                line: Some(line),
                message,
            },
            LedgerError::ParseError {
                line: None,
                message,
            } => LedgerError::ParseError {
                line: Some(line),
                message,
            },
            other => other,
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: &str, reason: &str) -> Self {
        LedgerError::InvalidInput {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a NotFound error for a product id
    pub fn product_not_found(id: ProductId) -> Self {
        LedgerError::NotFound {
            entity: EntityKind::Product,
            id,
        }
    }

    /// Create a NotFound error for an order id
    pub fn order_not_found(id: u64) -> Self {
        LedgerError::NotFound {
            entity: EntityKind::Order,
            id,
        }
    }

    /// Create an AlreadySold error
    pub fn already_sold(product: ProductId) -> Self {
        LedgerError::AlreadySold { product }
    }

    /// Create an InsufficientPayment error
    pub fn insufficient_payment(product: ProductId, price: Decimal, paid: Decimal) -> Self {
        LedgerError::InsufficientPayment {
            product,
            price,
            paid,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }

    /// Create an InvalidCommand error
    pub fn invalid_command(message: impl Into<String>) -> Self {
        LedgerError::InvalidCommand {
            message: message.into(),
        }
    }

    /// Create an ArithmeticOverflow error for a settlement credit to `owner`
    pub fn settlement_overflow(owner: &Identity) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: format!("settlement for {}", owner),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::FileNotFound { .. } | LedgerError::IoError { .. } => ErrorKind::Io,
            LedgerError::ParseError { .. } | LedgerError::InvalidCommand { .. } => {
                ErrorKind::Parse
            }
            LedgerError::InvalidInput { .. } => ErrorKind::InvalidInput,
            LedgerError::NotFound { .. } => ErrorKind::NotFound,
            LedgerError::AlreadySold { .. } => ErrorKind::AlreadySold,
            LedgerError::InsufficientPayment { .. } => ErrorKind::InsufficientPayment,
            LedgerError::ArithmeticOverflow { .. } => ErrorKind::ArithmeticOverflow,
        }
    }
}
