//! Core trait for the marketplace ledger operations
//!
//! This module defines the operation set both ledger implementations expose,
//! so callers and tests can drive the single-writer `Ledger` and the
//! thread-safe `ConcurrentLedger` interchangeably.

use crate::types::{
    Account, Identity, LedgerCommand, LedgerError, Order, OrderId, Product, ProductId,
};
use rust_decimal::Decimal;
use tracing::info;

/// Result of a successfully applied command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A listing created this product
    Listed(ProductId),

    /// A purchase created this order
    Purchased(OrderId),
}

/// Owned copy of the whole ledger state
///
/// Products and orders are in id order, accounts sorted by owner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSnapshot {
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub accounts: Vec<Account>,
}

/// The marketplace ledger operations
///
/// Every mutating operation is an indivisible transition: on error the ledger
/// is left exactly as it was.
pub trait Marketplace {
    /// List a product for sale, `caller` becomes the seller
    ///
    /// # Errors
    ///
    /// * `InvalidInput` - empty title/description or negative price
    /// * `ArithmeticOverflow` - id space exhausted
    fn list_product(
        &mut self,
        title: &str,
        description: &str,
        price: Decimal,
        caller: &Identity,
    ) -> Result<ProductId, LedgerError>;

    /// Buy a product, `caller` becomes the buyer
    ///
    /// Preconditions are checked in order and the first failure wins.
    ///
    /// # Errors
    ///
    /// * `NotFound` - no product with this id
    /// * `AlreadySold` - the product has been bought before
    /// * `InsufficientPayment` - `paid` is below the listed price
    /// * `ArithmeticOverflow` - id space or a settlement balance exhausted
    fn buy_product(
        &mut self,
        product_id: ProductId,
        paid: Decimal,
        caller: &Identity,
    ) -> Result<OrderId, LedgerError>;

    /// Number of products ever listed, also the latest product id
    fn get_product_count(&self) -> u64;

    /// Number of orders ever created, also the latest order id
    fn get_order_count(&self) -> u64;

    /// Look up a product; `NotFound` unless `1 <= id <= get_product_count()`
    fn get_product(&self, id: ProductId) -> Result<Product, LedgerError>;

    /// Look up an order; `NotFound` unless `1 <= id <= get_order_count()`
    fn get_order(&self, id: OrderId) -> Result<Order, LedgerError>;

    /// Settlement account of an identity
    fn get_account(&self, owner: &Identity) -> Option<Account>;

    /// Copy out the full ledger state
    fn snapshot(&self) -> LedgerSnapshot;

    /// Apply a command and log its result
    fn apply(&mut self, command: LedgerCommand) -> Result<CommandOutcome, LedgerError> {
        let result = match &command {
            LedgerCommand::List {
                caller,
                title,
                description,
                price,
            } => self
                .list_product(title, description, *price, caller)
                .map(CommandOutcome::Listed),
            LedgerCommand::Buy {
                caller,
                product,
                paid,
            } => self
                .buy_product(*product, *paid, caller)
                .map(CommandOutcome::Purchased),
        };
        log_result(&command, &result);
        result
    }
}

/// Small helper to log `apply` results
pub fn log_result(command: &LedgerCommand, result: &Result<CommandOutcome, LedgerError>) {
    let op = command.op();
    let caller = command.caller();
    let amount = command.amount();
    match (result, command) {
        (Ok(CommandOutcome::Listed(product)), _) => {
            info!(product = %product, caller = %caller, amount = %amount, "{op} applied");
        }
        (Ok(CommandOutcome::Purchased(order)), LedgerCommand::Buy { product, .. }) => {
            info!(
                product = %product,
                order = %order,
                caller = %caller,
                amount = %amount,
                "{op} applied"
            );
        }
        (Ok(CommandOutcome::Purchased(order)), _) => {
            info!(order = %order, caller = %caller, amount = %amount, "{op} applied");
        }
        (Err(e), LedgerCommand::Buy { product, .. }) => {
            info!(
                product = %product,
                caller = %caller,
                amount = %amount,
                reason = %e,
                "{op} skipped"
            );
        }
        (Err(e), LedgerCommand::List { .. }) => {
            info!(caller = %caller, amount = %amount, reason = %e, "{op} skipped");
        }
    }
}
