//! Single-writer marketplace ledger
//!
//! This module provides the `Ledger` that applies listings and purchases by
//! coordinating the `ProductCatalog`, the `OrderBook` and the
//! `SettlementBook`.
//!
//! The ledger enforces the marketplace rules:
//! - Listings must carry a non-empty title and description and a non-negative price
//! - A product is sold at most once
//! - The attached value must cover the listed price
//!
//! Every check and every checked computation happens before the first
//! mutation, so a failed operation leaves the ledger untouched.

use crate::core::catalog::ProductCatalog;
use crate::core::order_book::OrderBook;
use crate::core::settlement::{OverpaymentPolicy, SettlementBook};
use crate::core::traits::{LedgerSnapshot, Marketplace};
use crate::types::{Account, Identity, LedgerError, Order, OrderId, Product, ProductId, Timestamp};
use rust_decimal::Decimal;

/// Ledger behaviour settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Who keeps value paid above the listed price
    pub overpayment: OverpaymentPolicy,
}

/// Marketplace ledger for a single writer
///
/// Mutations take `&mut self`, so the borrow checker serializes them.
#[derive(Debug, Default)]
pub struct Ledger {
    catalog: ProductCatalog,
    order_book: OrderBook,
    settlement: SettlementBook,
    config: LedgerConfig,
    /// Logical clock, the value of the latest committed mutation
    clock: Timestamp,
}

impl Ledger {
    /// Create an empty ledger with the default configuration
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// Create an empty ledger
    ///
    /// # Arguments
    ///
    /// * `config` - Ledger behaviour settings
    pub fn with_config(config: LedgerConfig) -> Self {
        Ledger {
            catalog: ProductCatalog::new(),
            order_book: OrderBook::new(),
            settlement: SettlementBook::new(),
            config,
            clock: 0,
        }
    }

    pub fn config(&self) -> LedgerConfig {
        self.config
    }

    /// Current logical clock value
    pub fn clock(&self) -> Timestamp {
        self.clock
    }

    /// Settlement account of an identity
    pub fn account(&self, owner: &Identity) -> Option<&Account> {
        self.settlement.account(owner)
    }

    /// All settlement accounts sorted by owner
    pub fn accounts(&self) -> Vec<&Account> {
        self.settlement.accounts()
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> + '_ {
        self.catalog.iter()
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> + '_ {
        self.order_book.iter()
    }

    fn next_tick(&self) -> Result<Timestamp, LedgerError> {
        self.clock
            .checked_add(1)
            .ok_or_else(|| LedgerError::arithmetic_overflow("logical clock"))
    }
}

impl Marketplace for Ledger {
    fn list_product(
        &mut self,
        title: &str,
        description: &str,
        price: Decimal,
        caller: &Identity,
    ) -> Result<ProductId, LedgerError> {
        Product::validate_listing(title, description, price)?;
        let id = self.catalog.next_id()?;
        let tick = self.next_tick()?;

        self.catalog
            .push(Product::new(id, title, description, price, caller.clone()));
        self.clock = tick;
        Ok(id)
    }

    fn buy_product(
        &mut self,
        product_id: ProductId,
        paid: Decimal,
        caller: &Identity,
    ) -> Result<OrderId, LedgerError> {
        let product = self
            .catalog
            .get(product_id)
            .ok_or_else(|| LedgerError::product_not_found(product_id))?;
        if product.sold {
            return Err(LedgerError::already_sold(product_id));
        }
        if paid < product.price {
            return Err(LedgerError::insufficient_payment(
                product_id,
                product.price,
                paid,
            ));
        }

        let settlement = self.config.overpayment.settle(product.price, paid)?;
        let prepared = self
            .settlement
            .prepare(caller, &product.seller, &settlement)?;
        let order = Order {
            id: self.order_book.next_id()?,
            product_id,
            buyer: caller.clone(),
            seller: product.seller.clone(),
            amount_paid: paid,
            timestamp: self.next_tick()?,
        };

        // mark_sold cannot fail after the checks above
        self.catalog.mark_sold(product_id, caller.clone())?;
        self.settlement.commit(prepared);
        self.clock = order.timestamp;
        let id = order.id;
        self.order_book.push(order);
        Ok(id)
    }

    fn get_product_count(&self) -> u64 {
        self.catalog.len()
    }

    fn get_order_count(&self) -> u64 {
        self.order_book.len()
    }

    fn get_product(&self, id: ProductId) -> Result<Product, LedgerError> {
        self.catalog
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::product_not_found(id))
    }

    fn get_order(&self, id: OrderId) -> Result<Order, LedgerError> {
        self.order_book
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::order_not_found(id))
    }

    fn get_account(&self, owner: &Identity) -> Option<Account> {
        self.settlement.account(owner).cloned()
    }

    fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            products: self.catalog.iter().cloned().collect(),
            orders: self.order_book.iter().cloned().collect(),
            accounts: self.settlement.accounts().into_iter().cloned().collect(),
        }
    }
}
