//! Thread-safe marketplace ledger
//!
//! This module provides the `ConcurrentLedger`, which applies listings and
//! purchases through `&self` so it can be shared across threads and tokio tasks.
//!
//! # Design
//!
//! Products and orders live in `DashMap`s keyed by id. The published counts are
//! stored in atomics and only advance after the record is inserted, so any id
//! `1..=count` a reader observes is already present. The order count moves
//! only after the settlement and the sold flag are in place.
//!
//! # Locking
//!
//! ```text
//! list_product: listing_gate -> products shard (insert)
//! buy_product:  products shard (entry guard) -> commit
//! ```
//!
//! A purchase holds the exclusive entry guard of its product for the whole
//! transition, which makes the `sold` check and the flip indivisible. The
//! `commit` mutex serializes order id allocation and settlement. Listings never
//! take `commit` and purchases never take `listing_gate`, so there is no lock
//! cycle.
//!
//! # Poisoning
//!
//! Every critical section computes and validates before it mutates, so a
//! poisoned mutex still guards consistent state and is recovered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::warn;

use crate::core::ledger::LedgerConfig;
use crate::core::settlement::SettlementBook;
use crate::core::traits::{log_result, CommandOutcome, LedgerSnapshot, Marketplace};
use crate::types::{
    Account, Identity, LedgerCommand, LedgerError, Order, OrderId, Product, ProductId, Timestamp,
};

/// Marketplace ledger safe to share between threads
///
/// # Thread Safety
///
/// All methods take `&self`. Wrap the ledger in `Arc` to share it across
/// tasks. Purchases of different products proceed in parallel up to the
/// settlement commit; purchases of the same product are serialized by its
/// entry guard and exactly one of them can succeed.
#[derive(Debug, Default)]
pub struct ConcurrentLedger {
    /// Listed products by id
    products: DashMap<ProductId, Product>,

    /// Created orders by id
    orders: DashMap<OrderId, Order>,

    /// Latest published product id
    product_count: AtomicU64,

    /// Latest published order id
    order_count: AtomicU64,

    /// Serializes product id allocation
    listing_gate: Mutex<()>,

    /// Serializes order id allocation and settlement
    commit: Mutex<SettlementBook>,

    /// Logical clock
    clock: AtomicU64,

    config: LedgerConfig,
}

impl ConcurrentLedger {
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
        Self {
            products: DashMap::new(),
            orders: DashMap::new(),
            product_count: AtomicU64::new(0),
            order_count: AtomicU64::new(0),
            listing_gate: Mutex::new(()),
            commit: Mutex::new(SettlementBook::new()),
            clock: AtomicU64::new(0),
            config,
        }
    }

    pub fn config(&self) -> LedgerConfig {
        self.config
    }

    /// Current logical clock value
    pub fn clock(&self) -> Timestamp {
        self.clock.load(Ordering::Acquire)
    }

    /// List a product for sale
    ///
    /// # Arguments
    ///
    /// * `title` - Non-empty product title
    /// * `description` - Non-empty product description
    /// * `price` - Non-negative listed price
    /// * `caller` - Identity of the seller
    ///
    /// # Returns
    ///
    /// * `Ok(ProductId)` - The id assigned to the new product
    /// * `Err(LedgerError::InvalidInput)` - If a listing parameter is rejected
    /// * `Err(LedgerError::ArithmeticOverflow)` - If the id space or clock is exhausted
    pub fn list_product(
        &self,
        title: &str,
        description: &str,
        price: Decimal,
        caller: &Identity,
    ) -> Result<ProductId, LedgerError> {
        Product::validate_listing(title, description, price)?;

        let _gate = lock(&self.listing_gate, "listing");
        let id = self
            .product_count
            .load(Ordering::Acquire)
            .checked_add(1)
            .ok_or_else(|| LedgerError::arithmetic_overflow("product id allocation"))?;
        self.tick()?;

        self.products
            .insert(id, Product::new(id, title, description, price, caller.clone()));
        self.product_count.store(id, Ordering::Release);
        Ok(id)
    }

    /// Buy a product
    ///
    /// Preconditions are checked in order (exists, not sold, payment covers
    /// the price) while holding the product's entry guard. The order, the
    /// settlement and the sold flag are then committed together.
    ///
    /// # Arguments
    ///
    /// * `product_id` - The product to buy
    /// * `paid` - Value attached to the purchase
    /// * `caller` - Identity of the buyer
    ///
    /// # Returns
    ///
    /// * `Ok(OrderId)` - The id of the created order
    /// * `Err(LedgerError::NotFound)` - If no such product is published
    /// * `Err(LedgerError::AlreadySold)` - If the product was bought before
    /// * `Err(LedgerError::InsufficientPayment)` - If `paid` is below the price
    /// * `Err(LedgerError::ArithmeticOverflow)` - If an id, the clock or a balance overflows
    pub fn buy_product(
        &self,
        product_id: ProductId,
        paid: Decimal,
        caller: &Identity,
    ) -> Result<OrderId, LedgerError> {
        if !is_published(product_id, &self.product_count) {
            return Err(LedgerError::product_not_found(product_id));
        }
        let mut product = self
            .products
            .get_mut(&product_id)
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

        let mut book = lock(&self.commit, "commit");
        let prepared = book.prepare(caller, &product.seller, &settlement)?;
        let order_id = self
            .order_count
            .load(Ordering::Acquire)
            .checked_add(1)
            .ok_or_else(|| LedgerError::arithmetic_overflow("order id allocation"))?;
        let timestamp = self.tick()?;

        self.orders.insert(
            order_id,
            Order {
                id: order_id,
                product_id,
                buyer: caller.clone(),
                seller: product.seller.clone(),
                amount_paid: paid,
                timestamp,
            },
        );
        book.commit(prepared);
        product.mark_sold(caller.clone());
        self.order_count.store(order_id, Ordering::Release);
        Ok(order_id)
    }

    pub fn get_product_count(&self) -> u64 {
        self.product_count.load(Ordering::Acquire)
    }

    pub fn get_order_count(&self) -> u64 {
        self.order_count.load(Ordering::Acquire)
    }

    /// Look up a product by id
    ///
    /// Returns a copy; the product may be sold right after this returns.
    pub fn get_product(&self, id: ProductId) -> Result<Product, LedgerError> {
        if !is_published(id, &self.product_count) {
            return Err(LedgerError::product_not_found(id));
        }
        self.products
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LedgerError::product_not_found(id))
    }

    /// Look up an order by id
    pub fn get_order(&self, id: OrderId) -> Result<Order, LedgerError> {
        if !is_published(id, &self.order_count) {
            return Err(LedgerError::order_not_found(id));
        }
        self.orders
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LedgerError::order_not_found(id))
    }

    /// Settlement account of an identity
    pub fn account(&self, owner: &Identity) -> Option<Account> {
        lock(&self.commit, "commit").account(owner).cloned()
    }

    /// All settlement accounts sorted by owner
    pub fn accounts(&self) -> Vec<Account> {
        lock(&self.commit, "commit")
            .accounts()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Copy out the ledger state
    ///
    /// Each collection is read on its own, so the copy is only a consistent
    /// cut when no mutation is in flight.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let products = (1..=self.get_product_count())
            .filter_map(|id| self.products.get(&id).map(|entry| entry.value().clone()))
            .collect();
        let orders = (1..=self.get_order_count())
            .filter_map(|id| self.orders.get(&id).map(|entry| entry.value().clone()))
            .collect();

        LedgerSnapshot {
            products,
            orders,
            accounts: self.accounts(),
        }
    }

    /// Apply a command and log its result
    pub fn apply(&self, command: LedgerCommand) -> Result<CommandOutcome, LedgerError> {
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

    /// Advance the clock, leaving it untouched on overflow
    fn tick(&self) -> Result<Timestamp, LedgerError> {
        self.clock
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |now| now.checked_add(1))
            .map(|previous| previous + 1)
            .map_err(|_| LedgerError::arithmetic_overflow("logical clock"))
    }
}

impl Marketplace for ConcurrentLedger {
    fn list_product(
        &mut self,
        title: &str,
        description: &str,
        price: Decimal,
        caller: &Identity,
    ) -> Result<ProductId, LedgerError> {
        ConcurrentLedger::list_product(self, title, description, price, caller)
    }

    fn buy_product(
        &mut self,
        product_id: ProductId,
        paid: Decimal,
        caller: &Identity,
    ) -> Result<OrderId, LedgerError> {
        ConcurrentLedger::buy_product(self, product_id, paid, caller)
    }

    fn get_product_count(&self) -> u64 {
        ConcurrentLedger::get_product_count(self)
    }

    fn get_order_count(&self) -> u64 {
        ConcurrentLedger::get_order_count(self)
    }

    fn get_product(&self, id: ProductId) -> Result<Product, LedgerError> {
        ConcurrentLedger::get_product(self, id)
    }

    fn get_order(&self, id: OrderId) -> Result<Order, LedgerError> {
        ConcurrentLedger::get_order(self, id)
    }

    fn get_account(&self, owner: &Identity) -> Option<Account> {
        self.account(owner)
    }

    fn snapshot(&self) -> LedgerSnapshot {
        ConcurrentLedger::snapshot(self)
    }
}

fn is_published(id: u64, count: &AtomicU64) -> bool {
    id >= 1 && id <= count.load(Ordering::Acquire)
}

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &'static str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!(lock = name, "recovering poisoned lock");
        poisoned.into_inner()
    })
}
