//! Product-related types for the marketplace ledger
//!
//! A product is listed once and can be sold exactly once. Everything except the
//! sold/buyer pair is fixed at listing time.

use super::error::LedgerError;
use super::identity::Identity;
use rust_decimal::Decimal;

/// Product identifier
///
/// Assigned by the ledger, dense and sequential starting at 1.
pub type ProductId = u64;

/// A product listed on the marketplace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Ledger-assigned identifier
    pub id: ProductId,

    /// Short title shown to buyers
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Listed price, never negative
    pub price: Decimal,

    /// Identity that listed the product
    pub seller: Identity,

    /// Whether a purchase has succeeded
    ///
    /// Flips from false to true exactly once, together with `buyer`.
    pub sold: bool,

    /// Identity of the buyer, set by the same transition as `sold`
    pub buyer: Option<Identity>,
}

impl Product {
    /// Create a freshly listed product
    ///
    /// The product starts unsold with no buyer.
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        seller: Identity,
    ) -> Self {
        Product {
            id,
            title: title.into(),
            description: description.into(),
            price,
            seller,
            sold: false,
            buyer: None,
        }
    }

    /// Record the single unsold to sold transition
    ///
    /// Callers check `sold` under the same exclusive borrow before calling this.
    pub(crate) fn mark_sold(&mut self, buyer: Identity) {
        debug_assert!(!self.sold, "product {} sold twice", self.id);
        self.sold = true;
        self.buyer = Some(buyer);
    }

    /// Validate listing parameters
    ///
    /// Title and description must contain something other than whitespace and
    /// the price must not be negative.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidInput` naming the first offending field.
    pub fn validate_listing(
        title: &str,
        description: &str,
        price: Decimal,
    ) -> Result<(), LedgerError> {
        if title.trim().is_empty() {
            return Err(LedgerError::invalid_input("title", "must not be empty"));
        }
        if description.trim().is_empty() {
            return Err(LedgerError::invalid_input("description", "must not be empty"));
        }
        if price < Decimal::ZERO {
            return Err(LedgerError::invalid_input(
                "price",
                &format!("must not be negative, got {}", price),
            ));
        }
        Ok(())
    }
}
