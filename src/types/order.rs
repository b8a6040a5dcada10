//! Order-related types for the marketplace ledger
//!
//! An order is the immutable record of one completed purchase. Buyer and seller
//! are copied at purchase time so the record stays stable.

use super::identity::Identity;
use super::product::ProductId;
use rust_decimal::Decimal;

/// Order identifier
///
/// Assigned by the ledger, dense and sequential starting at 1.
pub type OrderId = u64;

/// Logical time of a committed ledger transition
pub type Timestamp = u64;

/// Record of one completed purchase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Ledger-assigned identifier
    pub id: OrderId,

    /// The purchased product
    pub product_id: ProductId,

    /// Identity that paid
    pub buyer: Identity,

    /// Identity that listed the product
    pub seller: Identity,

    /// Exact value attached to the purchase, may exceed the listed price
    pub amount_paid: Decimal,

    /// Logical clock value of the purchase
    pub timestamp: Timestamp,
}
