//! Settlement account types for the marketplace ledger
//!
//! Every identity that takes part in a purchase gets an account tracking the
//! value it moved through the ledger.

use super::identity::Identity;
use rust_decimal::Decimal;

/// Value moved by one identity
///
/// Across all accounts the ledger keeps `Σ spent == Σ earned + Σ refunded`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// The identity this account belongs to
    pub owner: Identity,

    /// Total value attached to purchases made as a buyer
    pub spent: Decimal,

    /// Total proceeds credited as a seller
    pub earned: Decimal,

    /// Total overpayment returned as a buyer
    ///
    /// Only grows under the refund overpayment policy.
    pub refunded: Decimal,
}

impl Account {
    /// Create an account with zero balances
    ///
    /// # Arguments
    ///
    /// * `owner` - The identity this account belongs to
    pub fn new(owner: Identity) -> Self {
        Account {
            owner,
            spent: Decimal::ZERO,
            earned: Decimal::ZERO,
            refunded: Decimal::ZERO,
        }
    }
}
