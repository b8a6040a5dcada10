//! Settlement of purchase value
//!
//! This module provides the `SettlementBook` which tracks, per identity, the
//! value moved by purchases, and the `OverpaymentPolicy` that decides who keeps
//! any excess above the listed price.
//!
//! Settlement is split in two steps so a purchase can stay all-or-nothing:
//! - `prepare` computes every new account state with checked arithmetic and
//!   may fail without touching anything
//! - `commit` installs the prepared states and cannot fail

use crate::types::{Account, Identity, LedgerError};
use clap::ValueEnum;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// What happens to value paid above the listed price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OverpaymentPolicy {
    /// Seller receives the price, the excess goes back to the buyer
    #[default]
    Refund,

    /// Seller keeps everything the buyer attached
    Retain,
}

/// How the value attached to one purchase is split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// Value attached by the buyer
    pub paid: Decimal,

    /// Value credited to the seller
    pub seller_proceeds: Decimal,

    /// Value returned to the buyer
    pub buyer_refund: Decimal,
}

impl OverpaymentPolicy {
    /// Split `paid` for a product listed at `price`
    ///
    /// Callers have already checked `paid >= price`.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the excess cannot be represented.
    pub fn settle(self, price: Decimal, paid: Decimal) -> Result<Settlement, LedgerError> {
        match self {
            OverpaymentPolicy::Refund => {
                let buyer_refund = paid
                    .checked_sub(price)
                    .ok_or_else(|| LedgerError::arithmetic_overflow("overpayment refund"))?;
                Ok(Settlement {
                    paid,
                    seller_proceeds: price,
                    buyer_refund,
                })
            }
            OverpaymentPolicy::Retain => Ok(Settlement {
                paid,
                seller_proceeds: paid,
                buyer_refund: Decimal::ZERO,
            }),
        }
    }
}

/// Account states computed by [`SettlementBook::prepare`], ready to commit
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSettlement {
    updates: Vec<Account>,
}

/// Per-identity settlement accounts
///
/// Accounts are created on first involvement in a purchase.
#[derive(Debug, Default)]
pub struct SettlementBook {
    /// Map of identity to account state
    accounts: HashMap<Identity, Account>,
}

impl SettlementBook {
    /// Create a settlement book with no accounts
    pub fn new() -> Self {
        SettlementBook {
            accounts: HashMap::new(),
        }
    }

    /// Get the account of an identity, if it ever took part in a purchase
    pub fn account(&self, owner: &Identity) -> Option<&Account> {
        self.accounts.get(owner)
    }

    /// Get all accounts sorted by owner
    ///
    /// Sorting gives deterministic output for CSV generation.
    pub fn accounts(&self) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self.accounts.values().collect();
        accounts.sort_by(|a, b| a.owner.cmp(&b.owner));
        accounts
    }

    /// Compute the account states after settling one purchase
    ///
    /// The buyer is debited `paid` and credited the refund; the seller is
    /// credited the proceeds. A buyer purchasing their own listing gets both
    /// sides applied to a single account.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if any balance would overflow. Nothing is
    /// mutated in either case.
    pub fn prepare(
        &self,
        buyer: &Identity,
        seller: &Identity,
        settlement: &Settlement,
    ) -> Result<PreparedSettlement, LedgerError> {
        let mut buyer_account = self.snapshot(buyer);
        buyer_account.spent = buyer_account
            .spent
            .checked_add(settlement.paid)
            .ok_or_else(|| LedgerError::settlement_overflow(buyer))?;
        buyer_account.refunded = buyer_account
            .refunded
            .checked_add(settlement.buyer_refund)
            .ok_or_else(|| LedgerError::settlement_overflow(buyer))?;

        if buyer == seller {
            buyer_account.earned = buyer_account
                .earned
                .checked_add(settlement.seller_proceeds)
                .ok_or_else(|| LedgerError::settlement_overflow(seller))?;
            return Ok(PreparedSettlement {
                updates: vec![buyer_account],
            });
        }

        let mut seller_account = self.snapshot(seller);
        seller_account.earned = seller_account
            .earned
            .checked_add(settlement.seller_proceeds)
            .ok_or_else(|| LedgerError::settlement_overflow(seller))?;

        Ok(PreparedSettlement {
            updates: vec![buyer_account, seller_account],
        })
    }

    /// Install account states computed by `prepare`
    pub fn commit(&mut self, prepared: PreparedSettlement) {
        for account in prepared.updates {
            self.accounts.insert(account.owner.clone(), account);
        }
    }

    fn snapshot(&self, owner: &Identity) -> Account {
        self.accounts
            .get(owner)
            .cloned()
            .unwrap_or_else(|| Account::new(owner.clone()))
    }
}
