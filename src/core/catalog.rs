//! Product storage for the single-writer ledger
//!
//! This module provides the `ProductCatalog`, the append-only collection of
//! listed products. Ids are dense and start at 1, so a product lives at index
//! `id - 1` and the catalog length doubles as the latest assigned id.

use crate::types::{Identity, LedgerError, Product, ProductId};

/// Append-only product collection
#[derive(Debug, Default)]
pub struct ProductCatalog {
    /// Products in id order
    products: Vec<Product>,
}

impl ProductCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        ProductCatalog {
            products: Vec::new(),
        }
    }

    /// Number of products ever listed
    pub fn len(&self) -> u64 {
        self.products.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// The id the next listing will receive
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` once the id space is exhausted.
    pub fn next_id(&self) -> Result<ProductId, LedgerError> {
        self.len()
            .checked_add(1)
            .ok_or_else(|| LedgerError::arithmetic_overflow("product id allocation"))
    }

    /// Append a product allocated with `next_id`
    pub fn push(&mut self, product: Product) {
        debug_assert_eq!(Some(product.id), self.next_id().ok());
        self.products.push(product);
    }

    /// Look up a product by id
    ///
    /// # Returns
    ///
    /// * `Some(&Product)` - If `1 <= id <= len()`
    /// * `None` - Otherwise
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        Self::index(id).and_then(|index| self.products.get(index))
    }

    /// Flip a product to sold
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is out of range and `AlreadySold` if the
    /// product has been sold before. The product is untouched on error.
    pub fn mark_sold(&mut self, id: ProductId, buyer: Identity) -> Result<(), LedgerError> {
        let product = Self::index(id)
            .and_then(|index| self.products.get_mut(index))
            .ok_or_else(|| LedgerError::product_not_found(id))?;
        if product.sold {
            return Err(LedgerError::already_sold(id));
        }
        product.mark_sold(buyer);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> + '_ {
        self.products.iter()
    }

    fn index(id: ProductId) -> Option<usize> {
        usize::try_from(id).ok()?.checked_sub(1)
    }
}
