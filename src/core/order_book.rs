//! Order storage for the single-writer ledger
//!
//! Orders are only ever appended. Like products, order ids are dense from 1.

use crate::types::{LedgerError, Order, OrderId};

/// Append-only order collection
#[derive(Debug, Default)]
pub struct OrderBook {
    /// Orders in id order
    orders: Vec<Order>,
}

impl OrderBook {
    pub fn new() -> Self {
        OrderBook { orders: Vec::new() }
    }

    /// Number of orders ever created
    pub fn len(&self) -> u64 {
        self.orders.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// The id the next order will receive
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` once the id space is exhausted.
    pub fn next_id(&self) -> Result<OrderId, LedgerError> {
        self.len()
            .checked_add(1)
            .ok_or_else(|| LedgerError::arithmetic_overflow("order id allocation"))
    }

    /// Append an order allocated with `next_id`
    pub fn push(&mut self, order: Order) {
        debug_assert_eq!(Some(order.id), self.next_id().ok());
        self.orders.push(order);
    }

    /// Look up an order by id, `None` unless `1 <= id <= len()`
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.orders.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> + '_ {
        self.orders.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Identity;
    use rust_decimal::Decimal;

    fn order(id: OrderId, product_id: u64) -> Order {
        Order {
            id,
            product_id,
            buyer: Identity::from("buyer"),
            seller: Identity::from("seller"),
            amount_paid: Decimal::ONE,
            timestamp: id,
        }
    }

    #[test]
    fn test_push_and_get() {
        let mut book = OrderBook::new();
        assert!(book.is_empty());

        book.push(order(1, 5));
        book.push(order(2, 3));

        assert_eq!(book.len(), 2);
        assert_eq!(book.get(1).unwrap().product_id, 5);
        assert_eq!(book.get(2).unwrap().product_id, 3);
        assert_eq!(book.next_id().unwrap(), 3);
    }

    #[test]
    fn test_get_out_of_range() {
        let mut book = OrderBook::new();
        book.push(order(1, 1));

        assert!(book.get(0).is_none());
        assert!(book.get(2).is_none());
    }
}
