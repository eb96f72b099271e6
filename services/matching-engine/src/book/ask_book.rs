//! Ask (sell-side) ladder
//!
//! Maintains sell orders sorted by price ascending (best ask first).
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use types::numeric::Price;
use types::order::RestingOrder;

use super::price_level::PriceLevel;

/// Ask (sell) side of a book
///
/// Orders are sorted by price ascending, so the lowest ask is first.
/// At each price level, orders are maintained in FIFO order. Levels are
/// erased in the same transition that empties them.
#[derive(Debug, Clone, Default)]
pub struct AskBook {
    /// Price levels; BTreeMap iterates ascending, best ask is `next`
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
    /// Create a new empty ask ladder
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Insert an order at the tail of its price level
    pub fn insert(&mut self, order: RestingOrder) {
        self.levels
            .entry(order.price)
            .or_insert_with(PriceLevel::new)
            .push_back(order);
    }

    /// Remove an order by id from the level at `price`
    ///
    /// Erases the level if it becomes empty. Returns the removed order.
    pub fn remove(&mut self, order_id: i64, price: Price) -> Option<RestingOrder> {
        let level = self.levels.get_mut(&price)?;
        let removed = level.remove(order_id)?;
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Some(removed)
    }

    /// Get the best ask price (lowest)
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next().copied()
    }

    /// Get mutable access to the best ask level
    pub fn best_level_mut(&mut self) -> Option<(Price, &mut PriceLevel)> {
        self.levels
            .iter_mut()
            .next()
            .map(|(price, level)| (*price, level))
    }

    /// Get a level by price
    pub fn level(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    /// Get mutable access to a level by price
    pub fn level_mut(&mut self, price: Price) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// Erase a level that has become empty
    pub fn remove_level(&mut self, price: Price) {
        debug_assert!(self.levels.get(&price).map_or(true, PriceLevel::is_empty));
        self.levels.remove(&price);
    }

    /// Check if the ladder is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of price levels
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Total resting orders across all levels
    pub fn order_count(&self) -> usize {
        self.levels.values().map(PriceLevel::order_count).sum()
    }

    /// Depth snapshot: top N levels as (price, total quantity), best first
    pub fn depth_snapshot(&self, depth: usize) -> Vec<(Price, u64)> {
        self.levels
            .iter()
            .take(depth)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::order::{OrderAction, OrderEvent, OrderType, Side};

    fn ask(order_id: i64, price: u64, qty: u64) -> RestingOrder {
        RestingOrder::from_event(&OrderEvent {
            timestamp: 1,
            order_id,
            instrument: "ACME".to_string(),
            side: Side::Sell,
            order_type: OrderType::Limit,
            quantity: qty,
            price: Price::from_u64(price),
            action: OrderAction::New,
        })
    }

    #[test]
    fn test_ask_book_best_is_lowest() {
        let mut book = AskBook::new();
        book.insert(ask(1, 100, 10));
        book.insert(ask(2, 101, 20));
        book.insert(ask(3, 99, 15));

        assert_eq!(book.best_price(), Some(Price::from_u64(99)));
    }

    #[test]
    fn test_ask_book_remove_erases_empty_level() {
        let mut book = AskBook::new();
        book.insert(ask(1, 100, 10));

        book.remove(1, Price::from_u64(100)).unwrap();
        assert!(book.is_empty());
        assert_eq!(book.order_count(), 0);
    }

    #[test]
    fn test_ask_book_depth_snapshot_best_first() {
        let mut book = AskBook::new();
        book.insert(ask(1, 100, 10));
        book.insert(ask(2, 102, 20));
        book.insert(ask(3, 101, 5));

        let depth = book.depth_snapshot(2);
        assert_eq!(depth[0], (Price::from_u64(100), 10));
        assert_eq!(depth[1], (Price::from_u64(101), 5));
    }
}
