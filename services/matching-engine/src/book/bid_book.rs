//! Bid (buy-side) ladder
//!
//! Maintains buy orders sorted by price descending (best bid first).
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use types::numeric::Price;
use types::order::RestingOrder;

use super::price_level::PriceLevel;

/// Bid (buy) side of a book
///
/// Orders are sorted by price descending, so the highest bid is first.
/// At each price level, orders are maintained in FIFO order. Levels are
/// erased in the same transition that empties them.
#[derive(Debug, Clone, Default)]
pub struct BidBook {
    /// Price levels; BTreeMap iterates ascending, best bid is `next_back`
    levels: BTreeMap<Price, PriceLevel>,
}

impl BidBook {
    /// Create a new empty bid ladder
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

    /// Get the best bid price (highest)
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next_back().copied()
    }

    /// Get mutable access to the best bid level
    pub fn best_level_mut(&mut self) -> Option<(Price, &mut PriceLevel)> {
        self.levels
            .iter_mut()
            .next_back()
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
            .rev()
            .take(depth)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::order::{OrderAction, OrderEvent, OrderType, Side};

    fn bid(order_id: i64, price: u64, qty: u64) -> RestingOrder {
        RestingOrder::from_event(&OrderEvent {
            timestamp: 1,
            order_id,
            instrument: "ACME".to_string(),
            side: Side::Buy,
            order_type: OrderType::Limit,
            quantity: qty,
            price: Price::from_u64(price),
            action: OrderAction::New,
        })
    }

    #[test]
    fn test_bid_book_best_is_highest() {
        let mut book = BidBook::new();
        book.insert(bid(1, 100, 10));
        book.insert(bid(2, 101, 20));
        book.insert(bid(3, 99, 15));

        assert_eq!(book.best_price(), Some(Price::from_u64(101)));
        assert_eq!(book.level_count(), 3);
    }

    #[test]
    fn test_bid_book_remove_erases_empty_level() {
        let mut book = BidBook::new();
        book.insert(bid(1, 100, 10));

        let removed = book.remove(1, Price::from_u64(100)).unwrap();
        assert_eq!(removed.order_id, 1);
        assert!(book.is_empty());
        assert_eq!(book.best_price(), None);
    }

    #[test]
    fn test_bid_book_remove_keeps_populated_level() {
        let mut book = BidBook::new();
        book.insert(bid(1, 100, 10));
        book.insert(bid(2, 100, 20));

        book.remove(1, Price::from_u64(100)).unwrap();
        assert_eq!(book.level_count(), 1);
        assert_eq!(book.order_count(), 1);
        assert_eq!(book.best_price(), Some(Price::from_u64(100)));
    }

    #[test]
    fn test_bid_book_depth_snapshot_best_first() {
        let mut book = BidBook::new();
        book.insert(bid(1, 100, 10));
        book.insert(bid(2, 102, 20));
        book.insert(bid(3, 101, 5));
        book.insert(bid(4, 99, 1));

        let depth = book.depth_snapshot(2);
        assert_eq!(depth.len(), 2);
        assert_eq!(depth[0], (Price::from_u64(102), 20));
        assert_eq!(depth[1], (Price::from_u64(101), 5));
    }

    #[test]
    fn test_bid_book_same_level_fifo() {
        let mut book = BidBook::new();
        book.insert(bid(1, 100, 10));
        book.insert(bid(2, 100, 20));

        let (price, level) = book.best_level_mut().unwrap();
        assert_eq!(price, Price::from_u64(100));
        assert_eq!(level.front().unwrap().order_id, 1);
    }
}
