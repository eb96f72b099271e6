//! Price level implementation with FIFO queue
//!
//! A price level contains all resting orders at a specific price point.
//! Orders are maintained in FIFO (First-In-First-Out) order to enforce
//! time priority: the head is the earliest arrival and matches first.

use std::collections::VecDeque;
use types::order::RestingOrder;

/// A price level containing resting orders at a specific price
///
/// Maintains strict FIFO ordering for time-priority matching. The full
/// resting-order state lives here so fills and modifies mutate in place.
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    /// Queue of orders at this price level (FIFO order)
    orders: VecDeque<RestingOrder>,
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new() -> Self {
        Self {
            orders: VecDeque::new(),
        }
    }

    /// Insert an order at the back of the queue (time priority)
    pub fn push_back(&mut self, order: RestingOrder) {
        self.orders.push_back(order);
    }

    /// Peek at the front order without removing it
    pub fn front(&self) -> Option<&RestingOrder> {
        self.orders.front()
    }

    /// Mutable access to the front order (fill target)
    pub fn front_mut(&mut self) -> Option<&mut RestingOrder> {
        self.orders.front_mut()
    }

    /// Pop the front order from the queue
    pub fn pop_front(&mut self) -> Option<RestingOrder> {
        self.orders.pop_front()
    }

    /// Remove an order from the queue by id
    ///
    /// Returns the removed order, or None if not found
    pub fn remove(&mut self, order_id: i64) -> Option<RestingOrder> {
        let position = self
            .orders
            .iter()
            .position(|order| order.order_id == order_id)?;
        self.orders.remove(position)
    }

    /// Find an order by id
    pub fn find(&self, order_id: i64) -> Option<&RestingOrder> {
        self.orders.iter().find(|order| order.order_id == order_id)
    }

    /// Check if the price level is empty
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Total remaining quantity at this price level
    pub fn total_quantity(&self) -> u64 {
        self.orders.iter().map(|o| o.remaining_quantity).sum()
    }

    /// Number of orders at this level
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}
