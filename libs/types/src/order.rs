//! Order event and resting-order types
//!
//! An `OrderEvent` is one validated input row; a `RestingOrder` is the
//! state the book keeps for it while it rests on a price level.

use crate::numeric::Price;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order type determining matching behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Rests in the book if not fully matched
    Limit,
    /// Sweeps the opposite side; never rests
    Market,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "LIMIT",
            OrderType::Market => "MARKET",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action requested by an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderAction {
    New,
    Modify,
    Cancel,
}

impl OrderAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::New => "NEW",
            OrderAction::Modify => "MODIFY",
            OrderAction::Cancel => "CANCEL",
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order status as reported in result records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Accepted and resting, no fills yet
    Pending,
    /// Some quantity executed, remainder still live
    PartiallyExecuted,
    /// Completely executed (terminal)
    Executed,
    /// Canceled by request or by a modify that shrank below fills (terminal)
    Canceled,
    /// Event could not be applied (terminal)
    Rejected,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::PartiallyExecuted => "PARTIALLY_EXECUTED",
            OrderStatus::Executed => "EXECUTED",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::Rejected => "REJECTED",
        }
    }

    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Executed | OrderStatus::Canceled | OrderStatus::Rejected
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validated input event, immutable once parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub timestamp: u64,
    pub order_id: i64,
    pub instrument: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: u64,
    pub price: Price,
    pub action: OrderAction,
}

/// Book-side state of an order.
///
/// `entry_timestamp` is the event timestamp at which the order took its
/// current resting position; a MODIFY resets it, costing time priority.
#[derive(Debug, Clone, PartialEq)]
pub struct RestingOrder {
    pub order_id: i64,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: u64,
    pub price: Price,
    /// Last action applied to this order, echoed in result records
    pub action: OrderAction,
    pub remaining_quantity: u64,
    pub cumulative_executed: u64,
    pub status: OrderStatus,
    pub entry_timestamp: u64,
}

impl RestingOrder {
    /// Build the initial resting state for a NEW event
    pub fn from_event(event: &OrderEvent) -> Self {
        Self {
            order_id: event.order_id,
            side: event.side,
            order_type: event.order_type,
            quantity: event.quantity,
            price: event.price,
            action: event.action,
            remaining_quantity: event.quantity,
            cumulative_executed: 0,
            status: OrderStatus::Pending,
            entry_timestamp: event.timestamp,
        }
    }

    /// Check quantity invariant: remaining + executed = total
    pub fn check_invariant(&self) -> bool {
        self.remaining_quantity + self.cumulative_executed == self.quantity
    }

    /// Check if the order is completely filled
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Check if the order has any fills
    pub fn has_fills(&self) -> bool {
        self.cumulative_executed > 0
    }

    /// Apply a fill and adjust the status
    ///
    /// # Panics
    /// Panics if the fill exceeds the remaining quantity or violates the
    /// conservation invariant.
    pub fn apply_fill(&mut self, fill_quantity: u64) {
        assert!(
            fill_quantity <= self.remaining_quantity,
            "Fill would exceed remaining quantity"
        );

        self.remaining_quantity -= fill_quantity;
        self.cumulative_executed += fill_quantity;
        self.status = if self.remaining_quantity == 0 {
            OrderStatus::Executed
        } else {
            OrderStatus::PartiallyExecuted
        };

        assert!(self.check_invariant(), "Invariant violated after fill");
    }
}
