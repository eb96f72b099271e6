//! Result records
//!
//! Every processed event produces one or more result records:
//! acknowledgements (PENDING), executions (one per matched side,
//! counterparty-symmetric), cancellations and rejections. The quantity and
//! price columns follow status-dependent rules:
//!
//! | status             | quantity column    | price column |
//! |--------------------|--------------------|--------------|
//! | PENDING            | original quantity  | order price  |
//! | REJECTED           | original quantity  | order price  |
//! | PARTIALLY_EXECUTED | remaining quantity | order price  |
//! | EXECUTED           | 0                  | order price  |
//! | CANCELED           | 0                  | 0            |

use crate::numeric::Price;
use crate::order::{OrderAction, OrderEvent, OrderStatus, OrderType, RestingOrder, Side};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output CSV header line
pub const CSV_HEADER: &str = "timestamp,order_id,instrument,side,type,quantity,price,action,status,executed_quantity,execution_price,counterparty_id";

/// One output row of the result stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub timestamp: u64,
    pub order_id: i64,
    pub instrument: String,
    pub side: Side,
    pub order_type: OrderType,
    /// Status-dependent quantity column, see module docs
    pub quantity: u64,
    /// Status-dependent price column, see module docs
    pub price: Price,
    pub action: OrderAction,
    pub status: OrderStatus,
    /// Quantity filled by this record's match; zero on acknowledgements
    pub executed_quantity: u64,
    /// Trade price of this record's match; zero on acknowledgements
    pub execution_price: Price,
    /// Opposite order of the match; zero on non-match records
    pub counterparty_id: i64,
}

impl ResultRecord {
    /// Acknowledgement-style record (PENDING, CANCELED, REJECTED, or the
    /// terminal record of a shrinking MODIFY). Carries no execution data.
    pub fn acknowledgement(
        timestamp: u64,
        instrument: &str,
        order: &RestingOrder,
        status: OrderStatus,
    ) -> Self {
        let quantity = match status {
            OrderStatus::Pending | OrderStatus::Rejected => order.quantity,
            OrderStatus::PartiallyExecuted => order.remaining_quantity,
            OrderStatus::Executed | OrderStatus::Canceled => 0,
        };
        let price = if status == OrderStatus::Canceled {
            Price::zero()
        } else {
            order.price
        };

        Self {
            timestamp,
            order_id: order.order_id,
            instrument: instrument.to_string(),
            side: order.side,
            order_type: order.order_type,
            quantity,
            price,
            action: order.action,
            status,
            executed_quantity: 0,
            execution_price: Price::zero(),
            counterparty_id: 0,
        }
    }

    /// Rejection of an event that never became a resting order
    /// (unknown id on MODIFY/CANCEL, wrong-book routing).
    pub fn rejected_event(timestamp: u64, instrument: &str, event: &OrderEvent) -> Self {
        Self {
            timestamp,
            order_id: event.order_id,
            instrument: instrument.to_string(),
            side: event.side,
            order_type: event.order_type,
            quantity: event.quantity,
            price: event.price,
            action: event.action,
            status: OrderStatus::Rejected,
            executed_quantity: 0,
            execution_price: Price::zero(),
            counterparty_id: 0,
        }
    }

    /// Execution record for one side of a match. `order` must already
    /// reflect the fill (status and remaining quantity updated).
    pub fn execution(
        timestamp: u64,
        instrument: &str,
        order: &RestingOrder,
        matched_quantity: u64,
        match_price: Price,
        counterparty_id: i64,
    ) -> Self {
        let quantity = if order.status == OrderStatus::Executed {
            0
        } else {
            order.remaining_quantity
        };

        Self {
            timestamp,
            order_id: order.order_id,
            instrument: instrument.to_string(),
            side: order.side,
            order_type: order.order_type,
            quantity,
            price: order.price,
            action: order.action,
            status: order.status,
            executed_quantity: matched_quantity,
            execution_price: match_price,
            counterparty_id,
        }
    }

    /// Format as one output CSV line (without trailing newline)
    pub fn to_csv(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            self.timestamp,
            self.order_id,
            self.instrument,
            self.side,
            self.order_type,
            self.quantity,
            self.price,
            self.action,
            self.status,
            self.executed_quantity,
            self.execution_price,
            self.counterparty_id,
        )
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_csv())
    }
}
