//! Fill execution
//!
//! Applies a matched quantity to both sides of a trade and produces the
//! two counterparty-symmetric result records, aggressor first.

use types::numeric::Price;
use types::order::RestingOrder;
use types::record::ResultRecord;

/// Execute a fill between the aggressor and the passive resting order.
///
/// Both orders are mutated in place: remaining and cumulative quantities
/// updated, statuses set to EXECUTED or PARTIALLY_EXECUTED. Returns the
/// two records — aggressor's first — each naming the other order as its
/// counterparty and sharing the event timestamp, quantity, and price.
pub fn execute(
    aggressor: &mut RestingOrder,
    passive: &mut RestingOrder,
    quantity: u64,
    price: Price,
    event_timestamp: u64,
    instrument: &str,
) -> [ResultRecord; 2] {
    aggressor.apply_fill(quantity);
    passive.apply_fill(quantity);

    [
        ResultRecord::execution(
            event_timestamp,
            instrument,
            aggressor,
            quantity,
            price,
            passive.order_id,
        ),
        ResultRecord::execution(
            event_timestamp,
            instrument,
            passive,
            quantity,
            price,
            aggressor.order_id,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::order::{OrderAction, OrderEvent, OrderStatus, OrderType, Side};

    fn resting(order_id: i64, side: Side, qty: u64, price: u64, ts: u64) -> RestingOrder {
        RestingOrder::from_event(&OrderEvent {
            timestamp: ts,
            order_id,
            instrument: "ACME".to_string(),
            side,
            order_type: OrderType::Limit,
            quantity: qty,
            price: Price::from_u64(price),
            action: OrderAction::New,
        })
    }

    #[test]
    fn test_execute_full_fill_both_sides() {
        let mut buy = resting(1, Side::Buy, 10, 100, 1);
        let mut sell = resting(2, Side::Sell, 10, 100, 2);

        let [r1, r2] = execute(&mut buy, &mut sell, 10, Price::from_u64(100), 2, "ACME");

        assert_eq!(buy.status, OrderStatus::Executed);
        assert_eq!(sell.status, OrderStatus::Executed);

        assert_eq!(r1.order_id, 1);
        assert_eq!(r1.counterparty_id, 2);
        assert_eq!(r2.order_id, 2);
        assert_eq!(r2.counterparty_id, 1);

        for rec in [&r1, &r2] {
            assert_eq!(rec.timestamp, 2);
            assert_eq!(rec.executed_quantity, 10);
            assert_eq!(rec.execution_price, Price::from_u64(100));
            assert_eq!(rec.status, OrderStatus::Executed);
            assert_eq!(rec.quantity, 0);
        }
    }

    #[test]
    fn test_execute_partial_fill_keeps_remaining() {
        let mut buy = resting(1, Side::Buy, 10, 100, 1);
        let mut sell = resting(2, Side::Sell, 4, 100, 2);

        let [r1, r2] = execute(&mut buy, &mut sell, 4, Price::from_u64(100), 2, "ACME");

        assert_eq!(buy.status, OrderStatus::PartiallyExecuted);
        assert_eq!(buy.remaining_quantity, 6);
        assert_eq!(sell.status, OrderStatus::Executed);

        assert_eq!(r1.quantity, 6); // remaining for partial
        assert_eq!(r2.quantity, 0); // zero for executed
        assert_eq!(r1.executed_quantity, 4);
        assert_eq!(r2.executed_quantity, 4);
    }

    #[test]
    fn test_execute_aggressor_record_first() {
        let mut market = resting(9, Side::Buy, 5, 0, 3);
        let mut passive = resting(2, Side::Sell, 5, 101, 1);

        let [r1, r2] = execute(&mut market, &mut passive, 5, Price::from_u64(101), 3, "ACME");
        assert_eq!(r1.order_id, 9);
        assert_eq!(r2.order_id, 2);
    }
}
