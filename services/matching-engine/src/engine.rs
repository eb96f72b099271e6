//! Per-instrument order book engine
//!
//! Applies one event at a time against dual price ladders and emits the
//! resulting records. Exactly one worker thread owns each book; nothing
//! here is shared or locked.

use std::collections::{HashMap, HashSet};
use types::numeric::Price;
use types::order::{OrderAction, OrderEvent, OrderStatus, OrderType, RestingOrder, Side};
use types::record::ResultRecord;

use crate::book::{AskBook, BidBook};
use crate::matching::{crossing, executor};

/// Order book for a single instrument
///
/// Holds the bid and ask ladders, an `order_id → (side, price)` index for
/// O(1) MODIFY/CANCEL lookup, and the set of ids touched by the current
/// event (drives the fresh-PENDING suppression on MODIFY).
pub struct OrderBook {
    instrument: String,
    bids: BidBook,
    asks: AskBook,
    order_index: HashMap<i64, (Side, Price)>,
    traded_this_event: HashSet<i64>,
}

impl OrderBook {
    /// Create an empty book for one instrument
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            bids: BidBook::new(),
            asks: AskBook::new(),
            order_index: HashMap::new(),
            traded_this_event: HashSet::new(),
        }
    }

    /// The instrument this book serves
    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Process one event and return the records it produced, in emission
    /// order. Domain failures come back as REJECTED records; the book is
    /// left untouched by a rejection.
    pub fn process(&mut self, event: OrderEvent) -> Vec<ResultRecord> {
        let mut records = Vec::new();
        let event_timestamp = event.timestamp;

        // Dispatcher routing bug: reject defensively, book state untouched.
        if event.instrument != self.instrument {
            records.push(ResultRecord::rejected_event(
                event_timestamp,
                &self.instrument,
                &event,
            ));
            return records;
        }

        self.traded_this_event.clear();

        match event.action {
            OrderAction::New => self.handle_new(event, &mut records),
            OrderAction::Modify => self.handle_modify(event, &mut records),
            OrderAction::Cancel => self.handle_cancel(event, &mut records),
        }

        records
    }

    fn handle_new(&mut self, event: OrderEvent, records: &mut Vec<ResultRecord>) {
        assert!(
            !self.order_index.contains_key(&event.order_id),
            "duplicate order_id {} on NEW",
            event.order_id
        );

        let event_timestamp = event.timestamp;
        let mut order = RestingOrder::from_event(&event);

        match event.order_type {
            OrderType::Limit => {
                self.insert(order.clone());
                records.push(ResultRecord::acknowledgement(
                    event_timestamp,
                    &self.instrument,
                    &order,
                    OrderStatus::Pending,
                ));
                self.match_crossing(event_timestamp, records);
            }
            OrderType::Market => {
                self.sweep(&mut order, event_timestamp, records);
                if order.cumulative_executed == 0 && order.quantity > 0 {
                    records.push(ResultRecord::acknowledgement(
                        event_timestamp,
                        &self.instrument,
                        &order,
                        OrderStatus::Rejected,
                    ));
                }
            }
        }
    }

    fn handle_modify(&mut self, event: OrderEvent, records: &mut Vec<ResultRecord>) {
        let event_timestamp = event.timestamp;

        let Some(existing) = self.remove_by_id(event.order_id) else {
            records.push(ResultRecord::rejected_event(
                event_timestamp,
                &self.instrument,
                &event,
            ));
            return;
        };

        // Rebuild from the event; side stays with the resting order. The
        // new entry timestamp costs the order its time priority.
        let mut order = existing;
        order.price = event.price;
        order.quantity = event.quantity;
        order.order_type = event.order_type;
        order.action = OrderAction::Modify;
        order.entry_timestamp = event_timestamp;

        if order.quantity <= order.cumulative_executed {
            // Shrunk to or below what has already traded: terminal record,
            // nothing re-inserted.
            order.remaining_quantity = 0;
            order.status = if order.cumulative_executed > 0 {
                OrderStatus::Executed
            } else {
                OrderStatus::Canceled
            };
            records.push(ResultRecord::acknowledgement(
                event_timestamp,
                &self.instrument,
                &order,
                order.status,
            ));
            return;
        }

        order.remaining_quantity = order.quantity - order.cumulative_executed;
        order.status = OrderStatus::Pending;

        match order.order_type {
            OrderType::Limit => {
                let order_id = order.order_id;
                self.insert(order);
                self.match_crossing(event_timestamp, records);

                // Fresh acknowledgement only if the re-inserted order did
                // not trade in the pass it just triggered.
                if !self.traded_this_event.contains(&order_id) {
                    if let Some(resting) = self.resting(order_id) {
                        records.push(ResultRecord::acknowledgement(
                            event_timestamp,
                            &self.instrument,
                            resting,
                            resting.status,
                        ));
                    }
                }
            }
            OrderType::Market => {
                let executed_before = order.cumulative_executed;
                self.sweep(&mut order, event_timestamp, records);
                if order.cumulative_executed == executed_before {
                    records.push(ResultRecord::acknowledgement(
                        event_timestamp,
                        &self.instrument,
                        &order,
                        OrderStatus::Rejected,
                    ));
                }
            }
        }
    }

    fn handle_cancel(&mut self, event: OrderEvent, records: &mut Vec<ResultRecord>) {
        let event_timestamp = event.timestamp;

        match self.remove_by_id(event.order_id) {
            Some(mut order) => {
                order.action = OrderAction::Cancel;
                order.status = OrderStatus::Canceled;
                records.push(ResultRecord::acknowledgement(
                    event_timestamp,
                    &self.instrument,
                    &order,
                    OrderStatus::Canceled,
                ));
            }
            None => {
                records.push(ResultRecord::rejected_event(
                    event_timestamp,
                    &self.instrument,
                    &event,
                ));
            }
        }
    }

    /// Match crossing resting orders until the spread opens or one side
    /// empties. The bid head is the recorded aggressor of each fill.
    fn match_crossing(&mut self, event_timestamp: u64, records: &mut Vec<ResultRecord>) {
        loop {
            let (Some(bid_price), Some(ask_price)) =
                (self.bids.best_price(), self.asks.best_price())
            else {
                break;
            };
            if !crossing::can_match(bid_price, ask_price) {
                break;
            }

            let bid_level = self
                .bids
                .level_mut(bid_price)
                .expect("best bid level exists");
            let ask_level = self
                .asks
                .level_mut(ask_price)
                .expect("best ask level exists");
            let buy = bid_level.front_mut().expect("mapped level is non-empty");
            let sell = ask_level.front_mut().expect("mapped level is non-empty");

            let price = crossing::execution_price(buy, sell);
            let quantity = buy.remaining_quantity.min(sell.remaining_quantity);

            let fills = executor::execute(
                &mut *buy,
                &mut *sell,
                quantity,
                price,
                event_timestamp,
                &self.instrument,
            );

            let buy_id = buy.order_id;
            let sell_id = sell.order_id;
            let buy_filled = buy.is_filled();
            let sell_filled = sell.is_filled();

            if buy_filled {
                bid_level.pop_front();
            }
            if sell_filled {
                ask_level.pop_front();
            }
            let bid_level_empty = bid_level.is_empty();
            let ask_level_empty = ask_level.is_empty();

            records.extend(fills);
            self.traded_this_event.insert(buy_id);
            self.traded_this_event.insert(sell_id);
            if buy_filled {
                self.order_index.remove(&buy_id);
            }
            if sell_filled {
                self.order_index.remove(&sell_id);
            }
            if bid_level_empty {
                self.bids.remove_level(bid_price);
            }
            if ask_level_empty {
                self.asks.remove_level(ask_price);
            }
        }
    }

    /// Sweep the opposite side with a market order. The order never
    /// rests; any residual after the book empties is dropped.
    fn sweep(
        &mut self,
        order: &mut RestingOrder,
        event_timestamp: u64,
        records: &mut Vec<ResultRecord>,
    ) {
        match order.side {
            Side::Buy => self.sweep_asks(order, event_timestamp, records),
            Side::Sell => self.sweep_bids(order, event_timestamp, records),
        }
    }

    fn sweep_asks(
        &mut self,
        order: &mut RestingOrder,
        event_timestamp: u64,
        records: &mut Vec<ResultRecord>,
    ) {
        while order.remaining_quantity > 0 {
            let Some((ask_price, level)) = self.asks.best_level_mut() else {
                break;
            };
            let resting = level.front_mut().expect("mapped level is non-empty");

            let price = resting.price;
            let quantity = order.remaining_quantity.min(resting.remaining_quantity);

            let fills = executor::execute(
                &mut *order,
                &mut *resting,
                quantity,
                price,
                event_timestamp,
                &self.instrument,
            );

            let resting_id = resting.order_id;
            let resting_filled = resting.is_filled();
            if resting_filled {
                level.pop_front();
            }
            let level_empty = level.is_empty();

            records.extend(fills);
            self.traded_this_event.insert(order.order_id);
            self.traded_this_event.insert(resting_id);
            if resting_filled {
                self.order_index.remove(&resting_id);
            }
            if level_empty {
                self.asks.remove_level(ask_price);
            }
        }
    }

    fn sweep_bids(
        &mut self,
        order: &mut RestingOrder,
        event_timestamp: u64,
        records: &mut Vec<ResultRecord>,
    ) {
        while order.remaining_quantity > 0 {
            let Some((bid_price, level)) = self.bids.best_level_mut() else {
                break;
            };
            let resting = level.front_mut().expect("mapped level is non-empty");

            let price = resting.price;
            let quantity = order.remaining_quantity.min(resting.remaining_quantity);

            let fills = executor::execute(
                &mut *order,
                &mut *resting,
                quantity,
                price,
                event_timestamp,
                &self.instrument,
            );

            let resting_id = resting.order_id;
            let resting_filled = resting.is_filled();
            if resting_filled {
                level.pop_front();
            }
            let level_empty = level.is_empty();

            records.extend(fills);
            self.traded_this_event.insert(order.order_id);
            self.traded_this_event.insert(resting_id);
            if resting_filled {
                self.order_index.remove(&resting_id);
            }
            if level_empty {
                self.bids.remove_level(bid_price);
            }
        }
    }

    fn insert(&mut self, order: RestingOrder) {
        self.order_index
            .insert(order.order_id, (order.side, order.price));
        match order.side {
            Side::Buy => self.bids.insert(order),
            Side::Sell => self.asks.insert(order),
        }
    }

    fn remove_by_id(&mut self, order_id: i64) -> Option<RestingOrder> {
        let (side, price) = self.order_index.remove(&order_id)?;
        let removed = match side {
            Side::Buy => self.bids.remove(order_id, price),
            Side::Sell => self.asks.remove(order_id, price),
        };
        debug_assert!(removed.is_some(), "index entry without resting order");
        removed
    }

    /// Look up a resting order by id
    pub fn resting(&self, order_id: i64) -> Option<&RestingOrder> {
        let (side, price) = self.order_index.get(&order_id)?;
        match side {
            Side::Buy => self.bids.level(*price)?.find(order_id),
            Side::Sell => self.asks.level(*price)?.find(order_id),
        }
    }

    /// Check if an order is resting in this book
    pub fn contains_order(&self, order_id: i64) -> bool {
        self.order_index.contains_key(&order_id)
    }

    /// Best bid price, if any
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    /// Best ask price, if any
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Total number of resting orders
    pub fn order_count(&self) -> usize {
        self.order_index.len()
    }

    /// Check if both ladders are empty
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Top-of-book depth snapshots (price, quantity), best first
    pub fn depth(&self, levels: usize) -> (Vec<(Price, u64)>, Vec<(Price, u64)>) {
        (
            self.bids.depth_snapshot(levels),
            self.asks.depth_snapshot(levels),
        )
    }
}
