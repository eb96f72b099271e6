//! Determinism and invariant tests for the matching engine
//!
//! Replays identical event streams through fresh books and verifies the
//! outputs match record-for-record, plus the cross-cutting properties:
//! counterparty symmetry, per-event fill balance, and a never-crossed
//! resting book.

use matching_engine::OrderBook;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use types::numeric::Price;
use types::order::{OrderAction, OrderEvent, OrderType, Side};
use types::record::ResultRecord;

fn random_events(seed: u64, count: usize) -> Vec<OrderEvent> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut events = Vec::with_capacity(count);
    let mut next_id: i64 = 1;

    for ts in 1..=count as u64 {
        let roll: u8 = rng.gen_range(0..10);
        let event = match roll {
            // Mostly NEW limit orders in a narrow band so they cross often
            0..=5 => {
                let id = next_id;
                next_id += 1;
                OrderEvent {
                    timestamp: ts,
                    order_id: id,
                    instrument: "ACME".to_string(),
                    side: if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell },
                    order_type: OrderType::Limit,
                    quantity: rng.gen_range(1..=50),
                    price: Price::from_u64(rng.gen_range(95..=105)),
                    action: OrderAction::New,
                }
            }
            6 => {
                let id = next_id;
                next_id += 1;
                OrderEvent {
                    timestamp: ts,
                    order_id: id,
                    instrument: "ACME".to_string(),
                    side: if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell },
                    order_type: OrderType::Market,
                    quantity: rng.gen_range(1..=30),
                    price: Price::zero(),
                    action: OrderAction::New,
                }
            }
            7 | 8 => OrderEvent {
                timestamp: ts,
                order_id: rng.gen_range(1..=next_id.max(2)),
                instrument: "ACME".to_string(),
                side: if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell },
                order_type: OrderType::Limit,
                quantity: rng.gen_range(1..=50),
                price: Price::from_u64(rng.gen_range(95..=105)),
                action: OrderAction::Modify,
            },
            _ => OrderEvent {
                timestamp: ts,
                order_id: rng.gen_range(1..=next_id.max(2)),
                instrument: "ACME".to_string(),
                side: Side::Buy,
                order_type: OrderType::Limit,
                quantity: 0,
                price: Price::zero(),
                action: OrderAction::Cancel,
            },
        };
        events.push(event);
    }

    events
}

fn replay(events: &[OrderEvent]) -> Vec<ResultRecord> {
    let mut book = OrderBook::new("ACME");
    let mut records = Vec::new();
    for event in events {
        records.extend(book.process(event.clone()));

        // Resting book never crosses, after every single event
        if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
            assert!(bid < ask, "resting cross after event ts={}", event.timestamp);
        }
    }
    records
}

#[test]
fn test_dual_replay_identical_records() {
    let events = random_events(42, 2_000);

    let first = replay(&events);
    let second = replay(&events);

    assert_eq!(first.len(), second.len());
    assert_eq!(first, second, "replays must produce identical records");
}

#[test]
fn test_counterparty_symmetry() {
    let events = random_events(7, 1_000);
    let records = replay(&events);

    let fills: Vec<_> = records.iter().filter(|r| r.executed_quantity > 0).collect();
    assert!(!fills.is_empty(), "stream should produce fills");
    assert_eq!(fills.len() % 2, 0, "fills come in pairs");

    for pair in fills.chunks(2) {
        let (a, b) = (pair[0], pair[1]);
        assert_eq!(a.counterparty_id, b.order_id);
        assert_eq!(b.counterparty_id, a.order_id);
        assert_eq!(a.timestamp, b.timestamp);
        assert_eq!(a.executed_quantity, b.executed_quantity);
        assert_eq!(a.execution_price, b.execution_price);
        assert_ne!(a.side, b.side);
    }
}

#[test]
fn test_fill_balance_buy_equals_sell() {
    let events = random_events(99, 1_500);
    let records = replay(&events);

    let bought: u64 = records
        .iter()
        .filter(|r| r.side == Side::Buy)
        .map(|r| r.executed_quantity)
        .sum();
    let sold: u64 = records
        .iter()
        .filter(|r| r.side == Side::Sell)
        .map(|r| r.executed_quantity)
        .sum();

    assert!(bought > 0);
    assert_eq!(bought, sold, "every trade fills one buy and one sell");
}

#[test]
fn test_scenario_exact_output_lines() {
    // Two crossing limits at the same price: two PENDINGs then two fills
    let mut book = OrderBook::new("X");
    let mut lines = Vec::new();

    for event in [
        OrderEvent {
            timestamp: 1,
            order_id: 1,
            instrument: "X".to_string(),
            side: Side::Buy,
            order_type: OrderType::Limit,
            quantity: 10,
            price: Price::parse("100.0").unwrap(),
            action: OrderAction::New,
        },
        OrderEvent {
            timestamp: 2,
            order_id: 2,
            instrument: "X".to_string(),
            side: Side::Sell,
            order_type: OrderType::Limit,
            quantity: 10,
            price: Price::parse("100.0").unwrap(),
            action: OrderAction::New,
        },
    ] {
        for record in book.process(event) {
            lines.push(record.to_csv());
        }
    }

    assert_eq!(
        lines,
        vec![
            "1,1,X,BUY,LIMIT,10,100.0,NEW,PENDING,0,0,0",
            "2,2,X,SELL,LIMIT,10,100.0,NEW,PENDING,0,0,0",
            "2,1,X,BUY,LIMIT,0,100.0,NEW,EXECUTED,10,100.0,2",
            "2,2,X,SELL,LIMIT,0,100.0,NEW,EXECUTED,10,100.0,1",
        ]
    );
}

#[test]
fn test_tie_break_earlier_bid_price_wins() {
    // Bid rests at 100 (ts 1); ask arrives at 99 (ts 2). The earlier
    // resting order's price is the execution price: 100.
    let mut book = OrderBook::new("X");
    book.process(OrderEvent {
        timestamp: 1,
        order_id: 1,
        instrument: "X".to_string(),
        side: Side::Buy,
        order_type: OrderType::Limit,
        quantity: 5,
        price: Price::parse("100.0").unwrap(),
        action: OrderAction::New,
    });
    let records = book.process(OrderEvent {
        timestamp: 2,
        order_id: 2,
        instrument: "X".to_string(),
        side: Side::Sell,
        order_type: OrderType::Limit,
        quantity: 5,
        price: Price::parse("99.0").unwrap(),
        action: OrderAction::New,
    });

    let fill = records.iter().find(|r| r.executed_quantity > 0).unwrap();
    assert_eq!(fill.execution_price, Price::parse("100.0").unwrap());
    assert_eq!(fill.executed_quantity, 5);
}
