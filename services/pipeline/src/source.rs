//! CSV event source
//!
//! Reads the input stream row by row, validates each row against the
//! schema, and pushes `OrderEvent`s into the bounded event queue. Columns
//! are mapped by header name, so their order is not fixed. Rows that fail
//! validation are warned and dropped; they produce no result records.

use anyhow::Context;
use crossbeam_channel::Sender;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::io::Read;
use tracing::{debug, info, warn};
use types::errors::ParseError;
use types::numeric::Price;
use types::order::{OrderAction, OrderEvent, OrderType, Side};

/// One raw CSV row before sanitisation
#[derive(Debug, Deserialize)]
struct RawEventRow {
    timestamp: u64,
    order_id: i64,
    instrument: String,
    side: String,
    #[serde(rename = "type")]
    order_type: String,
    quantity: u64,
    /// Optional: absent and empty are legal for MARKET orders
    #[serde(default)]
    price: Option<String>,
    action: String,
}

/// Counters reported by the reader thread
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceStats {
    pub rows_read: u64,
    pub events_parsed: u64,
    pub rows_dropped: u64,
}

/// Read order events from a CSV stream into the event queue.
///
/// Returns fatally only on a missing or empty header; row-level failures
/// are logged and skipped. The event queue's sender is dropped on return,
/// which signals EOF downstream.
pub fn read_events<R: Read>(
    input: R,
    events_tx: Sender<OrderEvent>,
) -> anyhow::Result<SourceStats> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers().context("reading CSV header line")?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        anyhow::bail!("input CSV header line is missing or empty");
    }
    info!(columns = headers.len(), "parsed input header");

    let mut stats = SourceStats::default();

    for row in reader.deserialize::<RawEventRow>() {
        stats.rows_read += 1;
        let event = match row {
            Ok(raw) => match sanitize(raw) {
                Ok(event) => event,
                Err(err) => {
                    warn!(row = stats.rows_read, %err, "dropping malformed row");
                    stats.rows_dropped += 1;
                    continue;
                }
            },
            Err(err) => {
                warn!(row = stats.rows_read, %err, "dropping unparsable row");
                stats.rows_dropped += 1;
                continue;
            }
        };

        // Blocks when the queue is full: backpressure on the reader.
        if events_tx.send(event).is_err() {
            warn!("event queue closed; stopping reader");
            break;
        }
        stats.events_parsed += 1;
    }

    info!(
        rows = stats.rows_read,
        parsed = stats.events_parsed,
        dropped = stats.rows_dropped,
        "finished reading order events"
    );
    Ok(stats)
}

/// Validate a raw row into an `OrderEvent`
fn sanitize(raw: RawEventRow) -> Result<OrderEvent, ParseError> {
    if raw.instrument.is_empty() {
        return Err(ParseError::MissingField("instrument"));
    }

    let side = parse_side(&raw.side)?;
    let order_type = parse_order_type(&raw.order_type)?;
    let action = parse_action(&raw.action)?;

    if raw.quantity == 0 && matches!(action, OrderAction::New | OrderAction::Modify) {
        warn!(order_id = raw.order_id, "zero quantity on NEW/MODIFY event");
    }

    let price = parse_price(raw.price.as_deref(), order_type, action)?;

    Ok(OrderEvent {
        timestamp: raw.timestamp,
        order_id: raw.order_id,
        instrument: raw.instrument,
        side,
        order_type,
        quantity: raw.quantity,
        price,
        action,
    })
}

fn parse_side(raw: &str) -> Result<Side, ParseError> {
    match raw.to_ascii_uppercase().as_str() {
        "BUY" => Ok(Side::Buy),
        "SELL" => Ok(Side::Sell),
        _ => Err(ParseError::InvalidField {
            field: "side",
            value: raw.to_string(),
        }),
    }
}

fn parse_order_type(raw: &str) -> Result<OrderType, ParseError> {
    match raw.to_ascii_uppercase().as_str() {
        "LIMIT" => Ok(OrderType::Limit),
        "MARKET" => Ok(OrderType::Market),
        _ => Err(ParseError::InvalidField {
            field: "type",
            value: raw.to_string(),
        }),
    }
}

fn parse_action(raw: &str) -> Result<OrderAction, ParseError> {
    match raw.to_ascii_uppercase().as_str() {
        "NEW" => Ok(OrderAction::New),
        "MODIFY" => Ok(OrderAction::Modify),
        "CANCEL" => Ok(OrderAction::Cancel),
        _ => Err(ParseError::InvalidField {
            field: "action",
            value: raw.to_string(),
        }),
    }
}

/// Price column rules: ignored for MARKET (best available price applies),
/// required and positive for NEW LIMIT, defaulted to zero otherwise.
fn parse_price(
    raw: Option<&str>,
    order_type: OrderType,
    action: OrderAction,
) -> Result<Price, ParseError> {
    let raw = raw.unwrap_or("").trim();

    match order_type {
        OrderType::Market => {
            if !raw.is_empty() && raw != "0" && raw != "0.0" {
                debug!(value = raw, "price ignored for MARKET order");
            }
            Ok(Price::zero())
        }
        OrderType::Limit => {
            if raw.is_empty() {
                if action == OrderAction::New {
                    return Err(ParseError::MissingField("price"));
                }
                return Ok(Price::zero());
            }
            let price = Price::parse(raw).ok_or_else(|| ParseError::InvalidField {
                field: "price",
                value: raw.to_string(),
            })?;
            if action == OrderAction::New && price.is_zero() {
                return Err(ParseError::InvalidField {
                    field: "price",
                    value: raw.to_string(),
                });
            }
            Ok(price)
        }
    }
}
