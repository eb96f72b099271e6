//! Crossing detection and execution pricing
//!
//! Determines when resting bids and asks can match and which side's
//! price the execution settles at.

use types::numeric::Price;
use types::order::RestingOrder;

/// Check if a bid and ask can match at given prices
///
/// A buy matches a sell when the bid price is at or above the ask price.
pub fn can_match(bid_price: Price, ask_price: Price) -> bool {
    bid_price >= ask_price
}

/// Execution price for two crossing resting orders.
///
/// The order that entered its resting position earlier sets the price;
/// on equal entry timestamps the bid price wins.
pub fn execution_price(buy: &RestingOrder, sell: &RestingOrder) -> Price {
    if buy.entry_timestamp < sell.entry_timestamp {
        buy.price
    } else if sell.entry_timestamp < buy.entry_timestamp {
        sell.price
    } else {
        buy.price
    }
}
