//! Market channel message parsing
//!
//! Frames are either a single event object or an array of them. Each event is
//! dispatched on `event_type`:
//!
//! - `book`: midpoint of best bid and best ask, or whichever side exists
//! - `price_change`: the changed price, flat or inside `price_changes`
//! - `last_trade_price`: the traded price
//!
//! Anything else yields no ticks. Prices outside [0, 1] are dropped.

use super::{PriceTick, TickSource};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
struct BookEvent {
    asset_id: String,
    #[serde(default)]
    bids: Vec<BookLevel>,
    #[serde(default)]
    asks: Vec<BookLevel>,
}

#[derive(Debug, Deserialize)]
struct BookLevel {
    price: String,
}

#[derive(Debug, Deserialize)]
struct PriceChange {
    asset_id: String,
    price: String,
}

/// Parse one text frame into zero or more ticks
pub fn parse_feed_message(text: &str) -> Vec<PriceTick> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring non-JSON feed frame");
            return vec![];
        }
    };

    match value {
        Value::Array(events) => events.iter().flat_map(parse_event).collect(),
        event @ Value::Object(_) => parse_event(&event),
        _ => vec![],
    }
}

fn parse_event(event: &Value) -> Vec<PriceTick> {
    let event_type = event
        .get("event_type")
        .and_then(Value::as_str)
        .unwrap_or("");

    match event_type {
        "book" => serde_json::from_value::<BookEvent>(event.clone())
            .ok()
            .and_then(book_tick)
            .into_iter()
            .collect(),
        "price_change" => price_change_ticks(event),
        "last_trade_price" => serde_json::from_value::<PriceChange>(event.clone())
            .ok()
            .and_then(|trade| tick(trade.asset_id, &trade.price, TickSource::LastTrade))
            .into_iter()
            .collect(),
        "tick_size_change" => vec![],
        other => {
            tracing::trace!(event_type = other, "Unknown feed event type");
            vec![]
        }
    }
}

fn book_tick(book: BookEvent) -> Option<PriceTick> {
    let best_bid = book.bids.iter().filter_map(|l| level_price(&l.price)).max();
    let best_ask = book.asks.iter().filter_map(|l| level_price(&l.price)).min();

    let price = match (best_bid, best_ask) {
        (Some(bid), Some(ask)) => (bid + ask) / Decimal::TWO,
        (Some(bid), None) => bid,
        (None, Some(ask)) => ask,
        (None, None) => return None,
    };

    in_range(price).then(|| PriceTick {
        token_id: book.asset_id,
        price,
        source: TickSource::Book,
        timestamp: Utc::now(),
    })
}

fn price_change_ticks(event: &Value) -> Vec<PriceTick> {
    let changes: Vec<PriceChange> = match event.get("price_changes") {
        Some(list) => serde_json::from_value(list.clone()).unwrap_or_default(),
        None => serde_json::from_value(event.clone()).into_iter().collect(),
    };

    changes
        .into_iter()
        .filter_map(|change| tick(change.asset_id, &change.price, TickSource::PriceChange))
        .collect()
}

fn tick(token_id: String, raw_price: &str, source: TickSource) -> Option<PriceTick> {
    let price = Decimal::from_str(raw_price).ok().filter(|p| in_range(*p))?;
    Some(PriceTick {
        token_id,
        price,
        source,
        timestamp: Utc::now(),
    })
}

/// Book levels with a zero price carry no information
fn level_price(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw).ok().filter(|p| *p > Decimal::ZERO)
}

fn in_range(price: Decimal) -> bool {
    price >= Decimal::ZERO && price <= Decimal::ONE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_book_midpoint() {
        let text = r#"{
            "event_type": "book",
            "asset_id": "tok",
            "bids": [{"price": "0.45", "size": "100"}, {"price": "0.46", "size": "10"}],
            "asks": [{"price": "0.50", "size": "100"}, {"price": "0.48", "size": "5"}]
        }"#;

        let ticks = parse_feed_message(text);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].token_id, "tok");
        assert_eq!(ticks[0].price, dec!(0.47));
        assert_eq!(ticks[0].source, TickSource::Book);
    }

    #[test]
    fn test_book_one_sided() {
        let text = r#"{"event_type": "book", "asset_id": "tok", "bids": [], "asks": [{"price": "0.52", "size": "1"}]}"#;
        let ticks = parse_feed_message(text);
        assert_eq!(ticks[0].price, dec!(0.52));

        let empty = r#"{"event_type": "book", "asset_id": "tok", "bids": [], "asks": []}"#;
        assert!(parse_feed_message(empty).is_empty());
    }

    #[test]
    fn test_price_change_flat_and_nested() {
        let flat = r#"{"event_type": "price_change", "asset_id": "a", "price": "0.33"}"#;
        let ticks = parse_feed_message(flat);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].price, dec!(0.33));

        let nested = r#"{
            "event_type": "price_change",
            "market": "0xabc",
            "price_changes": [
                {"asset_id": "a", "price": "0.40", "size": "10", "side": "BUY"},
                {"asset_id": "b", "price": "0.58", "size": "0", "side": "SELL"}
            ]
        }"#;
        let ticks = parse_feed_message(nested);
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[1].token_id, "b");
        assert_eq!(ticks[1].price, dec!(0.58));
        assert_eq!(ticks[1].source, TickSource::PriceChange);
    }

    #[test]
    fn test_last_trade_in_array() {
        let text = r#"[
            {"event_type": "last_trade_price", "asset_id": "x", "price": "0.61"},
            {"event_type": "tick_size_change", "asset_id": "x"}
        ]"#;
        let ticks = parse_feed_message(text);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].source, TickSource::LastTrade);
    }

    #[test]
    fn test_out_of_range_and_garbage_dropped() {
        assert!(parse_feed_message(r#"{"event_type": "last_trade_price", "asset_id": "x", "price": "1.5"}"#).is_empty());
        assert!(parse_feed_message(r#"{"event_type": "last_trade_price", "asset_id": "x", "price": "abc"}"#).is_empty());
        assert!(parse_feed_message("PONG").is_empty());
        assert!(parse_feed_message(r#"{"event_type": "mystery"}"#).is_empty());
    }
}
