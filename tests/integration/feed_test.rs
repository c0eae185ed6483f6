//! Integration tests for feed parsing and routing

use poly_arb::feed::{parse_feed_message, TickSource, TokenRouter};
use poly_arb::market::{MarketDescriptor, Side};
use poly_arb::price::PriceCache;
use rust_decimal_macros::dec;

fn descriptor() -> MarketDescriptor {
    MarketDescriptor {
        market_id: "0xcond".to_string(),
        question: "Will it rain?".to_string(),
        yes_token_id: "111".to_string(),
        no_token_id: "222".to_string(),
        yes_price: None,
        no_price: None,
    }
}

#[test]
fn test_book_and_price_change_reach_cache() {
    let router = TokenRouter::new();
    let cache = PriceCache::new();
    router.register(&[descriptor()]);

    let book = r#"[{
        "event_type": "book",
        "asset_id": "111",
        "market": "0xcond",
        "bids": [{"price": "0.46", "size": "100"}, {"price": "0.45", "size": "50"}],
        "asks": [{"price": "0.48", "size": "80"}]
    }]"#;
    let ticks = parse_feed_message(book);
    assert_eq!(ticks.len(), 1);
    assert_eq!(ticks[0].source, TickSource::Book);
    assert_eq!(ticks[0].price, dec!(0.47));

    for tick in &ticks {
        router.apply(&cache, tick);
    }

    let change = r#"{
        "event_type": "price_change",
        "asset_id": "222",
        "price": "0.50"
    }"#;
    for tick in &parse_feed_message(change) {
        router.apply(&cache, tick);
    }

    let snapshot = cache.get("0xcond").unwrap();
    assert_eq!(snapshot.yes_price, Some(dec!(0.47)));
    assert_eq!(snapshot.no_price, Some(dec!(0.50)));
    assert_eq!(snapshot.edge(), Some(dec!(0.03)));
}

#[test]
fn test_unknown_token_ignored() {
    let router = TokenRouter::new();
    let cache = PriceCache::new();
    router.register(&[descriptor()]);

    let ticks = parse_feed_message(
        r#"{"event_type": "last_trade_price", "asset_id": "999", "price": "0.40"}"#,
    );
    assert_eq!(ticks.len(), 1);
    assert!(router.apply(&cache, &ticks[0]).is_none());
    assert!(cache.is_empty());
    assert_eq!(router.route("222"), Some(("0xcond".to_string(), Side::No)));
}

#[test]
fn test_malformed_message_yields_nothing() {
    assert!(parse_feed_message("not json").is_empty());
    assert!(parse_feed_message(r#"{"event_type": "tick_size_change"}"#).is_empty());
}
