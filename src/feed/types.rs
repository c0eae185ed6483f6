//! Price feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Event kind a tick was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickSource {
    /// Book snapshot midpoint
    Book,
    /// Price level change
    PriceChange,
    /// Last traded price
    LastTrade,
}

/// A single token price observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    /// Outcome token identifier
    pub token_id: String,
    /// Price in [0, 1]
    pub price: Decimal,
    /// Event kind
    pub source: TickSource,
    /// Local receive time
    pub timestamp: DateTime<Utc>,
}

/// Connection state of the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// Subscribed and streaming
    Connected,
    /// Waiting to reconnect
    Reconnecting { attempt: u32 },
    /// Closed, no more ticks will arrive
    Disconnected,
}

/// Item delivered by a [`super::PriceFeed`] subscription
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Tick(PriceTick),
    Status(FeedStatus),
}
