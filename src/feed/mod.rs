//! Live price feed
//!
//! Streams per-token prices from the Polymarket market channel and routes
//! them into the price cache.

mod parse;
mod polymarket;
mod router;
mod types;

pub use parse::parse_feed_message;
pub use polymarket::{MarketFeed, POLYMARKET_WS_URL};
pub use router::TokenRouter;
pub use types::{FeedEvent, FeedStatus, PriceTick, TickSource};

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Source of live price ticks
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Subscribe to ticks for the given tokens
    ///
    /// Dropping the receiver ends the subscription.
    async fn subscribe(&self, token_ids: Vec<String>) -> anyhow::Result<mpsc::Receiver<FeedEvent>>;
}
