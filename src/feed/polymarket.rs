//! Polymarket market channel subscription

use super::{parse_feed_message, FeedEvent, FeedStatus, PriceFeed};
use crate::telemetry::{self, CounterMetric};
use crate::ws::{WsClient, WsConfig, WsMessage};
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

/// Polymarket CLOB WebSocket URL for market data
pub const POLYMARKET_WS_URL: &str = "wss://ws-subscriptions-clob.polymarket.com/ws/market";

/// Live feed over the Polymarket market channel
///
/// Resubscribes to the full token list after every reconnect.
pub struct MarketFeed {
    ws_config: WsConfig,
    buffer_size: usize,
}

impl MarketFeed {
    /// Create a feed with the given transport configuration
    pub fn new(ws_config: WsConfig) -> Self {
        Self {
            ws_config,
            buffer_size: 4096,
        }
    }

    /// Set the tick channel capacity
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }
}

impl Default for MarketFeed {
    fn default() -> Self {
        Self::new(WsConfig::new(POLYMARKET_WS_URL))
    }
}

#[async_trait]
impl PriceFeed for MarketFeed {
    async fn subscribe(&self, token_ids: Vec<String>) -> anyhow::Result<mpsc::Receiver<FeedEvent>> {
        let (tx, rx) = mpsc::channel(self.buffer_size);

        if token_ids.is_empty() {
            tracing::warn!("No token IDs provided, feed will stay idle");
            return Ok(rx);
        }

        tracing::info!(token_count = token_ids.len(), "Starting market feed subscription");

        let config = self.ws_config.clone();
        tokio::spawn(async move {
            run_subscription_loop(config, token_ids, tx).await;
        });

        Ok(rx)
    }
}

/// Subscription message for the market channel
#[derive(Debug, Serialize)]
struct SubscriptionMessage<'a> {
    assets_ids: &'a [String],
    #[serde(rename = "type")]
    msg_type: &'static str,
}

async fn run_subscription_loop(
    config: WsConfig,
    token_ids: Vec<String>,
    tx: mpsc::Sender<FeedEvent>,
) {
    let (mut ws_rx, ws_tx) = WsClient::new(config).connect();
    let mut connected = false;

    while let Some(msg) = ws_rx.recv().await {
        let forwarded = match msg {
            WsMessage::Connected => {
                connected = true;
                let subscription = SubscriptionMessage {
                    assets_ids: &token_ids,
                    msg_type: "market",
                };
                match serde_json::to_string(&subscription) {
                    Ok(json) => {
                        if ws_tx.send(json).await.is_err() {
                            tracing::error!("Failed to send subscription message");
                            return;
                        }
                        tracing::info!(tokens = token_ids.len(), "Subscribed to market channel");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to encode subscription message");
                        return;
                    }
                }
                tx.send(FeedEvent::Status(FeedStatus::Connected)).await
            }
            WsMessage::Text(text) => {
                if !connected {
                    continue;
                }
                let ticks = parse_feed_message(&text);
                telemetry::increment(CounterMetric::FeedTicks, ticks.len() as u64);
                let mut result = Ok(());
                for tick in ticks {
                    result = tx.send(FeedEvent::Tick(tick)).await;
                    if result.is_err() {
                        break;
                    }
                }
                result
            }
            WsMessage::Reconnecting { attempt } => {
                connected = false;
                telemetry::increment(CounterMetric::FeedReconnects, 1);
                tx.send(FeedEvent::Status(FeedStatus::Reconnecting { attempt })).await
            }
            WsMessage::Disconnected => {
                let _ = tx.send(FeedEvent::Status(FeedStatus::Disconnected)).await;
                break;
            }
        };

        if forwarded.is_err() {
            tracing::debug!("Feed receiver dropped, closing subscription");
            return;
        }
    }

    tracing::info!("Market feed subscription ended");
}
