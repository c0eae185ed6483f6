//! End-to-end pipeline tests: catalog, feed, detection, validation, execution

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use poly_arb::bot::ArbitrageBot;
use poly_arb::config::Config;
use poly_arb::execution::{
    DryRunSigner, ExecutionCoordinator, OrderAck, OrderSubmitter, PaperSubmitter, SignedOrder,
};
use poly_arb::feed::{FeedEvent, FeedStatus, PriceFeed, PriceTick, TickSource};
use poly_arb::market::{MarketCatalog, MarketDescriptor, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

struct StaticCatalog {
    markets: Vec<MarketDescriptor>,
}

#[async_trait]
impl MarketCatalog for StaticCatalog {
    async fn fetch_markets(&self, _limit: usize) -> anyhow::Result<Vec<MarketDescriptor>> {
        Ok(self.markets.clone())
    }
}

/// Feed backed by a channel the test drives
struct ScriptedFeed {
    rx: Mutex<Option<mpsc::Receiver<FeedEvent>>>,
    subscriptions: Mutex<Vec<Vec<String>>>,
}

impl ScriptedFeed {
    fn new() -> (Self, mpsc::Sender<FeedEvent>) {
        let (tx, rx) = mpsc::channel(64);
        let feed = Self {
            rx: Mutex::new(Some(rx)),
            subscriptions: Mutex::new(vec![]),
        };
        (feed, tx)
    }
}

#[async_trait]
impl PriceFeed for ScriptedFeed {
    async fn subscribe(&self, token_ids: Vec<String>) -> anyhow::Result<mpsc::Receiver<FeedEvent>> {
        self.subscriptions.lock().push(token_ids);
        self.rx
            .lock()
            .take()
            .ok_or_else(|| anyhow::anyhow!("already subscribed"))
    }
}

/// Accepts YES legs and rejects NO legs
struct HalfSubmitter;

#[async_trait]
impl OrderSubmitter for HalfSubmitter {
    async fn submit(&self, order: &SignedOrder) -> anyhow::Result<OrderAck> {
        match order.leg {
            Side::Yes => Ok(OrderAck {
                order_id: "yes-1".to_string(),
            }),
            Side::No => anyhow::bail!("insufficient balance"),
        }
    }
}

fn unpriced_market() -> MarketDescriptor {
    MarketDescriptor {
        market_id: "0xcond".to_string(),
        question: "Will it rain?".to_string(),
        yes_token_id: "111".to_string(),
        no_token_id: "222".to_string(),
        yes_price: Some(dec!(0.50)),
        no_price: Some(dec!(0.52)),
    }
}

fn tick(token_id: &str, price: Decimal) -> FeedEvent {
    FeedEvent::Tick(PriceTick {
        token_id: token_id.to_string(),
        price,
        source: TickSource::PriceChange,
        timestamp: Utc::now(),
    })
}

fn build_bot(
    submitter: Arc<dyn OrderSubmitter>,
    feed: Arc<ScriptedFeed>,
) -> Arc<ArbitrageBot> {
    let coordinator = ExecutionCoordinator::new(
        Arc::new(DryRunSigner::default()),
        submitter,
        chrono::Duration::seconds(300),
    );
    Arc::new(ArbitrageBot::new(
        &Config::default(),
        Arc::new(StaticCatalog {
            markets: vec![unpriced_market()],
        }),
        feed,
        coordinator,
    ))
}

async fn wait_for<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn test_feed_ticks_drive_paper_execution() {
    let submitter = Arc::new(PaperSubmitter::new());
    let (feed, ticks) = ScriptedFeed::new();
    let feed = Arc::new(feed);
    let bot = build_bot(submitter.clone(), Arc::clone(&feed));

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let runner = tokio::spawn(Arc::clone(&bot).run_until(async {
        let _ = stop_rx.await;
    }));

    // Catalog prices 0.50 + 0.52 carry no edge
    wait_for(|| bot.cache().is_complete("0xcond")).await;
    assert!(bot.detector().active().is_empty());

    ticks.send(FeedEvent::Status(FeedStatus::Connected)).await.unwrap();
    ticks.send(tick("111", dec!(0.47))).await.unwrap();
    ticks.send(tick("222", dec!(0.50))).await.unwrap();

    wait_for(|| bot.coordinator().stats().total_executions == 1).await;

    stop_tx.send(()).unwrap();
    runner.await.unwrap().unwrap();

    let subscriptions = feed.subscriptions.lock().clone();
    assert_eq!(subscriptions, vec![vec!["111".to_string(), "222".to_string()]]);

    let orders = submitter.accepted().await;
    assert_eq!(orders.len(), 2);
    let yes = orders.iter().find(|o| o.leg == Side::Yes).unwrap();
    let no = orders.iter().find(|o| o.leg == Side::No).unwrap();
    assert_eq!(yes.order.token_id, "111");
    assert_eq!(yes.order.price, dec!(0.47));
    assert_eq!(no.order.token_id, "222");
    assert_eq!(no.order.price, dec!(0.50));

    let stats = bot.stats();
    assert_eq!(stats.opportunities_detected, 1);
    assert_eq!(stats.opportunities_executed, 1);
    assert_eq!(stats.execution.successful_executions, 1);
    assert_eq!(stats.execution.success_rate, Some(dec!(100)));
    // Executed opportunities are cleared
    assert!(bot.detector().get("0xcond").is_none());
}

#[tokio::test]
async fn test_partial_fill_is_recorded_and_cleared() {
    let (feed, ticks) = ScriptedFeed::new();
    let bot = build_bot(Arc::new(HalfSubmitter), Arc::new(feed));

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let runner = tokio::spawn(Arc::clone(&bot).run_until(async {
        let _ = stop_rx.await;
    }));

    wait_for(|| bot.cache().is_complete("0xcond")).await;
    ticks.send(tick("111", dec!(0.47))).await.unwrap();
    ticks.send(tick("222", dec!(0.50))).await.unwrap();

    wait_for(|| bot.coordinator().stats().total_executions == 1).await;

    stop_tx.send(()).unwrap();
    runner.await.unwrap().unwrap();

    let history = bot.coordinator().history();
    assert_eq!(history.len(), 1);
    assert!(history[0].result.is_partial());
    assert_eq!(history[0].result.order_ids(), vec!["yes-1"]);

    let stats = bot.coordinator().stats();
    assert_eq!(stats.partial_fills, 1);
    assert_eq!(stats.failed_executions, 0);
    assert!(bot.detector().get("0xcond").is_none());
}

#[tokio::test]
async fn test_feed_close_and_unknown_tokens_are_tolerated() {
    let (feed, ticks) = ScriptedFeed::new();
    let bot = build_bot(Arc::new(PaperSubmitter::new()), Arc::new(feed));

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let runner = tokio::spawn(Arc::clone(&bot).run_until(async {
        let _ = stop_rx.await;
    }));

    wait_for(|| bot.cache().is_complete("0xcond")).await;
    ticks.send(tick("999", dec!(0.10))).await.unwrap();
    ticks
        .send(FeedEvent::Status(FeedStatus::Disconnected))
        .await
        .unwrap();
    drop(ticks);

    tokio::time::sleep(Duration::from_millis(100)).await;
    stop_tx.send(()).unwrap();
    runner.await.unwrap().unwrap();

    assert_eq!(bot.cache().len(), 1);
    assert_eq!(bot.coordinator().stats().total_executions, 0);
}
