//! Arbitrage bot orchestration

use super::stats::{BotStats, Counters};
use crate::config::Config;
use crate::execution::ExecutionCoordinator;
use crate::feed::{FeedEvent, FeedStatus, PriceFeed, TokenRouter};
use crate::market::{seed_prices, MarketCatalog};
use crate::opportunity::{
    Opportunity, OpportunityDetector, OpportunityEvent, OpportunityValidator, RejectReason,
    ValidationResult,
};
use crate::price::PriceCache;
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// What happened to an opportunity handed to the bot
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Execution task spawned
    Spawned,
    /// Every execution slot was busy
    Dropped,
    /// Failed revalidation
    Rejected(RejectReason),
}

/// Runs the opportunity pipeline end to end
pub struct ArbitrageBot {
    cache: Arc<PriceCache>,
    router: TokenRouter,
    detector: Arc<OpportunityDetector>,
    validator: OpportunityValidator,
    coordinator: Arc<ExecutionCoordinator>,
    catalog: Arc<dyn MarketCatalog>,
    feed: Arc<dyn PriceFeed>,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
    fetch_limit: usize,
    refresh_interval: Duration,
    stats_interval: Duration,
    counters: Counters,
    started_at: Instant,
}

impl ArbitrageBot {
    pub fn new(
        config: &Config,
        catalog: Arc<dyn MarketCatalog>,
        feed: Arc<dyn PriceFeed>,
        coordinator: ExecutionCoordinator,
    ) -> Self {
        let cache = Arc::new(PriceCache::new());
        let detector = Arc::new(OpportunityDetector::new(
            Arc::clone(&cache),
            &config.detector,
            &config.sizing,
        ));
        let max_concurrent = config.bot.max_concurrent_executions;

        Self {
            cache,
            router: TokenRouter::new(),
            detector,
            validator: OpportunityValidator::new(
                &config.validator,
                config.detector.min_edge_threshold,
            ),
            coordinator: Arc::new(coordinator),
            catalog,
            feed,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            fetch_limit: config.market.fetch_limit,
            refresh_interval: Duration::from_secs(config.market.refresh_interval_secs),
            stats_interval: Duration::from_secs(config.bot.stats_report_interval_secs),
            counters: Counters::default(),
            started_at: Instant::now(),
        }
    }

    pub fn cache(&self) -> &Arc<PriceCache> {
        &self.cache
    }

    pub fn detector(&self) -> &Arc<OpportunityDetector> {
        &self.detector
    }

    pub fn coordinator(&self) -> &Arc<ExecutionCoordinator> {
        &self.coordinator
    }

    pub fn router(&self) -> &TokenRouter {
        &self.router
    }

    /// Fetch the catalog, route and seed its markets, then rescan everything
    ///
    /// Returns the number of newly routed tokens.
    pub async fn refresh_markets(&self) -> anyhow::Result<usize> {
        let markets = self.catalog.fetch_markets(self.fetch_limit).await?;
        let new_tokens = self.router.register(&markets);
        let priced = seed_prices(&self.cache, &markets);

        telemetry::set_gauge(GaugeMetric::TrackedMarkets, self.cache.len() as f64);
        telemetry::set_gauge(GaugeMetric::SubscribedTokens, self.router.len() as f64);
        tracing::info!(
            markets = markets.len(),
            priced,
            new_tokens,
            "Market catalog refreshed"
        );

        self.detector.scan_all();
        Ok(new_tokens)
    }

    /// Admit, revalidate and spawn execution of one opportunity
    ///
    /// Opportunities arriving while every slot is busy are dropped, not queued.
    pub fn dispatch(
        self: &Arc<Self>,
        opportunity: Opportunity,
        executions: &mut JoinSet<()>,
    ) -> Dispatch {
        Counters::bump(&self.counters.detected);

        let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() else {
            Counters::bump(&self.counters.dropped);
            telemetry::increment(CounterMetric::OpportunitiesDropped, 1);
            tracing::debug!(
                market = %opportunity.market_id,
                "Skipping opportunity, max concurrent executions reached"
            );
            return Dispatch::Dropped;
        };

        let current = self.cache.get(&opportunity.market_id);
        if let ValidationResult::Rejected(reason) =
            self.validator.validate(&opportunity, current.as_ref())
        {
            Counters::bump(&self.counters.rejected);
            telemetry::increment(CounterMetric::ValidationRejected, 1);
            tracing::debug!(market = %opportunity.market_id, %reason, "Opportunity rejected");
            return Dispatch::Rejected(reason);
        }

        Counters::bump(&self.counters.executed);
        let bot = Arc::clone(self);
        executions.spawn(async move {
            let _permit = permit;
            bot.report_in_flight();

            let result = bot.coordinator.execute(&opportunity).await;
            tracing::debug!(
                market = %opportunity.market_id,
                stage = %result.stage(),
                success = result.is_success(),
                "Execution attempt finished"
            );
            bot.detector
                .remove_if_current(&opportunity.market_id, opportunity.id);
        });

        Dispatch::Spawned
    }

    fn report_in_flight(&self) {
        let in_flight = self.max_concurrent - self.permits.available_permits();
        telemetry::set_gauge(GaugeMetric::InFlightExecutions, in_flight as f64);
    }

    /// Run until Ctrl-C
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `shutdown` resolves, then wait for in-flight executions
    pub async fn run_until<F>(self: Arc<Self>, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        let price_subscription = self.detector.start();

        let (opportunity_tx, mut opportunity_rx) = mpsc::channel::<Opportunity>(1024);
        let bridge = self.detector.on_opportunity(move |event| {
            if let OpportunityEvent::Detected(opportunity) = event {
                if opportunity_tx.try_send(opportunity.clone()).is_err() {
                    tracing::warn!(
                        market = %opportunity.market_id,
                        "Opportunity channel full, dropping"
                    );
                }
            }
        });

        if let Err(e) = self.refresh_markets().await {
            tracing::error!(error = %e, "Initial market fetch failed");
        }
        let mut feed_rx = self.subscribe_feed().await;

        let start = tokio::time::Instant::now();
        let mut refresh = tokio::time::interval_at(start + self.refresh_interval, self.refresh_interval);
        let mut report = tokio::time::interval_at(start + self.stats_interval, self.stats_interval);
        let mut executions: JoinSet<()> = JoinSet::new();
        tokio::pin!(shutdown);

        tracing::info!(
            max_concurrent_executions = self.max_concurrent,
            account = %self.coordinator.address(),
            "Arbitrage bot started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }

                event = next_feed_event(&mut feed_rx) => {
                    self.on_feed_event(event, &mut feed_rx);
                }

                Some(opportunity) = opportunity_rx.recv() => {
                    self.dispatch(opportunity, &mut executions);
                }

                Some(joined) = executions.join_next(), if !executions.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "Execution task failed");
                    }
                    self.report_in_flight();
                }

                _ = refresh.tick() => {
                    match self.refresh_markets().await {
                        Ok(new_tokens) if new_tokens > 0 || feed_rx.is_none() => {
                            feed_rx = self.subscribe_feed().await;
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!(error = %e, "Market refresh failed"),
                    }
                }

                _ = report.tick() => {
                    self.report_stats();
                }
            }
        }

        bridge.unsubscribe();
        price_subscription.unsubscribe();

        while let Some(joined) = executions.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Execution task failed");
            }
        }

        self.report_stats();
        tracing::info!("Arbitrage bot stopped");
        Ok(())
    }

    async fn subscribe_feed(&self) -> Option<mpsc::Receiver<FeedEvent>> {
        let tokens = self.router.token_ids();
        if tokens.is_empty() {
            tracing::warn!("No tokens to subscribe to");
            return None;
        }

        match self.feed.subscribe(tokens).await {
            Ok(rx) => Some(rx),
            Err(e) => {
                tracing::error!(error = %e, "Feed subscription failed");
                None
            }
        }
    }

    fn on_feed_event(
        &self,
        event: Option<FeedEvent>,
        feed_rx: &mut Option<mpsc::Receiver<FeedEvent>>,
    ) {
        match event {
            Some(FeedEvent::Tick(tick)) => {
                self.router.apply(&self.cache, &tick);
            }
            Some(FeedEvent::Status(FeedStatus::Connected)) => {
                tracing::info!("Price feed connected");
            }
            Some(FeedEvent::Status(FeedStatus::Reconnecting { attempt })) => {
                tracing::warn!(attempt, "Price feed interrupted, reconnecting");
            }
            Some(FeedEvent::Status(FeedStatus::Disconnected)) | None => {
                tracing::warn!("Price feed closed, will resubscribe on next refresh");
                *feed_rx = None;
            }
        }
    }

    pub fn stats(&self) -> BotStats {
        BotStats {
            uptime_secs: self.started_at.elapsed().as_secs(),
            opportunities_detected: Counters::read(&self.counters.detected),
            opportunities_executed: Counters::read(&self.counters.executed),
            opportunities_dropped: Counters::read(&self.counters.dropped),
            opportunities_rejected: Counters::read(&self.counters.rejected),
            active_opportunities: self.detector.active().len(),
            tracked_markets: self.cache.len(),
            execution: self.coordinator.stats(),
        }
    }

    fn report_stats(&self) {
        let stats = self.stats();
        tracing::info!(
            uptime = %stats.uptime_display(),
            opportunities_detected = stats.opportunities_detected,
            opportunities_executed = stats.opportunities_executed,
            opportunities_dropped = stats.opportunities_dropped,
            opportunities_rejected = stats.opportunities_rejected,
            active_opportunities = stats.active_opportunities,
            tracked_markets = stats.tracked_markets,
            executions = stats.execution.total_executions,
            successful = stats.execution.successful_executions,
            partial_fills = stats.execution.partial_fills,
            success_rate = ?stats.execution.success_rate,
            expected_profit = %stats.execution.total_expected_profit,
            "Bot stats"
        );
    }
}

async fn next_feed_event(feed_rx: &mut Option<mpsc::Receiver<FeedEvent>>) -> Option<FeedEvent> {
    match feed_rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
