//! Bot statistics

use crate::execution::ExecutionStats;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of the bot
#[derive(Debug, Clone, Serialize)]
pub struct BotStats {
    pub uptime_secs: u64,
    /// Detected events received from the detector
    pub opportunities_detected: u64,
    /// Opportunities handed to the coordinator
    pub opportunities_executed: u64,
    /// Opportunities dropped because every execution slot was busy
    pub opportunities_dropped: u64,
    /// Opportunities rejected by the validator
    pub opportunities_rejected: u64,
    pub active_opportunities: usize,
    pub tracked_markets: usize,
    pub execution: ExecutionStats,
}

impl BotStats {
    /// Uptime as `XhYmZs`
    pub fn uptime_display(&self) -> String {
        let hours = self.uptime_secs / 3600;
        let minutes = (self.uptime_secs % 3600) / 60;
        let seconds = self.uptime_secs % 60;
        format!("{hours}h {minutes}m {seconds}s")
    }
}

#[derive(Debug, Default)]
pub(super) struct Counters {
    pub detected: AtomicU64,
    pub executed: AtomicU64,
    pub dropped: AtomicU64,
    pub rejected: AtomicU64,
}

impl Counters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn read(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
