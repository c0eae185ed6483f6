//! Orchestrator
//!
//! Wires the feed, price cache, detector, validator and coordinator together
//! and runs the periodic catalog refresh and stats report.

mod orchestrator;
mod stats;

pub use orchestrator::{ArbitrageBot, Dispatch};
pub use stats::BotStats;
