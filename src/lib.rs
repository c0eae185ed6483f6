//! poly-arb: Complete-set arbitrage bot for Polymarket binary markets
//!
//! This library provides the core components for:
//! - Market catalog fetching from the CLOB REST API
//! - Live per-token prices from the Polymarket market channel
//! - A shared price cache with update notifications
//! - Edge detection with Kelly-style position sizing
//! - Pre-trade validation and opportunity ranking
//! - Paired YES/NO order building, signing and submission
//! - Bot orchestration with bounded concurrent executions
//! - Full observability stack

pub mod bot;
pub mod cli;
pub mod config;
pub mod execution;
pub mod feed;
pub mod market;
pub mod opportunity;
pub mod price;
pub mod risk;
pub mod subscription;
pub mod telemetry;
pub mod ws;
