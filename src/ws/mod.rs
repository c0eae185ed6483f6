//! WebSocket transport
//!
//! Bidirectional client with ping keepalive and capped exponential backoff
//! between reconnection attempts.

mod client;
mod types;

pub use client::WsClient;
pub use types::{ReconnectPolicy, WsConfig, WsError, WsMessage};
