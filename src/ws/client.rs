//! WebSocket client with automatic reconnection

use super::types::{WsConfig, WsError, WsMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// WebSocket client with reconnection and ping keepalive
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Connect in a background task
    ///
    /// Returns `(events, outbound)`. `Connected` is emitted after every
    /// successful (re)connect so callers can resend subscriptions. Dropping
    /// `outbound` or `events` closes the connection.
    pub fn connect(&self) -> (mpsc::Receiver<WsMessage>, mpsc::Sender<String>) {
        let (msg_tx, msg_rx) = mpsc::channel(1024);
        let (send_tx, send_rx) = mpsc::channel(256);
        let config = self.config.clone();

        tokio::spawn(async move {
            if let Err(e) = run_connection_loop(config, msg_tx, send_rx).await {
                tracing::error!(error = %e, "WebSocket connection loop failed");
            }
        });

        (msg_rx, send_tx)
    }
}

async fn run_connection_loop(
    config: WsConfig,
    tx: mpsc::Sender<WsMessage>,
    mut send_rx: mpsc::Receiver<String>,
) -> Result<(), WsError> {
    let policy = config.reconnect;
    let mut attempts = 0;

    loop {
        let mut connected = false;
        match connect_and_stream(&config, &tx, &mut send_rx, &mut connected).await {
            Ok(()) => {
                tracing::info!("WebSocket connection closed cleanly");
                let _ = tx.send(WsMessage::Disconnected).await;
                return Ok(());
            }
            Err(e) => {
                // Each interruption of a live connection gets a fresh budget
                if connected {
                    attempts = 0;
                }
                attempts += 1;
                tracing::warn!(error = %e, attempt = attempts, "WebSocket connection error");

                if policy.exhausted(attempts) {
                    tracing::error!("Max reconnection attempts reached");
                    let _ = tx.send(WsMessage::Disconnected).await;
                    return Err(WsError::MaxReconnectsExceeded);
                }

                if tx.is_closed() {
                    tracing::info!("Receiver dropped, stopping reconnection");
                    return Ok(());
                }

                let _ = tx.send(WsMessage::Reconnecting { attempt: attempts }).await;
                sleep(policy.delay_for(attempts)).await;
            }
        }
    }
}

async fn connect_and_stream(
    config: &WsConfig,
    tx: &mpsc::Sender<WsMessage>,
    send_rx: &mut mpsc::Receiver<String>,
    connected: &mut bool,
) -> Result<(), WsError> {
    tracing::info!(url = %config.url, "Connecting to WebSocket");

    let (ws_stream, _response) = connect_async(&config.url)
        .await
        .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

    let (mut write, mut read) = ws_stream.split();

    if tx.send(WsMessage::Connected).await.is_err() {
        return Ok(());
    }
    *connected = true;

    let mut ping_interval = tokio::time::interval(config.ping_interval);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // First tick fires immediately
    ping_interval.tick().await;
    let mut waiting_for_pong = false;

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if tx.send(WsMessage::Text(text)).await.is_err() {
                            tracing::debug!("Receiver dropped, closing connection");
                            return Ok(());
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        write.send(Message::Pong(data)).await
                            .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    }
                    Some(Ok(Message::Pong(_))) => {
                        waiting_for_pong = false;
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("Received close frame");
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        return Err(WsError::ConnectionFailed(e.to_string()));
                    }
                    None => {
                        return Err(WsError::ConnectionFailed("stream ended unexpectedly".into()));
                    }
                    _ => {}
                }
            }

            outbound = send_rx.recv() => {
                match outbound {
                    Some(text) => {
                        write.send(Message::Text(text)).await
                            .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    }
                    None => return Ok(()),
                }
            }

            _ = ping_interval.tick() => {
                if waiting_for_pong {
                    return Err(WsError::ConnectionFailed("pong timeout".into()));
                }
                write.send(Message::Ping(vec![])).await
                    .map_err(|e| WsError::SendFailed(e.to_string()))?;
                waiting_for_pong = true;
            }
        }
    }
}
