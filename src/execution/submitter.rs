//! Order submission

use super::{OrderAck, SignedOrder};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Sends signed orders to an exchange
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    async fn submit(&self, order: &SignedOrder) -> anyhow::Result<OrderAck>;
}

/// Paper submitter that accepts every order
#[derive(Default)]
pub struct PaperSubmitter {
    accepted: Arc<RwLock<Vec<SignedOrder>>>,
}

impl PaperSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders accepted so far, in submission order
    pub async fn accepted(&self) -> Vec<SignedOrder> {
        self.accepted.read().await.clone()
    }
}

#[async_trait]
impl OrderSubmitter for PaperSubmitter {
    async fn submit(&self, order: &SignedOrder) -> anyhow::Result<OrderAck> {
        let order_id = format!("paper-{}", Uuid::new_v4());
        self.accepted.write().await.push(order.clone());

        tracing::info!(
            order_id = %order_id,
            leg = %order.leg,
            token = %order.order.token_id,
            price = %order.order.price,
            size = %order.order.size,
            "Paper order accepted"
        );
        Ok(OrderAck { order_id })
    }
}

#[derive(Debug, Serialize)]
struct OrderRequest<'a> {
    order: &'a super::Order,
    signature: &'a str,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    #[serde(rename = "orderID")]
    order_id: String,
}

/// Submits orders to the CLOB REST API
pub struct ClobSubmitter {
    api_url: String,
    client: Client,
}

impl ClobSubmitter {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            api_url: api_url.into(),
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl OrderSubmitter for ClobSubmitter {
    async fn submit(&self, order: &SignedOrder) -> anyhow::Result<OrderAck> {
        let url = format!("{}/order", self.api_url);
        let response = self
            .client
            .post(&url)
            .json(&OrderRequest {
                order: &order.order,
                signature: order.signature.as_str(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Order submission failed: {} - {}", status, body);
        }

        let body: OrderResponse = response.json().await?;
        tracing::info!(
            order_id = %body.order_id,
            leg = %order.leg,
            token = %order.order.token_id,
            "Order accepted"
        );
        Ok(OrderAck {
            order_id: body.order_id,
        })
    }
}
