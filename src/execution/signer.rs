//! Order signing capabilities

use super::Signature;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Placeholder account used when no address is configured in paper mode
pub const DRY_RUN_ADDRESS: &str = "0xDRY_RUN_MODE_NO_WALLET";

/// Signature returned by [`DryRunSigner`]
pub const DRY_RUN_SIGNATURE: &str = "DRY_RUN_SIGNATURE";

/// Signs order payloads on behalf of one account
#[async_trait]
pub trait OrderSigner: Send + Sync {
    /// Account the signatures are made for
    fn address(&self) -> &str;
    /// Sign an opaque payload
    async fn sign(&self, payload: &[u8]) -> anyhow::Result<Signature>;
}

/// Signer for paper trading; never touches key material
#[derive(Debug, Clone)]
pub struct DryRunSigner {
    address: String,
}

impl DryRunSigner {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

impl Default for DryRunSigner {
    fn default() -> Self {
        Self::new(DRY_RUN_ADDRESS)
    }
}

#[async_trait]
impl OrderSigner for DryRunSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign(&self, _payload: &[u8]) -> anyhow::Result<Signature> {
        Ok(Signature(DRY_RUN_SIGNATURE.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct SignRequest<'a> {
    address: &'a str,
    payload: &'a str,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    signature: String,
}

/// Delegates signing to an external HTTP signing service
pub struct RemoteSigner {
    url: String,
    address: String,
    client: Client,
}

impl RemoteSigner {
    pub fn new(
        url: impl Into<String>,
        address: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            url: url.into(),
            address: address.into(),
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl OrderSigner for RemoteSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign(&self, payload: &[u8]) -> anyhow::Result<Signature> {
        let payload = std::str::from_utf8(payload)?;
        let response = self
            .client
            .post(&self.url)
            .json(&SignRequest {
                address: &self.address,
                payload,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Signing service error: {} - {}", status, body);
        }

        let body: SignResponse = response.json().await?;
        if body.signature.is_empty() {
            anyhow::bail!("Signing service returned an empty signature");
        }
        Ok(Signature(body.signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_signer() {
        let signer = DryRunSigner::default();
        assert_eq!(signer.address(), DRY_RUN_ADDRESS);

        let signature = signer.sign(b"{}").await.unwrap();
        assert_eq!(signature.as_str(), DRY_RUN_SIGNATURE);
    }

    #[tokio::test]
    async fn test_remote_signer_unreachable() {
        let signer = RemoteSigner::new(
            "http://127.0.0.1:1/sign",
            "0xabc",
            Duration::from_millis(500),
        )
        .unwrap();
        assert_eq!(signer.address(), "0xabc");
        assert!(signer.sign(b"{}").await.is_err());
    }

    #[test]
    fn test_sign_request_shape() {
        let request = SignRequest {
            address: "0xabc",
            payload: "{\"salt\":\"1\"}",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["address"], "0xabc");
        assert_eq!(json["payload"], "{\"salt\":\"1\"}");
    }
}
